//! Channel models for LDPC simulation.
//!
//! Every channel transmits the all-zero codeword, draws one noisy
//! realization per [`Channel::simulate`] call and turns it into decoder
//! LLRs with [`Channel::compute_llrs`]. Channels are seeded so a worker's
//! stream of realizations is reproducible.
//!
//! # Example
//!
//! ```rust,ignore
//! use ldpc_channel::ChannelKind;
//!
//! let mut channel = "awgn".parse::<ChannelKind>()?.build(block_length, 42);
//! channel.set_param(2.5);
//! channel.simulate();
//! channel.compute_llrs(&mut llrs);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod awgn;
pub mod bsc;
pub mod error;

pub use awgn::AwgnChannel;
pub use bsc::BscChannel;
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A noisy channel feeding one decoder.
pub trait Channel: Send {
    /// Sets the tunable channel parameter (SNR, crossover probability, ...).
    fn set_param(&mut self, value: f64);

    /// Current channel parameter.
    fn param(&self) -> f64;

    /// Draws a new channel realization for the all-zero codeword.
    fn simulate(&mut self);

    /// Writes the LLRs of the current realization into `llrs`.
    ///
    /// `llrs.len()` must equal the block length the channel was built for.
    fn compute_llrs(&self, llrs: &mut [f64]);
}

/// The closed set of supported channel models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// BPSK over additive white Gaussian noise; parameter is Es/N0 in dB.
    Awgn,
    /// Binary symmetric channel; parameter is the crossover probability.
    Bsc,
}

impl ChannelKind {
    /// Builds a channel of this kind for `block_length` bits.
    pub fn build(self, block_length: usize, seed: u64) -> Box<dyn Channel> {
        match self {
            Self::Awgn => Box::new(AwgnChannel::new(block_length, seed)),
            Self::Bsc => Box::new(BscChannel::new(block_length, seed)),
        }
    }

    /// Name of the swept parameter, used as the first log column.
    pub const fn param_name(self) -> &'static str {
        match self {
            Self::Awgn => "snr",
            Self::Bsc => "epsilon",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awgn => write!(f, "awgn"),
            Self::Bsc => write!(f, "bsc"),
        }
    }
}

impl FromStr for ChannelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awgn" => Ok(Self::Awgn),
            "bsc" => Ok(Self::Bsc),
            _ => Err(Error::UnknownChannel(s.to_string())),
        }
    }
}
