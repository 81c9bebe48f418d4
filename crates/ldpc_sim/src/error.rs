//! Error types for simulator construction.
//!
//! Only construction can fail. Once a sweep is running, I/O problems are
//! reported as warnings and never abort it.

use thiserror::Error;

/// Errors that can occur while building a simulator.
#[derive(Debug, Error)]
pub enum Error {
    /// Channel model outside the supported set.
    #[error("unknown channel model '{0}' (expected 'awgn' or 'bsc')")]
    UnknownChannel(String),

    /// The parameter grid cannot be generated.
    #[error("invalid parameter grid: start={start}, stop={stop}, step={step} (step must be positive and bounds finite)")]
    InvalidGrid {
        /// First value.
        start: f64,
        /// Exclusive upper bound.
        stop: f64,
        /// Increment.
        step: f64,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be parsed.
    #[error("config parse error ({format}): {message}")]
    ConfigParse {
        /// The format that failed to parse.
        format: &'static str,
        /// Description of the parse error.
        message: String,
    },

    /// Code loading failed.
    #[error(transparent)]
    Code(#[from] ldpc_code::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ldpc_channel::Error> for Error {
    fn from(err: ldpc_channel::Error) -> Self {
        match err {
            ldpc_channel::Error::UnknownChannel(name) => Self::UnknownChannel(name),
        }
    }
}

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;
