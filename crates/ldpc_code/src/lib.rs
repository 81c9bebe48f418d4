//! LDPC code descriptor and iterative decoder.
//!
//! This crate provides:
//! - [`LdpcCode`]: a sparse parity-check matrix loaded from alist files
//! - [`CodeDescriptor`]: the read-only dimensions a simulator needs
//! - [`Decoder`] and [`BpDecoder`]: flooding belief propagation with
//!   early termination
//!
//! # Example
//!
//! ```rust,ignore
//! use ldpc_code::{Algorithm, BpDecoder, Decoder, LdpcCode};
//! use std::sync::Arc;
//!
//! let code = Arc::new(LdpcCode::load("code.alist")?);
//! let mut decoder = BpDecoder::new(code, Algorithm::SumProduct, 50, true);
//! let iterations = decoder.decode(&llrs);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod code;
pub mod decoder;
pub mod error;

pub use code::{CodeDescriptor, LdpcCode};
pub use decoder::{Algorithm, BpDecoder, Decoder};
pub use error::{Error, Result};
