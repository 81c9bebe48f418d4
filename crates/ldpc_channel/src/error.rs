//! Error types for channel selection.

use thiserror::Error;

/// Errors that can occur while selecting or configuring a channel.
#[derive(Debug, Error)]
pub enum Error {
    /// Channel model name outside the supported set.
    #[error("unknown channel model '{0}' (expected 'awgn' or 'bsc')")]
    UnknownChannel(String),
}

/// Result type alias for channel operations.
pub type Result<T> = std::result::Result<T, Error>;
