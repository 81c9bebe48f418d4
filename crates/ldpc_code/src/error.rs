//! Error types for code loading and validation.

use thiserror::Error;

/// Errors that can occur while building or loading a code.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse an alist description.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// Line number where the error occurred (1-based).
        line: usize,
        /// Reason for the parse failure.
        reason: String,
    },

    /// The matrix is well-formed text but not a usable code.
    #[error("invalid code: {0}")]
    Invalid(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a parse error at the given line.
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for code operations.
pub type Result<T> = std::result::Result<T, Error>;
