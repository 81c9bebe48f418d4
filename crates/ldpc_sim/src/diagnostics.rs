//! Per-error-frame diagnostics.
//!
//! When enabled, every counted frame error is appended to a separate log
//! with the positions of the wrong bits and of the unsatisfied checks.

use ldpc_code::CodeDescriptor;
use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Description of one erroneous frame against the all-zero codeword.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorFrameRecord {
    /// Channel parameter of the sweep point.
    pub parameter: f64,
    /// Frame counter value when the error was recorded.
    pub frame: u64,
    /// Bit positions decoded as one.
    pub failed_bits: Vec<usize>,
    /// Checks not satisfied by the hard decision.
    pub failed_checks: Vec<usize>,
}

impl ErrorFrameRecord {
    /// Builds a record from a hard decision.
    pub fn new(
        parameter: f64,
        frame: u64,
        hard_bits: &[bool],
        code: &dyn CodeDescriptor,
    ) -> Self {
        let failed_bits = hard_bits
            .iter()
            .enumerate()
            .filter_map(|(i, &bit)| bit.then_some(i))
            .collect();
        Self {
            parameter,
            frame,
            failed_bits,
            failed_checks: code.syndrome(hard_bits),
        }
    }

    /// Returns true if the decoder converged to a wrong codeword.
    pub fn is_codeword(&self) -> bool {
        self.failed_checks.is_empty()
    }
}

impl fmt::Display for ErrorFrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bits = String::new();
        for b in &self.failed_bits {
            write!(bits, " {b}")?;
        }
        let mut checks = String::new();
        for c in &self.failed_checks {
            write!(checks, " {c}")?;
        }
        write!(
            f,
            "param: {:.3} -- frame: {} -- is codeword: {} -- dH: {} |{bits} -- synd weight: {} |{checks}",
            self.parameter,
            self.frame,
            u8::from(self.is_codeword()),
            self.failed_bits.len(),
            self.failed_checks.len(),
        )
    }
}

/// Append-only error-frame log.
#[derive(Debug, Clone)]
pub struct ErrorFrameLog {
    path: PathBuf,
}

impl ErrorFrameLog {
    /// Creates a log writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn append(&self, record: &ErrorFrameRecord) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{record}")
    }
}
