//! Simulation configuration.
//!
//! [`SimConfig`] gathers everything the sweep needs from outside: the grid,
//! the worker pool size, the stopping rule, the decoder settings and where
//! results go. It can be built in code with the `with_*` methods or loaded
//! from a YAML or JSON file.

use crate::error::{Error, Result};
use ldpc_channel::ChannelKind;
use ldpc_code::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where snapshots are surfaced besides the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Continuously overwritten console progress line.
    #[default]
    Interactive,
    /// In-process results table, no console output.
    Headless,
    /// Both the console line and the results table.
    Both,
}

impl OutputMode {
    /// Returns true if progress lines are written.
    pub const fn console(self) -> bool {
        matches!(self, Self::Interactive | Self::Both)
    }

    /// Returns true if the results table is filled.
    pub const fn table(self) -> bool {
        matches!(self, Self::Headless | Self::Both)
    }
}

/// `(start, stop, step)` description of the channel-parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRange {
    /// First value.
    pub start: f64,
    /// Exclusive upper bound.
    pub stop: f64,
    /// Increment between values.
    pub step: f64,
}

impl GridRange {
    /// Creates a grid range.
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }
}

/// Configuration for a parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Result log, fully rewritten on every snapshot.
    pub log_path: Option<PathBuf>,
    /// Channel-parameter grid.
    pub grid: GridRange,
    /// Number of worker threads.
    pub workers: usize,
    /// Base seed; worker `i` is seeded with `seed + i`.
    pub seed: u64,
    /// Channel model name (`awgn` or `bsc`).
    pub channel: String,
    /// Check-node update rule.
    pub algorithm: Algorithm,
    /// Decoder iteration cap.
    pub max_iterations: u32,
    /// Stop decoding once the hard decision is a codeword.
    pub early_termination: bool,
    /// Frame errors after which a point is complete.
    pub target_frame_errors: u64,
    /// Frames after which a point is complete regardless of errors.
    pub max_frames: u64,
    /// Console and/or results-table output.
    pub output_mode: OutputMode,
    /// Append the per-frame latency column to the log.
    pub log_frame_time: bool,
    /// Write a column header as the first log line.
    pub log_header: bool,
    /// Optional per-error-frame diagnostics log (appended).
    pub error_log: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_path: Some(PathBuf::from("results.txt")),
            grid: GridRange::new(0.0, 3.0, 0.5),
            workers: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
            seed: 0,
            channel: ChannelKind::Awgn.to_string(),
            algorithm: Algorithm::default(),
            max_iterations: 50,
            early_termination: true,
            target_frame_errors: 50,
            max_frames: 10_000_000,
            output_mode: OutputMode::default(),
            log_frame_time: false,
            log_header: true,
            error_log: None,
        }
    }
}

impl SimConfig {
    /// Sets the parameter grid.
    #[must_use]
    pub const fn with_grid(mut self, start: f64, stop: f64, step: f64) -> Self {
        self.grid = GridRange::new(start, stop, step);
        self
    }

    /// Sets the number of workers.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects the channel model by name.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Sets the decoder algorithm and iteration cap.
    #[must_use]
    pub const fn with_decoder(mut self, algorithm: Algorithm, max_iterations: u32) -> Self {
        self.algorithm = algorithm;
        self.max_iterations = max_iterations;
        self
    }

    /// Enables or disables decoder early termination.
    #[must_use]
    pub const fn with_early_termination(mut self, enabled: bool) -> Self {
        self.early_termination = enabled;
        self
    }

    /// Sets the stopping rule.
    #[must_use]
    pub const fn with_limits(mut self, target_frame_errors: u64, max_frames: u64) -> Self {
        self.target_frame_errors = target_frame_errors;
        self.max_frames = max_frames;
        self
    }

    /// Sets the output mode.
    #[must_use]
    pub const fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Sets the result log path; `None` disables the log file.
    #[must_use]
    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    /// Adds the latency column to the log.
    #[must_use]
    pub const fn with_frame_time(mut self, enabled: bool) -> Self {
        self.log_frame_time = enabled;
        self
    }

    /// Enables the per-error-frame diagnostics log.
    #[must_use]
    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = Some(path.into());
        self
    }

    /// Loads a configuration file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(Error::InvalidConfig(format!(
                "unsupported config extension {other:?} for {} (use .yaml or .json)",
                path.display()
            ))),
        }
    }

    /// Parses a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] on malformed input.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
            format: "yaml",
            message: e.to_string(),
        })
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] on malformed input.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse {
            format: "json",
            message: e.to_string(),
        })
    }

    /// Checks the values that do not depend on the channel model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGrid`] or [`Error::InvalidConfig`].
    pub fn validate(&self) -> Result<()> {
        let GridRange { start, stop, step } = self.grid;
        if !step.is_finite() || step <= 0.0 || !start.is_finite() || !stop.is_finite() {
            return Err(Error::InvalidGrid { start, stop, step });
        }
        if self.target_frame_errors == 0 {
            return Err(Error::InvalidConfig(
                "target_frame_errors must be at least 1".to_string(),
            ));
        }
        if self.max_frames == 0 {
            return Err(Error::InvalidConfig("max_frames must be at least 1".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the channel model name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChannel`] for names outside the supported set.
    pub fn channel_kind(&self) -> Result<ChannelKind> {
        Ok(self.channel.parse::<ChannelKind>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channel_kind().unwrap(), ChannelKind::Awgn);
        assert!(config.workers >= 1);
    }

    #[test]
    fn rejects_non_positive_step() {
        for step in [0.0, -0.5, f64::NAN] {
            let config = SimConfig::default().with_grid(0.0, 1.0, step);
            assert!(
                matches!(config.validate(), Err(Error::InvalidGrid { .. })),
                "step {step} accepted"
            );
        }
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(SimConfig::default().with_limits(0, 10).validate().is_err());
        assert!(SimConfig::default().with_limits(10, 0).validate().is_err());
    }

    #[test]
    fn unknown_channel_is_distinguishable() {
        let config = SimConfig::default().with_channel("rayleigh");
        assert!(matches!(
            config.channel_kind(),
            Err(Error::UnknownChannel(name)) if name == "rayleigh"
        ));
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config = SimConfig::from_yaml_str(
            "grid: { start: 1.0, stop: 2.0, step: 0.25 }\n\
             workers: 3\n\
             channel: bsc\n\
             output_mode: headless\n",
        )
        .unwrap();
        assert_eq!(config.grid, GridRange::new(1.0, 2.0, 0.25));
        assert_eq!(config.workers, 3);
        assert_eq!(config.channel, "bsc");
        assert_eq!(config.output_mode, OutputMode::Headless);
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    fn json_selects_min_sum() {
        let config =
            SimConfig::from_json_str("{ \"algorithm\": { \"min_sum\": { \"scale\": 0.75 } } }")
                .unwrap();
        assert_eq!(config.algorithm, Algorithm::MinSum { scale: 0.75 });
    }

    #[test]
    fn json_parse_error_is_reported() {
        let err = SimConfig::from_json_str("{ \"workers\": \"many\" }").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { format: "json", .. }));
    }

    #[test]
    fn from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("sim.json");
        std::fs::write(&json, "{ \"seed\": 9, \"target_frame_errors\": 7 }").unwrap();
        let config = SimConfig::from_file(&json).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.target_frame_errors, 7);

        let toml = dir.path().join("sim.toml");
        std::fs::write(&toml, "seed = 9").unwrap();
        assert!(matches!(
            SimConfig::from_file(&toml),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn output_mode_flags() {
        assert!(OutputMode::Interactive.console() && !OutputMode::Interactive.table());
        assert!(!OutputMode::Headless.console() && OutputMode::Headless.table());
        assert!(OutputMode::Both.console() && OutputMode::Both.table());
    }
}
