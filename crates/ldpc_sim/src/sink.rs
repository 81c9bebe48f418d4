//! Result snapshots.
//!
//! A [`ResultPoint`] is the derived view of one sweep point at some moment.
//! The [`ResultSink`] keeps the latest point per sweep position and surfaces
//! it three ways: an in-process [`ResultTable`], a console progress line
//! overwritten with `\r`, and a log file rewritten in full on every emission.

#![allow(clippy::cast_precision_loss)] // frame counts stay far below 2^52

use crate::config::{OutputMode, SimConfig};
use crate::diagnostics::{ErrorFrameLog, ErrorFrameRecord};
use crate::stats::Counters;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Derived metrics of one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPoint {
    /// Channel parameter value.
    pub parameter: f64,
    /// Frame-error rate.
    pub fer: f64,
    /// Bit-error rate.
    pub ber: f64,
    /// Mean decoder iterations per counted frame.
    pub avg_iterations: f64,
    /// Frames counted.
    pub frame_count: u64,
    /// Frame errors counted.
    pub frame_error_count: u64,
    /// Wall time per counted frame, snapshot overhead excluded.
    pub per_frame_latency: Duration,
}

impl ResultPoint {
    /// Derives a point from a counter state.
    ///
    /// Returns `None` when no frame has been counted.
    pub fn from_counters(
        parameter: f64,
        counters: Counters,
        block_length: usize,
        elapsed: Duration,
    ) -> Option<Self> {
        let metrics = counters.metrics(block_length)?;
        Some(Self {
            parameter,
            fer: metrics.fer,
            ber: metrics.ber,
            avg_iterations: metrics.avg_iterations,
            frame_count: counters.frames,
            frame_error_count: counters.frame_errors,
            per_frame_latency: Duration::from_secs_f64(
                elapsed.as_secs_f64() / counters.frames as f64,
            ),
        })
    }

    /// Whitespace-separated log record.
    pub fn log_line(&self, with_latency: bool) -> String {
        let mut line = format!(
            "{:.6} {} {} {} {}",
            self.parameter,
            scientific(self.fer),
            scientific(self.ber),
            self.frame_count,
            scientific(self.avg_iterations)
        );
        if with_latency {
            line.push_str(&format!(" {:.6}", self.per_frame_latency.as_secs_f64()));
        }
        line
    }

    /// Console progress record, aligned with [`banner`].
    pub fn progress_line(&self, target_frame_errors: u64) -> String {
        format!(
            "{:>4}/{:<4} | {:>10} | {:>7.3} | {:>10} | {:>10} | {:>8.2} | {:>10.3}",
            self.frame_error_count,
            target_frame_errors,
            self.frame_count,
            self.parameter,
            scientific(self.ber),
            scientific(self.fer),
            self.avg_iterations,
            self.per_frame_latency.as_secs_f64() * 1e3,
        )
    }
}

/// Three-digit scientific notation with a signed two-digit exponent
/// (`1.000e-01`).
fn scientific(value: f64) -> String {
    let formatted = format!("{value:.3e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// Console column titles for a sweep over `param_name`.
pub fn banner(param_name: &str) -> String {
    format!(
        "{:<9} | {:>10} | {:>7} | {:>10} | {:>10} | {:>8} | {:>10}",
        "FEC",
        "FRAME",
        param_name.to_uppercase(),
        "BER",
        "FER",
        "AVGITERS",
        "TIME/FRAME"
    )
}

/// Results indexed by sweep position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    /// Channel parameter per position.
    pub parameters: Vec<f64>,
    /// Frame-error rate.
    pub fer: Vec<f64>,
    /// Bit-error rate.
    pub ber: Vec<f64>,
    /// Mean decoder iterations.
    pub avg_iterations: Vec<f64>,
    /// Seconds per frame.
    pub time_per_frame: Vec<f64>,
    /// Frame errors counted.
    pub frame_errors: Vec<u64>,
    /// Frames counted.
    pub frames: Vec<u64>,
}

impl ResultTable {
    /// Creates a zeroed table with one row per grid value.
    pub fn new(parameters: &[f64]) -> Self {
        let n = parameters.len();
        Self {
            parameters: parameters.to_vec(),
            fer: vec![0.0; n],
            ber: vec![0.0; n],
            avg_iterations: vec![0.0; n],
            time_per_frame: vec![0.0; n],
            frame_errors: vec![0; n],
            frames: vec![0; n],
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Overwrites row `index`.
    pub fn set(&mut self, index: usize, point: &ResultPoint) {
        *slot(&mut self.parameters, index) = point.parameter;
        *slot(&mut self.fer, index) = point.fer;
        *slot(&mut self.ber, index) = point.ber;
        *slot(&mut self.avg_iterations, index) = point.avg_iterations;
        *slot(&mut self.time_per_frame, index) = point.per_frame_latency.as_secs_f64();
        *slot(&mut self.frame_errors, index) = point.frame_error_count;
        *slot(&mut self.frames, index) = point.frame_count;
    }
}

fn slot<T: Default + Clone>(values: &mut Vec<T>, index: usize) -> &mut T {
    if index >= values.len() {
        values.resize(index + 1, T::default());
    }
    &mut values[index]
}

/// Destination of result snapshots.
///
/// Write failures never abort a sweep; they are reported with `warn!`.
pub struct ResultSink {
    mode: OutputMode,
    log_path: Option<PathBuf>,
    log_frame_time: bool,
    header: Option<String>,
    param_name: String,
    lines: Vec<Option<String>>,
    table: Option<ResultTable>,
    progress: Box<dyn Write + Send>,
    target_frame_errors: u64,
    error_log: Option<ErrorFrameLog>,
}

impl ResultSink {
    /// Creates a sink for a sweep over `grid`, writing progress to stdout.
    pub fn new(config: &SimConfig, param_name: &str, grid: &[f64]) -> Self {
        let header = config.log_header.then(|| {
            let mut header = format!("{param_name} fer ber frames avg_iter");
            if config.log_frame_time {
                header.push_str(" frame_time");
            }
            header
        });
        Self {
            mode: config.output_mode,
            log_path: config.log_path.clone(),
            log_frame_time: config.log_frame_time,
            header,
            param_name: param_name.to_string(),
            lines: vec![None; grid.len()],
            table: config.output_mode.table().then(|| ResultTable::new(grid)),
            progress: Box::new(io::stdout()),
            target_frame_errors: config.target_frame_errors,
            error_log: config.error_log.clone().map(ErrorFrameLog::new),
        }
    }

    /// Redirects console progress to `writer`.
    #[must_use]
    pub fn with_progress_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.progress = Box::new(writer);
        self
    }

    /// Output mode.
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Result log location, if any.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Results table, present in headless and combined modes.
    pub const fn table(&self) -> Option<&ResultTable> {
        self.table.as_ref()
    }

    /// Consumes the sink and returns its results table.
    pub fn into_table(self) -> Option<ResultTable> {
        self.table
    }

    /// Prints the console banner.
    pub fn begin_sweep(&mut self) {
        if self.mode.console() {
            let banner = banner(&self.param_name);
            self.write_progress(&format!("{banner}\n"));
        }
    }

    /// Stores `point` as the latest snapshot of sweep position `index`.
    pub fn emit(&mut self, index: usize, point: &ResultPoint) {
        if let Some(table) = &mut self.table {
            table.set(index, point);
        }

        if self.mode.console() {
            let line = point.progress_line(self.target_frame_errors);
            self.write_progress(&format!("\r{line}"));
        }

        *slot(&mut self.lines, index) = Some(point.log_line(self.log_frame_time));
        if let Some(path) = &self.log_path {
            if let Err(e) = fs::write(path, self.log_contents()) {
                warn!(path = %path.display(), error = %e, "failed to write result log");
            }
        }
    }

    /// Emits the final snapshot of a point and ends its progress line.
    pub fn finish_point(&mut self, index: usize, point: Option<&ResultPoint>) {
        if let Some(point) = point {
            self.emit(index, point);
        }
        if self.mode.console() {
            self.write_progress("\n");
        }
    }

    /// Returns true if error frames are being logged.
    pub const fn logs_error_frames(&self) -> bool {
        self.error_log.is_some()
    }

    /// Appends a record to the error-frame log, if enabled.
    pub fn log_error_frame(&self, record: &ErrorFrameRecord) {
        if let Some(log) = &self.error_log {
            if let Err(e) = log.append(record) {
                warn!(path = %log.path().display(), error = %e, "failed to append error frame");
            }
        }
    }

    /// Current log file content.
    pub fn log_contents(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(header);
            out.push('\n');
        }
        for line in self.lines.iter().flatten() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn write_progress(&mut self, text: &str) {
        let result = self
            .progress
            .write_all(text.as_bytes())
            .and_then(|()| self.progress.flush());
        if let Err(e) = result {
            debug!(error = %e, "progress write failed");
        }
    }
}
