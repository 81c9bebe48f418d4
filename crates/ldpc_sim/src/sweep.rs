//! Parameter sweep controller.

use crate::campaign::{CampaignLimits, HaltReason, TrialCampaign};
use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::grid::ChannelParameterGrid;
use crate::sink::{ResultPoint, ResultSink};
use crate::stats::StatsAggregator;
use crate::stop::StopFlag;
use crate::worker::WorkerContext;
use ldpc_channel::ChannelKind;
use ldpc_code::{CodeDescriptor, LdpcCode};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs one trial campaign per grid value, in ascending order.
///
/// The worker pool is built once and reused by every campaign.
pub struct Simulator {
    config: SimConfig,
    code: Arc<dyn CodeDescriptor>,
    grid: ChannelParameterGrid,
    workers: Vec<WorkerContext>,
    stats: StatsAggregator,
    param_name: &'static str,
}

impl Simulator {
    /// Builds a simulator with `config.workers` reference worker contexts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChannel`] for an unsupported channel model,
    /// [`Error::InvalidGrid`] or [`Error::InvalidConfig`] for out-of-range
    /// settings. Nothing is started on error.
    pub fn new(code: Arc<LdpcCode>, config: SimConfig) -> Result<Self> {
        config.validate()?;
        let kind = config.channel_kind()?;
        if config.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".to_string()));
        }
        let grid = ChannelParameterGrid::new(config.grid)?;

        let workers = (0..config.workers)
            .map(|i| WorkerContext::build(i, &code, kind, &config))
            .collect();

        info!(
            n = code.block_length(),
            m = code.check_count(),
            workers = config.workers,
            points = grid.len(),
            channel = %kind,
            "simulator ready"
        );

        Ok(Self {
            config,
            code,
            grid,
            workers,
            stats: StatsAggregator::new(),
            param_name: kind.param_name(),
        })
    }

    /// Loads an alist code from `path` and builds a simulator for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Code`] if the code cannot be read or parsed, and
    /// otherwise the errors of [`Simulator::new`].
    pub fn load(path: impl AsRef<Path>, config: SimConfig) -> Result<Self> {
        let code = LdpcCode::load(path)?;
        Self::new(Arc::new(code), config)
    }

    /// Builds a simulator around caller-supplied worker contexts.
    ///
    /// `config.workers` and `config.channel` are not used to build anything;
    /// the channel name only picks the log column title.
    ///
    /// # Errors
    ///
    /// Same validation as [`Simulator::new`], plus an empty `workers` or a
    /// worker whose frame length differs from the code's block length.
    pub fn with_workers(
        code: Arc<dyn CodeDescriptor>,
        config: SimConfig,
        workers: Vec<WorkerContext>,
    ) -> Result<Self> {
        config.validate()?;
        if workers.is_empty() {
            return Err(Error::InvalidConfig("at least one worker is required".to_string()));
        }
        let block_length = code.block_length();
        if let Some(worker) = workers.iter().find(|w| w.block_length() != block_length) {
            return Err(Error::InvalidConfig(format!(
                "worker {} is built for {} bits, code has {block_length}",
                worker.index(),
                worker.block_length()
            )));
        }
        let grid = ChannelParameterGrid::new(config.grid)?;
        let param_name = config
            .channel_kind()
            .map_or("param", ChannelKind::param_name);

        Ok(Self {
            config,
            code,
            grid,
            workers,
            stats: StatsAggregator::new(),
            param_name,
        })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Sweep values.
    pub const fn grid(&self) -> &ChannelParameterGrid {
        &self.grid
    }

    /// Number of worker contexts.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Creates the sink described by the configuration.
    pub fn sink(&self) -> ResultSink {
        ResultSink::new(&self.config, self.param_name, self.grid.values())
    }

    /// Runs the sweep with the configured sink.
    ///
    /// Returns one point per sweep value that counted at least one frame.
    pub fn run(&mut self, stop: &StopFlag) -> Vec<ResultPoint> {
        let mut sink = self.sink();
        self.run_with_sink(&mut sink, stop)
    }

    /// Runs the sweep, emitting snapshots to `sink`.
    ///
    /// A stop request lets the current campaign's trials finish and skips
    /// every later sweep value.
    pub fn run_with_sink(&mut self, sink: &mut ResultSink, stop: &StopFlag) -> Vec<ResultPoint> {
        let limits = CampaignLimits {
            target_frame_errors: self.config.target_frame_errors,
            max_frames: self.config.max_frames,
        };
        let mut results = Vec::with_capacity(self.grid.len());

        sink.begin_sweep();
        for (index, &parameter) in self.grid.iter().enumerate() {
            if stop.is_set() {
                warn!(
                    skipped = self.grid.len() - index,
                    "stop requested, skipping remaining sweep points"
                );
                break;
            }

            for worker in &mut self.workers {
                worker.reconfigure(parameter);
            }

            let outcome = TrialCampaign::new(
                index,
                parameter,
                limits,
                self.code.as_ref(),
                &self.stats,
                stop,
                sink,
            )
            .run(&mut self.workers);

            let counters = outcome.counters;
            match outcome.halt {
                HaltReason::Stopped => warn!(
                    parameter,
                    frames = counters.frames,
                    frame_errors = counters.frame_errors,
                    "sweep point interrupted"
                ),
                HaltReason::TargetReached | HaltReason::FrameCap => {
                    if let Some(point) = &outcome.point {
                        info!(
                            parameter,
                            fer = point.fer,
                            ber = point.ber,
                            frames = point.frame_count,
                            avg_iterations = point.avg_iterations,
                            elapsed_ms = outcome.elapsed.as_millis() as u64,
                            "sweep point complete"
                        );
                    }
                }
            }

            results.extend(outcome.point);
            self.stats.reset();
        }
        results
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("block_length", &self.code.block_length())
            .field("grid", &self.grid)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = self
            .config
            .log_path
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        writeln!(f, "output file: {output}")?;
        writeln!(f, "workers: {}", self.workers.len())?;
        write!(f, "{}:", self.param_name)?;
        for value in &self.grid {
            write!(f, " {value:.3}")?;
        }
        writeln!(f)?;
        writeln!(f, "max frames: {}", self.config.max_frames)?;
        writeln!(f, "target frame errors: {}", self.config.target_frame_errors)?;
        writeln!(f, "max iterations: {}", self.config.max_iterations)?;
        writeln!(f, "channel: {}", self.config.channel)?;
        write!(f, "rng: ChaCha8 (seed {})", self.config.seed)
    }
}
