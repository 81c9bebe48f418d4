//! Run command implementation.

use anyhow::{Context, Result};
use clap::Args;
use ldpc_code::Algorithm;
use ldpc_sim::{OutputMode, ResultPoint, ResultTable, SimConfig, Simulator, StopFlag};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Arguments of the run command. Flags override the config file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the parity-check matrix (alist)
    pub code: String,

    /// Configuration file (.yaml or .json)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Result log, rewritten after every snapshot
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write a result log
    #[arg(long, conflicts_with = "output")]
    pub no_log: bool,

    /// First channel parameter value
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<f64>,

    /// Exclusive upper bound of the parameter grid
    #[arg(long, allow_negative_numbers = true)]
    pub stop: Option<f64>,

    /// Grid increment
    #[arg(long)]
    pub step: Option<f64>,

    /// Number of worker threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Base RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Channel model (awgn or bsc)
    #[arg(long)]
    pub channel: Option<String>,

    /// Decoder iteration cap
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Use scaled min-sum with this scale instead of sum-product
    #[arg(long)]
    pub min_sum: Option<f64>,

    /// Always run the full iteration budget
    #[arg(long)]
    pub no_early_term: bool,

    /// Frame cap per sweep point
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Frame errors per sweep point
    #[arg(long)]
    pub target_fec: Option<u64>,

    /// Output mode (interactive, headless or both)
    #[arg(long)]
    pub mode: Option<String>,

    /// Add the per-frame time column to the log
    #[arg(long)]
    pub frame_time: bool,

    /// Append a diagnostic line per frame error to this file
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Write the final results as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl RunArgs {
    /// Builds the simulation config: file first, then flags.
    pub fn build_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {path}"))?,
            None => SimConfig::default(),
        };

        if let Some(path) = &self.output {
            config.log_path = Some(path.clone());
        }
        if self.no_log {
            config.log_path = None;
        }
        if let Some(start) = self.start {
            config.grid.start = start;
        }
        if let Some(stop) = self.stop {
            config.grid.stop = stop;
        }
        if let Some(step) = self.step {
            config.grid.step = step;
        }
        if let Some(threads) = self.threads {
            config.workers = threads;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(channel) = &self.channel {
            config.channel.clone_from(channel);
        }
        if let Some(iterations) = self.iterations {
            config.max_iterations = iterations;
        }
        if let Some(scale) = self.min_sum {
            config.algorithm = Algorithm::MinSum { scale };
        }
        if self.no_early_term {
            config.early_termination = false;
        }
        if let Some(max_frames) = self.max_frames {
            config.max_frames = max_frames;
        }
        if let Some(target) = self.target_fec {
            config.target_frame_errors = target;
        }
        if let Some(mode) = &self.mode {
            config.output_mode = parse_mode(mode)?;
        }
        if self.frame_time {
            config.log_frame_time = true;
        }
        if let Some(path) = &self.error_log {
            config.error_log = Some(path.clone());
        }

        Ok(config)
    }
}

fn parse_mode(mode: &str) -> Result<OutputMode> {
    match mode.to_lowercase().as_str() {
        "interactive" => Ok(OutputMode::Interactive),
        "headless" => Ok(OutputMode::Headless),
        "both" => Ok(OutputMode::Both),
        _ => anyhow::bail!("Unknown output mode: {mode}. Use 'interactive', 'headless' or 'both'."),
    }
}

#[derive(Serialize)]
struct Export<'a> {
    config: &'a SimConfig,
    points: &'a [ResultPoint],
    table: Option<&'a ResultTable>,
}

/// Runs the run command.
pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.build_config()?;

    let mut sim = Simulator::load(&args.code, config.clone())
        .with_context(|| format!("Failed to set up simulation for code: {}", args.code))?;
    info!("Loaded code {} with {} workers", args.code, sim.worker_count());
    if config.output_mode.console() {
        println!("{sim}");
    }

    let stop = StopFlag::new();
    let interrupt = {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing in-flight trials");
                stop.set();
            }
        })
    };

    let (points, table) = tokio::task::spawn_blocking(move || {
        let mut sink = sim.sink();
        debug!(mode = ?sink.mode(), "Result sink ready");
        if let Some(path) = sink.log_path() {
            info!("Writing results to: {}", path.display());
        }
        let points = sim.run_with_sink(&mut sink, &stop);
        (points, sink.into_table())
    })
    .await
    .with_context(|| "Simulation task failed")?;
    interrupt.abort();

    info!("Sweep finished with {} points", points.len());

    if let Some(path) = &args.json {
        let export = Export {
            config: &config,
            points: &points,
            table: table.as_ref(),
        };
        let json = serde_json::to_string_pretty(&export)
            .with_context(|| "Failed to serialize results")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write results: {}", path.display()))?;
        info!("Results written to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        fs::write(&path, "workers: 8\nseed: 1\nchannel: bsc\n").unwrap();

        let args = RunArgs {
            config: Some(path.display().to_string()),
            threads: Some(2),
            start: Some(-1.0),
            min_sum: Some(0.75),
            no_log: true,
            mode: Some("Headless".to_string()),
            ..RunArgs::default()
        };
        let config = args.build_config().unwrap();

        assert_eq!(config.workers, 2);
        assert_eq!(config.seed, 1);
        assert_eq!(config.channel, "bsc");
        assert!((config.grid.start + 1.0).abs() < f64::EPSILON);
        assert_eq!(config.algorithm, Algorithm::MinSum { scale: 0.75 });
        assert_eq!(config.log_path, None);
        assert_eq!(config.output_mode, OutputMode::Headless);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(parse_mode("quiet").is_err());
    }
}
