//! Parallel Monte-Carlo error-rate sweep for LDPC codes.
//!
//! This crate provides:
//! - [`Simulator`]: walks a channel-parameter grid and runs one trial
//!   campaign per value, reusing a fixed pool of worker contexts
//! - [`TrialCampaign`]: scoped worker threads with a frame-error target,
//!   a frame cap and cooperative cancellation
//! - [`StatsAggregator`]: atomic counters on the hot path, one critical
//!   section for frame errors
//! - [`ResultSink`]: results table, console progress line and a log file
//!   rewritten on every snapshot
//!
//! # Determinism
//!
//! Each worker's channel is seeded with `seed + worker_index`, so a worker's
//! noise stream is reproducible. Which worker counts which frame depends on
//! thread scheduling, so multi-worker results are statistically but not
//! bitwise reproducible.
//!
//! # Example
//!
//! ```rust,ignore
//! use ldpc_sim::{SimConfig, Simulator, StopFlag};
//!
//! let code = Arc::new(LdpcCode::load("code.alist")?);
//! let config = SimConfig::default().with_grid(1.0, 3.0, 0.25).with_limits(100, 1_000_000);
//! let mut sim = Simulator::new(code, config)?;
//! let points = sim.run(&StopFlag::new());
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod campaign;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod sink;
pub mod stats;
pub mod stop;
pub mod sweep;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use campaign::{CampaignLimits, CampaignOutcome, HaltReason, TrialCampaign};
pub use config::{GridRange, OutputMode, SimConfig};
pub use diagnostics::{ErrorFrameLog, ErrorFrameRecord};
pub use error::{Error, Result};
pub use grid::ChannelParameterGrid;
pub use sink::{ResultPoint, ResultSink, ResultTable};
pub use stats::{derive_metrics, Counters, Metrics, StatsAggregator};
pub use stop::StopFlag;
pub use sweep::Simulator;
pub use worker::WorkerContext;
