//! Running statistics for one sweep point.
//!
//! The counters are split by how often they change. `frames` and
//! `iteration_sum` are bumped on the hot path with a single atomic add each.
//! `frame_errors` and `bit_errors` only change inside the campaign's
//! critical section, but `frame_errors` is still read without the lock by
//! every worker's stopping check.

#![allow(clippy::cast_precision_loss)] // counters stay far below 2^52

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Error rates derived from a counter state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Bit-error rate.
    pub ber: f64,
    /// Frame-error rate.
    pub fer: f64,
    /// Mean decoder iterations per counted frame.
    pub avg_iterations: f64,
}

/// Derives BER, FER and mean iterations.
///
/// Returns `None` when no frame has been counted yet.
pub fn derive_metrics(
    frames: u64,
    frame_errors: u64,
    bit_errors: u64,
    iteration_sum: u64,
    block_length: usize,
) -> Option<Metrics> {
    if frames == 0 {
        return None;
    }
    let frames_f = frames as f64;
    Some(Metrics {
        ber: bit_errors as f64 / (frames_f * block_length as f64),
        fer: frame_errors as f64 / frames_f,
        avg_iterations: iteration_sum as f64 / frames_f,
    })
}

/// Point-in-time copy of the running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Frames counted toward the denominator.
    pub frames: u64,
    /// Counted frames with at least one bit error.
    pub frame_errors: u64,
    /// Bit errors over counted frames.
    pub bit_errors: u64,
    /// Iterations over every decode, counted or not.
    pub iteration_sum: u64,
}

impl Counters {
    /// Derives the error rates for this state.
    pub fn metrics(&self, block_length: usize) -> Option<Metrics> {
        derive_metrics(
            self.frames,
            self.frame_errors,
            self.bit_errors,
            self.iteration_sum,
            block_length,
        )
    }
}

/// Shared counters for the sweep point being simulated.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    frames: AtomicU64,
    frame_errors: AtomicU64,
    bit_errors: AtomicU64,
    iteration_sum: AtomicU64,
}

impl StatsAggregator {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames counted so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Frame errors counted so far.
    pub fn frame_errors(&self) -> u64 {
        self.frame_errors.load(Ordering::Relaxed)
    }

    /// Folds one decode's iterations into the sum.
    pub fn add_iterations(&self, iterations: u64) {
        self.iteration_sum.fetch_add(iterations, Ordering::Relaxed);
    }

    /// Counts one frame and returns the new total.
    pub fn count_frame(&self) -> u64 {
        self.frames.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Records an erroneous frame and returns the resulting counters.
    ///
    /// Callers must serialize these calls; the campaign does so with its
    /// critical section so snapshots never interleave.
    pub fn record_frame_error(&self, bit_errors: u64) -> Counters {
        self.bit_errors.fetch_add(bit_errors, Ordering::Relaxed);
        self.frame_errors.fetch_add(1, Ordering::Release);
        self.counters()
    }

    /// Current counter values.
    pub fn counters(&self) -> Counters {
        Counters {
            frames: self.frames.load(Ordering::Relaxed),
            frame_errors: self.frame_errors.load(Ordering::Acquire),
            bit_errors: self.bit_errors.load(Ordering::Relaxed),
            iteration_sum: self.iteration_sum.load(Ordering::Relaxed),
        }
    }

    /// Zeroes every counter for the next sweep point.
    pub fn reset(&self) {
        self.frames.store(0, Ordering::Relaxed);
        self.frame_errors.store(0, Ordering::Relaxed);
        self.bit_errors.store(0, Ordering::Relaxed);
        self.iteration_sum.store(0, Ordering::Relaxed);
    }
}
