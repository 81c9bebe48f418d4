//! One sweep point, simulated by a pool of scoped worker threads.
//!
//! Workers share the counters in a [`StatsAggregator`] with two tiers of
//! synchronization. Every decode adds its iterations atomically, and every
//! counted frame bumps `frames` atomically. Only a frame error enters the
//! single critical section, where the error counters move together, the
//! snapshot is emitted and the error-frame log is written.
//!
//! The stopping check reads `frame_errors` without the lock, so a point may
//! count up to one extra frame error per worker beyond the target and up to
//! one extra frame per worker beyond the frame cap.

use crate::diagnostics::ErrorFrameRecord;
use crate::sink::{ResultPoint, ResultSink};
use crate::stats::{Counters, StatsAggregator};
use crate::stop::StopFlag;
use crate::worker::WorkerContext;
use ldpc_code::CodeDescriptor;
use parking_lot::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Stopping rule of a sweep point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignLimits {
    /// Frame errors after which the point is complete.
    pub target_frame_errors: u64,
    /// Frames after which the point is complete.
    pub max_frames: u64,
}

/// Why a campaign ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The frame-error target was reached.
    TargetReached,
    /// The frame cap was reached first.
    FrameCap,
    /// The stop flag was set.
    Stopped,
}

/// Final state of a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignOutcome {
    /// Counters when the last worker left.
    pub counters: Counters,
    /// Wall time without snapshot overhead.
    pub elapsed: Duration,
    /// Why the campaign ended.
    pub halt: HaltReason,
    /// Final snapshot, absent when no frame was counted.
    pub point: Option<ResultPoint>,
}

/// State touched only under the critical section.
struct ErrorPath<'a> {
    sink: &'a mut ResultSink,
    /// Start time pushed forward by the time spent in the critical section.
    baseline: Instant,
}

/// Drives one sweep point to completion.
pub struct TrialCampaign<'a> {
    index: usize,
    parameter: f64,
    limits: CampaignLimits,
    code: &'a dyn CodeDescriptor,
    stats: &'a StatsAggregator,
    stop: &'a StopFlag,
    log_errors: bool,
    error_path: Mutex<ErrorPath<'a>>,
}

impl<'a> TrialCampaign<'a> {
    /// Prepares a campaign for sweep position `index`.
    ///
    /// `stats` must be zeroed; the campaign does not reset it.
    pub fn new(
        index: usize,
        parameter: f64,
        limits: CampaignLimits,
        code: &'a dyn CodeDescriptor,
        stats: &'a StatsAggregator,
        stop: &'a StopFlag,
        sink: &'a mut ResultSink,
    ) -> Self {
        Self {
            index,
            parameter,
            limits,
            code,
            stats,
            stop,
            log_errors: sink.logs_error_frames(),
            error_path: Mutex::new(ErrorPath {
                sink,
                baseline: Instant::now(),
            }),
        }
    }

    /// Runs one thread per worker context until the point is complete.
    pub fn run(self, workers: &mut [WorkerContext]) -> CampaignOutcome {
        self.error_path.lock().baseline = Instant::now();

        thread::scope(|s| {
            for worker in workers.iter_mut() {
                let campaign = &self;
                s.spawn(move || campaign.work(worker));
            }
        });

        let counters = self.stats.counters();
        let halt = if counters.frame_errors >= self.limits.target_frame_errors {
            HaltReason::TargetReached
        } else if counters.frames >= self.limits.max_frames {
            HaltReason::FrameCap
        } else {
            HaltReason::Stopped
        };

        let ErrorPath { sink, baseline } = self.error_path.into_inner();
        let elapsed = baseline.elapsed();
        let point = ResultPoint::from_counters(
            self.parameter,
            counters,
            self.code.block_length(),
            elapsed,
        );
        sink.finish_point(self.index, point.as_ref());

        CampaignOutcome {
            counters,
            elapsed,
            halt,
            point,
        }
    }

    fn done(&self) -> bool {
        self.stats.frame_errors() >= self.limits.target_frame_errors
            || self.stats.frames() >= self.limits.max_frames
            || self.stop.is_set()
    }

    fn work(&self, worker: &mut WorkerContext) {
        debug!(worker = worker.index(), parameter = self.parameter, "worker started");
        while !self.done() {
            let iterations = worker.run_trial();
            self.stats.add_iterations(u64::from(iterations));

            if self.stats.frame_errors() < self.limits.target_frame_errors {
                self.stats.count_frame();
                let bit_errors = worker.count_bit_errors();
                if bit_errors > 0 {
                    self.record_error(worker, bit_errors);
                }
            }
        }
    }

    fn record_error(&self, worker: &WorkerContext, bit_errors: u64) {
        let mut path = self.error_path.lock();
        let counters = self.stats.record_frame_error(bit_errors);
        let entered = Instant::now();

        let elapsed = entered.saturating_duration_since(path.baseline);
        if let Some(point) =
            ResultPoint::from_counters(self.parameter, counters, self.code.block_length(), elapsed)
        {
            path.sink.emit(self.index, &point);
        }
        if self.log_errors {
            let record = ErrorFrameRecord::new(
                self.parameter,
                counters.frames,
                &worker.hard_decisions(),
                self.code,
            );
            path.sink.log_error_frame(&record);
        }

        path.baseline += entered.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputMode, SimConfig};
    use crate::test_support::{hamming, stub_worker, stub_workers};

    fn headless_sink() -> ResultSink {
        let config = SimConfig::default()
            .with_output_mode(OutputMode::Headless)
            .with_log_path(None);
        ResultSink::new(&config, "snr", &[0.0])
    }

    fn run(
        workers: &mut [WorkerContext],
        limits: CampaignLimits,
        stop: &StopFlag,
    ) -> (CampaignOutcome, ResultSink) {
        let code = hamming();
        let stats = StatsAggregator::new();
        let mut sink = headless_sink();
        let outcome = TrialCampaign::new(0, 0.0, limits, &code, &stats, stop, &mut sink).run(workers);
        (outcome, sink)
    }

    #[test]
    fn reaches_error_target() {
        let mut workers = stub_workers(1, 7, 10);
        let limits = CampaignLimits {
            target_frame_errors: 5,
            max_frames: 1000,
        };
        let (outcome, sink) = run(&mut workers, limits, &StopFlag::new());

        assert_eq!(outcome.halt, HaltReason::TargetReached);
        assert_eq!(outcome.counters.frames, 50);
        assert_eq!(outcome.counters.frame_errors, 5);
        assert_eq!(outcome.counters.bit_errors, 5);
        assert_eq!(outcome.counters.iteration_sum, 150);
        assert_eq!(sink.table().unwrap().frames, vec![50]);
    }

    #[test]
    fn stops_at_frame_cap() {
        let mut workers = stub_workers(1, 7, 10);
        let limits = CampaignLimits {
            target_frame_errors: 5,
            max_frames: 30,
        };
        let (outcome, _) = run(&mut workers, limits, &StopFlag::new());

        assert_eq!(outcome.halt, HaltReason::FrameCap);
        assert_eq!(outcome.counters.frames, 30);
        assert_eq!(outcome.counters.frame_errors, 3);
    }

    #[test]
    fn stop_flag_ends_campaign() {
        let stop = StopFlag::new();
        let mut workers = vec![stub_worker(0, 7, 10, Some((2, stop.clone())))];
        let limits = CampaignLimits {
            target_frame_errors: 5,
            max_frames: 1000,
        };
        let (outcome, _) = run(&mut workers, limits, &stop);

        assert_eq!(outcome.halt, HaltReason::Stopped);
        assert!(outcome.counters.frames <= 2);
        assert_eq!(outcome.point.unwrap().frame_count, outcome.counters.frames);
    }

    #[test]
    fn already_stopped_counts_nothing() {
        let stop = StopFlag::new();
        stop.set();
        let mut workers = stub_workers(2, 7, 10);
        let limits = CampaignLimits {
            target_frame_errors: 5,
            max_frames: 1000,
        };
        let (outcome, _) = run(&mut workers, limits, &stop);

        assert_eq!(outcome.counters, Counters::default());
        assert!(outcome.point.is_none());
    }

    #[test]
    fn overshoot_is_bounded_by_worker_count() {
        let workers_n = 4;
        let mut workers = stub_workers(workers_n, 7, 3);
        let limits = CampaignLimits {
            target_frame_errors: 20,
            max_frames: 100_000,
        };
        let (outcome, _) = run(&mut workers, limits, &StopFlag::new());

        let c = outcome.counters;
        assert!(c.frame_errors >= 20);
        assert!(c.frame_errors < 20 + workers_n as u64);
        assert!(c.frame_errors <= c.frames);
        assert!(c.iteration_sum >= 3 * c.frames);
    }

    #[test]
    fn frame_cap_overshoot_is_bounded() {
        let workers_n = 3;
        let mut workers = stub_workers(workers_n, 7, 1_000_000);
        let limits = CampaignLimits {
            target_frame_errors: 1,
            max_frames: 500,
        };
        let (outcome, _) = run(&mut workers, limits, &StopFlag::new());

        assert_eq!(outcome.halt, HaltReason::FrameCap);
        assert!(outcome.counters.frames >= 500);
        assert!(outcome.counters.frames <= 500 + workers_n as u64);
        assert_eq!(outcome.counters.frame_errors, 0);
    }

    struct SlowWriter(Duration);

    impl std::io::Write for SlowWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            thread::sleep(self.0);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn snapshot_output_is_excluded_from_latency() {
        let delay = Duration::from_millis(10);
        let config = SimConfig::default()
            .with_output_mode(OutputMode::Interactive)
            .with_log_path(None);
        let mut sink =
            ResultSink::new(&config, "snr", &[0.0]).with_progress_writer(SlowWriter(delay));
        let code = hamming();
        let stats = StatsAggregator::new();
        let stop = StopFlag::new();
        let mut workers = stub_workers(1, 7, 2);
        let limits = CampaignLimits {
            target_frame_errors: 20,
            max_frames: 1000,
        };

        let started = Instant::now();
        let outcome =
            TrialCampaign::new(0, 0.0, limits, &code, &stats, &stop, &mut sink).run(&mut workers);
        let wall = started.elapsed();

        assert_eq!(outcome.counters.frames, 40);
        assert!(wall >= delay * 20, "wall {wall:?}");
        assert!(outcome.elapsed < delay * 5, "elapsed {:?}", outcome.elapsed);
        let point = outcome.point.unwrap();
        assert!(point.per_frame_latency < delay / 4, "{:?}", point.per_frame_latency);
    }

    #[test]
    fn error_frames_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("errors.txt");
        let config = SimConfig::default()
            .with_output_mode(OutputMode::Headless)
            .with_log_path(None)
            .with_error_log(&log);
        let mut sink = ResultSink::new(&config, "snr", &[0.0]);
        let code = hamming();
        let stats = StatsAggregator::new();
        let stop = StopFlag::new();
        let mut workers = stub_workers(1, 7, 4);
        let limits = CampaignLimits {
            target_frame_errors: 3,
            max_frames: 1000,
        };
        TrialCampaign::new(0, 0.5, limits, &code, &stats, &stop, &mut sink).run(&mut workers);

        let content = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("param: 0.500 -- frame: 4 -- is codeword: 0 -- dH: 1 | 0"));
    }
}
