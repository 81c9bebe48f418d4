//! Deterministic collaborators shared by the unit tests.

use crate::stop::StopFlag;
use crate::worker::WorkerContext;
use ldpc_channel::Channel;
use ldpc_code::{Decoder, LdpcCode};

/// (7,4) Hamming code.
pub fn hamming() -> LdpcCode {
    LdpcCode::from_dense(&[
        vec![1, 1, 1, 0, 1, 0, 0],
        vec![1, 1, 0, 1, 0, 1, 0],
        vec![1, 0, 1, 1, 0, 0, 1],
    ])
    .unwrap()
}

/// Channel whose every `fail_every`-th frame arrives with bit 0 flipped.
pub struct StubChannel {
    parameter: f64,
    trials: u64,
    fail_every: u64,
    stop_on: Option<(u64, StopFlag)>,
}

impl Channel for StubChannel {
    fn set_param(&mut self, value: f64) {
        self.parameter = value;
    }

    fn param(&self) -> f64 {
        self.parameter
    }

    fn simulate(&mut self) {
        self.trials += 1;
        if let Some((trial, flag)) = &self.stop_on {
            if self.trials == *trial {
                flag.set();
            }
        }
    }

    fn compute_llrs(&self, llrs: &mut [f64]) {
        llrs.fill(1.0);
        if self.trials % self.fail_every == 0 {
            llrs[0] = -1.0;
        }
    }
}

/// Decoder that passes channel LLRs through unchanged.
pub struct StubDecoder {
    llrs: Vec<f64>,
}

impl Decoder for StubDecoder {
    fn decode(&mut self, llrs: &[f64]) -> u32 {
        self.llrs.clear();
        self.llrs.extend_from_slice(llrs);
        3
    }

    fn decoded_llrs(&self) -> &[f64] {
        &self.llrs
    }
}

/// Worker built from the stubs; `stop_on` sets the flag during that trial.
pub fn stub_worker(
    index: usize,
    block_length: usize,
    fail_every: u64,
    stop_on: Option<(u64, StopFlag)>,
) -> WorkerContext {
    WorkerContext::new(
        index,
        block_length,
        Box::new(StubChannel {
            parameter: 0.0,
            trials: 0,
            fail_every,
            stop_on,
        }),
        Box::new(StubDecoder { llrs: Vec::new() }),
    )
}

/// `count` stub workers failing on the same schedule.
pub fn stub_workers(count: usize, block_length: usize, fail_every: u64) -> Vec<WorkerContext> {
    (0..count)
        .map(|i| stub_worker(i, block_length, fail_every, None))
        .collect()
}
