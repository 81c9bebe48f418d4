//! Per-worker decoder and channel pair.

use crate::config::SimConfig;
use ldpc_channel::{Channel, ChannelKind};
use ldpc_code::{BpDecoder, CodeDescriptor, Decoder, LdpcCode};
use std::fmt;
use std::sync::Arc;

/// One decoder bound to the channel that feeds it.
///
/// A context belongs to exactly one worker slot and is reused for the whole
/// sweep; only the channel parameter changes between sweep points.
pub struct WorkerContext {
    index: usize,
    channel: Box<dyn Channel>,
    decoder: Box<dyn Decoder>,
    llrs: Vec<f64>,
}

impl WorkerContext {
    /// Binds `channel` and `decoder` for frames of `block_length` bits.
    pub fn new(
        index: usize,
        block_length: usize,
        channel: Box<dyn Channel>,
        decoder: Box<dyn Decoder>,
    ) -> Self {
        Self {
            index,
            channel,
            decoder,
            llrs: vec![0.0; block_length],
        }
    }

    /// Builds the reference pair for worker `index`: a `kind` channel seeded
    /// with `config.seed + index` and a belief-propagation decoder.
    pub fn build(index: usize, code: &Arc<LdpcCode>, kind: ChannelKind, config: &SimConfig) -> Self {
        let block_length = code.block_length();
        let channel = kind.build(block_length, config.seed.wrapping_add(index as u64));
        let decoder = BpDecoder::new(
            Arc::clone(code),
            config.algorithm,
            config.max_iterations,
            config.early_termination,
        );
        Self::new(index, block_length, channel, Box::new(decoder))
    }

    /// Worker slot index.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Frame length the LLR buffer was sized for.
    pub fn block_length(&self) -> usize {
        self.llrs.len()
    }

    /// Moves the channel to a new sweep point.
    pub fn reconfigure(&mut self, parameter: f64) {
        self.channel.set_param(parameter);
    }

    /// Current channel parameter.
    pub fn parameter(&self) -> f64 {
        self.channel.param()
    }

    /// Transmits and decodes one frame, returning the iterations used.
    pub fn run_trial(&mut self) -> u32 {
        self.channel.simulate();
        self.channel.compute_llrs(&mut self.llrs);
        self.decoder.decode(&self.llrs)
    }

    /// Bits of the last decoded frame that differ from the all-zero codeword.
    pub fn count_bit_errors(&self) -> u64 {
        self.decoder
            .decoded_llrs()
            .iter()
            .filter(|&&llr| llr <= 0.0)
            .count() as u64
    }

    /// Hard decision of the last decoded frame (`true` is a one).
    pub fn hard_decisions(&self) -> Vec<bool> {
        self.decoder
            .decoded_llrs()
            .iter()
            .map(|&llr| llr <= 0.0)
            .collect()
    }
}

impl fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerContext")
            .field("index", &self.index)
            .field("parameter", &self.channel.param())
            .field("block_length", &self.block_length())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hamming, stub_worker};

    #[test]
    fn stub_worker_fails_on_schedule() {
        let mut worker = stub_worker(0, 7, 3, None);
        let errors: Vec<u64> = (0..6)
            .map(|_| {
                assert_eq!(worker.run_trial(), 3);
                worker.count_bit_errors()
            })
            .collect();
        assert_eq!(errors, vec![0, 0, 1, 0, 0, 1]);
        assert_eq!(
            worker.hard_decisions(),
            vec![true, false, false, false, false, false, false]
        );
    }

    #[test]
    fn reconfigure_changes_only_parameter() {
        let mut worker = stub_worker(2, 7, 10, None);
        worker.reconfigure(1.25);
        assert!((worker.parameter() - 1.25).abs() < f64::EPSILON);
        assert_eq!(worker.index(), 2);
    }

    #[test]
    fn reference_pair_decodes_clean_frames() {
        let code = Arc::new(hamming());
        let config = SimConfig::default().with_seed(11);
        let mut worker = WorkerContext::build(0, &code, ChannelKind::Bsc, &config);
        worker.reconfigure(0.0);
        assert_eq!(worker.run_trial(), 0);
        assert_eq!(worker.count_bit_errors(), 0);
    }

    #[test]
    fn workers_get_distinct_seeds() {
        let code = Arc::new(hamming());
        let config = SimConfig::default().with_seed(5);
        let mut a = WorkerContext::build(0, &code, ChannelKind::Awgn, &config);
        let mut b = WorkerContext::build(1, &code, ChannelKind::Awgn, &config);
        a.reconfigure(-3.0);
        b.reconfigure(-3.0);
        let mut differ = false;
        for _ in 0..20 {
            a.run_trial();
            b.run_trial();
            differ |= a.hard_decisions() != b.hard_decisions();
        }
        assert!(differ);
    }
}
