//! BPSK over additive white Gaussian noise.

use crate::Channel;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::trace;

/// AWGN channel carrying BPSK symbols (bit 0 maps to +1).
///
/// The parameter is Es/N0 in dB; the per-dimension noise variance is
/// `10^(-snr/10)` and the LLR of a received sample `y` is `2y / sigma²`.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    rng: ChaCha8Rng,
    snr_db: f64,
    sigma2: f64,
    received: Vec<f64>,
}

impl AwgnChannel {
    /// Creates a channel for `block_length` symbols at 0 dB.
    pub fn new(block_length: usize, seed: u64) -> Self {
        let mut channel = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            snr_db: 0.0,
            sigma2: 1.0,
            received: vec![1.0; block_length],
        };
        channel.set_param(0.0);
        channel
    }

    /// Noise variance per real dimension.
    pub const fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Samples of the last realization.
    pub fn received(&self) -> &[f64] {
        &self.received
    }
}

impl Channel for AwgnChannel {
    fn set_param(&mut self, value: f64) {
        self.snr_db = value;
        self.sigma2 = 10.0_f64.powf(-value / 10.0);
        trace!(snr_db = value, sigma2 = self.sigma2, "awgn channel reconfigured");
    }

    fn param(&self) -> f64 {
        self.snr_db
    }

    fn simulate(&mut self) {
        let sigma = self.sigma2.sqrt();
        for y in &mut self.received {
            let noise: f64 = self.rng.sample(StandardNormal);
            *y = sigma.mul_add(noise, 1.0);
        }
    }

    fn compute_llrs(&self, llrs: &mut [f64]) {
        debug_assert_eq!(llrs.len(), self.received.len());
        let scale = 2.0 / self.sigma2;
        for (llr, &y) in llrs.iter_mut().zip(&self.received) {
            *llr = scale * y;
        }
    }
}
