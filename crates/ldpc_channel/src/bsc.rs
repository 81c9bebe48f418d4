//! Binary symmetric channel.

use crate::Channel;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// LLR magnitude used when the crossover probability is zero.
const SATURATED_LLR: f64 = 1e3;

/// Binary symmetric channel with crossover probability `p`.
///
/// Each transmitted zero is flipped independently with probability `p`;
/// the LLR magnitude is `ln((1 - p) / p)`.
#[derive(Debug, Clone)]
pub struct BscChannel {
    rng: ChaCha8Rng,
    crossover: f64,
    llr_magnitude: f64,
    flipped: Vec<bool>,
}

impl BscChannel {
    /// Creates a noiseless channel for `block_length` bits.
    pub fn new(block_length: usize, seed: u64) -> Self {
        let mut channel = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            crossover: 0.0,
            llr_magnitude: SATURATED_LLR,
            flipped: vec![false; block_length],
        };
        channel.set_param(0.0);
        channel
    }

    /// Which bits the last realization flipped.
    pub fn flipped(&self) -> &[bool] {
        &self.flipped
    }
}

impl Channel for BscChannel {
    fn set_param(&mut self, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            warn!(crossover = value, "crossover probability outside [0, 1]");
        }
        self.crossover = value;
        let magnitude = ((1.0 - value) / value).ln();
        self.llr_magnitude = if magnitude.is_nan() {
            SATURATED_LLR
        } else {
            magnitude.clamp(-SATURATED_LLR, SATURATED_LLR)
        };
    }

    fn param(&self) -> f64 {
        self.crossover
    }

    fn simulate(&mut self) {
        for bit in &mut self.flipped {
            *bit = self.rng.gen::<f64>() < self.crossover;
        }
    }

    fn compute_llrs(&self, llrs: &mut [f64]) {
        debug_assert_eq!(llrs.len(), self.flipped.len());
        for (llr, &flipped) in llrs.iter_mut().zip(&self.flipped) {
            *llr = if flipped {
                -self.llr_magnitude
            } else {
                self.llr_magnitude
            };
        }
    }
}
