//! Iterative belief-propagation decoding.
//!
//! [`Decoder`] is the interface the simulator drives; [`BpDecoder`] is a
//! flooding-schedule implementation over an [`LdpcCode`]. Messages are kept
//! in flat per-edge buffers so a decoder can be reused across frames
//! without allocating.

use crate::code::LdpcCode;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

/// Largest magnitude a message may take.
const MAX_MESSAGE: f64 = 1e3;

/// A soft-input soft-output iterative decoder.
///
/// LLR convention: positive values favour bit 0, a decoded LLR `<= 0` is a
/// hard decision for bit 1.
pub trait Decoder: Send {
    /// Decodes one frame from channel LLRs and returns the iterations used.
    fn decode(&mut self, llrs: &[f64]) -> u32;

    /// A-posteriori LLRs of the last decoded frame.
    fn decoded_llrs(&self) -> &[f64];
}

/// Check-node update rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Exact tanh-rule belief propagation.
    #[default]
    SumProduct,
    /// Scaled min-sum approximation.
    MinSum {
        /// Scale applied to every check message.
        scale: f64,
    },
}

/// Flooding belief-propagation decoder.
#[derive(Debug, Clone)]
pub struct BpDecoder {
    code: Arc<LdpcCode>,
    algorithm: Algorithm,
    max_iterations: u32,
    early_termination: bool,
    /// Edge range of each check, edges are numbered check by check.
    check_edges: Vec<Range<usize>>,
    /// Edges incident to each bit.
    var_edges: Vec<Vec<usize>>,
    /// Bit index of each edge.
    edge_var: Vec<usize>,
    channel_llrs: Vec<f64>,
    output_llrs: Vec<f64>,
    var_to_check: Vec<f64>,
    check_to_var: Vec<f64>,
    hard: Vec<bool>,
}

impl BpDecoder {
    /// Creates a decoder for `code`.
    ///
    /// `max_iterations` is clamped to at least one. With
    /// `early_termination` the decoder stops as soon as the hard decision is
    /// a codeword; without it every frame runs the full iteration budget.
    pub fn new(
        code: Arc<LdpcCode>,
        algorithm: Algorithm,
        max_iterations: u32,
        early_termination: bool,
    ) -> Self {
        use crate::code::CodeDescriptor;

        let n = code.block_length();
        let m = code.check_count();
        let edges = code.edge_count();

        let mut check_edges = Vec::with_capacity(m);
        let mut var_edges = vec![Vec::new(); n];
        let mut edge_var = Vec::with_capacity(edges);
        for c in 0..m {
            let start = edge_var.len();
            for &v in code.check_neighbors(c) {
                var_edges[v].push(edge_var.len());
                edge_var.push(v);
            }
            check_edges.push(start..edge_var.len());
        }

        Self {
            code,
            algorithm,
            max_iterations: max_iterations.max(1),
            early_termination,
            check_edges,
            var_edges,
            edge_var,
            channel_llrs: vec![0.0; n],
            output_llrs: vec![0.0; n],
            var_to_check: vec![0.0; edges],
            check_to_var: vec![0.0; edges],
            hard: vec![false; n],
        }
    }

    /// Configured iteration cap.
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    fn update_checks(&mut self) {
        for range in &self.check_edges {
            let incoming = &self.var_to_check[range.clone()];
            let outgoing = &mut self.check_to_var[range.clone()];
            match self.algorithm {
                Algorithm::SumProduct => {
                    for (i, out) in outgoing.iter_mut().enumerate() {
                        let product: f64 = incoming
                            .iter()
                            .enumerate()
                            .filter(|&(j, _)| j != i)
                            .map(|(_, &x)| (x / 2.0).tanh())
                            .product();
                        *out = 2.0 * product.clamp(-1.0 + 1e-15, 1.0 - 1e-15).atanh();
                    }
                }
                Algorithm::MinSum { scale } => {
                    let mut min1 = f64::MAX;
                    let mut min2 = f64::MAX;
                    let mut min_idx = 0;
                    let mut negative = false;
                    for (j, &x) in incoming.iter().enumerate() {
                        negative ^= x < 0.0;
                        let a = x.abs();
                        if a < min1 {
                            min2 = min1;
                            min1 = a;
                            min_idx = j;
                        } else if a < min2 {
                            min2 = a;
                        }
                    }
                    for (i, out) in outgoing.iter_mut().enumerate() {
                        let magnitude = if i == min_idx { min2 } else { min1 };
                        let own_negative = incoming[i] < 0.0;
                        let sign = if negative ^ own_negative { -1.0 } else { 1.0 };
                        *out = sign * scale * magnitude.min(MAX_MESSAGE);
                    }
                }
            }
        }
    }

    fn update_vars(&mut self) {
        for (v, edges) in self.var_edges.iter().enumerate() {
            let total = self.channel_llrs[v]
                + edges.iter().map(|&e| self.check_to_var[e]).sum::<f64>();
            self.output_llrs[v] = total;
            self.hard[v] = total <= 0.0;
            for &e in edges {
                self.var_to_check[e] =
                    (total - self.check_to_var[e]).clamp(-MAX_MESSAGE, MAX_MESSAGE);
            }
        }
    }
}

impl Decoder for BpDecoder {
    fn decode(&mut self, llrs: &[f64]) -> u32 {
        debug_assert_eq!(llrs.len(), self.channel_llrs.len());

        for (((input, output), hard), &llr) in self
            .channel_llrs
            .iter_mut()
            .zip(self.output_llrs.iter_mut())
            .zip(self.hard.iter_mut())
            .zip(llrs)
        {
            *input = llr;
            *output = llr;
            *hard = llr <= 0.0;
        }

        if self.early_termination && self.code.is_codeword(&self.hard) {
            return 0;
        }

        for (msg, &v) in self.var_to_check.iter_mut().zip(&self.edge_var) {
            *msg = self.channel_llrs[v].clamp(-MAX_MESSAGE, MAX_MESSAGE);
        }

        for iteration in 1..=self.max_iterations {
            self.update_checks();
            self.update_vars();
            if self.early_termination && self.code.is_codeword(&self.hard) {
                return iteration;
            }
        }
        self.max_iterations
    }

    fn decoded_llrs(&self) -> &[f64] {
        &self.output_llrs
    }
}
