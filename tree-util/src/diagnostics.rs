//! Lightweight instrumentation for the tree sampler.
//!
//! Each sampler owns its own [`SamplerStats`]; independent chains keep
//! separate sinks and can be combined afterwards with [`SamplerStats::merge`].

use serde::Serialize;
use std::collections::BTreeMap;

/// Counters and histograms collected by tree sampling.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SamplerStats {
    /// calls to `sample_tree`
    pub calls: usize,
    /// single-edge Gibbs proposals
    pub proposals: usize,
    /// proposals that moved the edge (`k1 != k2`)
    pub accepted: usize,
    /// proposals with no numerically positive candidate mass
    pub infeasible: usize,
    /// bit length of the number of bridging candidates -> count
    pub log2_choices: BTreeMap<u32, usize>,
}

impl SamplerStats {
    /// Record one proposal.
    ///
    /// * `num_choices` - number of bridging candidates considered
    /// * `moved` - whether a different edge was inserted
    /// * `feasible` - whether the candidate mass was positive
    pub fn record(&mut self, num_choices: usize, moved: bool, feasible: bool) {
        self.proposals += 1;
        if moved {
            self.accepted += 1;
        }
        if !feasible {
            self.infeasible += 1;
        }
        *self.log2_choices.entry(bit_length(num_choices)).or_insert(0) += 1;
    }

    /// Fraction of proposals that moved an edge
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }

    /// Add the counts of another sink into this one.
    pub fn merge(&mut self, other: &SamplerStats) {
        self.calls += other.calls;
        self.proposals += other.proposals;
        self.accepted += other.accepted;
        self.infeasible += other.infeasible;
        for (&bits, &count) in &other.log2_choices {
            *self.log2_choices.entry(bits).or_insert(0) += count;
        }
    }
}

#[inline]
fn bit_length(n: usize) -> u32 {
    usize::BITS - n.leading_zeros()
}
