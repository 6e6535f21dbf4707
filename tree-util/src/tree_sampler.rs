//! Gibbs sampler over spanning trees of a dense weighted graph.
//!
//! Consider `E` undirected edges that move around a graph of `V = E + 1`
//! vertices, never spanning the same pair twice and always forming a
//! spanning tree. One Gibbs step picks one of the `E` edges at random and
//! removes it, which splits the tree into two components. The only edges
//! that restore a spanning tree are the ones bridging those components, so
//! the replacement is drawn among them in proportion to `exp(edge_logits)`.
//! The resulting chain targets the distribution over spanning trees
//! proportional to the product of `exp(edge_logits[k])` over tree edges.

use crate::diagnostics::SamplerStats;
use crate::error::{Result, TreeError};
use crate::mutable_tree::MutableTree;
use crate::tree_structure::Edge;
use log::{debug, info, warn};
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Total mass the candidate probabilities are scaled to, kept just under
/// one so that downstream samplers never see a mass above one.
const MAX_TOTAL_MASS: f64 = 0.9999995;

/// Configuration of tree sampling runs.
#[derive(Debug, Clone)]
pub struct TreeSamplerArgs {
    /// Number of sweeps; each sweep makes `E` single-edge proposals
    pub steps: usize,
    /// Number of independent chains for [`run_chains`]
    pub num_chains: usize,
    /// Seed of the first chain; chain `i` uses `seed + i`
    pub seed: u64,
}

impl Default for TreeSamplerArgs {
    fn default() -> Self {
        Self {
            steps: 1,
            num_chains: 1,
            seed: 42,
        }
    }
}

/// Final edges and diagnostics of one chain.
#[derive(Debug, Clone)]
pub struct TreeChain {
    /// Sorted edges of the last tree
    pub edges: Vec<Edge>,
    /// Counters collected while sampling
    pub stats: SamplerStats,
}

/// Tree sampler owning its random stream, scratch space and diagnostics.
pub struct TreeSampler<R: Rng> {
    rng: R,
    stats: SamplerStats,
    scratch: Scratch,
}

#[derive(Default)]
struct Scratch {
    valid_edges: Vec<usize>,
    valid_probs: Vec<f64>,
}

impl<R: Rng> TreeSampler<R> {
    /// Create a sampler drawing from `rng`.
    pub fn new(rng: R) -> Self {
        TreeSampler {
            rng,
            stats: SamplerStats::default(),
            scratch: Scratch::default(),
        }
    }

    /// Run `steps` sweeps of edge moves starting from `edges`.
    ///
    /// * `grid` - `3 x K` complete graph
    /// * `edge_logits` - `K` nonnormalized log weights
    /// * `edges` - `E` initial tree edges
    /// * `steps` - number of sweeps
    pub fn sample(
        &mut self,
        grid: &Array2<usize>,
        edge_logits: &[f64],
        edges: &[Edge],
        steps: usize,
    ) -> Result<Vec<Edge>> {
        sample_tree_with_scratch(
            grid,
            edge_logits,
            edges,
            steps,
            &mut self.rng,
            &mut self.stats,
            &mut self.scratch,
        )
    }

    /// Diagnostics collected so far
    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    /// Consume the sampler and keep its diagnostics
    pub fn into_stats(self) -> SamplerStats {
        self.stats
    }
}

/// Sample a random spanning tree of a dense weighted graph by MCMC.
///
/// Returns the sorted `(v1, v2)` pairs of the final tree, or `edges`
/// unchanged when there is at most one edge (nothing to choose).
///
/// * `grid` - `3 x K` array as returned by `make_complete_graph`
/// * `edge_logits` - length-`K` nonnormalized log probabilities
/// * `edges` - `E` initial tree edges
/// * `steps` - number of sweeps of `E` proposals each
/// * `rng` - random stream; seed it for reproducible chains
/// * `stats` - diagnostics sink
pub fn sample_tree<R: Rng>(
    grid: &Array2<usize>,
    edge_logits: &[f64],
    edges: &[Edge],
    steps: usize,
    rng: &mut R,
    stats: &mut SamplerStats,
) -> Result<Vec<Edge>> {
    let mut scratch = Scratch::default();
    sample_tree_with_scratch(grid, edge_logits, edges, steps, rng, stats, &mut scratch)
}

fn sample_tree_with_scratch<R: Rng>(
    grid: &Array2<usize>,
    edge_logits: &[f64],
    edges: &[Edge],
    steps: usize,
    rng: &mut R,
    stats: &mut SamplerStats,
    scratch: &mut Scratch,
) -> Result<Vec<Edge>> {
    debug!("sample_tree sampling a random spanning tree");
    stats.calls += 1;
    if edges.len() <= 1 {
        return Ok(edges.to_vec());
    }

    if edge_logits.len() != grid.ncols() {
        return Err(TreeError::DimensionMismatch {
            expected: grid.ncols(),
            got: edge_logits.len(),
        });
    }

    let mut tree = MutableTree::new(grid, edges)?;
    let ne = tree.num_edges();
    let nk = grid.ncols();

    let Scratch {
        valid_edges,
        valid_probs,
    } = scratch;

    for _step in 0..steps {
        for _ in 0..ne {
            let e = pick_edge_slot(rng, ne);
            let k1 = tree.remove_edge(e)?;

            valid_edges.clear();
            valid_edges.extend((0..nk).filter(|&k| tree.is_bridge(k)));

            valid_probs.clear();
            valid_probs.extend(valid_edges.iter().map(|&k| edge_logits[k]));

            let max = valid_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            valid_probs.iter_mut().for_each(|p| *p = (*p - max).exp());
            let total: f64 = valid_probs.iter().sum();

            let feasible = total > 0.0 && total.is_finite();
            let k2 = if feasible {
                let scale = MAX_TOTAL_MASS / total;
                valid_probs.iter_mut().for_each(|p| *p *= scale);
                valid_edges[sample_from_probs(&valid_probs[..], rng)]
            } else {
                warn!(
                    "no positive mass among {} bridging edges; keeping edge {}",
                    valid_edges.len(),
                    k1
                );
                k1
            };

            tree.add_edge(e, k2)?;
            stats.record(valid_edges.len(), k1 != k2, feasible);
        }
    }

    let edges = tree.edges();
    debug_assert_eq!(edges.len(), ne);
    Ok(edges)
}

/// Choose the edge slot to resample.
///
/// Slots must be drawn uniformly at random. After a move the edge in a slot
/// is unrelated to the edge that was there before, and a sequential scan
/// over slots does not leave the tree distribution invariant.
#[inline]
pub(crate) fn pick_edge_slot<R: Rng>(rng: &mut R, num_edges: usize) -> usize {
    rng.random_range(0..num_edges)
}

/// Draw an index in proportion to nonnegative weights.
fn sample_from_probs<R: Rng>(probs: &[f64], rng: &mut R) -> usize {
    let total: f64 = probs.iter().sum();
    let u: f64 = rng.random::<f64>() * total;
    let mut cum = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cum += p;
        if u < cum {
            return i;
        }
    }
    probs.len() - 1
}

/// Run independent tree chains in parallel.
///
/// Chain `i` draws from `SmallRng::seed_from_u64(args.seed + i)` so the
/// output does not depend on the number of worker threads.
///
/// * `grid` - `3 x K` complete graph
/// * `edge_logits` - `K` nonnormalized log weights
/// * `edges` - initial tree shared by every chain
/// * `args` - sweeps, number of chains and seed
pub fn run_chains(
    grid: &Array2<usize>,
    edge_logits: &[f64],
    edges: &[Edge],
    args: &TreeSamplerArgs,
) -> Result<Vec<TreeChain>> {
    let chains = (0..args.num_chains)
        .into_par_iter()
        .map(|i| -> Result<TreeChain> {
            let rng = SmallRng::seed_from_u64(args.seed.wrapping_add(i as u64));
            let mut sampler = TreeSampler::new(rng);
            let edges = sampler.sample(grid, edge_logits, edges, args.steps)?;
            Ok(TreeChain {
                edges,
                stats: sampler.into_stats(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut total = SamplerStats::default();
    for chain in &chains {
        total.merge(&chain.stats);
    }
    info!(
        "{} chains, {} proposals, acceptance rate {:.3}, {} infeasible",
        chains.len(),
        total.proposals,
        total.acceptance_rate(),
        total.infeasible
    );

    Ok(chains)
}
