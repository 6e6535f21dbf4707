//! Structural engine for tree-structured latent variable models.
//!
//! Features of a model are connected by a latent spanning tree whose
//! topology is learned jointly with the parameters. This crate keeps the
//! topology and nothing else:
//!
//! - a dense pairing between unordered vertex pairs and complete-graph edges,
//! - a canonical, comparable tree encoding,
//! - a Gibbs sampler that moves one tree edge at a time, restricted to the
//!   edges that bridge the two components left after a removal,
//! - a compiler from a rooted tree to a flat up/in/root/out message-passing
//!   schedule for exact inference.
//!
//! Probabilities, sufficient statistics and the arithmetic of message
//! passing belong to the caller.

#![deny(missing_docs)]

/// Pairing function between vertex pairs and complete-graph edge ids
pub mod complete_graph;

/// Canonical spanning tree encoding with a lazily built complete graph
pub mod tree_structure;

/// Spanning tree supporting one edge removal/insertion cycle at a time
pub mod mutable_tree;

/// Gibbs sampler over spanning trees
pub mod tree_sampler;

/// Counters and histograms collected by the tree sampler
pub mod diagnostics;

/// Leaf-peeling search for a central root vertex
pub mod center;

/// Message-passing schedules compiled from rooted trees
pub mod propagation;

/// Error type shared by the structural engine
pub mod error;

pub use center::find_center_of_tree;
pub use complete_graph::{
    complete_edge_vertices, find_complete_edge, make_complete_graph, num_complete_edges,
};
pub use diagnostics::SamplerStats;
pub use error::{Result, TreeError};
pub use mutable_tree::MutableTree;
pub use propagation::{
    make_propagation_schedule, propagate, schedule_to_grid, OpCode, PropagationOp,
    TreePropagation,
};
pub use tree_sampler::{run_chains, sample_tree, TreeChain, TreeSampler, TreeSamplerArgs};
pub use tree_structure::{make_tree, Edge, TreeStructure};
