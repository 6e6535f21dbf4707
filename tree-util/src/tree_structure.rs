//! Canonical encoding of a spanning tree on `V` vertices.
//!
//! The tree is a `3 x E` grid of `(edge, vertex, vertex)` columns with
//! `v1 < v2` in every column and the columns sorted by `(v1, v2)`. Two
//! encodings of the same edge set are therefore identical.

use crate::complete_graph::make_complete_graph;
use crate::error::{Result, TreeError};
use log::debug;
use ndarray::Array2;
use std::sync::OnceLock;

/// Unordered vertex pair
pub type Edge = (usize, usize);

/// Topology of a tree over features.
#[derive(Debug, Clone)]
pub struct TreeStructure {
    num_vertices: usize,
    num_edges: usize,
    /// 3 x E, sorted (edge, v1, v2) columns
    tree_grid: Array2<usize>,
    /// 3 x K, built on first access
    complete_grid: OnceLock<Array2<usize>>,
}

impl TreeStructure {
    /// Create the path tree `(0, 1), (1, 2), ..., (V - 2, V - 1)`.
    ///
    /// * `num_vertices` - number of vertices (must be >= 1)
    pub fn new(num_vertices: usize) -> Self {
        assert!(num_vertices >= 1, "A tree needs at least one vertex");
        debug!("TreeStructure with {} vertices", num_vertices);
        let edges: Vec<Edge> = (1..num_vertices).map(|v| (v - 1, v)).collect();
        TreeStructure {
            num_vertices,
            num_edges: num_vertices - 1,
            tree_grid: make_tree(&edges),
            complete_grid: OnceLock::new(),
        }
    }

    /// Build a tree from an explicit edge list.
    pub fn from_edges(num_vertices: usize, edges: &[Edge]) -> Result<Self> {
        let mut tree = Self::new(num_vertices);
        tree.set_edges(edges)?;
        Ok(tree)
    }

    /// Replace the edges of this tree.
    ///
    /// The edge list is canonicalized but not checked for cycles or
    /// connectivity; supplying an actual spanning tree is up to the caller.
    ///
    /// * `edges` - exactly `V - 1` unordered vertex pairs
    pub fn set_edges(&mut self, edges: &[Edge]) -> Result<()> {
        if edges.len() != self.num_edges {
            return Err(TreeError::InvalidTopology(format!(
                "expected {} edges on {} vertices, got {}",
                self.num_edges,
                self.num_vertices,
                edges.len()
            )));
        }
        if let Some(&(v1, v2)) = edges
            .iter()
            .find(|&&(v1, v2)| v1 >= self.num_vertices || v2 >= self.num_vertices)
        {
            return Err(TreeError::InvalidTopology(format!(
                "edge ({}, {}) is out of range for {} vertices",
                v1, v2, self.num_vertices
            )));
        }
        self.tree_grid = make_tree(edges);
        Ok(())
    }

    /// Number of vertices `V`
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of edges `E = V - 1`
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// `3 x E` grid of `(edge, vertex, vertex)` columns defining the tree.
    pub fn tree_grid(&self) -> &Array2<usize> {
        &self.tree_grid
    }

    /// `3 x K` grid of `(edge, vertex, vertex)` columns defining the
    /// complete graph; built and cached on first access.
    pub fn complete_grid(&self) -> &Array2<usize> {
        self.complete_grid
            .get_or_init(|| make_complete_graph(self.num_vertices))
    }

    /// Vertex ids `0..V`
    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.num_vertices
    }

    /// Sorted `(v1, v2)` pairs of the tree
    pub fn edges(&self) -> Vec<Edge> {
        self.tree_grid
            .columns()
            .into_iter()
            .map(|col| (col[1], col[2]))
            .collect()
    }

    /// Drop cached temporary structures (the complete grid).
    pub fn clear_cache(&mut self) {
        self.complete_grid.take();
    }
}

impl PartialEq for TreeStructure {
    fn eq(&self, other: &Self) -> bool {
        self.num_vertices == other.num_vertices && self.tree_grid == other.tree_grid
    }
}

impl Eq for TreeStructure {}

/// Construct a `3 x E` tree grid from unordered vertex pairs.
///
/// Each pair is sorted, the pairs are sorted, and edge ids are assigned in
/// that order.
pub fn make_tree(edges: &[Edge]) -> Array2<usize> {
    let mut sorted: Vec<Edge> = edges
        .iter()
        .map(|&(v1, v2)| if v2 < v1 { (v2, v1) } else { (v1, v2) })
        .collect();
    sorted.sort_unstable();

    let mut grid = Array2::<usize>::zeros((3, sorted.len()));
    for (e, &(v1, v2)) in sorted.iter().enumerate() {
        grid[[0, e]] = e;
        grid[[1, e]] = v1;
        grid[[2, e]] = v2;
    }
    grid
}
