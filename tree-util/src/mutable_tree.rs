//! Spanning tree that supports one edge move at a time.
//!
//! A move is a strict `remove_edge` / `add_edge` pair. Between the two
//! calls the structure is a forest with two components and `components`
//! marks the side reached from one endpoint of the removed edge with
//! `true`. `add_edge` only accepts complete-graph edges that bridge the two
//! sides, which restores a spanning tree.

use crate::complete_graph::{find_complete_edge, num_complete_edges};
use crate::error::{Result, TreeError};
use crate::tree_structure::Edge;
use fnv::FnvHashMap as HashMap;
use fnv::FnvHashSet as HashSet;
use ndarray::Array2;

/// Mutable spanning tree over the vertices of a complete graph.
///
/// Tree edges live in `E` slots. A slot keeps its position across moves
/// while the complete-graph edge stored in it changes.
#[derive(Debug, Clone)]
pub struct MutableTree<'a> {
    num_vertices: usize,
    num_edges: usize,
    /// 3 x K complete graph
    grid: &'a Array2<usize>,
    /// slot -> complete edge
    e2k: Vec<Option<usize>>,
    /// complete edge -> slot
    k2e: HashMap<usize, usize>,
    neighbors: Vec<HashSet<usize>>,
    components: Vec<bool>,
    /// slot emptied by the last `remove_edge`
    vacant: Option<usize>,
    stack: Vec<usize>,
}

impl<'a> MutableTree<'a> {
    /// Build a mutable spanning tree.
    ///
    /// * `grid` - `3 x K` array as returned by `make_complete_graph`
    /// * `edges` - `E` tree edges as unordered vertex pairs, `V = E + 1`
    pub fn new(grid: &'a Array2<usize>, edges: &[Edge]) -> Result<Self> {
        let num_edges = edges.len();
        let num_vertices = num_edges + 1;
        let nk = num_complete_edges(num_vertices);

        if grid.dim() != (3, nk) {
            return Err(TreeError::DimensionMismatch {
                expected: nk,
                got: grid.ncols(),
            });
        }

        let mut e2k = Vec::with_capacity(num_edges);
        let mut k2e = HashMap::default();
        let mut neighbors = vec![HashSet::default(); num_vertices];

        for (e, &(v1, v2)) in edges.iter().enumerate() {
            if v1 == v2 || v1 >= num_vertices || v2 >= num_vertices {
                return Err(TreeError::InvalidTopology(format!(
                    "invalid edge ({}, {}) on {} vertices",
                    v1, v2, num_vertices
                )));
            }
            let k = find_complete_edge(v1, v2);
            if k2e.insert(k, e).is_some() {
                return Err(TreeError::InvalidTopology(format!(
                    "duplicate edge ({}, {})",
                    v1, v2
                )));
            }
            e2k.push(Some(k));
            neighbors[v1].insert(v2);
            neighbors[v2].insert(v1);
        }

        debug_assert_eq!(k2e.len(), num_edges);

        Ok(MutableTree {
            num_vertices,
            num_edges,
            grid,
            e2k,
            k2e,
            neighbors,
            components: vec![false; num_vertices],
            vacant: None,
            stack: Vec::with_capacity(num_vertices),
        })
    }

    /// Number of vertices `V`
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of edge slots `E`
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Number of edges currently in the tree (`E`, or `E - 1` mid-move)
    pub fn num_edges_present(&self) -> usize {
        self.k2e.len()
    }

    /// Side of the cut each vertex lies on; all `false` outside a move.
    pub fn components(&self) -> &[bool] {
        &self.components
    }

    /// Current neighbours of a vertex
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[v].iter().copied()
    }

    /// Complete-graph edge stored at a slot, if any
    pub fn edge_at(&self, e: usize) -> Option<usize> {
        self.e2k.get(e).copied().flatten()
    }

    /// Whether a complete-graph edge bridges the two sides of the cut.
    #[inline]
    pub fn is_bridge(&self, k: usize) -> bool {
        self.components[self.grid[[1, k]]] != self.components[self.grid[[2, k]]]
    }

    /// Remove the edge at slot `e` and mark the component of one of its
    /// endpoints.
    ///
    /// Returns the complete-graph edge id that was removed.
    pub fn remove_edge(&mut self, e: usize) -> Result<usize> {
        if let Some(vacant) = self.vacant {
            return Err(TreeError::PreconditionViolation(format!(
                "slot {} is still vacant; add an edge before removing another",
                vacant
            )));
        }
        let k = self.edge_at(e).ok_or_else(|| {
            TreeError::PreconditionViolation(format!(
                "no edge at slot {} of {}",
                e, self.num_edges
            ))
        })?;

        self.e2k[e] = None;
        self.k2e.remove(&k);
        self.vacant = Some(e);

        let (v1, v2) = (self.grid[[1, k]], self.grid[[2, k]]);
        self.neighbors[v1].remove(&v2);
        self.neighbors[v2].remove(&v1);

        // flood fill from v1
        let components = &mut self.components;
        let stack = &mut self.stack;
        stack.clear();
        stack.push(v1);
        components[v1] = true;
        while let Some(u) = stack.pop() {
            for &w in &self.neighbors[u] {
                if !components[w] {
                    components[w] = true;
                    stack.push(w);
                }
            }
        }

        debug_assert_eq!(self.k2e.len(), self.num_edges - 1);
        Ok(k)
    }

    /// Insert complete-graph edge `k` into the vacant slot `e`.
    ///
    /// `k` must bridge the two components left by the last `remove_edge`.
    pub fn add_edge(&mut self, e: usize, k: usize) -> Result<()> {
        if self.vacant != Some(e) {
            return Err(TreeError::PreconditionViolation(match self.vacant {
                Some(vacant) => format!("slot {} is not vacant (slot {} is)", e, vacant),
                None => format!("slot {} is not vacant; remove an edge first", e),
            }));
        }
        if k >= self.grid.ncols() {
            return Err(TreeError::PreconditionViolation(format!(
                "complete edge {} is out of range for {} edges",
                k,
                self.grid.ncols()
            )));
        }
        if !self.is_bridge(k) {
            return Err(TreeError::PreconditionViolation(format!(
                "edge ({}, {}) does not connect the two components",
                self.grid[[1, k]],
                self.grid[[2, k]]
            )));
        }

        let (v1, v2) = (self.grid[[1, k]], self.grid[[2, k]]);
        self.e2k[e] = Some(k);
        self.k2e.insert(k, e);
        self.neighbors[v1].insert(v2);
        self.neighbors[v2].insert(v1);
        self.components.fill(false);
        self.vacant = None;

        debug_assert_eq!(self.k2e.len(), self.num_edges);
        Ok(())
    }

    /// Sorted `(v1, v2)` pairs of the edges currently in the tree.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .e2k
            .iter()
            .flatten()
            .map(|&k| (self.grid[[1, k]], self.grid[[2, k]]))
            .collect();
        edges.sort_unstable();
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete_graph::make_complete_graph;

    fn reachable_from(tree: &MutableTree, start: usize) -> Vec<bool> {
        let mut seen = vec![false; tree.num_vertices()];
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(u) = stack.pop() {
            for w in tree.neighbors(u) {
                if !seen[w] {
                    seen[w] = true;
                    stack.push(w);
                }
            }
        }
        seen
    }

    #[test]
    fn test_remove_splits_into_two_components() -> Result<()> {
        let grid = make_complete_graph(6);
        let edges = vec![(0, 1), (1, 2), (2, 3), (3, 4), (1, 5)];
        let mut tree = MutableTree::new(&grid, &edges)?;

        for e in 0..edges.len() {
            let k = tree.remove_edge(e)?;
            assert_eq!(tree.num_edges_present(), edges.len() - 1);

            let (v1, v2) = (grid[[1, k]], grid[[2, k]]);
            let marked = tree.components().to_vec();
            assert_eq!(marked, reachable_from(&tree, v1));
            assert!(marked[v1]);
            assert!(!marked[v2]);
            assert_eq!(reachable_from(&tree, v2), marked.iter().map(|m| !m).collect::<Vec<_>>());

            tree.add_edge(e, k)?;
            assert_eq!(tree.num_edges_present(), edges.len());
            assert!(tree.components().iter().all(|&c| !c));
            assert!(reachable_from(&tree, 0).iter().all(|&r| r));
        }
        Ok(())
    }

    #[test]
    fn test_move_to_a_bridging_edge() -> Result<()> {
        let grid = make_complete_graph(4);
        let mut tree = MutableTree::new(&grid, &[(0, 1), (1, 2), (2, 3)])?;
        // drop (1, 2): {0, 1} vs {2, 3}
        let k = tree.remove_edge(1)?;
        assert_eq!(k, find_complete_edge(1, 2));
        let bridge = find_complete_edge(0, 3);
        assert!(tree.is_bridge(bridge));
        tree.add_edge(1, bridge)?;
        assert_eq!(tree.edges(), vec![(0, 1), (0, 3), (2, 3)]);
        assert_eq!(tree.edge_at(1), Some(bridge));
        Ok(())
    }

    #[test]
    fn test_add_edge_within_one_side_fails() -> Result<()> {
        let grid = make_complete_graph(4);
        let mut tree = MutableTree::new(&grid, &[(0, 1), (1, 2), (2, 3)])?;
        // drop (0, 1): {0} vs {1, 2, 3}
        let k = tree.remove_edge(0)?;
        assert_eq!(k, find_complete_edge(0, 1));
        let inside = find_complete_edge(1, 3);
        let err = tree.add_edge(0, inside).unwrap_err();
        assert!(matches!(err, TreeError::PreconditionViolation(_)));
        // the cut is still open and a valid bridge is accepted
        tree.add_edge(0, find_complete_edge(0, 3))?;
        assert_eq!(tree.edges(), vec![(0, 3), (1, 2), (2, 3)]);
        Ok(())
    }

    #[test]
    fn test_out_of_order_calls_fail() -> Result<()> {
        let grid = make_complete_graph(3);
        let mut tree = MutableTree::new(&grid, &[(0, 1), (1, 2)])?;
        assert!(matches!(
            tree.add_edge(0, 0),
            Err(TreeError::PreconditionViolation(_))
        ));
        let k = tree.remove_edge(0)?;
        assert!(matches!(
            tree.remove_edge(1),
            Err(TreeError::PreconditionViolation(_))
        ));
        assert!(matches!(
            tree.add_edge(1, k),
            Err(TreeError::PreconditionViolation(_))
        ));
        tree.add_edge(0, k)?;
        assert!(matches!(
            tree.remove_edge(5),
            Err(TreeError::PreconditionViolation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_construction() {
        let grid = make_complete_graph(4);
        assert!(matches!(
            MutableTree::new(&grid, &[(0, 1), (0, 1), (2, 3)]),
            Err(TreeError::InvalidTopology(_))
        ));
        assert!(matches!(
            MutableTree::new(&grid, &[(0, 1), (1, 4), (2, 3)]),
            Err(TreeError::InvalidTopology(_))
        ));
        assert!(matches!(
            MutableTree::new(&grid, &[(0, 1), (1, 2)]),
            Err(TreeError::DimensionMismatch { .. })
        ));
    }
}
