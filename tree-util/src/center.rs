//! Central vertex of a tree by repeated leaf peeling.

use ndarray::Array2;
use std::collections::{BTreeSet, VecDeque};

/// Adjacency sets of a `3 x E` tree grid on `E + 1` vertices.
pub(crate) fn tree_neighbors(grid: &Array2<usize>) -> Vec<BTreeSet<usize>> {
    let nv = grid.ncols() + 1;
    let mut neighbors = vec![BTreeSet::new(); nv];
    for col in grid.columns() {
        let (v1, v2) = (col[1], col[2]);
        neighbors[v1].insert(v2);
        neighbors[v2].insert(v1);
    }
    neighbors
}

/// Find a maximally central vertex of a tree.
///
/// Leaves are peeled off in rounds until one vertex is left (or two, in
/// which case the last one peeled is returned). Initial leaves are queued
/// in decreasing vertex order and newly exposed leaves in decreasing
/// neighbour order, so the answer depends only on the tree grid.
///
/// * `grid` - `3 x E` tree as returned by `make_tree`
pub fn find_center_of_tree(grid: &Array2<usize>) -> usize {
    let mut neighbors = tree_neighbors(grid);
    let nv = neighbors.len();

    let mut queue: VecDeque<usize> = (0..nv).rev().filter(|&v| neighbors[v].len() <= 1).collect();

    let mut center = 0;
    while let Some(v) = queue.pop_front() {
        center = v;
        let adjacent: Vec<usize> = neighbors[v].iter().rev().copied().collect();
        for v2 in adjacent {
            neighbors[v2].remove(&v);
            if neighbors[v2].len() == 1 {
                queue.push_back(v2);
            }
        }
    }
    center
}
