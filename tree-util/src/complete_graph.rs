//! Complete graph on `V` vertices.
//!
//! Every unordered pair `v1 < v2` is addressed by the pairing function
//!
//! ```text
//! k = v1 + v2 * (v2 - 1) / 2
//! ```
//!
//! which enumerates all `K = V * (V - 1) / 2` pairs densely, so that edge
//! potentials can live in a flat array of length `K`.

use ndarray::Array2;

/// Number of edges `K` in a complete graph on `num_vertices` vertices.
#[inline]
pub fn num_complete_edges(num_vertices: usize) -> usize {
    num_vertices * num_vertices.saturating_sub(1) / 2
}

/// Find the complete-graph edge id `k` of an unordered pair of vertices.
///
/// Symmetric in its arguments. The two vertices must differ.
#[inline]
pub fn find_complete_edge(v1: usize, v2: usize) -> usize {
    debug_assert_ne!(v1, v2, "a complete-graph edge needs two distinct vertices");
    let (v1, v2) = if v2 < v1 { (v2, v1) } else { (v1, v2) };
    v1 + v2 * (v2 - 1) / 2
}

/// Recover the sorted pair `(v1, v2)` from a complete-graph edge id.
pub fn complete_edge_vertices(k: usize) -> (usize, usize) {
    // largest v2 with v2 * (v2 - 1) / 2 <= k
    let mut v2 = ((1.0 + (1.0 + 8.0 * k as f64).sqrt()) / 2.0) as usize;
    while v2 * (v2 - 1) / 2 > k {
        v2 -= 1;
    }
    while (v2 + 1) * v2 / 2 <= k {
        v2 += 1;
    }
    (k - v2 * (v2 - 1) / 2, v2)
}

/// Construct the `3 x K` grid of `(edge, vertex, vertex)` columns of a
/// complete graph, in increasing order of `k`.
///
/// * `num_vertices` - number of vertices `V >= 1`
pub fn make_complete_graph(num_vertices: usize) -> Array2<usize> {
    assert!(num_vertices >= 1, "A graph needs at least one vertex");
    let nk = num_complete_edges(num_vertices);
    let mut grid = Array2::<usize>::zeros((3, nk));
    let mut k = 0;
    for v2 in 0..num_vertices {
        for v1 in 0..v2 {
            grid[[0, k]] = k;
            grid[[1, k]] = v1;
            grid[[2, k]] = v2;
            k += 1;
        }
    }
    debug_assert_eq!(k, nk);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnv::FnvHashSet as HashSet;

    #[test]
    fn test_pairing_is_symmetric_and_injective() {
        let nv = 9;
        let mut seen = HashSet::default();
        for v2 in 0..nv {
            for v1 in 0..v2 {
                let k = find_complete_edge(v1, v2);
                assert_eq!(k, find_complete_edge(v2, v1));
                assert!(k < num_complete_edges(nv));
                assert!(seen.insert(k), "collision at ({}, {})", v1, v2);
            }
        }
        assert_eq!(seen.len(), num_complete_edges(nv));
    }

    #[test]
    fn test_pairing_on_six_vertices() {
        assert_eq!(find_complete_edge(2, 5), find_complete_edge(5, 2));
        assert_ne!(find_complete_edge(2, 5), find_complete_edge(1, 5));
        assert_eq!(find_complete_edge(2, 5), 12);
    }

    #[test]
    fn test_inverse_pairing() {
        for k in 0..num_complete_edges(40) {
            let (v1, v2) = complete_edge_vertices(k);
            assert!(v1 < v2);
            assert_eq!(find_complete_edge(v1, v2), k);
        }
    }

    #[test]
    fn test_complete_grid() {
        let grid = make_complete_graph(4);
        assert_eq!(grid.dim(), (3, 6));
        for k in 0..grid.ncols() {
            assert_eq!(grid[[0, k]], k);
            assert_eq!(find_complete_edge(grid[[1, k]], grid[[2, k]]), k);
        }
        // ordered by v2 first, then v1
        let v2: Vec<usize> = grid.row(2).to_vec();
        assert_eq!(v2, vec![1, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_single_vertex() {
        let grid = make_complete_graph(1);
        assert_eq!(grid.dim(), (3, 0));
    }

    #[test]
    #[should_panic(expected = "A graph needs at least one vertex")]
    fn test_no_vertices() {
        make_complete_graph(0);
    }
}
