//! Message-passing schedules for exact inference on trees.
//!
//! A schedule is a flat list of operations over a rooted tree:
//!
//! 1. `Up` then one `In` per child, for every vertex from the leaves to the
//!    root (reverse BFS order),
//! 2. a single `Root` at the root,
//! 3. one `Out` per non-root vertex from the root to the leaves (BFS order).
//!
//! The inward half collects every subtree into the root; the outward half
//! pushes the root's summary back to every vertex. What an operation
//! computes is left to a [`TreePropagation`] implementation.

use crate::center::{find_center_of_tree, tree_neighbors};
use crate::error::{Result, TreeError};
use fnv::FnvHashMap as HashMap;
use ndarray::Array2;
use serde::Serialize;
use std::collections::VecDeque;

/// Numeric code of a schedule operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpCode {
    /// start the summary of a vertex from its own data
    Up = 0,
    /// fold a child's summary into its parent
    In = 1,
    /// finalize the root
    Root = 2,
    /// pass the parent's summary down to a vertex
    Out = 3,
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpCode::Up => "up",
            OpCode::In => "in",
            OpCode::Root => "root",
            OpCode::Out => "out",
        };
        write!(f, "{}", name)
    }
}

/// One step of a propagation schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropagationOp {
    /// Start the inward summary of `vertex`
    Up {
        /// vertex operated on
        vertex: usize,
    },
    /// Fold the inward summary of `child` into `vertex` across `edge`
    In {
        /// parent vertex
        vertex: usize,
        /// child whose summary is complete
        child: usize,
        /// tree edge id of (vertex, child)
        edge: usize,
    },
    /// Finalize the root
    Root {
        /// the root vertex
        vertex: usize,
    },
    /// Send the summary of `parent` down to `vertex` across `edge`
    Out {
        /// vertex receiving the message
        vertex: usize,
        /// its parent
        parent: usize,
        /// tree edge id of (vertex, parent)
        edge: usize,
    },
}

impl PropagationOp {
    /// Operation code
    pub fn opcode(&self) -> OpCode {
        match self {
            PropagationOp::Up { .. } => OpCode::Up,
            PropagationOp::In { .. } => OpCode::In,
            PropagationOp::Root { .. } => OpCode::Root,
            PropagationOp::Out { .. } => OpCode::Out,
        }
    }

    /// Vertex operated on
    pub fn vertex(&self) -> usize {
        match *self {
            PropagationOp::Up { vertex }
            | PropagationOp::In { vertex, .. }
            | PropagationOp::Root { vertex }
            | PropagationOp::Out { vertex, .. } => vertex,
        }
    }

    /// Flat `(opcode, vertex, relative, edge)` record; `relative` and
    /// `edge` are zero for `Up` and `Root`.
    pub fn as_row(&self) -> [usize; 4] {
        match *self {
            PropagationOp::Up { vertex } => [OpCode::Up as usize, vertex, 0, 0],
            PropagationOp::In {
                vertex,
                child,
                edge,
            } => [OpCode::In as usize, vertex, child, edge],
            PropagationOp::Root { vertex } => [OpCode::Root as usize, vertex, 0, 0],
            PropagationOp::Out {
                vertex,
                parent,
                edge,
            } => [OpCode::Out as usize, vertex, parent, edge],
        }
    }
}

/// Make a schedule for message passing on a tree.
///
/// * `grid` - `3 x E` tree as returned by `make_tree`
/// * `root` - root vertex; defaults to `find_center_of_tree(grid)`
///
/// Returns `3V - 1` operations: `V` up, `E` in, one root and `E` out.
pub fn make_propagation_schedule(
    grid: &Array2<usize>,
    root: Option<usize>,
) -> Result<Vec<PropagationOp>> {
    let ne = grid.ncols();
    let nv = ne + 1;
    for col in grid.columns() {
        let (v1, v2) = (col[1], col[2]);
        if v1 >= nv || v2 >= nv {
            return Err(TreeError::InvalidTopology(format!(
                "edge ({}, {}) is out of range for {} vertices",
                v1, v2, nv
            )));
        }
    }
    let root = root.unwrap_or_else(|| find_center_of_tree(grid));
    if root >= nv {
        return Err(TreeError::InvalidTopology(format!(
            "root {} is out of range for {} vertices",
            root, nv
        )));
    }

    let neighbors = tree_neighbors(grid);
    let mut edge_dict: HashMap<(usize, usize), usize> = HashMap::default();
    for col in grid.columns() {
        let (e, v1, v2) = (col[0], col[1], col[2]);
        edge_dict.insert((v1, v2), e);
        edge_dict.insert((v2, v1), e);
    }

    // (vertex, parent, children) in BFS order; children ascending
    let mut nested: Vec<(usize, Option<usize>, Vec<usize>)> = Vec::with_capacity(nv);
    let mut queue = VecDeque::from([(root, None)]);
    while let Some((v, parent)) = queue.pop_front() {
        let children: Vec<usize> = neighbors[v]
            .iter()
            .copied()
            .filter(|&v2| Some(v2) != parent)
            .collect();
        queue.extend(children.iter().map(|&v2| (v2, Some(v))));
        nested.push((v, parent, children));
        if nested.len() > nv {
            return Err(TreeError::InvalidTopology(
                "edges contain a cycle".to_string(),
            ));
        }
    }

    if nested.len() != nv {
        return Err(TreeError::InvalidTopology(format!(
            "only {} of {} vertices are reachable from the root",
            nested.len(),
            nv
        )));
    }

    let mut schedule = Vec::with_capacity(3 * nv - 1);
    for (v, _, children) in nested.iter().rev() {
        schedule.push(PropagationOp::Up { vertex: *v });
        for &child in children {
            schedule.push(PropagationOp::In {
                vertex: *v,
                child,
                edge: edge_dict[&(*v, child)],
            });
        }
    }
    schedule.push(PropagationOp::Root { vertex: root });
    for (v, parent, _) in nested.iter().skip(1) {
        if let Some(parent) = *parent {
            schedule.push(PropagationOp::Out {
                vertex: *v,
                parent,
                edge: edge_dict[&(*v, parent)],
            });
        }
    }

    if schedule.len() != 3 * nv - 1 {
        return Err(TreeError::ScheduleLength {
            expected: 3 * nv - 1,
            got: schedule.len(),
        });
    }
    Ok(schedule)
}

/// Flatten a schedule into an `N x 4` grid of
/// `(opcode, vertex, relative, edge)` rows.
pub fn schedule_to_grid(schedule: &[PropagationOp]) -> Array2<usize> {
    let mut grid = Array2::<usize>::zeros((schedule.len(), 4));
    for (mut row, op) in grid.rows_mut().into_iter().zip(schedule) {
        for (x, y) in row.iter_mut().zip(op.as_row()) {
            *x = y;
        }
    }
    grid
}

/// Numeric operations driven by a propagation schedule.
///
/// Implementations decide what a summary is (a message vector, a
/// likelihood, a sample) and how it is combined.
pub trait TreePropagation {
    /// Start the inward summary of `vertex` from its own data.
    fn up(&mut self, vertex: usize);

    /// Fold the finished inward summary of `child` into `vertex`.
    fn inward(&mut self, vertex: usize, child: usize, edge: usize);

    /// Finalize the summary at the root.
    fn root(&mut self, vertex: usize);

    /// Combine the outward summary of `parent` into `vertex`.
    fn outward(&mut self, vertex: usize, parent: usize, edge: usize);
}

/// Run a schedule against a set of numeric operations, in order.
pub fn propagate<P: TreePropagation + ?Sized>(schedule: &[PropagationOp], ops: &mut P) {
    for op in schedule {
        match *op {
            PropagationOp::Up { vertex } => ops.up(vertex),
            PropagationOp::In {
                vertex,
                child,
                edge,
            } => ops.inward(vertex, child, edge),
            PropagationOp::Root { vertex } => ops.root(vertex),
            PropagationOp::Out {
                vertex,
                parent,
                edge,
            } => ops.outward(vertex, parent, edge),
        }
    }
}
