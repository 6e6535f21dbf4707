/// Failures raised by the structural engine.
///
/// Numerically degenerate proposals in the tree sampler are not errors;
/// they are counted in [`crate::SamplerStats`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// An edge set that cannot describe a spanning tree on the vertex set
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A mutable tree was used outside of its remove/add contract
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    /// An array whose length disagrees with the number of vertices
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// length implied by the vertex count
        expected: usize,
        /// length supplied by the caller
        got: usize,
    },

    /// A compiled schedule without exactly 3V - 1 operations
    #[error("Schedule has {got} operations but {expected} are required")]
    ScheduleLength {
        /// 3V - 1
        expected: usize,
        /// emitted operations
        got: usize,
    },
}

/// Result type of the structural engine
pub type Result<T> = std::result::Result<T, TreeError>;
