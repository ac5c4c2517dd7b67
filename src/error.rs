//! Error types for layout construction and latency searches

use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Precondition violations rejected before any descent begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Unit arity below 2 never shrinks the working set, so the descent
    /// would not terminate
    #[error("unit arity must be at least 2, got {0}")]
    ArityTooSmall(usize),

    /// A zero-stage latency bound is unsatisfiable for any input width
    /// above 1
    #[error("latency bound must be at least 1 stage")]
    ZeroLatency,
}
