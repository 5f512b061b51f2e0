//! Error types for npoint.

use thiserror::Error;

/// Errors returned by the public counting, tree and matcher entry points.
///
/// Only input validation produces these. An empty result (no tuple matches)
/// is a zero count, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NPointError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Number of nodes or candidate sets does not match the matcher's tuple size.
    #[error("tuple size mismatch: matcher expects {expected} positions, got {actual}")]
    TupleSizeMismatch { expected: usize, actual: usize },

    /// Coordinate data inconsistent with the declared dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A point index (or node range end) beyond the point store.
    #[error("point index {index} out of range for store of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    /// A tree was requested over an empty point set.
    #[error("point set is empty")]
    EmptyPointSet,
}

pub type Result<T> = std::result::Result<T, NPointError>;
