//! Error types for tensorgrad.

use thiserror::Error;

/// Errors that can occur in tensor operations and during differentiation.
#[derive(Debug, Error)]
pub enum TensorError {
    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two shapes that were required to be identical differ.
    #[error("incompatible shapes: {lhs:?} vs {rhs:?}")]
    IncompatibleShapes { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Reduction or indexing along an axis the tensor does not have.
    #[error("dimension {dim} out of range for tensor with {ndim} dimensions")]
    InvalidDimension { dim: usize, ndim: usize },

    /// Operation requires specific tensor rank.
    #[error("expected tensor of rank {expected}, got rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Shapes cannot be broadcast against each other.
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    /// A kernel was evaluated outside its mathematical domain.
    #[error("domain error in {op}: {message}")]
    Domain { op: &'static str, message: String },

    /// An operation's backward step returned the wrong number of gradients.
    #[error(
        "backward arity mismatch in {op}: expected {expected} input gradients, got {actual} (bug in backward definition)"
    )]
    ArityMismatch {
        op: String,
        expected: usize,
        actual: usize,
    },

    /// The broadcast reducer could not restore the original input shape.
    #[error("cannot reduce gradient of shape {grad:?} to input shape {target:?}")]
    ShapeReconciliation { grad: Vec<usize>, target: Vec<usize> },

    /// A caller-side precondition was violated.
    #[error("precondition violated: {0}")]
    Precondition(String),
}

impl TensorError {
    /// Build a domain error for the named operation.
    pub fn domain(op: &'static str, message: impl Into<String>) -> Self {
        Self::Domain {
            op,
            message: message.into(),
        }
    }

    /// Build a precondition violation.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}
