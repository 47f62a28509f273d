//! Element storage behind a [`Tensor`](crate::Tensor).
//!
//! Storage only knows a flat run of elements. Shape, strides and the
//! column-major layout belong to the tensor that owns it.

mod dense;

use crate::scalar::Scalar;

pub use dense::Dense;

/// Flat element buffer a tensor can be built on.
pub trait TensorStorage<T: Scalar>: Clone + std::fmt::Debug {
    /// `len` zeros.
    fn zeros(len: usize) -> Self;

    fn from_vec(data: Vec<T>) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_slice(&self) -> &[T];

    fn as_mut_slice(&mut self) -> &mut [T];
}
