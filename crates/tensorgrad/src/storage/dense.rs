//! Dense storage for tensor data.

use super::TensorStorage;
use crate::scalar::Scalar;

/// Every element stored explicitly, in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<T: Scalar> {
    data: Vec<T>,
}

impl<T: Scalar> Dense<T> {
    /// Consume the storage, returning the backing vector.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Scalar> TensorStorage<T> for Dense<T> {
    fn zeros(len: usize) -> Self {
        Self {
            data: vec![T::zero(); len],
        }
    }

    fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Scalar> std::ops::Index<usize> for Dense<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T: Scalar> std::ops::IndexMut<usize> for Dense<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}
