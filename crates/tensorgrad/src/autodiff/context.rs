//! Per-application scratch space shared by a forward and its backward step.

use super::saved_tensor::SavedTensor;
use crate::backend::Backend;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Values a forward computation saves for its backward computation.
///
/// The `needs_grad` flag is fixed at construction. When it is false the
/// output will be a constant, backward can never run, and every `save_*`
/// call is dropped.
#[derive(Debug, Clone, Default)]
pub struct Context<T: Scalar> {
    needs_grad: bool,
    backend: Backend,
    saved: Vec<SavedTensor<T>>,
    shapes: Vec<Vec<usize>>,
}

impl<T: Scalar> Context<T> {
    pub fn new(needs_grad: bool, backend: Backend) -> Self {
        Self {
            needs_grad,
            backend,
            saved: Vec::new(),
            shapes: Vec::new(),
        }
    }

    #[inline]
    pub fn needs_grad(&self) -> bool {
        self.needs_grad
    }

    /// Backend whose kernels the forward and backward steps should run.
    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Save tensor values, in order, for the backward step.
    pub fn save_for_backward(&mut self, tensors: &[&DenseTensor<T>]) {
        if !self.needs_grad {
            return;
        }
        self.saved
            .extend(tensors.iter().map(|&t| SavedTensor::new(t.clone())));
    }

    /// Save a shape, e.g. the input shape of a reshape.
    pub fn save_shape(&mut self, shape: &[usize]) {
        if self.needs_grad {
            self.shapes.push(shape.to_vec());
        }
    }

    pub fn saved_tensors(&self) -> &[SavedTensor<T>] {
        &self.saved
    }

    /// The `i`-th saved tensor.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation if nothing was saved at `i`.
    pub fn saved(&self, i: usize) -> Result<&DenseTensor<T>, TensorError> {
        self.saved.get(i).map(SavedTensor::get).ok_or_else(|| {
            TensorError::precondition(format!(
                "no saved tensor at position {i} ({} saved)",
                self.saved.len()
            ))
        })
    }

    /// The `i`-th saved shape.
    pub fn saved_shape(&self, i: usize) -> Result<&[usize], TensorError> {
        self.shapes.get(i).map(Vec::as_slice).ok_or_else(|| {
            TensorError::precondition(format!(
                "no saved shape at position {i} ({} saved)",
                self.shapes.len()
            ))
        })
    }
}
