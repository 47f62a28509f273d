//! Gradients waiting to be consumed by the backward pass.

use std::collections::HashMap;

use super::tensor::NodeId;
use crate::error::TensorError;
use crate::operations::add_into;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Per-node sums of the gradient contributions received so far.
///
/// A node reached through several consumers gets one entry; later
/// contributions are added in place.
#[derive(Debug)]
pub struct Gradients<T: Scalar> {
    pending: HashMap<NodeId, DenseTensor<T>>,
}

impl<T: Scalar> Gradients<T> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Add `grad` to whatever is already pending for `id`.
    ///
    /// Fails with `IncompatibleShapes` when the pending sum has another shape.
    pub fn accumulate(&mut self, id: NodeId, grad: DenseTensor<T>) -> Result<(), TensorError> {
        if let Some(sum) = self.pending.get_mut(&id) {
            return add_into(sum, &grad);
        }
        self.pending.insert(id, grad);
        Ok(())
    }

    /// Take the finished sum for `id` out of the map.
    pub fn remove(&mut self, id: NodeId) -> Option<DenseTensor<T>> {
        self.pending.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T: Scalar> Default for Gradients<T> {
    fn default() -> Self {
        Self::new()
    }
}
