//! Reduce a broadcast gradient back to the shape of the input it came from.
//!
//! ```text
//! input (3, 1) ──broadcast──► (3, 4) ──op──► output (3, 4)
//! grad  (3, 1) ◄──sum dim 1── (3, 4) ◄─────── grad_output (3, 4)
//! ```

use crate::backend::Backend;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::shape::{pad_leading, shape_broadcast};
use crate::tensor::DenseTensor;

/// Reshape the gradient `grad` to `target`, summing over broadcast axes.
///
/// If `grad` is smaller than `target` but broadcasts to it (a reduction's
/// gradient, for instance), it is broadcast up instead.
///
/// # Errors
///
/// Returns `ShapeReconciliation` if the shapes are not broadcast-compatible
/// or the reduced gradient does not end up with shape `target`.
pub fn expand<T: Scalar>(
    grad: DenseTensor<T>,
    target: &[usize],
    backend: Backend,
) -> Result<DenseTensor<T>, TensorError> {
    if grad.shape() == target {
        return Ok(grad);
    }
    let reconciliation_error = |grad: &[usize]| TensorError::ShapeReconciliation {
        grad: grad.to_vec(),
        target: target.to_vec(),
    };

    let joined = shape_broadcast(grad.shape(), target)
        .map_err(|_| reconciliation_error(grad.shape()))?;
    let grad = if grad.shape() == joined.as_slice() {
        grad
    } else {
        backend.broadcast_to(&grad, &joined)?
    };
    if joined.as_slice() == target {
        return Ok(grad);
    }

    let padded = pad_leading(target, joined.len());
    let mut reduced = grad;
    for (dim, (&want, &have)) in padded.iter().zip(&joined).enumerate() {
        if want == 1 && have != 1 {
            reduced = backend.reduce(&reduced, dim, T::zero(), |acc, x| acc + x)?;
        }
    }
    if reduced.shape() != padded.as_slice() {
        return Err(reconciliation_error(reduced.shape()));
    }
    reduced.into_shape(target)
}
