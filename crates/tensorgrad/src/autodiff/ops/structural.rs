//! Operations that move elements around without changing their values.

use crate::autodiff::context::Context;
use crate::autodiff::function::Function;
use crate::error::TensorError;
use crate::operations::{inverse_permutation, permuted};
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Reorder axes: axis `i` of the output is axis `order[i]` of the input.
#[derive(Debug, Clone, Default)]
pub struct Permute {
    pub order: Vec<usize>,
}

impl<T: Scalar> Function<T> for Permute {
    fn name(&self) -> &'static str {
        "Permute"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        permuted(inputs[0], &self.order, ctx.backend())
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let inverse = inverse_permutation(&self.order)?;
        Ok(vec![permuted(grad_output, &inverse, ctx.backend())?])
    }
}

/// Reinterpret the elements under a new shape with the same element count.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub shape: Vec<usize>,
}

impl<T: Scalar> Function<T> for View {
    fn name(&self) -> &'static str {
        "View"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.save_shape(inputs[0].shape());
        inputs[0].reshape(&self.shape)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![grad_output.reshape(ctx.saved_shape(0)?)?])
    }
}
