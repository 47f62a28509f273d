//! Tracked matrix product.

use crate::autodiff::context::Context;
use crate::autodiff::function::Function;
use crate::error::TensorError;
use crate::operations::permuted;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// 2-D matrix product `a @ b`.
///
/// Backward: `grad_a = g @ bᵀ`, `grad_b = aᵀ @ g`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatMul;

impl<T: Scalar> Function<T> for MatMul {
    fn name(&self) -> &'static str {
        "MatMul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        let out = ctx.backend().matmul(inputs[0], inputs[1])?;
        ctx.save_for_backward(inputs);
        Ok(out)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let (a, b) = (ctx.saved(0)?, ctx.saved(1)?);
        let backend = ctx.backend();
        let grad_a = backend.matmul(grad_output, &permuted(b, &[1, 0], backend)?)?;
        let grad_b = backend.matmul(&permuted(a, &[1, 0], backend)?, grad_output)?;
        Ok(vec![grad_a, grad_b])
    }
}
