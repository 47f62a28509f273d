//! Reductions. Reduced axes are kept with size 1; reducing everything
//! yields shape `[1]`.

use crate::autodiff::context::Context;
use crate::autodiff::function::Function;
use crate::backend::Backend;
use crate::error::TensorError;
use crate::operators;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

fn reduce<T: Scalar>(
    backend: Backend,
    a: &DenseTensor<T>,
    dim: Option<usize>,
    start: T,
    f: impl Fn(T, T) -> T,
) -> Result<DenseTensor<T>, TensorError> {
    match dim {
        Some(dim) => backend.reduce(a, dim, start, f),
        None => backend.reduce(&a.reshape(&[a.len()])?, 0, start, f),
    }
}

/// Sum over one axis, or over all elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum {
    pub dim: Option<usize>,
}

impl<T: Scalar> Function<T> for Sum {
    fn name(&self) -> &'static str {
        "Sum"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        reduce(ctx.backend(), inputs[0], self.dim, T::zero(), operators::add)
    }

    /// The gradient is handed back at the reduced shape; broadcasting it
    /// to the input shape happens in the backward driver.
    fn backward(
        &self,
        _ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![grad_output.clone()])
    }
}

/// 1 if every element (along `dim`) is non-zero, else 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct All {
    pub dim: Option<usize>,
}

impl<T: Scalar> Function<T> for All {
    fn name(&self) -> &'static str {
        "All"
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
        reduce(ctx.backend(), inputs[0], self.dim, T::one(), |acc, x| {
            if acc != T::zero() && x != T::zero() {
                T::one()
            } else {
                T::zero()
            }
        })
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        _grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![DenseTensor::zeros(ctx.saved_shape(0)?)])
    }
}
