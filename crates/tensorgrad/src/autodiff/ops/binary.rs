//! Elementwise two-input operations with broadcasting.
//!
//! Backward steps return gradients at the broadcast output shape; the
//! backward driver reduces them to each input's own shape.

use crate::autodiff::context::Context;
use crate::autodiff::function::Function;
use crate::error::TensorError;
use crate::operators;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl<T: Scalar> Function<T> for Add {
    fn name(&self) -> &'static str {
        "Add"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.backend().zip(inputs[0], inputs[1], operators::add)
    }

    fn backward(
        &self,
        _ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![grad_output.clone(), grad_output.clone()])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mul;

impl<T: Scalar> Function<T> for Mul {
    fn name(&self) -> &'static str {
        "Mul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.save_for_backward(inputs);
        ctx.backend().zip(inputs[0], inputs[1], operators::mul)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let (a, b) = (ctx.saved(0)?, ctx.saved(1)?);
        let backend = ctx.backend();
        Ok(vec![
            backend.zip(grad_output, b, operators::mul)?,
            backend.zip(grad_output, a, operators::mul)?,
        ])
    }
}

/// Shared forward/backward of comparisons, which are piecewise constant.
fn compare<T: Scalar>(
    ctx: &mut Context<T>,
    inputs: &[&DenseTensor<T>],
    f: fn(T, T) -> T,
) -> Result<DenseTensor<T>, TensorError> {
    ctx.save_shape(inputs[0].shape());
    ctx.save_shape(inputs[1].shape());
    ctx.backend().zip(inputs[0], inputs[1], f)
}

fn zero_grads<T: Scalar>(ctx: &Context<T>) -> Result<Vec<DenseTensor<T>>, TensorError> {
    Ok(vec![
        DenseTensor::zeros(ctx.saved_shape(0)?),
        DenseTensor::zeros(ctx.saved_shape(1)?),
    ])
}

/// 1 where `a < b`, else 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

impl<T: Scalar> Function<T> for LessThan {
    fn name(&self) -> &'static str {
        "LessThan"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        compare(ctx, inputs, operators::lt)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        _grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        zero_grads(ctx)
    }
}

/// 1 where `a == b`, else 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equal;

impl<T: Scalar> Function<T> for Equal {
    fn name(&self) -> &'static str {
        "Equal"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        compare(ctx, inputs, operators::eq)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        _grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        zero_grads(ctx)
    }
}

/// 1 where `|a - b| < 1e-2`, else 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsClose;

impl<T: Scalar> Function<T> for IsClose {
    fn name(&self) -> &'static str {
        "IsClose"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        compare(ctx, inputs, operators::is_close)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        _grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        zero_grads(ctx)
    }
}
