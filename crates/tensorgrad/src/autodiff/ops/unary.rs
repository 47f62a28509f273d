//! Elementwise single-input operations.

use crate::autodiff::context::Context;
use crate::autodiff::function::Function;
use crate::error::TensorError;
use crate::operators;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// `-x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neg;

impl<T: Scalar> Function<T> for Neg {
    fn name(&self) -> &'static str {
        "Neg"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        Ok(ctx.backend().map(inputs[0], operators::neg))
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![ctx.backend().map(grad_output, operators::neg)])
    }
}

/// `1 / x`, failing at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inv;

impl<T: Scalar> Function<T> for Inv {
    fn name(&self) -> &'static str {
        "Inv"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.save_for_backward(inputs);
        ctx.backend().try_map(inputs[0], operators::inv)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let a = ctx.saved(0)?;
        Ok(vec![ctx.backend().try_zip(a, grad_output, operators::inv_back)?])
    }
}

/// Natural logarithm, failing for non-positive inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl<T: Scalar> Function<T> for Log {
    fn name(&self) -> &'static str {
        "Log"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.save_for_backward(inputs);
        ctx.backend().try_map(inputs[0], operators::log)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let a = ctx.saved(0)?;
        Ok(vec![ctx.backend().try_zip(a, grad_output, operators::log_back)?])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Exp;

impl<T: Scalar> Function<T> for Exp {
    fn name(&self) -> &'static str {
        "Exp"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        let out = ctx.backend().map(inputs[0], operators::exp);
        ctx.save_for_backward(&[&out]);
        Ok(out)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        // d/dx exp(x) = exp(x), which forward already computed
        let out = ctx.saved(0)?;
        Ok(vec![ctx.backend().zip(out, grad_output, operators::mul)?])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl<T: Scalar> Function<T> for Relu {
    fn name(&self) -> &'static str {
        "Relu"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        ctx.save_for_backward(inputs);
        Ok(ctx.backend().map(inputs[0], operators::relu))
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let a = ctx.saved(0)?;
        Ok(vec![ctx.backend().zip(a, grad_output, operators::relu_back)?])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl<T: Scalar> Function<T> for Sigmoid {
    fn name(&self) -> &'static str {
        "Sigmoid"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        let out = ctx.backend().map(inputs[0], operators::sigmoid);
        ctx.save_for_backward(&[&out]);
        Ok(out)
    }

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        let s = ctx.saved(0)?;
        let grad = ctx
            .backend()
            .zip(s, grad_output, |s, g| g * s * (T::one() - s))?;
        Ok(vec![grad])
    }
}

/// Identity that produces a fresh node with its own copy of the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contiguous;

impl<T: Scalar> Function<T> for Contiguous {
    fn name(&self) -> &'static str {
        "Contiguous"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError> {
        Ok(ctx.backend().map(inputs[0], operators::id))
    }

    fn backward(
        &self,
        _ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError> {
        Ok(vec![grad_output.clone()])
    }
}

#[cfg(test)]
mod tests {
    use crate::{Tensor, TensorError, TrackedTensor};
    use approx::assert_relative_eq;

    fn leaf(data: Vec<f64>) -> TrackedTensor<f64> {
        let n = data.len();
        TrackedTensor::leaf(Tensor::from_vec(data, &[n]).unwrap())
    }

    #[test]
    fn test_neg_backward() {
        let x = leaf(vec![1.0, -2.0]);
        x.neg().unwrap().sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[-1.0, -1.0]);
    }

    #[test]
    fn test_inv_forward_and_backward() {
        let x = leaf(vec![2.0, 4.0]);
        let y = x.inv().unwrap();
        assert_eq!(y.value().data(), &[0.5, 0.25]);
        y.sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[-0.25, -0.0625]);
    }

    #[test]
    fn test_inv_of_zero_is_domain_error() {
        let x = leaf(vec![1.0, 0.0]);
        assert!(matches!(x.inv(), Err(TensorError::Domain { op: "inv", .. })));
    }

    #[test]
    fn test_log_backward() {
        let x = leaf(vec![1.0, 4.0]);
        x.log().unwrap().sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[1.0, 0.25]);
    }

    #[test]
    fn test_log_of_negative_is_domain_error() {
        let x = leaf(vec![1.0, -1.0]);
        assert!(matches!(x.log(), Err(TensorError::Domain { op: "log", .. })));
    }

    #[test]
    fn test_exp_backward() {
        let x = leaf(vec![0.0, 1.0]);
        x.exp().unwrap().sum(None).unwrap().backward().unwrap();
        let g = x.grad().unwrap();
        assert_relative_eq!(g.data()[0], 1.0);
        assert_relative_eq!(g.data()[1], std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn test_relu_backward() {
        let x = leaf(vec![-1.0, 0.0, 3.0]);
        let y = x.relu().unwrap();
        assert_eq!(y.value().data(), &[0.0, 0.0, 3.0]);
        y.sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sigmoid_backward_at_zero() {
        let x = leaf(vec![0.0]);
        x.sigmoid().unwrap().backward().unwrap();
        assert_relative_eq!(x.grad().unwrap().data()[0], 0.25);
    }

    #[test]
    fn test_contiguous_is_new_node() {
        let x = leaf(vec![1.0, 2.0]);
        let y = x.contiguous().unwrap();
        assert_ne!(y.id(), x.id());
        assert_eq!(y.value(), x.value());
        y.sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[1.0, 1.0]);
    }
}
