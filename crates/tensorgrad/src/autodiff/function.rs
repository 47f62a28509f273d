//! Differentiable operations and the protocol for applying them.

use super::context::Context;
use super::tensor::TrackedTensor;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use log::trace;
use std::fmt::Debug;
use std::rc::Rc;

/// A differentiable operation.
///
/// `forward` computes the output value from raw input values and may stash
/// whatever it needs in the [`Context`]. `backward` receives the same
/// context and the gradient of the output, and must return exactly one
/// gradient per input, in argument order.
pub trait Function<T: Scalar>: Debug {
    /// Operation name, used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Number of inputs the operation takes.
    fn arity(&self) -> usize;

    fn forward(
        &self,
        ctx: &mut Context<T>,
        inputs: &[&DenseTensor<T>],
    ) -> Result<DenseTensor<T>, TensorError>;

    fn backward(
        &self,
        ctx: &Context<T>,
        grad_output: &DenseTensor<T>,
    ) -> Result<Vec<DenseTensor<T>>, TensorError>;
}

/// How a node came to be.
///
/// A leaf has no `last_fn` and no inputs. A derived node records the
/// operation, the context its forward step filled in, and its inputs.
#[derive(Debug)]
pub struct History<T: Scalar> {
    last_fn: Option<Rc<dyn Function<T>>>,
    ctx: Context<T>,
    inputs: Vec<TrackedTensor<T>>,
}

impl<T: Scalar> History<T> {
    pub(crate) fn leaf() -> Self {
        Self {
            last_fn: None,
            ctx: Context::default(),
            inputs: Vec::new(),
        }
    }

    pub(crate) fn derived(
        last_fn: Rc<dyn Function<T>>,
        ctx: Context<T>,
        inputs: Vec<TrackedTensor<T>>,
    ) -> Self {
        Self {
            last_fn: Some(last_fn),
            ctx,
            inputs,
        }
    }

    pub fn last_fn(&self) -> Option<&dyn Function<T>> {
        self.last_fn.as_deref()
    }

    pub fn ctx(&self) -> &Context<T> {
        &self.ctx
    }

    pub fn inputs(&self) -> &[TrackedTensor<T>] {
        &self.inputs
    }

    /// Move the inputs out, leaving this history with none.
    pub(crate) fn take_inputs(&mut self) -> Vec<TrackedTensor<T>> {
        std::mem::take(&mut self.inputs)
    }
}

/// Apply `op` to `inputs`, recording history when any input is tracked.
///
/// The output inherits the backend of the first input. When no input has
/// history the output is a constant and nothing about the call is kept.
///
/// # Errors
///
/// Returns a precondition violation if the number of inputs differs from
/// `op.arity()`, and propagates any error of the forward step.
pub fn apply<T: Scalar, F: Function<T> + 'static>(
    op: F,
    inputs: &[&TrackedTensor<T>],
) -> Result<TrackedTensor<T>, TensorError> {
    if inputs.len() != op.arity() {
        return Err(TensorError::precondition(format!(
            "{} takes {} inputs, got {}",
            op.name(),
            op.arity(),
            inputs.len()
        )));
    }

    let needs_grad = inputs.iter().any(|t| !t.is_constant());
    let backend = inputs.first().map(|t| t.backend()).unwrap_or_default();
    let mut ctx = Context::new(needs_grad, backend);

    let values: Vec<&DenseTensor<T>> = inputs.iter().map(|t| t.value()).collect();
    let output = op.forward(&mut ctx, &values)?;

    if !needs_grad {
        return Ok(TrackedTensor::new(output).with_backend(backend));
    }
    let parents: Vec<TrackedTensor<T>> = inputs.iter().map(|&t| t.clone()).collect();
    let history = History::derived(Rc::new(op), ctx, parents);
    let node = TrackedTensor::from_history(output, history, backend);
    trace!(
        "recorded {} as node {:?}",
        node.history().and_then(History::last_fn).map_or("?", |f| f.name()),
        node.id()
    );
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use crate::backend::Backend;

    #[derive(Debug)]
    struct Double;

    impl Function<f64> for Double {
        fn name(&self) -> &'static str {
            "Double"
        }

        fn arity(&self) -> usize {
            1
        }

        fn forward(
            &self,
            ctx: &mut Context<f64>,
            inputs: &[&DenseTensor<f64>],
        ) -> Result<DenseTensor<f64>, TensorError> {
            ctx.save_for_backward(inputs);
            Ok(ctx.backend().map(inputs[0], |x| 2.0 * x))
        }

        fn backward(
            &self,
            ctx: &Context<f64>,
            grad_output: &DenseTensor<f64>,
        ) -> Result<Vec<DenseTensor<f64>>, TensorError> {
            Ok(vec![ctx.backend().map(grad_output, |g| 2.0 * g)])
        }
    }

    #[test]
    fn test_apply_on_constant_gives_constant() {
        let x = TrackedTensor::new(Tensor::ones(&[3]));
        let y = apply(Double, &[&x]).unwrap();
        assert!(y.is_constant());
        assert_eq!(y.value().data(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_apply_records_history() {
        let x = TrackedTensor::leaf(Tensor::ones(&[3])).with_backend(Backend::Faer);
        let y = apply(Double, &[&x]).unwrap();

        assert!(!y.is_constant());
        assert!(!y.is_leaf());
        assert_eq!(y.backend(), Backend::Faer);

        let history = y.history().unwrap();
        assert_eq!(history.last_fn().unwrap().name(), "Double");
        assert!(history.ctx().needs_grad());
        assert_eq!(history.ctx().saved_tensors().len(), 1);
        assert_eq!(history.inputs().len(), 1);
        assert_eq!(history.inputs()[0].id(), x.id());
    }

    #[test]
    fn test_apply_checks_input_count() {
        let x = TrackedTensor::leaf(Tensor::ones(&[3]));
        let result = apply(Double, &[&x, &x]);
        assert!(matches!(result, Err(TensorError::Precondition(_))));
    }
}
