//! Backward pass execution for reverse-mode automatic differentiation.

use super::gradients::Gradients;
use super::tensor::TrackedTensor;
use super::topo::topological_order;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use log::{debug, trace};

/// Propagate `seed`, the gradient of `root`, to every leaf behind `root`.
///
/// Nodes are processed in [`topological_order`], so by the time a node's
/// pending gradient is taken every consumer has already contributed to it.
/// Leaves add their gradient into their own `grad`; every other node runs
/// its backward step and queues the results on its inputs.
///
/// Errors abort the pass. Leaves that were already reached keep the
/// gradient accumulated so far.
pub(crate) fn backpropagate<T: Scalar>(
    root: &TrackedTensor<T>,
    seed: DenseTensor<T>,
) -> Result<(), TensorError> {
    let order = topological_order(root);
    debug!(
        "backward from node {:?}: {} nodes to visit",
        root.id(),
        order.len()
    );

    let mut pending = Gradients::new();
    pending.accumulate(root.id(), seed)?;

    for node in &order {
        let Some(grad) = pending.remove(node.id()) else {
            continue;
        };

        if node.is_leaf() {
            trace!("accumulating gradient into leaf {:?}", node.id());
            node.accumulate_derivative(&grad)?;
            continue;
        }

        trace!("running backward step of node {:?}", node.id());
        for (input, contribution) in node.chain_rule(&grad)? {
            trace!("  -> gradient for node {:?}", input.id());
            pending.accumulate(input.id(), contribution)?;
        }
    }

    debug!("backward from node {:?} finished", root.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use crate::autodiff::{Context, Function, apply};
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct Scale(f64);

    impl Function<f64> for Scale {
        fn name(&self) -> &'static str {
            "Scale"
        }

        fn arity(&self) -> usize {
            1
        }

        fn forward(
            &self,
            ctx: &mut Context<f64>,
            inputs: &[&DenseTensor<f64>],
        ) -> Result<DenseTensor<f64>, TensorError> {
            Ok(ctx.backend().map(inputs[0], |x| self.0 * x))
        }

        fn backward(
            &self,
            ctx: &Context<f64>,
            grad_output: &DenseTensor<f64>,
        ) -> Result<Vec<DenseTensor<f64>>, TensorError> {
            Ok(vec![ctx.backend().map(grad_output, |g| self.0 * g)])
        }
    }

    #[test]
    fn test_backward_chain() {
        // leaf -> scale(2) -> scale(3)
        let leaf = TrackedTensor::leaf(Tensor::scalar(1.0));
        let node1 = apply(Scale(2.0), &[&leaf]).unwrap();
        let node2 = apply(Scale(3.0), &[&node1]).unwrap();

        backpropagate(&node2, Tensor::scalar(1.0)).unwrap();

        assert_relative_eq!(leaf.grad().unwrap().data()[0], 6.0);
        assert!(node1.grad().is_none());
    }

    #[test]
    fn test_backward_accumulates_across_calls() {
        let leaf = TrackedTensor::leaf(Tensor::scalar(1.0));
        let y = apply(Scale(2.0), &[&leaf]).unwrap();

        y.backward().unwrap();
        y.backward().unwrap();
        assert_relative_eq!(leaf.grad().unwrap().data()[0], 4.0);
    }

    #[test]
    fn test_backward_with_seed() {
        let leaf = TrackedTensor::leaf(Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap());
        let y = apply(Scale(2.0), &[&leaf]).unwrap();

        y.backward_with(Tensor::from_vec(vec![1.0, 10.0], &[2]).unwrap())
            .unwrap();
        assert_eq!(leaf.grad().unwrap().data(), &[2.0, 20.0]);
    }
}
