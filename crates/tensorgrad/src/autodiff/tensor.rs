//! TrackedTensor - a tensor value that participates in the computation graph.

use super::backward::backpropagate;
use super::context::Context;
use super::expand::expand;
use super::function::History;
use super::ops::Contiguous;
use crate::backend::Backend;
use crate::error::TensorError;
use crate::operations::add_into;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique, creation-ordered identifier of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(index: usize) -> Self {
        Self(index)
    }
}

struct Node<T: Scalar> {
    id: NodeId,
    value: DenseTensor<T>,
    history: Option<History<T>>,
    grad: RefCell<Option<DenseTensor<T>>>,
    backend: Cell<Backend>,
}

// The default drop recurses once per node through `History::inputs`, which
// overflows the stack on long chains. Unlink uniquely owned inputs onto a
// worklist instead so each node is dropped with an empty input list.
impl<T: Scalar> Drop for Node<T> {
    fn drop(&mut self) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        let mut pending = history.take_inputs();
        while let Some(input) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(input.inner) {
                if let Some(history) = node.history.as_mut() {
                    pending.extend(history.take_inputs());
                }
            }
        }
    }
}

/// A tensor that tracks how it was computed.
///
/// Clones share the same node: they have the same id, history and
/// gradient slot. A node is one of
///
/// - a *constant* (no history), ignored by differentiation,
/// - a *leaf* (history without a producing operation), whose gradient is
///   accumulated by [`backward`](Self::backward),
/// - a *derived* node produced by [`apply`](super::apply).
///
/// # Example
///
/// ```
/// use tensorgrad::{Tensor, TrackedTensor};
///
/// let a: TrackedTensor<f64> = TrackedTensor::leaf(Tensor::ones(&[2, 3]));
/// assert!(a.is_leaf());
/// assert!(a.requires_grad());
///
/// let b: TrackedTensor<f64> = TrackedTensor::new(Tensor::ones(&[2, 3]));
/// assert!(b.is_constant());
/// ```
pub struct TrackedTensor<T: Scalar> {
    inner: Rc<Node<T>>,
}

impl<T: Scalar> Clone for TrackedTensor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Scalar> fmt::Debug for TrackedTensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedTensor")
            .field("id", &self.id())
            .field("shape", &self.shape())
            .field(
                "op",
                &self
                    .history()
                    .and_then(History::last_fn)
                    .map(|op| op.name()),
            )
            .field("requires_grad", &self.requires_grad())
            .finish()
    }
}

impl<T: Scalar> TrackedTensor<T> {
    fn from_parts(value: DenseTensor<T>, history: Option<History<T>>, backend: Backend) -> Self {
        Self {
            inner: Rc::new(Node {
                id: NodeId::fresh(),
                value,
                history,
                grad: RefCell::new(None),
                backend: Cell::new(backend),
            }),
        }
    }

    pub(crate) fn from_history(value: DenseTensor<T>, history: History<T>, backend: Backend) -> Self {
        Self::from_parts(value, Some(history), backend)
    }

    /// Create a constant that does not participate in differentiation.
    pub fn new(value: DenseTensor<T>) -> Self {
        Self::from_parts(value, None, Backend::default())
    }

    /// Create a leaf that accumulates a gradient.
    pub fn leaf(value: DenseTensor<T>) -> Self {
        Self::from_parts(value, Some(History::leaf()), Backend::default())
    }

    /// Rebuild this value as a leaf (`true`) or a constant (`false`).
    ///
    /// The result is a new node; any history this tensor had is dropped.
    pub fn with_requires_grad(self, requires_grad: bool) -> Self {
        let history = requires_grad.then(History::leaf);
        Self::from_parts(self.value().clone(), history, self.backend())
    }

    /// Select the kernel backend for operations whose first input is the
    /// returned node.
    ///
    /// Other handles to this node keep their backend. If this is the only
    /// handle the node is updated in place. A shared constant is copied into
    /// a new constant, and a shared leaf or derived node is wrapped in an
    /// identity operation so gradients still reach it.
    ///
    /// ```
    /// use tensorgrad::{Backend, DenseTensor, TrackedTensor};
    ///
    /// let x = TrackedTensor::leaf(DenseTensor::<f64>::ones(&[2]));
    /// let y = x.clone().with_backend(Backend::Faer);
    /// assert_eq!(x.backend(), Backend::Generic);
    /// assert_eq!(y.backend(), Backend::Faer);
    /// ```
    pub fn with_backend(self, backend: Backend) -> Self {
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.backend.set(backend);
            return self;
        }
        if self.is_constant() {
            return Self::from_parts(self.value().clone(), None, backend);
        }
        let history = History::derived(
            Rc::new(Contiguous),
            Context::new(true, backend),
            vec![self.clone()],
        );
        Self::from_history(self.value().clone(), history, backend)
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    #[inline]
    pub fn value(&self) -> &DenseTensor<T> {
        &self.inner.value
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.inner.value.shape()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.value.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.value.is_empty()
    }

    /// Read the only element of a single-element tensor.
    pub fn item(&self) -> Result<T, TensorError> {
        self.inner.value.item()
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.inner.backend.get()
    }

    pub fn history(&self) -> Option<&History<T>> {
        self.inner.history.as_ref()
    }

    /// True for nodes created by the user that require gradients.
    pub fn is_leaf(&self) -> bool {
        self.history().is_some_and(|h| h.last_fn().is_none())
    }

    /// True for nodes without history.
    pub fn is_constant(&self) -> bool {
        self.inner.history.is_none()
    }

    /// True for leaves and for nodes derived from them.
    pub fn requires_grad(&self) -> bool {
        !self.is_constant()
    }

    /// Inputs of the operation that produced this node, in argument order.
    pub fn parents(&self) -> &[TrackedTensor<T>] {
        match self.history() {
            Some(history) => history.inputs(),
            None => &[],
        }
    }

    /// Accumulated gradient, if any has reached this node.
    pub fn grad(&self) -> Option<DenseTensor<T>> {
        self.inner.grad.borrow().clone()
    }

    /// Forget the accumulated gradient.
    pub fn zero_grad(&self) {
        self.inner.grad.borrow_mut().take();
    }

    /// Add `d` into this leaf's gradient, starting from zeros.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation unless this node is a leaf, and
    /// `IncompatibleShapes` if `d` does not have the leaf's shape.
    pub fn accumulate_derivative(&self, d: &DenseTensor<T>) -> Result<(), TensorError> {
        if !self.is_leaf() {
            return Err(TensorError::precondition(format!(
                "accumulate_derivative requires a leaf, node {:?} is {}",
                self.id(),
                if self.is_constant() { "a constant" } else { "derived" }
            )));
        }
        let mut slot = self.inner.grad.borrow_mut();
        let grad = slot.get_or_insert_with(|| DenseTensor::zeros(self.shape()));
        add_into(grad, d)
    }

    /// Run this node's backward step and pair each non-constant input with
    /// its gradient, reduced to that input's shape.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation for leaves and constants,
    /// `ArityMismatch` if the backward step returns the wrong number of
    /// gradients, and propagates errors of the backward step itself.
    pub fn chain_rule(
        &self,
        d_output: &DenseTensor<T>,
    ) -> Result<Vec<(TrackedTensor<T>, DenseTensor<T>)>, TensorError> {
        let history = self.history().ok_or_else(|| {
            TensorError::precondition(format!("chain_rule on constant node {:?}", self.id()))
        })?;
        let op = history.last_fn().ok_or_else(|| {
            TensorError::precondition(format!("chain_rule on leaf node {:?}", self.id()))
        })?;

        let grads = op.backward(history.ctx(), d_output)?;
        if grads.len() != history.inputs().len() {
            return Err(TensorError::ArityMismatch {
                op: op.name().to_string(),
                expected: history.inputs().len(),
                actual: grads.len(),
            });
        }

        history
            .inputs()
            .iter()
            .zip(grads)
            .filter(|(input, _)| !input.is_constant())
            .map(|(input, grad)| {
                let reduced = expand(grad, input.shape(), history.ctx().backend())?;
                Ok((input.clone(), reduced))
            })
            .collect()
    }

    /// Backpropagate from this single-element node, seeding with one.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation if the node has more than one
    /// element or is a constant.
    pub fn backward(&self) -> Result<(), TensorError> {
        if self.len() != 1 {
            return Err(TensorError::precondition(format!(
                "backward() without a seed requires a single-element tensor, got shape {:?}",
                self.shape()
            )));
        }
        self.backward_with(DenseTensor::ones(self.shape()))
    }

    /// Backpropagate from this node with an explicit output gradient.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation if the node is a constant or the
    /// seed's shape differs from the node's.
    pub fn backward_with(&self, seed: DenseTensor<T>) -> Result<(), TensorError> {
        if self.is_constant() {
            return Err(TensorError::precondition(format!(
                "backward() on constant node {:?}",
                self.id()
            )));
        }
        if seed.shape() != self.shape() {
            return Err(TensorError::precondition(format!(
                "seed of shape {:?} does not match output shape {:?}",
                seed.shape(),
                self.shape()
            )));
        }
        backpropagate(self, seed)
    }

    /// A constant holding a copy of this value.
    pub fn detach(&self) -> Self {
        Self::new(self.value().clone()).with_backend(self.backend())
    }

    /// A constant of zeros with this node's shape and backend.
    pub fn zeros_like(&self) -> Self {
        Self::new(DenseTensor::zeros(self.shape())).with_backend(self.backend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    #[test]
    fn test_ids_increase() {
        let a = TrackedTensor::new(Tensor::<f64>::ones(&[1]));
        let b = TrackedTensor::new(Tensor::<f64>::ones(&[1]));
        assert!(a.id() < b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_node_kinds() {
        let c = TrackedTensor::new(Tensor::<f64>::ones(&[2]));
        assert!(c.is_constant());
        assert!(!c.is_leaf());
        assert!(!c.requires_grad());
        assert!(c.parents().is_empty());

        let l = TrackedTensor::leaf(Tensor::<f64>::ones(&[2]));
        assert!(l.is_leaf());
        assert!(!l.is_constant());
        assert!(l.requires_grad());
    }

    #[test]
    fn test_with_requires_grad() {
        let c = TrackedTensor::new(Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap())
            .with_backend(Backend::Faer);
        let l = c.with_requires_grad(true);
        assert!(l.is_leaf());
        assert_eq!(l.backend(), Backend::Faer);
        assert_eq!(l.value().data(), &[1.0, 2.0]);

        let c2 = l.clone().with_requires_grad(false);
        assert!(c2.is_constant());
        assert!(l.is_leaf());
    }

    #[test]
    fn test_with_backend_leaves_other_handles_alone() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[2]));
        let y = x.clone().with_backend(Backend::Faer);
        assert_eq!(x.backend(), Backend::Generic);
        assert_eq!(y.backend(), Backend::Faer);
        assert_ne!(x.id(), y.id());

        let z = y.mul_scalar(3.0).unwrap();
        assert_eq!(z.backend(), Backend::Faer);
        z.sum(None).unwrap().backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[3.0, 3.0]);

        let c = TrackedTensor::new(Tensor::<f64>::ones(&[2]));
        let c2 = c.clone().with_backend(Backend::Faer);
        assert!(c2.is_constant());
        assert_eq!(c.backend(), Backend::Generic);
        assert_eq!(c2.backend(), Backend::Faer);
    }

    #[test]
    fn test_with_backend_unique_handle_keeps_node() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[2]));
        let id = x.id();
        let x = x.with_backend(Backend::Faer);
        assert_eq!(x.id(), id);
        assert!(x.is_leaf());
        assert_eq!(x.backend(), Backend::Faer);
    }

    #[test]
    fn test_drop_long_chain() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let mut y = x.clone();
        for _ in 0..100_000 {
            y = y.neg().unwrap();
        }
        y.backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[1.0]);
        drop(y);
        assert!(x.is_leaf());
    }

    #[test]
    fn test_accumulate_derivative() {
        let l = TrackedTensor::leaf(Tensor::<f64>::zeros(&[2]));
        assert!(l.grad().is_none());

        let d = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        l.accumulate_derivative(&d).unwrap();
        l.accumulate_derivative(&d).unwrap();
        assert_eq!(l.grad().unwrap().data(), &[2.0, 4.0]);

        l.zero_grad();
        assert!(l.grad().is_none());
    }

    #[test]
    fn test_accumulate_derivative_rejects_non_leaves() {
        let c = TrackedTensor::new(Tensor::<f64>::zeros(&[2]));
        let d = Tensor::ones(&[2]);
        assert!(matches!(
            c.accumulate_derivative(&d),
            Err(TensorError::Precondition(_))
        ));

        let l = TrackedTensor::leaf(Tensor::<f64>::zeros(&[2]));
        let derived = l.neg().unwrap();
        assert!(matches!(
            derived.accumulate_derivative(&d),
            Err(TensorError::Precondition(_))
        ));
        assert!(derived.grad().is_none());
    }

    #[test]
    fn test_accumulate_derivative_shape_mismatch() {
        let l = TrackedTensor::leaf(Tensor::<f64>::zeros(&[2]));
        let d = Tensor::ones(&[3]);
        assert!(matches!(
            l.accumulate_derivative(&d),
            Err(TensorError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_chain_rule_skips_constants() {
        let x = TrackedTensor::leaf(Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap());
        let c = TrackedTensor::new(Tensor::from_vec(vec![3.0, 4.0], &[2]).unwrap());
        let y = x.mul(&c).unwrap();

        let pairs = y.chain_rule(&Tensor::ones(&[2])).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.id(), x.id());
        assert_eq!(pairs[0].1.data(), &[3.0, 4.0]);
    }

    #[test]
    fn test_chain_rule_on_leaf_fails() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        assert!(x.chain_rule(&Tensor::ones(&[1])).is_err());
    }

    #[test]
    fn test_backward_preconditions() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[2]));
        assert!(matches!(x.backward(), Err(TensorError::Precondition(_))));
        assert!(matches!(
            x.backward_with(Tensor::ones(&[3])),
            Err(TensorError::Precondition(_))
        ));

        let c = TrackedTensor::new(Tensor::<f64>::ones(&[1]));
        assert!(matches!(c.backward(), Err(TensorError::Precondition(_))));
    }

    #[test]
    fn test_backward_on_leaf_root() {
        let x = TrackedTensor::leaf(Tensor::<f64>::scalar(5.0));
        x.backward().unwrap();
        assert_eq!(x.grad().unwrap().data(), &[1.0]);
    }

    #[test]
    fn test_detach_and_zeros_like() {
        let x = TrackedTensor::leaf(Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap());
        let d = x.detach();
        assert!(d.is_constant());
        assert_ne!(d.id(), x.id());
        assert_eq!(d.value(), x.value());

        let z = x.zeros_like();
        assert!(z.is_constant());
        assert_eq!(z.value().data(), &[0.0, 0.0]);
    }
}
