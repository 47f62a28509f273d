//! Reverse-mode automatic differentiation on a dynamic graph.
//!
//! The graph is not a separate object: every [`TrackedTensor`] produced by
//! an operation holds a [`History`] with the operation, its [`Context`] and
//! shared handles to its inputs. The graph lives exactly as long as the
//! tensors that reference it.
//!
//! # Architecture
//!
//! ```text
//! apply(op, inputs)
//!     → Context::new(needs_grad, backend of first input)
//!     → op.forward(ctx, values)
//!     → TrackedTensor { value, History { op, ctx, inputs } }
//!
//! root.backward()
//!     → topological_order(root)        root first, leaves last
//!     → for each node:
//!           leaf:    accumulate_derivative(grad)
//!           derived: chain_rule(grad)  backward + arity check + expand
//! ```
//!
//! # Example
//!
//! ```
//! use tensorgrad::{Tensor, TrackedTensor};
//!
//! // x: (3, 1) is broadcast against w: (1, 4)
//! let x: TrackedTensor<f64> = TrackedTensor::leaf(Tensor::ones(&[3, 1]));
//! let w: TrackedTensor<f64> = TrackedTensor::leaf(Tensor::ones(&[1, 4]));
//! let loss = x.mul(&w).unwrap().sum(None).unwrap();
//! loss.backward().unwrap();
//!
//! assert_eq!(x.grad().unwrap().shape(), &[3, 1]);
//! assert!(x.grad().unwrap().data().iter().all(|&g| g == 4.0));
//! ```
//!
//! # Design Notes
//!
//! - Single-threaded: nodes are shared with `Rc`
//! - Node ids come from a process-wide atomic counter
//! - Gradients for broadcast inputs are summed back to the input shape

mod backward;
mod context;
mod expand;
mod function;
mod gradients;
pub mod ops;
mod saved_tensor;
mod tensor;
mod topo;

pub use context::Context;
pub use expand::expand;
pub use function::{Function, History, apply};
pub use gradients::Gradients;
pub use saved_tensor::SavedTensor;
pub use tensor::{NodeId, TrackedTensor};
pub use topo::topological_order;
