//! tensorgrad - dense tensors with reverse-mode automatic differentiation
//!
//! Operations on [`TrackedTensor`]s build a computation graph as they run.
//! Calling [`TrackedTensor::backward`] on a result walks that graph in
//! reverse topological order and accumulates gradients into every leaf.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Differentiable API (autodiff module)
//!     → TrackedTensor, Function, apply, backward
//!
//! Level 2: Value-level operations (operations module)
//!     → permutedims, add_into
//!
//! Level 3: Kernel backends (backend module)
//!     → GenericBackend (naive loops)
//!     → FaerBackend (faer GEMM)
//! ```
//!
//! # Example
//!
//! ```
//! use tensorgrad::{Tensor, TrackedTensor};
//!
//! let a = TrackedTensor::leaf(Tensor::scalar(2.0));
//! let b = TrackedTensor::leaf(Tensor::scalar(3.0));
//!
//! // y = a * b + a
//! let y = a.mul(&b).unwrap().add(&a).unwrap();
//! y.backward().unwrap();
//!
//! assert_eq!(a.grad().unwrap().data(), &[4.0]);
//! assert_eq!(b.grad().unwrap().data(), &[2.0]);
//! ```

pub mod autodiff;
pub mod backend;
pub mod error;
pub mod operations;
pub mod operators;
pub mod random;
pub mod scalar;
pub mod shape;
pub mod storage;
pub mod tensor;

pub use autodiff::{Context, Function, History, NodeId, TrackedTensor, apply};
pub use backend::Backend;
pub use error::TensorError;
pub use random::RandomScalar;
pub use scalar::Scalar;
pub use storage::{Dense, TensorStorage};
pub use tensor::{DenseTensor, Tensor};
