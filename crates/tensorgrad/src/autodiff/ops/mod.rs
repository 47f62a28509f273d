//! Differentiable operations and the tracked-tensor methods that apply them.
//!
//! Every operation is a [`Function`](super::Function); the methods on
//! [`TrackedTensor`] are thin wrappers around [`apply`].

mod binary;
mod matmul;
mod reduce;
mod structural;
mod unary;

pub use binary::{Add, Equal, IsClose, LessThan, Mul};
pub use matmul::MatMul;
pub use reduce::{All, Sum};
pub use structural::{Permute, View};
pub use unary::{Contiguous, Exp, Inv, Log, Neg, Relu, Sigmoid};

use super::function::apply;
use super::tensor::TrackedTensor;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

impl<T: Scalar> TrackedTensor<T> {
    /// A constant single-element operand on this tensor's backend.
    fn constant(&self, value: T) -> Self {
        Self::new(DenseTensor::scalar(value)).with_backend(self.backend())
    }

    pub fn add(&self, other: &Self) -> Result<Self, TensorError> {
        apply(Add, &[self, other])
    }

    pub fn sub(&self, other: &Self) -> Result<Self, TensorError> {
        self.add(&other.neg()?)
    }

    pub fn mul(&self, other: &Self) -> Result<Self, TensorError> {
        apply(Mul, &[self, other])
    }

    /// `self * (1 / other)`; fails where `other` is zero.
    pub fn div(&self, other: &Self) -> Result<Self, TensorError> {
        self.mul(&other.inv()?)
    }

    pub fn neg(&self) -> Result<Self, TensorError> {
        apply(Neg, &[self])
    }

    pub fn inv(&self) -> Result<Self, TensorError> {
        apply(Inv, &[self])
    }

    pub fn log(&self) -> Result<Self, TensorError> {
        apply(Log, &[self])
    }

    pub fn exp(&self) -> Result<Self, TensorError> {
        apply(Exp, &[self])
    }

    pub fn relu(&self) -> Result<Self, TensorError> {
        apply(Relu, &[self])
    }

    pub fn sigmoid(&self) -> Result<Self, TensorError> {
        apply(Sigmoid, &[self])
    }

    pub fn matmul(&self, other: &Self) -> Result<Self, TensorError> {
        apply(MatMul, &[self, other])
    }

    pub fn lt(&self, other: &Self) -> Result<Self, TensorError> {
        apply(LessThan, &[self, other])
    }

    pub fn gt(&self, other: &Self) -> Result<Self, TensorError> {
        apply(LessThan, &[other, self])
    }

    pub fn eq(&self, other: &Self) -> Result<Self, TensorError> {
        apply(Equal, &[self, other])
    }

    pub fn is_close(&self, other: &Self) -> Result<Self, TensorError> {
        apply(IsClose, &[self, other])
    }

    /// Sum along `dim` (kept with size 1), or over everything into shape `[1]`.
    pub fn sum(&self, dim: Option<usize>) -> Result<Self, TensorError> {
        apply(Sum { dim }, &[self])
    }

    pub fn mean(&self, dim: Option<usize>) -> Result<Self, TensorError> {
        let count = match dim {
            Some(d) => *self.shape().get(d).ok_or(TensorError::InvalidDimension {
                dim: d,
                ndim: self.shape().len(),
            })?,
            None => self.len(),
        };
        self.sum(dim)?.mul_scalar(T::one() / T::from_f64(count as f64))
    }

    pub fn all(&self, dim: Option<usize>) -> Result<Self, TensorError> {
        apply(All { dim }, &[self])
    }

    pub fn permute(&self, order: &[usize]) -> Result<Self, TensorError> {
        apply(
            Permute {
                order: order.to_vec(),
            },
            &[self],
        )
    }

    pub fn view(&self, shape: &[usize]) -> Result<Self, TensorError> {
        apply(
            View {
                shape: shape.to_vec(),
            },
            &[self],
        )
    }

    pub fn contiguous(&self) -> Result<Self, TensorError> {
        apply(Contiguous, &[self])
    }

    pub fn add_scalar(&self, value: T) -> Result<Self, TensorError> {
        self.add(&self.constant(value))
    }

    pub fn mul_scalar(&self, value: T) -> Result<Self, TensorError> {
        self.mul(&self.constant(value))
    }
}
