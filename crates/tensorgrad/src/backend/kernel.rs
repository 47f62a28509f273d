//! Kernel backend trait.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::shape::{
    broadcast_index, cartesian_to_linear, linear_to_cartesian, shape_broadcast, shape_size,
};
use crate::tensor::DenseTensor;

/// Backend trait for the numeric kernels the differentiable operations use.
///
/// Elementwise, broadcasting and reduction kernels have loop-based default
/// implementations; a backend only has to supply `matmul` and report
/// whether it is accelerated.
pub trait KernelBackend {
    /// Whether this backend runs an accelerated execution path.
    fn is_accelerated() -> bool;

    /// 2-D matrix product `a @ b`.
    ///
    /// # Errors
    ///
    /// Returns `RankMismatch` for non-matrix operands and
    /// `IncompatibleShapes` when inner dimensions differ.
    fn matmul<T: Scalar>(
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
    ) -> Result<DenseTensor<T>, TensorError>;

    /// Apply `f` to every element.
    fn map<T: Scalar, F: Fn(T) -> T>(a: &DenseTensor<T>, f: F) -> DenseTensor<T> {
        let data: Vec<T> = a.data().iter().map(|&x| f(x)).collect();
        DenseTensor::from_vec(data, a.shape()).expect("map: shape unchanged")
    }

    /// Apply a fallible `f` to every element, stopping at the first error.
    fn try_map<T: Scalar, F: Fn(T) -> Result<T, TensorError>>(
        a: &DenseTensor<T>,
        f: F,
    ) -> Result<DenseTensor<T>, TensorError> {
        let data = a
            .data()
            .iter()
            .map(|&x| f(x))
            .collect::<Result<Vec<T>, _>>()?;
        DenseTensor::from_vec(data, a.shape())
    }

    /// Combine two tensors elementwise, broadcasting their shapes.
    fn zip<T: Scalar, F: Fn(T, T) -> T>(
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
        f: F,
    ) -> Result<DenseTensor<T>, TensorError> {
        Self::try_zip(a, b, |x, y| Ok(f(x, y)))
    }

    /// Fallible broadcasting elementwise combination.
    fn try_zip<T: Scalar, F: Fn(T, T) -> Result<T, TensorError>>(
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
        f: F,
    ) -> Result<DenseTensor<T>, TensorError> {
        if a.shape() == b.shape() {
            let data = a
                .data()
                .iter()
                .zip(b.data())
                .map(|(&x, &y)| f(x, y))
                .collect::<Result<Vec<T>, _>>()?;
            return DenseTensor::from_vec(data, a.shape());
        }

        let out_shape = shape_broadcast(a.shape(), b.shape())?;
        let data = (0..shape_size(&out_shape))
            .map(|linear| {
                let index = linear_to_cartesian(linear, &out_shape);
                let ai = broadcast_index(&index, &out_shape, a.shape());
                let bi = broadcast_index(&index, &out_shape, b.shape());
                f(
                    a.data()[cartesian_to_linear(&ai, a.strides())],
                    b.data()[cartesian_to_linear(&bi, b.strides())],
                )
            })
            .collect::<Result<Vec<T>, _>>()?;
        DenseTensor::from_vec(data, &out_shape)
    }

    /// Fold `a` along `dim`, keeping that axis with size 1.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimension` if `dim >= a.ndim()`.
    fn reduce<T: Scalar, F: Fn(T, T) -> T>(
        a: &DenseTensor<T>,
        dim: usize,
        start: T,
        f: F,
    ) -> Result<DenseTensor<T>, TensorError> {
        if dim >= a.ndim() {
            return Err(TensorError::InvalidDimension {
                dim,
                ndim: a.ndim(),
            });
        }
        let mut out_shape = a.shape().to_vec();
        out_shape[dim] = 1;
        let mut out = DenseTensor::full(&out_shape, start);
        let out_strides = out.strides().to_vec();

        for (linear, &value) in a.data().iter().enumerate() {
            let mut index = linear_to_cartesian(linear, a.shape());
            index[dim] = 0;
            let slot = &mut out.data_mut()[cartesian_to_linear(&index, &out_strides)];
            *slot = f(*slot, value);
        }
        Ok(out)
    }

    /// Materialize `a` at a larger, broadcast-compatible `shape`.
    ///
    /// # Errors
    ///
    /// Returns `BroadcastMismatch` unless `a` broadcasts to exactly `shape`.
    fn broadcast_to<T: Scalar>(
        a: &DenseTensor<T>,
        shape: &[usize],
    ) -> Result<DenseTensor<T>, TensorError> {
        if shape_broadcast(a.shape(), shape)? != shape {
            return Err(TensorError::BroadcastMismatch {
                lhs: a.shape().to_vec(),
                rhs: shape.to_vec(),
            });
        }
        let data: Vec<T> = (0..shape_size(shape))
            .map(|linear| {
                let index = linear_to_cartesian(linear, shape);
                let small = broadcast_index(&index, shape, a.shape());
                a.data()[cartesian_to_linear(&small, a.strides())]
            })
            .collect();
        DenseTensor::from_vec(data, shape)
    }

    /// Permute `src` into `dest`, which must already have the permuted shape.
    ///
    /// `perm[i]` gives the source dimension for the i-th dimension of `dest`.
    fn permute_into<T: Scalar>(dest: &mut DenseTensor<T>, src: &DenseTensor<T>, perm: &[usize]) {
        let new_strides = dest.strides().to_vec();
        for (linear_old, &value) in src.data().iter().enumerate() {
            let old_indices = linear_to_cartesian(linear_old, src.shape());
            let new_indices: Vec<usize> = perm.iter().map(|&p| old_indices[p]).collect();
            dest.data_mut()[cartesian_to_linear(&new_indices, &new_strides)] = value;
        }
    }
}
