//! faer-backed kernels and zero-copy matrix views.
//!
//! Both tensorgrad and faer use column-major storage, so a 2-D tensor can
//! be handed to faer's GEMM without copying.

use faer::linalg::matmul::matmul;
use faer::{Accum, MatMut, MatRef, Par};

use super::kernel::KernelBackend;
use super::matmul_dims;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Borrow a dense tensor's elements as a faer matrix.
pub trait AsFaerMat<T: Scalar> {
    /// Read-only `rows x cols` view. Panics unless `rows * cols` equals the
    /// element count.
    ///
    /// ```
    /// use tensorgrad::DenseTensor;
    /// use tensorgrad::backend::AsFaerMat;
    ///
    /// let v = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[4]).unwrap();
    /// let m = v.as_faer_mat(2, 2);
    /// assert_eq!(m[(1, 0)], 2.0);
    /// assert_eq!(m[(0, 1)], 3.0);
    /// ```
    fn as_faer_mat(&self, rows: usize, cols: usize) -> MatRef<'_, T>;

    /// Mutable counterpart of [`as_faer_mat`](Self::as_faer_mat).
    fn as_faer_mat_mut(&mut self, rows: usize, cols: usize) -> MatMut<'_, T>;
}

fn check_view_size(rows: usize, cols: usize, len: usize) {
    assert_eq!(
        rows * cols,
        len,
        "a {rows} x {cols} view needs {} elements, tensor has {len}",
        rows * cols
    );
}

impl<T: Scalar> AsFaerMat<T> for DenseTensor<T> {
    fn as_faer_mat(&self, rows: usize, cols: usize) -> MatRef<'_, T> {
        check_view_size(rows, cols, self.len());
        MatRef::from_column_major_slice(self.data(), rows, cols)
    }

    fn as_faer_mat_mut(&mut self, rows: usize, cols: usize) -> MatMut<'_, T> {
        check_view_size(rows, cols, self.len());
        MatMut::from_column_major_slice_mut(self.data_mut(), rows, cols)
    }
}

/// Backend that routes matrix products through faer's GEMM.
pub struct FaerBackend;

impl KernelBackend for FaerBackend {
    fn is_accelerated() -> bool {
        true
    }

    fn matmul<T: Scalar>(
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
    ) -> Result<DenseTensor<T>, TensorError> {
        let (m, k, n) = matmul_dims(a, b)?;
        let a_mat = a.as_faer_mat(m, k);
        let b_mat = b.as_faer_mat(k, n);

        let mut c = DenseTensor::<T>::zeros(&[m, n]);
        let mut c_mat = c.as_faer_mat_mut(m, n);

        matmul(
            c_mat.as_mut(),
            Accum::Replace,
            a_mat,
            b_mat,
            T::one(),
            Par::Seq,
        );
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_as_faer_mat_column_major() {
        let t: DenseTensor<f64> =
            DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let mat = t.as_faer_mat(2, 3);
        assert_eq!(mat[(1, 0)], 2.0);
        assert_eq!(mat[(0, 2)], 5.0);
    }

    #[test]
    fn test_faer_matmul_vector_product() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[1, 3]).unwrap();
        let b = DenseTensor::from_vec(vec![4.0, 5.0, 6.0], &[3, 1]).unwrap();
        let c = FaerBackend::matmul(&a, &b).unwrap();
        assert_eq!(c.shape(), &[1, 1]);
        assert_relative_eq!(c.data()[0], 32.0, epsilon = 1e-12);
    }

    #[test]
    fn test_faer_matmul_f32() {
        let a = DenseTensor::from_vec(vec![1.0f32, 0.0, 0.0, 1.0], &[2, 2]).unwrap();
        let b = DenseTensor::from_vec(vec![3.0f32, 4.0, 5.0, 6.0], &[2, 2]).unwrap();
        let c = FaerBackend::matmul(&a, &b).unwrap();
        assert_eq!(c.data(), b.data());
    }
}
