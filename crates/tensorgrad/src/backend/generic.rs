//! Generic (naive loop-based) backend implementation.

use super::kernel::KernelBackend;
use super::matmul_dims;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Generic backend using naive loop-based implementations.
///
/// This backend is always available and is the default for new tensors.
/// It's suitable for small tensors and debugging.
pub struct GenericBackend;

impl KernelBackend for GenericBackend {
    fn is_accelerated() -> bool {
        false
    }

    fn matmul<T: Scalar>(
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
    ) -> Result<DenseTensor<T>, TensorError> {
        let (m, k, n) = matmul_dims(a, b)?;
        let mut c = DenseTensor::zeros(&[m, n]);
        let (a_data, b_data) = (a.data(), b.data());
        let c_data = c.data_mut();

        // Column-major: element (i, j) of an m-row matrix lives at i + j * m.
        for j in 0..n {
            for p in 0..k {
                let b_pj = b_data[p + j * k];
                for i in 0..m {
                    c_data[i + j * m] = c_data[i + j * m] + a_data[i + p * m] * b_pj;
                }
            }
        }
        Ok(c)
    }
}
