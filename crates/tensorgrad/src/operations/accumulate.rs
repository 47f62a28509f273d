//! In-place gradient accumulation.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Add `src` into `dest` elementwise.
///
/// Both tensors must have the same shape; accumulation never broadcasts.
///
/// # Example
///
/// ```
/// use tensorgrad::Tensor;
/// use tensorgrad::operations::add_into;
///
/// let mut acc = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let g = Tensor::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();
/// add_into(&mut acc, &g).unwrap();
/// assert_eq!(acc.data(), &[5.0, 7.0, 9.0]);
/// ```
pub fn add_into<T: Scalar>(
    dest: &mut DenseTensor<T>,
    src: &DenseTensor<T>,
) -> Result<(), TensorError> {
    if dest.shape() != src.shape() {
        return Err(TensorError::IncompatibleShapes {
            lhs: dest.shape().to_vec(),
            rhs: src.shape().to_vec(),
        });
    }
    for (d, &s) in dest.data_mut().iter_mut().zip(src.data()) {
        *d = *d + s;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_into_shape_mismatch() {
        let mut a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3, 1]).unwrap();
        assert!(matches!(
            add_into(&mut a, &b),
            Err(TensorError::IncompatibleShapes { .. })
        ));
        assert_eq!(a.data(), &[1.0, 2.0, 3.0]);
    }
}
