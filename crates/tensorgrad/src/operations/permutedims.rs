//! Axis reordering on dense values.
//!
//! Both the `Permute` operation and the transposes inside the matrix
//! product gradient go through [`permuted`], so the kernel used is whatever
//! backend the caller hands in.

use crate::backend::Backend;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Reorder axes with the default backend.
///
/// Axis `i` of the result is axis `perm[i]` of `tensor`.
///
/// ```
/// use tensorgrad::DenseTensor;
/// use tensorgrad::operations::permutedims;
///
/// let m = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]).unwrap();
/// let mt = permutedims(&m, &[1, 0]).unwrap();
/// assert_eq!(mt.shape(), &[2, 3]);
/// assert_eq!(mt.get(&[1, 2]), m.get(&[2, 1]));
/// ```
pub fn permutedims<T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &[usize],
) -> Result<DenseTensor<T>, TensorError> {
    permuted(tensor, perm, Backend::default())
}

/// Reorder axes using `backend` for the element copy.
///
/// Fails with [`TensorError::InvalidPermutation`] unless `perm` names every
/// axis of `tensor` exactly once.
pub fn permuted<T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &[usize],
    backend: Backend,
) -> Result<DenseTensor<T>, TensorError> {
    check_permutation(perm, tensor.ndim())?;
    let shape: Vec<usize> = perm.iter().map(|&axis| tensor.shape()[axis]).collect();
    let mut out = DenseTensor::zeros(&shape);
    permutedims_into(&mut out, tensor, perm, backend);
    Ok(out)
}

/// Copy `src` into `dest` with axes reordered by `perm`.
///
/// `dest` must already have the permuted shape; the kernels assert it.
pub fn permutedims_into<T: Scalar>(
    dest: &mut DenseTensor<T>,
    src: &DenseTensor<T>,
    perm: &[usize],
    backend: Backend,
) {
    backend.permute_into(dest, src, perm);
}

/// The permutation that undoes `perm`, so that `inverse[perm[i]] == i`.
pub fn inverse_permutation(perm: &[usize]) -> Result<Vec<usize>, TensorError> {
    check_permutation(perm, perm.len())?;
    let mut inverse = vec![0; perm.len()];
    for (position, &axis) in perm.iter().enumerate() {
        inverse[axis] = position;
    }
    Ok(inverse)
}

fn check_permutation(perm: &[usize], ndim: usize) -> Result<(), TensorError> {
    let mut seen = vec![false; ndim];
    let is_valid = perm.len() == ndim
        && perm
            .iter()
            .all(|&axis| axis < ndim && !std::mem::replace(&mut seen[axis], true));
    if is_valid {
        Ok(())
    } else {
        Err(TensorError::InvalidPermutation {
            perm: perm.to_vec(),
            ndim,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(shape: &[usize]) -> DenseTensor<f64> {
        let n = shape.iter().product::<usize>();
        DenseTensor::from_vec((0..n).map(|v| v as f64).collect(), shape).unwrap()
    }

    #[test]
    fn test_matrix_transpose() {
        let m = counting(&[3, 2]);
        let mt = permutedims(&m, &[1, 0]).unwrap();
        assert_eq!(mt.shape(), &[2, 3]);
        for r in 0..3 {
            for c in 0..2 {
                assert_eq!(m.get(&[r, c]), mt.get(&[c, r]));
            }
        }
    }

    #[test]
    fn test_backends_agree() {
        let t = counting(&[2, 3, 4]);
        let generic = permuted(&t, &[2, 0, 1], Backend::Generic).unwrap();
        let faer = permuted(&t, &[2, 0, 1], Backend::Faer).unwrap();
        assert_eq!(generic, faer);
    }

    #[test]
    fn test_rejects_bad_permutations() {
        let t: DenseTensor<f64> = DenseTensor::zeros(&[4, 5]);
        for perm in [&[1][..], &[1, 0, 2], &[1, 3], &[1, 1]] {
            assert!(matches!(
                permutedims(&t, perm),
                Err(TensorError::InvalidPermutation { ndim: 2, .. })
            ));
        }
    }

    #[test]
    fn test_inverse_undoes_permutation() {
        assert_eq!(inverse_permutation(&[2, 0, 1]).unwrap(), vec![1, 2, 0]);
        assert!(inverse_permutation(&[0, 0]).is_err());

        let t = counting(&[2, 3, 4]);
        let perm = [1, 2, 0];
        let there = permutedims(&t, &perm).unwrap();
        let back = permutedims(&there, &inverse_permutation(&perm).unwrap()).unwrap();
        assert_eq!(back, t);
    }
}
