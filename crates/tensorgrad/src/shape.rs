//! Shape, stride and broadcasting utilities.
//!
//! Storage is column-major (Fortran order), so the first index varies
//! fastest. Broadcasting follows the usual right-aligned rule: shapes are
//! compared from their last axis backwards, missing leading axes count as
//! size 1, and a size-1 axis stretches to match the other operand.

use crate::error::TensorError;

/// Number of elements described by a shape.
///
/// The empty shape describes a single scalar element; any zero-length
/// axis makes the whole tensor empty.
///
/// # Examples
///
/// ```
/// use tensorgrad::shape::shape_size;
///
/// assert_eq!(shape_size(&[2, 3, 4]), 24);
/// assert_eq!(shape_size(&[]), 1);
/// assert_eq!(shape_size(&[3, 0]), 0);
/// ```
#[inline]
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Compute column-major strides from shape.
///
/// For shape [d0, d1, d2, ...], returns strides [1, d0, d0*d1, ...].
///
/// # Examples
///
/// ```
/// use tensorgrad::shape::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut stride = 1;
    shape
        .iter()
        .map(|&dim| {
            let current = stride;
            stride *= dim;
            current
        })
        .collect()
}

/// Convert cartesian indices to a linear storage offset.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Convert a linear offset to cartesian indices (column-major).
pub fn linear_to_cartesian(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(shape.len());
    for &dim in shape {
        indices.push(linear % dim);
        linear /= dim;
    }
    indices
}

/// Broadcast two shapes against each other.
///
/// # Errors
///
/// Returns `TensorError::BroadcastMismatch` when an aligned pair of axes
/// differ and neither is 1.
///
/// # Examples
///
/// ```
/// use tensorgrad::shape::shape_broadcast;
///
/// assert_eq!(shape_broadcast(&[3, 1], &[3, 4]).unwrap(), vec![3, 4]);
/// assert_eq!(shape_broadcast(&[4], &[2, 3, 4]).unwrap(), vec![2, 3, 4]);
/// assert!(shape_broadcast(&[3], &[4]).is_err());
/// ```
pub fn shape_broadcast(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, TensorError> {
    let ndim = lhs.len().max(rhs.len());
    let lhs_padded = pad_leading(lhs, ndim);
    let rhs_padded = pad_leading(rhs, ndim);

    lhs_padded
        .iter()
        .zip(rhs_padded.iter())
        .map(|(&a, &b)| match (a, b) {
            _ if a == b => Ok(a),
            (1, _) => Ok(b),
            (_, 1) => Ok(a),
            _ => Err(TensorError::BroadcastMismatch {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            }),
        })
        .collect()
}

/// Map an index of a broadcast (larger) shape back onto a smaller shape.
///
/// Axes the small shape lacks are dropped; axes where it has size 1 map to 0.
pub fn broadcast_index(big_index: &[usize], big_shape: &[usize], shape: &[usize]) -> Vec<usize> {
    let offset = big_shape.len() - shape.len();
    shape
        .iter()
        .enumerate()
        .map(|(i, &dim)| if dim == 1 { 0 } else { big_index[i + offset] })
        .collect()
}

/// Left-pad a shape with size-1 axes up to `ndim` axes.
pub fn pad_leading(shape: &[usize], ndim: usize) -> Vec<usize> {
    let mut padded = vec![1; ndim.saturating_sub(shape.len())];
    padded.extend_from_slice(shape);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_strides() {
        assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
        assert_eq!(compute_strides(&[2, 3]), vec![1, 2]);
        assert_eq!(compute_strides(&[5]), vec![1]);
    }

    #[test]
    fn test_cartesian_linear_roundtrip() {
        let shape = [3, 4, 5];
        let strides = compute_strides(&shape);
        for linear in 0..shape_size(&shape) {
            let cartesian = linear_to_cartesian(linear, &shape);
            assert_eq!(cartesian_to_linear(&cartesian, &strides), linear);
        }
    }

    #[test]
    fn test_broadcast_same_shape() {
        assert_eq!(shape_broadcast(&[2, 3], &[2, 3]).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_broadcast_stretches_size_one() {
        assert_eq!(shape_broadcast(&[1, 3], &[2, 1]).unwrap(), vec![2, 3]);
        assert_eq!(shape_broadcast(&[1], &[5, 2]).unwrap(), vec![5, 2]);
    }

    #[test]
    fn test_broadcast_missing_leading_axes() {
        assert_eq!(shape_broadcast(&[2, 3, 4], &[3, 1]).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_broadcast_incompatible() {
        let err = shape_broadcast(&[2, 3], &[3, 2]).unwrap_err();
        assert!(matches!(err, TensorError::BroadcastMismatch { .. }));
    }

    #[test]
    fn test_broadcast_index() {
        assert_eq!(broadcast_index(&[2, 3], &[3, 4], &[3, 1]), vec![2, 0]);
        assert_eq!(broadcast_index(&[1, 2, 3], &[2, 3, 4], &[4]), vec![3]);
        assert_eq!(broadcast_index(&[1, 2], &[2, 3], &[1]), vec![0]);
    }

    #[test]
    fn test_pad_leading() {
        assert_eq!(pad_leading(&[3], 3), vec![1, 1, 3]);
        assert_eq!(pad_leading(&[2, 3], 2), vec![2, 3]);
    }
}
