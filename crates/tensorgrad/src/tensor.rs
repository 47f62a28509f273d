//! N-dimensional dense tensor values.
//!
//! `Tensor` is the plain value type: shape, column-major strides and owned
//! storage. It knows nothing about differentiation; the autodiff layer wraps
//! it in [`TrackedTensor`](crate::autodiff::TrackedTensor).

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::shape::{cartesian_to_linear, compute_strides, shape_size};
use crate::storage::{Dense, TensorStorage};
use std::marker::PhantomData;

/// Shape, column-major strides and the storage holding the elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar, StoreT: TensorStorage<ElT> = Dense<ElT>> {
    storage: StoreT,
    shape: Vec<usize>,
    strides: Vec<usize>,
    _phantom: PhantomData<ElT>,
}

/// Tensor over [`Dense`] storage, the representation every value and
/// gradient in the graph uses.
pub type DenseTensor<ElT> = Tensor<ElT, Dense<ElT>>;

impl<ElT: Scalar, StoreT: TensorStorage<ElT>> Tensor<ElT, StoreT> {
    fn with_storage(storage: StoreT, shape: &[usize]) -> Self {
        Self {
            storage,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            _phantom: PhantomData,
        }
    }

    /// All-zero tensor of the given shape.
    ///
    /// ```
    /// use tensorgrad::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self::with_storage(StoreT::zeros(shape_size(shape)), shape)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, ElT::one())
    }

    /// Every element set to `value`.
    pub fn full(shape: &[usize], value: ElT) -> Self {
        let mut t = Self::zeros(shape);
        t.fill(value);
        t
    }

    /// One-element tensor of shape `[1]`.
    pub fn scalar(value: ElT) -> Self {
        Self::with_storage(StoreT::from_vec(vec![value]), &[1])
    }

    /// Wrap column-major `data` as a tensor of `shape`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if `data.len()` is not the
    /// product of `shape`.
    ///
    /// ```
    /// use tensorgrad::{DenseTensor, Tensor};
    ///
    /// let t: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Some(&2.0)); // column-major
    /// assert_eq!(t.get(&[0, 1]), Some(&3.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected = shape_size(shape);
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::with_storage(StoreT::from_vec(data), shape))
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Elements in storage (column-major) order.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        self.storage.as_slice()
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        self.storage.as_mut_slice()
    }

    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&ElT> {
        self.data().get(i)
    }

    fn offset_of(&self, index: &[usize]) -> Result<usize, TensorError> {
        if index.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: index.len(),
            });
        }
        if let Some((&i, &dim_size)) = index.iter().zip(&self.shape).find(|(i, d)| i >= d) {
            return Err(TensorError::IndexOutOfBounds {
                index: i,
                dim_size,
            });
        }
        Ok(cartesian_to_linear(index, &self.strides))
    }

    /// Element at a cartesian index, or `None` if the index is invalid.
    pub fn get(&self, index: &[usize]) -> Option<&ElT> {
        let offset = self.offset_of(index).ok()?;
        self.get_linear(offset)
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut ElT> {
        let offset = self.offset_of(index).ok()?;
        self.data_mut().get_mut(offset)
    }

    /// Overwrite the element at a cartesian index.
    ///
    /// # Errors
    ///
    /// Returns `WrongNumberOfIndices` or `IndexOutOfBounds` for an invalid index.
    pub fn set(&mut self, index: &[usize], value: ElT) -> Result<(), TensorError> {
        let offset = self.offset_of(index)?;
        self.data_mut()[offset] = value;
        Ok(())
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: ElT) {
        self.data_mut().fill(value);
    }

    /// The element of a one-element tensor.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation for any other element count.
    pub fn item(&self) -> Result<ElT, TensorError> {
        match self.data() {
            [value] => Ok(*value),
            data => Err(TensorError::precondition(format!(
                "item() requires a single-element tensor, got {} elements",
                data.len()
            ))),
        }
    }
}

impl<ElT: Scalar> Tensor<ElT, Dense<ElT>> {
    /// Copy the elements under a new shape with the same element count.
    ///
    /// Storage order is kept, so this is a column-major reshape.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the element counts differ.
    ///
    /// ```
    /// use tensorgrad::DenseTensor;
    ///
    /// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t3x2 = t.reshape(&[3, 2]).unwrap();
    /// assert_eq!(t3x2.shape(), &[3, 2]);
    /// assert_eq!(t3x2.data(), t.data());
    /// ```
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self, TensorError> {
        Self::from_vec(self.data().to_vec(), new_shape)
    }

    /// Like [`reshape`](Self::reshape), reusing this tensor's storage.
    pub fn into_shape(self, new_shape: &[usize]) -> Result<Self, TensorError> {
        Self::from_vec(self.storage.into_vec(), new_shape)
    }

    /// Copy with axes reordered; axis `i` of the result is axis `perm[i]`
    /// of `self`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPermutation` unless `perm` is a permutation of `0..ndim`.
    ///
    /// ```
    /// use tensorgrad::DenseTensor;
    ///
    /// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t2 = t.permutedims(&[1, 0]).unwrap();
    /// assert_eq!(t2.shape(), &[3, 2]);
    /// assert_eq!(t.get(&[1, 0]), t2.get(&[0, 1]));
    /// ```
    pub fn permutedims(&self, perm: &[usize]) -> Result<Self, TensorError> {
        crate::operations::permutedims(self, perm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(shape: &[usize]) -> DenseTensor<f64> {
        let n = shape_size(shape);
        Tensor::from_vec((0..n).map(|v| v as f64).collect(), shape).unwrap()
    }

    #[test]
    fn test_constructors() {
        let z: DenseTensor<f32> = Tensor::zeros(&[4, 2]);
        assert_eq!((z.ndim(), z.len()), (2, 8));
        assert_eq!(z.strides(), &[1, 4]);
        assert!(z.data().iter().all(|&v| v == 0.0));

        let f: DenseTensor<f64> = Tensor::full(&[3], -0.5);
        assert_eq!(f.data(), &[-0.5, -0.5, -0.5]);

        let rank0: DenseTensor<f64> = Tensor::ones(&[]);
        assert_eq!((rank0.ndim(), rank0.item().unwrap()), (0, 1.0));

        let empty: DenseTensor<f64> = Tensor::zeros(&[3, 0]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_indexing_is_column_major() {
        let t = counting(&[3, 2]);
        assert_eq!(t.get(&[2, 0]), Some(&2.0));
        assert_eq!(t.get(&[0, 1]), Some(&3.0));
        assert_eq!(t.get_linear(5), Some(&5.0));
        assert_eq!(t.get_linear(6), None);
    }

    #[test]
    fn test_bad_indices() {
        let mut t = counting(&[3, 2]);
        assert_eq!(t.get(&[3, 0]), None);
        assert_eq!(t.get(&[1]), None);
        assert!(matches!(
            t.set(&[0, 2], 1.0),
            Err(TensorError::IndexOutOfBounds { index: 2, dim_size: 2 })
        ));
        assert!(matches!(
            t.set(&[0, 0, 0], 1.0),
            Err(TensorError::WrongNumberOfIndices { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_writes() {
        let mut t = counting(&[2, 2]);
        t.set(&[1, 1], 10.0).unwrap();
        *t.get_mut(&[1, 0]).unwrap() += 0.5;
        assert_eq!(t.data(), &[0.0, 1.5, 2.0, 10.0]);

        t.fill(9.0);
        assert!(t.data().iter().all(|&v| v == 9.0));
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(matches!(
            Tensor::<f64>::from_vec(vec![0.0; 5], &[2, 3]),
            Err(TensorError::ShapeMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_item() {
        assert_eq!(DenseTensor::scalar(4.25f64).item().unwrap(), 4.25);
        assert!(matches!(
            counting(&[2]).item(),
            Err(TensorError::Precondition(_))
        ));
    }

    #[test]
    fn test_reshape_keeps_storage_order() {
        let t = counting(&[2, 3]);
        let r = t.reshape(&[3, 2]).unwrap();
        assert_eq!(r.data(), t.data());
        assert_eq!(r.get(&[0, 1]), Some(&3.0));
        assert!(t.reshape(&[5]).is_err());

        let moved = r.into_shape(&[6]).unwrap();
        assert_eq!(moved.shape(), &[6]);
    }

    #[test]
    fn test_permutedims_moves_axes() {
        let t = counting(&[2, 3, 4]);
        let p = t.permutedims(&[1, 2, 0]).unwrap();
        assert_eq!(p.shape(), &[3, 4, 2]);
        for (i, j, k) in [(0, 0, 0), (1, 2, 3), (0, 1, 2)] {
            assert_eq!(t.get(&[i, j, k]), p.get(&[j, k, i]));
        }
    }
}
