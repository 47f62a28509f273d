//! Values captured during a forward step.

use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use std::rc::Rc;

/// A tensor value stashed by a forward step for use in its backward step.
///
/// Cloning shares the underlying value.
#[derive(Debug)]
pub struct SavedTensor<T: Scalar> {
    data: Rc<DenseTensor<T>>,
}

impl<T: Scalar> SavedTensor<T> {
    pub fn new(tensor: DenseTensor<T>) -> Self {
        Self {
            data: Rc::new(tensor),
        }
    }

    /// Borrow the saved value.
    pub fn get(&self) -> &DenseTensor<T> {
        &self.data
    }
}

impl<T: Scalar> Clone for SavedTensor<T> {
    fn clone(&self) -> Self {
        Self {
            data: Rc::clone(&self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    #[test]
    fn test_saved_value_is_shared_between_clones() {
        let value: DenseTensor<f64> = Tensor::from_vec(vec![0.25, 4.0], &[2, 1]).unwrap();
        let saved = SavedTensor::new(value.clone());
        let copy = saved.clone();

        assert_eq!(copy.get(), &value);
        assert_eq!(Rc::strong_count(&saved.data), 2);
        drop(copy);
        assert_eq!(Rc::strong_count(&saved.data), 1);
    }
}
