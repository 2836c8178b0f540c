//! Numeric reductions.

use crate::array::NdArray;
use crate::element::Scalar;
use crate::error::{ArrayError, Result};

impl<T: Scalar> NdArray<T> {
    /// Sum of all elements; zero for an empty array.
    pub fn sum(&self) -> T {
        self.iter().fold(T::zero(), |acc, x| acc + x)
    }

    /// Product of all elements; one for an empty array.
    pub fn product(&self) -> T {
        self.iter().fold(T::one(), |acc, x| acc * x)
    }

    /// Arithmetic mean as `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidArgument`] for an empty array.
    pub fn mean(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(ArrayError::invalid_argument("mean of an empty array"));
        }
        let total: f64 = self.iter().map(Scalar::to_f64_lossy).sum();
        Ok(total / self.size() as f64)
    }

    /// Smallest element, `None` when empty. Incomparable values (NaN) are skipped.
    pub fn min(&self) -> Option<T> {
        self.iter().reduce(|a, b| if b < a { b } else { a })
    }

    /// Largest element, `None` when empty. Incomparable values (NaN) are skipped.
    pub fn max(&self) -> Option<T> {
        self.iter().reduce(|a, b| if b > a { b } else { a })
    }

    /// Sum along `axis`, removing it from the result.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidAxis`] if `axis >= ndim`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    /// assert_eq!(a.sum_axis(0).unwrap().to_flat_vec(), vec![5, 7, 9]);
    /// assert_eq!(a.sum_axis(1).unwrap().to_flat_vec(), vec![6, 15]);
    /// ```
    pub fn sum_axis(&self, axis: usize) -> Result<Self> {
        let ndim = self.ndim();
        if axis >= ndim {
            return Err(ArrayError::InvalidAxis { axis, ndim });
        }
        let dims = self.dims();
        let outer: usize = dims[..axis].iter().product();
        let len = dims[axis];
        let inner: usize = dims[axis + 1..].iter().product();

        let src = self.flat_data(false);
        let mut data = vec![T::zero(); outer * inner];
        for o in 0..outer {
            for k in 0..len {
                let base = (o * len + k) * inner;
                for i in 0..inner {
                    data[o * inner + i] = data[o * inner + i] + src[base + i];
                }
            }
        }

        let mut out_dims = dims.to_vec();
        out_dims.remove(axis);
        self.derive_values(&out_dims, data)
    }
}
