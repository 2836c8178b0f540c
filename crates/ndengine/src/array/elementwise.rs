//! Eager element-wise operations.

use crate::array::NdArray;
use crate::config::ArrayConfig;
use crate::element::{Element, Scalar};
use crate::error::{ArrayError, Result};

impl<T: Element> NdArray<T> {
    /// Apply `f` to every element, returning a new array of the same shape.
    ///
    /// The result is built through this array's selector and keeps its
    /// attributes.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_vec(vec![1.0, 4.0, 9.0]).unwrap();
    /// let r = a.map(|x: &f64| x.sqrt()).unwrap();
    /// assert_eq!(r.to_flat_vec(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&T) -> T,
    {
        let data: Vec<T> = self.flat_data(false).iter().map(f).collect();
        self.derive_values(self.dims(), data)
    }

    /// Like [`map`](Self::map) with a fallible function; the first error aborts.
    pub fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&T) -> Result<T>,
    {
        let data = self
            .flat_data(false)
            .iter()
            .map(f)
            .collect::<Result<Vec<T>>>()?;
        self.derive_values(self.dims(), data)
    }

    /// Apply `f` to every element, producing a different element type.
    ///
    /// The result uses the default configuration and keeps attributes.
    pub fn map_to<U, F>(&self, f: F) -> Result<NdArray<U>>
    where
        U: Element,
        F: Fn(&T) -> U,
    {
        let data: Vec<U> = self.flat_data(false).iter().map(f).collect();
        let mut out = NdArray::from_flat_with_config(data, self.dims(), ArrayConfig::default())?;
        out.attrs = self.attrs.clone();
        Ok(out)
    }

    /// Apply `f` to every element in place.
    pub fn map_inplace<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        for flat in 0..self.size() {
            let value = self.backend.get_flat(flat)?;
            self.backend.set_flat(flat, f(&value))?;
        }
        Ok(())
    }

    /// Combine two equally shaped arrays element-wise.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] if the shapes differ.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_vec(vec![1, 2, 3]).unwrap();
    /// let b = NdArray::from_vec(vec![4, 5, 6]).unwrap();
    /// let c = a.zip_with(&b, |x, y| x * y).unwrap();
    /// assert_eq!(c.to_flat_vec(), vec![4, 10, 18]);
    /// ```
    pub fn zip_with<F>(&self, other: &Self, f: F) -> Result<Self>
    where
        F: Fn(&T, &T) -> T,
    {
        check_same_shape(self, other)?;
        let lhs = self.flat_data(false);
        let rhs = other.flat_data(false);
        let data: Vec<T> = lhs.iter().zip(rhs.iter()).map(|(a, b)| f(a, b)).collect();
        self.derive_values(self.dims(), data)
    }
}

impl<T: Scalar> NdArray<T> {
    /// Multiply all elements by `alpha`.
    pub fn scale(&self, alpha: T) -> Result<Self> {
        self.map(|&x| x * alpha)
    }

    pub fn scale_inplace(&mut self, alpha: T) -> Result<()> {
        self.map_inplace(|&x| x * alpha)
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |&a, &b| a + b)
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |&a, &b| a - b)
    }

    /// Element-wise product.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |&a, &b| a * b)
    }
}

pub(crate) fn check_same_shape<T: Element, U: Element>(a: &NdArray<T>, b: &NdArray<U>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(ArrayError::ShapeMismatch {
            expected: a.dims().to_vec(),
            actual: b.dims().to_vec(),
        });
    }
    Ok(())
}
