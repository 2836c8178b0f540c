//! Predicate scans, boolean masks and index-based gather/scatter.
//!
//! All scans walk elements in row-major order. Results of `where_`, `mask`
//! and `take` are fresh one-dimensional arrays without attributes.

use crate::array::NdArray;
use crate::array::elementwise::check_same_shape;
use crate::config::ArrayConfig;
use crate::element::Element;
use crate::error::{ArrayError, Result};

impl<T: Element> NdArray<T> {
    /// Elements satisfying `pred`, in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::{NdArray, nested};
    ///
    /// let a = NdArray::from_nested(nested![[1, 2], [3, 4]]).unwrap();
    /// assert_eq!(a.where_(|&x| x > 1).unwrap().to_flat_vec(), vec![2, 3, 4]);
    /// ```
    pub fn where_<P>(&self, pred: P) -> Result<Self>
    where
        P: Fn(&T) -> bool,
    {
        let data: Vec<T> = self.iter().filter(|v| pred(v)).collect();
        let len = data.len();
        self.fresh_values(&[len], data)
    }

    /// Flat offsets of elements satisfying `pred`.
    pub fn where_indices<P>(&self, pred: P) -> Vec<usize>
    where
        P: Fn(&T) -> bool,
    {
        self.iter()
            .enumerate()
            .filter_map(|(flat, v)| pred(&v).then_some(flat))
            .collect()
    }

    /// Number of elements satisfying `pred`.
    pub fn count_where<P>(&self, pred: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.iter().filter(|v| pred(v)).count()
    }

    /// Whether any element satisfies `pred`; stops at the first match.
    pub fn any<P>(&self, pred: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.iter().any(|v| pred(&v))
    }

    /// Whether every element satisfies `pred`; stops at the first failure.
    pub fn all<P>(&self, pred: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.iter().all(|v| pred(&v))
    }

    /// Indices and value of the first element satisfying `pred`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat(vec![5, 1, 7, 1], &[2, 2]).unwrap();
    /// assert_eq!(a.find_first(|&x| x == 1), Some((vec![0, 1], 1)));
    /// assert_eq!(a.find_last(|&x| x == 1), Some((vec![1, 1], 1)));
    /// assert_eq!(a.find_first(|&x| x > 10), None);
    /// ```
    pub fn find_first<P>(&self, pred: P) -> Option<(Vec<usize>, T)>
    where
        P: Fn(&T) -> bool,
    {
        self.indexed_iter().find(|(_, v)| pred(v))
    }

    /// Indices and value of the last element satisfying `pred`.
    ///
    /// Scans backwards and stops at its first hit.
    pub fn find_last<P>(&self, pred: P) -> Option<(Vec<usize>, T)>
    where
        P: Fn(&T) -> bool,
    {
        let (flat, value) = self.iter().enumerate().rev().find(|(_, v)| pred(v))?;
        let indices = self.shape().from_flat_index(flat).ok()?;
        Some((indices, value))
    }

    /// Elements where `mask` is `true`, in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] unless `mask` has this array's shape.
    pub fn mask(&self, mask: &NdArray<bool>) -> Result<Self> {
        check_same_shape(self, mask)?;
        let data: Vec<T> = self
            .iter()
            .zip(mask.iter())
            .filter_map(|(v, keep)| keep.then_some(v))
            .collect();
        let len = data.len();
        self.fresh_values(&[len], data)
    }

    /// Boolean array of `pred` applied to each element.
    pub fn compare<P>(&self, pred: P) -> Result<NdArray<bool>>
    where
        P: Fn(&T) -> bool,
    {
        let data: Vec<bool> = self.iter().map(|v| pred(&v)).collect();
        NdArray::from_flat_with_config(data, self.dims(), ArrayConfig::default())
    }

    /// Elements at the given flat offsets, as a one-dimensional array.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::FlatIndexOutOfRange`] for any offset past the end.
    pub fn take(&self, flat_indices: &[usize]) -> Result<Self> {
        let data = flat_indices
            .iter()
            .map(|&i| self.get_flat(i))
            .collect::<Result<Vec<T>>>()?;
        self.fresh_values(&[data.len()], data)
    }

    /// Write `values[k]` at flat offset `flat_indices[k]`.
    ///
    /// Every offset is validated before the first write, so an error leaves
    /// the array unchanged.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::LengthMismatch`] if the two slices differ in length
    /// - [`ArrayError::FlatIndexOutOfRange`] for any offset past the end
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let mut a = NdArray::from_vec(vec![0, 0, 0, 0]).unwrap();
    /// assert!(a.put(&[1, 9], &[5, 6]).is_err());
    /// assert_eq!(a.to_flat_vec(), vec![0, 0, 0, 0]);
    ///
    /// a.put(&[1, 3], &[5, 6]).unwrap();
    /// assert_eq!(a.to_flat_vec(), vec![0, 5, 0, 6]);
    /// ```
    pub fn put(&mut self, flat_indices: &[usize], values: &[T]) -> Result<()> {
        check_lengths(flat_indices.len(), values.len())?;
        let size = self.size();
        if let Some(&index) = flat_indices.iter().find(|&&i| i >= size) {
            return Err(ArrayError::FlatIndexOutOfRange { index, size });
        }
        for (&flat, value) in flat_indices.iter().zip(values) {
            self.backend.set_flat(flat, value.clone())?;
        }
        Ok(())
    }

    /// Write `values[k]` at multi-index `indices[k]`; validated like [`put`](Self::put).
    pub fn put_at(&mut self, indices: &[Vec<usize>], values: &[T]) -> Result<()> {
        check_lengths(indices.len(), values.len())?;
        let flat = indices
            .iter()
            .map(|ix| self.shape().to_flat_index(ix))
            .collect::<Result<Vec<usize>>>()?;
        for (flat, value) in flat.into_iter().zip(values) {
            self.backend.set_flat(flat, value.clone())?;
        }
        Ok(())
    }
}

fn check_lengths(indices: usize, values: usize) -> Result<()> {
    if indices != values {
        return Err(ArrayError::LengthMismatch {
            expected: indices,
            actual: values,
        });
    }
    Ok(())
}
