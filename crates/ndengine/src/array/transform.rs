//! Axis transforms: transposition, reshaping helpers and concatenation.

use std::borrow::Borrow;

use crate::array::NdArray;
use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::strides::{cartesian_to_linear, increment_indices};

impl<T: Element> NdArray<T> {
    /// Permute axes: axis `i` of the result is axis `perm[i]` of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidPermutation`] unless `perm` is a
    /// permutation of `0..ndim`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat((0..24).collect(), &[2, 3, 4]).unwrap();
    /// let b = a.transpose(&[2, 0, 1]).unwrap();
    /// assert_eq!(b.dims(), &[4, 2, 3]);
    /// assert_eq!(a.get(&[1, 2, 3]).unwrap(), b.get(&[3, 1, 2]).unwrap());
    /// ```
    pub fn transpose(&self, perm: &[usize]) -> Result<Self> {
        validate_permutation(perm, self.ndim())?;

        let src_dims = self.dims();
        let src_strides = self.shape().strides();
        let out_dims: Vec<usize> = perm.iter().map(|&p| src_dims[p]).collect();
        // Source stride for each output axis.
        let strides: Vec<usize> = perm.iter().map(|&p| src_strides[p]).collect();

        let src = self.flat_data(false);
        let mut data = Vec::with_capacity(self.size());
        if self.size() > 0 {
            let mut out_idx = vec![0usize; out_dims.len()];
            loop {
                data.push(src[cartesian_to_linear(&out_idx, &strides)].clone());
                if !increment_indices(&mut out_idx, &out_dims) {
                    break;
                }
            }
        }
        self.derive_values(&out_dims, data)
    }

    /// Reverse the axis order.
    pub fn t(&self) -> Result<Self> {
        let perm: Vec<usize> = (0..self.ndim()).rev().collect();
        self.transpose(&perm)
    }

    /// One-dimensional view of all elements.
    pub fn flatten(&self) -> Result<Self> {
        self.reshape(&[self.size()])
    }

    /// Drop every axis of length 1.
    pub fn squeeze(&self) -> Result<Self> {
        let dims: Vec<usize> = self.dims().iter().copied().filter(|&d| d != 1).collect();
        self.reshape(&dims)
    }

    /// Insert a length-1 axis at position `axis` (`0..=ndim`).
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidAxis`] if `axis > ndim`.
    pub fn expand_dims(&self, axis: usize) -> Result<Self> {
        if axis > self.ndim() {
            return Err(ArrayError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut dims = self.dims().to_vec();
        dims.insert(axis, 1);
        self.reshape(&dims)
    }
}

/// Join arrays along `axis`.
///
/// All inputs must share every dimension except `axis`. The result is built
/// through the first array's configuration and carries no attributes.
///
/// # Errors
///
/// - [`ArrayError::InvalidArgument`] for an empty input list
/// - [`ArrayError::InvalidAxis`] if `axis` is outside the first array's rank
/// - [`ArrayError::ShapeMismatch`] if the other dimensions disagree
///
/// # Example
///
/// ```
/// use ndengine::{NdArray, concatenate};
///
/// let a = NdArray::from_flat(vec![1, 2, 3, 4], &[2, 2]).unwrap();
/// let b = NdArray::from_flat(vec![5, 6], &[1, 2]).unwrap();
/// let c = concatenate(&[&a, &b], 0).unwrap();
/// assert_eq!(c.dims(), &[3, 2]);
/// assert_eq!(c.to_flat_vec(), vec![1, 2, 3, 4, 5, 6]);
/// ```
pub fn concatenate<T, A>(arrays: &[A], axis: usize) -> Result<NdArray<T>>
where
    T: Element,
    A: Borrow<NdArray<T>>,
{
    let first: &NdArray<T> = arrays
        .first()
        .ok_or_else(|| ArrayError::invalid_argument("nothing to concatenate"))?
        .borrow();
    let ndim = first.ndim();
    if axis >= ndim {
        return Err(ArrayError::InvalidAxis { axis, ndim });
    }

    // Start offset of each input along `axis`.
    let mut offsets = Vec::with_capacity(arrays.len());
    let mut total = 0usize;
    for array in arrays {
        let array: &NdArray<T> = array.borrow();
        let compatible = array.ndim() == ndim
            && array
                .dims()
                .iter()
                .zip(first.dims())
                .enumerate()
                .all(|(i, (a, b))| i == axis || a == b);
        if !compatible {
            let mut expected = first.dims().to_vec();
            if let Some(&len) = array.dims().get(axis) {
                expected[axis] = len;
            }
            return Err(ArrayError::ShapeMismatch {
                expected,
                actual: array.dims().to_vec(),
            });
        }
        offsets.push(total);
        total += array.dims()[axis];
    }

    let out_shape = first.shape().with_axis(axis, total)?;
    let out_dims = out_shape.dims();
    let mut data = Vec::with_capacity(out_shape.size());
    if out_shape.size() > 0 {
        let mut index = vec![0usize; ndim];
        let mut local = vec![0usize; ndim];
        loop {
            let source = offsets.partition_point(|&start| start <= index[axis]) - 1;
            local.copy_from_slice(&index);
            local[axis] -= offsets[source];
            let array: &NdArray<T> = arrays[source].borrow();
            data.push(array.get(&local)?);
            if !increment_indices(&mut index, out_dims) {
                break;
            }
        }
    }
    first.fresh_values(out_dims, data)
}

fn validate_permutation(perm: &[usize], ndim: usize) -> Result<()> {
    let invalid = || ArrayError::InvalidPermutation {
        perm: perm.to_vec(),
        ndim,
    };
    if perm.len() != ndim {
        return Err(invalid());
    }
    let mut seen = vec![false; ndim];
    for &p in perm {
        if p >= ndim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }
    Ok(())
}
