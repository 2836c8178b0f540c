//! Array shape and index mapping.

use std::fmt;
use std::ops::Index;

use smallvec::SmallVec;

use crate::error::{ArrayError, Result};
use crate::strides::{cartesian_to_linear, compute_strides, linear_to_cartesian};

/// Dimension sizes of an array, with row-major index mapping.
///
/// Uses `SmallVec<[usize; 6]>` so shapes of common rank never allocate.
/// The empty shape is the 0-d scalar shape and has size 1.
///
/// # Example
///
/// ```
/// use ndengine::Shape;
///
/// let shape = Shape::new(&[2, 3]);
/// assert_eq!(shape.size(), 6);
/// assert_eq!(shape.to_flat_index(&[1, 2]).unwrap(), 5);
/// assert_eq!(shape.from_flat_index(4).unwrap(), vec![1, 1]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dims: SmallVec<[usize; 6]>,
    strides: SmallVec<[usize; 6]>,
}

impl Shape {
    /// Create a shape from dimension sizes.
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().copied().collect(),
            strides: compute_strides(dims).into_iter().collect(),
        }
    }

    /// The 0-d scalar shape.
    pub fn scalar() -> Self {
        Self::new(&[])
    }

    /// Dimension sizes.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (1 for the scalar shape).
    #[inline]
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether this is the 0-d scalar shape.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Length of `axis`, or `None` if out of range.
    pub fn axis_len(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// Copy of this shape with `axis` resized to `len`.
    pub fn with_axis(&self, axis: usize, len: usize) -> Result<Self> {
        if axis >= self.ndim() {
            return Err(ArrayError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut dims = self.dims.to_vec();
        dims[axis] = len;
        Ok(Self::new(&dims))
    }

    /// Check that `indices` addresses an element of this shape.
    pub fn check_indices(&self, indices: &[usize]) -> Result<()> {
        if indices.len() != self.ndim() {
            return Err(ArrayError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (axis, (&idx, &len)) in indices.iter().zip(self.dims.iter()).enumerate() {
            if idx >= len {
                return Err(ArrayError::IndexOutOfRange {
                    index: idx as isize,
                    axis,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Map multi-dimensional indices to a flat row-major offset.
    ///
    /// # Errors
    ///
    /// Returns an `IndexOutOfRange`-kind error for a wrong index count or any
    /// index past its axis length.
    pub fn to_flat_index(&self, indices: &[usize]) -> Result<usize> {
        self.check_indices(indices)?;
        Ok(cartesian_to_linear(indices, &self.strides))
    }

    /// Map a flat row-major offset back to multi-dimensional indices.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::FlatIndexOutOfRange`] if `flat >= size()`.
    pub fn from_flat_index(&self, flat: usize) -> Result<Vec<usize>> {
        let size = self.size();
        if flat >= size {
            return Err(ArrayError::FlatIndexOutOfRange { index: flat, size });
        }
        Ok(linear_to_cartesian(flat, &self.dims))
    }
}

impl Index<usize> for Shape {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.dims[axis]
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(&dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(&dims)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_size_and_ndim() {
        let s = Shape::new(&[2, 3, 4]);
        assert_eq!(s.ndim(), 3);
        assert_eq!(s.size(), 24);
        assert_eq!(s[1], 3);
        assert_eq!(s.strides(), &[12, 4, 1]);
    }

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert!(s.is_scalar());
        assert_eq!(s.size(), 1);
        assert_eq!(s.to_flat_index(&[]).unwrap(), 0);
        assert_eq!(s.from_flat_index(0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_zero_length_axis() {
        let s = Shape::new(&[3, 0]);
        assert_eq!(s.size(), 0);
        assert!(s.from_flat_index(0).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let s = Shape::new(&[2, 3]);
        assert_eq!(
            s.to_flat_index(&[2, 0]).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(
            s.to_flat_index(&[0]).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(
            s.from_flat_index(6).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
    }

    #[test]
    fn test_bijection() {
        let s = Shape::new(&[2, 1, 3, 4]);
        for flat in 0..s.size() {
            let idx = s.from_flat_index(flat).unwrap();
            assert_eq!(s.to_flat_index(&idx).unwrap(), flat);
        }
    }

    #[test]
    fn test_with_axis() {
        let s = Shape::new(&[4, 5]);
        assert_eq!(s.with_axis(0, 2).unwrap().dims(), &[2, 5]);
        assert!(s.with_axis(2, 1).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(&[2, 3]).to_string(), "(2, 3)");
        assert_eq!(Shape::new(&[5]).to_string(), "(5,)");
        assert_eq!(Shape::scalar().to_string(), "()");
    }
}
