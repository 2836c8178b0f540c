//! Rank-tagged slice results.

use crate::array::NdArray;
use crate::element::Element;
use crate::error::Result;

/// Outcome of [`NdArray::slice`], tagged by result rank.
///
/// Rank 0 is a bare element; every other rank wraps an array.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceResult<T: Element> {
    Scalar(T),
    Vector(NdArray<T>),
    Matrix(NdArray<T>),
    Cube(NdArray<T>),
    /// Rank 4 or higher.
    NdArray(NdArray<T>),
}

impl<T: Element> SliceResult<T> {
    /// Classify `array` by its rank.
    ///
    /// A 0-d array becomes [`SliceResult::Scalar`] holding its only element.
    pub fn from_array(array: NdArray<T>) -> Result<Self> {
        Ok(match array.ndim() {
            0 => SliceResult::Scalar(array.get_flat(0)?),
            1 => SliceResult::Vector(array),
            2 => SliceResult::Matrix(array),
            3 => SliceResult::Cube(array),
            _ => SliceResult::NdArray(array),
        })
    }

    /// Rank of the selection.
    pub fn rank(&self) -> usize {
        match self {
            SliceResult::Scalar(_) => 0,
            SliceResult::Vector(_) => 1,
            SliceResult::Matrix(_) => 2,
            SliceResult::Cube(_) => 3,
            SliceResult::NdArray(a) => a.ndim(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, SliceResult::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&T> {
        match self {
            SliceResult::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray<T>> {
        match self {
            SliceResult::Scalar(_) => None,
            SliceResult::Vector(a)
            | SliceResult::Matrix(a)
            | SliceResult::Cube(a)
            | SliceResult::NdArray(a) => Some(a),
        }
    }

    pub fn into_scalar(self) -> Option<T> {
        match self {
            SliceResult::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The selection as an array; a scalar becomes a 0-d array.
    pub fn into_array(self) -> Result<NdArray<T>> {
        match self {
            SliceResult::Scalar(v) => NdArray::from_flat(vec![v], &[]),
            SliceResult::Vector(a)
            | SliceResult::Matrix(a)
            | SliceResult::Cube(a)
            | SliceResult::NdArray(a) => Ok(a),
        }
    }
}
