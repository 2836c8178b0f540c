//! N-dimensional array facade over a pluggable storage backend.
//!
//! ```text
//! NdArray<T>
//! ├── backend: Box<dyn StorageBackend<T>>   chosen by the config's selector
//! ├── attrs:   Attributes                   ordered metadata, never aliased
//! └── config:  ArrayConfig<T>               carried into derived arrays
//! ```
//!
//! Every operation that produces a new array builds its storage through the
//! carried [`ArrayConfig`], so a custom selector follows an array through
//! slicing, mapping and reshaping.

mod elementwise;
mod filter;
mod nested;
mod random;
mod reduce;
mod result;
mod stream;
mod transform;

use std::borrow::Cow;

use num_traits::NumCast;

use crate::config::ArrayConfig;
use crate::element::{Element, Scalar};
use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use crate::slice::{SliceSpec, resolve_all, result_dims};
use crate::storage::{BackendKind, DenseBackend, InitialData, StorageBackend};
use crate::strides::{increment_indices, linear_to_cartesian};
use crate::value::{Attributes, Value};

pub use nested::Nested;
pub use random::{RandomNormal, RandomUniform};
pub use result::SliceResult;
pub use stream::{AxisChunks, Chunk};
pub use transform::concatenate;

/// An n-dimensional, row-major array of `T`.
///
/// # Example
///
/// ```
/// use ndengine::{NdArray, SliceResult, s};
///
/// let a = NdArray::from_flat((1..=6).collect(), &[2, 3]).unwrap();
/// assert_eq!(a.get(&[1, 2]).unwrap(), 6);
///
/// let b = a.reshape(&[3, 2]).unwrap();
/// assert_eq!(b.get(&[2, 0]).unwrap(), 5);
///
/// match a.slice(&s![1]).unwrap() {
///     SliceResult::Vector(row) => assert_eq!(row.to_flat_vec(), vec![4, 5, 6]),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NdArray<T: Element> {
    backend: Box<dyn StorageBackend<T>>,
    attrs: Attributes,
    config: ArrayConfig<T>,
}

impl<T: Element> NdArray<T> {
    pub(crate) fn from_backend(backend: Box<dyn StorageBackend<T>>, config: ArrayConfig<T>) -> Self {
        Self {
            backend,
            attrs: Attributes::new(),
            config,
        }
    }

    /// Array holding row-major `data` with dimensions `dims`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::LengthMismatch`] if `data.len()` differs from the
    /// product of `dims` (1 for `dims = []`).
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// assert_eq!(a.get(&[1, 0]).unwrap(), 3.0);
    /// assert!(NdArray::from_flat(vec![1.0, 2.0], &[3]).is_err());
    /// ```
    pub fn from_flat(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        Self::from_flat_with_config(data, dims, ArrayConfig::default())
    }

    pub fn from_flat_with_config(data: Vec<T>, dims: &[usize], config: ArrayConfig<T>) -> Result<Self> {
        let shape = Shape::new(dims);
        if data.len() != shape.size() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.size(),
                actual: data.len(),
            });
        }
        let backend = config.select_backend(shape, InitialData::Values(data))?;
        Ok(Self::from_backend(backend, config))
    }

    /// One-dimensional array over `data`.
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        let len = data.len();
        Self::from_flat(data, &[len])
    }

    /// Array with every element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidArgument`] for an empty shape or any zero
    /// dimension.
    pub fn filled(dims: &[usize], value: T) -> Result<Self> {
        Self::filled_with_config(dims, value, ArrayConfig::default())
    }

    pub fn filled_with_config(dims: &[usize], value: T, config: ArrayConfig<T>) -> Result<Self> {
        validate_generation_dims(dims)?;
        let backend = config.select_backend(Shape::new(dims), InitialData::Fill(value))?;
        Ok(Self::from_backend(backend, config))
    }

    /// Array whose element at flat offset `i` is `f(i)`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::generate(&[2, 2], |i| i * 10).unwrap();
    /// assert_eq!(a.to_flat_vec(), vec![0, 10, 20, 30]);
    /// ```
    pub fn generate<F>(dims: &[usize], f: F) -> Result<Self>
    where
        F: FnMut(usize) -> T,
    {
        Self::generate_with_config(dims, f, ArrayConfig::default())
    }

    pub fn generate_with_config<F>(dims: &[usize], f: F, config: ArrayConfig<T>) -> Result<Self>
    where
        F: FnMut(usize) -> T,
    {
        validate_generation_dims(dims)?;
        let size: usize = dims.iter().product();
        let data: Vec<T> = (0..size).map(f).collect();
        Self::from_flat_with_config(data, dims, config)
    }

    /// Array whose element at `indices` is `f(indices)`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let eye = NdArray::from_fn(&[3, 3], |ix| if ix[0] == ix[1] { 1 } else { 0 }).unwrap();
    /// assert_eq!(eye.get(&[1, 1]).unwrap(), 1);
    /// assert_eq!(eye.get(&[0, 2]).unwrap(), 0);
    /// ```
    pub fn from_fn<F>(dims: &[usize], f: F) -> Result<Self>
    where
        F: FnMut(&[usize]) -> T,
    {
        Self::from_fn_with_config(dims, f, ArrayConfig::default())
    }

    pub fn from_fn_with_config<F>(dims: &[usize], mut f: F, config: ArrayConfig<T>) -> Result<Self>
    where
        F: FnMut(&[usize]) -> T,
    {
        validate_generation_dims(dims)?;
        let size: usize = dims.iter().product();
        let mut data = Vec::with_capacity(size);
        let mut indices = vec![0usize; dims.len()];
        loop {
            data.push(f(&indices));
            if !increment_indices(&mut indices, dims) {
                break;
            }
        }
        Self::from_flat_with_config(data, dims, config)
    }

    /// Array built from a rectangular nested list.
    ///
    /// The shape is the list length at each depth; a bare leaf gives a 0-d
    /// array.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::ShapeMismatch`] for jagged input
    /// - [`ArrayError::InvalidArgument`] for an empty list at any depth
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::{NdArray, nested};
    ///
    /// let a = NdArray::from_nested(nested![[1, 2, 3], [4, 5, 6]]).unwrap();
    /// assert_eq!(a.dims(), &[2, 3]);
    /// assert!(NdArray::from_nested(nested![[1, 2], [3]]).is_err());
    /// ```
    pub fn from_nested(nested: Nested<T>) -> Result<Self> {
        Self::from_nested_with_config(nested, ArrayConfig::default())
    }

    pub fn from_nested_with_config(nested: Nested<T>, config: ArrayConfig<T>) -> Result<Self> {
        let (dims, data) = nested.into_flat()?;
        Self::from_flat_with_config(data, &dims, config)
    }

    /// Shape of the array.
    #[inline]
    pub fn shape(&self) -> &Shape {
        self.backend.shape()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.shape().dims()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape().ndim()
    }

    /// Total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.shape().size()
    }

    /// Whether the array holds no elements (some axis has length 0).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Element at `indices`.
    ///
    /// # Errors
    ///
    /// Returns an `IndexOutOfRange`-kind error if `indices.len() != ndim` or
    /// any index exceeds its axis.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        self.backend.get(indices)
    }

    /// Overwrite the element at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        self.backend.set(indices, value)
    }

    /// Element at flat row-major offset `flat`.
    pub fn get_flat(&self, flat: usize) -> Result<T> {
        self.backend.get_flat(flat)
    }

    pub fn set_flat(&mut self, flat: usize, value: T) -> Result<()> {
        self.backend.set_flat(flat, value)
    }

    /// Select a sub-array.
    ///
    /// Missing trailing specs select whole axes. The result variant follows the
    /// result rank: when every axis is indexed by a `Single` the element is
    /// read directly and returned as [`SliceResult::Scalar`], without building
    /// a backend.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::TooManySliceSpecs`] for more specs than axes
    /// - [`ArrayError::InvalidStep`] for a non-positive step
    /// - [`ArrayError::IndexOutOfRange`] for a `Single` outside its axis
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::{NdArray, SliceResult, s};
    ///
    /// let a = NdArray::from_flat((0..12).collect(), &[3, 4]).unwrap();
    ///
    /// let m = a.slice(&s![0..2, 1..]).unwrap();
    /// assert_eq!(m.rank(), 2);
    /// assert_eq!(m.into_array().unwrap().to_flat_vec(), vec![1, 2, 3, 5, 6, 7]);
    ///
    /// assert_eq!(a.slice(&s![-1, -1]).unwrap(), SliceResult::Scalar(11));
    /// ```
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<SliceResult<T>> {
        let resolved = resolve_all(specs, self.shape())?;
        if result_dims(&resolved).is_empty() {
            let indices: Vec<usize> = resolved.iter().map(|r| r.start).collect();
            return Ok(SliceResult::Scalar(self.backend.get(&indices)?));
        }
        let backend = self.backend.slice(&resolved)?;
        SliceResult::from_array(self.derive(backend))
    }

    /// Same elements viewed with dimensions `dims`.
    ///
    /// With copy-on-write enabled in the array's config, a dense source shares
    /// its buffer with the result until either side is written. Otherwise the
    /// data is copied through the selector.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] if the element counts differ.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    /// let mut b = a.reshape(&[3, 2]).unwrap();
    /// assert!(b.shares_storage_with(&a));
    ///
    /// b.set(&[0, 0], 100).unwrap();
    /// assert!(!b.shares_storage_with(&a));
    /// assert_eq!(a.get(&[0, 0]).unwrap(), 1);
    /// ```
    pub fn reshape(&self, dims: &[usize]) -> Result<Self> {
        let shape = Shape::new(dims);
        if shape.size() != self.size() {
            return Err(ArrayError::ShapeMismatch {
                expected: self.dims().to_vec(),
                actual: dims.to_vec(),
            });
        }
        if self.config.copy_on_write() {
            if let Some(buffer) = self.backend.shared_buffer() {
                let backend = DenseBackend::from_shared(shape, buffer)?;
                return Ok(self.derive(Box::new(backend)));
            }
        }
        let data = self.backend.flat_data(true).into_owned();
        let backend = self.config.select_backend(shape, InitialData::Values(data))?;
        Ok(self.derive(backend))
    }

    /// Whether `self` and `other` currently alias one dense buffer.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        match (self.backend.shared_buffer(), other.backend.shared_buffer()) {
            (Some(a), Some(b)) => a.shares_storage_with(&b),
            _ => false,
        }
    }

    /// Deep copy of data and attributes.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Read-only view of the current contents.
    ///
    /// With copy-on-write enabled, a dense array shares its buffer with the
    /// snapshot and the first write to either side copies it, so later writes
    /// to `self` are never seen. Other arrays are deep-copied.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let mut a = NdArray::from_vec(vec![1, 2, 3]).unwrap();
    /// let snap = a.snapshot();
    /// assert!(snap.shares_storage_with(&a));
    ///
    /// a.set(&[0], 10).unwrap();
    /// assert_eq!(snap.get(&[0]).unwrap(), 1);
    /// ```
    pub fn snapshot(&self) -> Self {
        if self.config.copy_on_write() {
            if let Some(buffer) = self.backend.shared_buffer() {
                if let Ok(backend) = DenseBackend::from_shared(self.shape().clone(), buffer) {
                    return self.derive(Box::new(backend));
                }
            }
        }
        self.clone()
    }

    /// Row-major values as an owned vector.
    pub fn to_flat_vec(&self) -> Vec<T> {
        self.backend.flat_data(true).into_owned()
    }

    /// Row-major values; with `copy = false` the backend may lend its buffer.
    pub fn flat_data(&self, copy: bool) -> Cow<'_, [T]> {
        self.backend.flat_data(copy)
    }

    /// Values in row-major order.
    pub fn iter(&self) -> Values<'_, T> {
        Values::new(self.backend.flat_data(false))
    }

    /// `(indices, value)` pairs in row-major order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Vec<usize>, T)> + '_ {
        let dims = self.dims();
        self.iter()
            .enumerate()
            .map(move |(flat, value)| (linear_to_cartesian(flat, dims), value))
    }

    /// The storage backend.
    pub fn backend(&self) -> &dyn StorageBackend<T> {
        self.backend.as_ref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Estimated heap footprint of the stored elements in bytes.
    pub fn memory_usage(&self) -> usize {
        self.backend.memory_usage()
    }

    /// The configuration this array was built with.
    pub fn config(&self) -> &ArrayConfig<T> {
        &self.config
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Builder-style attribute insert.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Wrap `backend` with this array's attributes and config.
    pub(crate) fn derive(&self, backend: Box<dyn StorageBackend<T>>) -> Self {
        Self {
            backend,
            attrs: self.attrs.clone(),
            config: self.config.clone(),
        }
    }

    /// New array through this array's selector, keeping attributes.
    pub(crate) fn derive_values(&self, dims: &[usize], data: Vec<T>) -> Result<Self> {
        let mut out = self.fresh_values(dims, data)?;
        out.attrs = self.attrs.clone();
        Ok(out)
    }

    /// New array through this array's selector, without attributes.
    pub(crate) fn fresh_values(&self, dims: &[usize], data: Vec<T>) -> Result<Self> {
        Self::from_flat_with_config(data, dims, self.config.clone())
    }
}

impl<T: Scalar> NdArray<T> {
    /// Array of zeros.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let z: NdArray<f64> = NdArray::zeros(&[2, 3]).unwrap();
    /// assert_eq!(z.size(), 6);
    /// assert!(NdArray::<f64>::zeros(&[]).is_err());
    /// assert!(NdArray::<f64>::zeros(&[2, 0]).is_err());
    /// ```
    pub fn zeros(dims: &[usize]) -> Result<Self> {
        Self::filled(dims, T::zero())
    }

    pub fn zeros_with_config(dims: &[usize], config: ArrayConfig<T>) -> Result<Self> {
        Self::filled_with_config(dims, T::zero(), config)
    }

    /// Array of ones.
    pub fn ones(dims: &[usize]) -> Result<Self> {
        Self::filled(dims, T::one())
    }

    pub fn ones_with_config(dims: &[usize], config: ArrayConfig<T>) -> Result<Self> {
        Self::filled_with_config(dims, T::one(), config)
    }

    /// One-dimensional `[0, 1, ..., n - 1]`.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::InvalidArgument`] for `n == 0`
    /// - [`ArrayError::InvalidArgument`] if a position is not representable in `T`
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let r: NdArray<i64> = NdArray::arange(4).unwrap();
    /// assert_eq!(r.to_flat_vec(), vec![0, 1, 2, 3]);
    /// ```
    pub fn arange(n: usize) -> Result<Self> {
        Self::arange_with_config(n, ArrayConfig::default())
    }

    pub fn arange_with_config(n: usize, config: ArrayConfig<T>) -> Result<Self> {
        validate_generation_dims(&[n])?;
        let data = (0..n)
            .map(|i| {
                <T as NumCast>::from(i).ok_or_else(|| {
                    ArrayError::invalid_argument(format!("{i} is not representable in the element type"))
                })
            })
            .collect::<Result<Vec<T>>>()?;
        Self::from_flat_with_config(data, &[n], config)
    }
}

impl<T: Element> PartialEq for NdArray<T> {
    /// Arrays are equal when shapes and values match; backend kind, config
    /// and attributes are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.flat_data(false) == other.flat_data(false)
    }
}

/// Generation utilities reject shapes with no elements.
fn validate_generation_dims(dims: &[usize]) -> Result<()> {
    if dims.is_empty() {
        return Err(ArrayError::invalid_argument("shape must have at least one axis"));
    }
    if let Some(axis) = dims.iter().position(|&d| d == 0) {
        return Err(ArrayError::invalid_argument(format!(
            "dimension {axis} of shape {dims:?} is zero"
        )));
    }
    Ok(())
}

/// Row-major value iterator returned by [`NdArray::iter`].
#[derive(Debug)]
pub struct Values<'a, T: Element> {
    data: Cow<'a, [T]>,
    front: usize,
    back: usize,
}

impl<'a, T: Element> Values<'a, T> {
    fn new(data: Cow<'a, [T]>) -> Self {
        let back = data.len();
        Self {
            data,
            front: 0,
            back,
        }
    }
}

impl<T: Element> Iterator for Values<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let value = self.data[self.front].clone();
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Element> DoubleEndedIterator for Values<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.data[self.back].clone())
    }
}

impl<T: Element> ExactSizeIterator for Values<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s;
    use crate::storage::FixedSelector;
    use std::sync::Arc;

    fn sample() -> NdArray<i32> {
        NdArray::from_flat((1..=6).collect(), &[2, 3]).unwrap()
    }

    #[test]
    fn test_from_flat_length_mismatch() {
        let e = NdArray::from_flat(vec![1, 2, 3], &[2, 2]).unwrap_err();
        assert_eq!(
            e,
            ArrayError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_zero_dim_array_is_scalar() {
        let a = NdArray::from_flat(vec![7], &[]).unwrap();
        assert_eq!(a.ndim(), 0);
        assert_eq!(a.size(), 1);
        assert_eq!(a.get(&[]).unwrap(), 7);
        assert_eq!(a.slice(&[]).unwrap(), SliceResult::Scalar(7));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut a = sample();
        a.set(&[1, 2], 60).unwrap();
        assert_eq!(a.get(&[1, 2]).unwrap(), 60);
        assert!(a.get(&[2, 0]).is_err());
        assert!(a.get(&[0]).is_err());
        assert!(a.set(&[0, 0, 0], 1).is_err());
    }

    #[test]
    fn test_generation_rejects_empty_shapes() {
        assert!(NdArray::filled(&[], 1).is_err());
        assert!(NdArray::generate(&[3, 0], |i| i).is_err());
        assert!(NdArray::from_fn(&[0], |_| 0).is_err());
        assert!(NdArray::<i32>::arange(0).is_err());
    }

    #[test]
    fn test_from_fn_visits_row_major() {
        let a = NdArray::from_fn(&[2, 2], |ix| ix[0] * 10 + ix[1]).unwrap();
        assert_eq!(a.to_flat_vec(), vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_slice_classification() {
        let a = NdArray::from_flat((0..24).collect(), &[2, 3, 4]).unwrap();
        assert!(matches!(a.slice(&s![0, 0, 0]).unwrap(), SliceResult::Scalar(0)));
        assert!(matches!(a.slice(&s![0, 0]).unwrap(), SliceResult::Vector(_)));
        assert!(matches!(a.slice(&s![0]).unwrap(), SliceResult::Matrix(_)));
        assert!(matches!(a.slice(&[]).unwrap(), SliceResult::Cube(_)));

        let b = a.reshape(&[1, 2, 3, 4]).unwrap();
        assert!(matches!(b.slice(&[]).unwrap(), SliceResult::NdArray(_)));
    }

    #[test]
    fn test_scalar_iff_every_axis_single() {
        let a = NdArray::from_flat((0..24).collect(), &[2, 3, 4]).unwrap();
        let choices = [SliceSpec::Single(1), SliceSpec::range(0, 1), SliceSpec::All];
        for x in choices {
            for y in choices {
                for z in choices {
                    let specs = [x, y, z];
                    let r = a.slice(&specs).unwrap();
                    assert_eq!(r.is_scalar(), specs.iter().all(SliceSpec::is_single));
                    assert_eq!(r.rank(), specs.iter().filter(|s| !s.is_single()).count());
                }
            }
        }
    }

    #[test]
    fn test_slice_keeps_length_one_ranges() {
        let a = sample();
        let r = a.slice(&s![0..1, 1]).unwrap();
        assert_eq!(r.rank(), 1);
        assert_eq!(r.into_array().unwrap().to_flat_vec(), vec![2]);
    }

    #[test]
    fn test_slice_errors() {
        let a = sample();
        assert!(a.slice(&s![0, 0, 0]).is_err());
        assert!(a.slice(&[SliceSpec::stepped(0, 2, 0)]).is_err());
        assert!(a.slice(&s![5]).is_err());
    }

    #[test]
    fn test_reshape_mismatch() {
        let e = sample().reshape(&[4, 2]).unwrap_err();
        assert_eq!(
            e,
            ArrayError::ShapeMismatch {
                expected: vec![2, 3],
                actual: vec![4, 2]
            }
        );
    }

    #[test]
    fn test_reshape_without_copy_on_write_copies() {
        let config = ArrayConfig::default().with_copy_on_write(false);
        let a = NdArray::from_flat_with_config((0..6).collect(), &[6], config).unwrap();
        let b = a.reshape(&[2, 3]).unwrap();
        assert!(!b.shares_storage_with(&a));
        assert_eq!(b.to_flat_vec(), a.to_flat_vec());
    }

    #[test]
    fn test_config_follows_derived_arrays() {
        let config =
            ArrayConfig::new(Arc::new(FixedSelector::new(BackendKind::Chunked).with_block_len(2)));
        let a = NdArray::from_flat_with_config((0..9).collect(), &[3, 3], config).unwrap();
        assert_eq!(a.backend_kind(), BackendKind::Chunked);
        let row = a.slice(&s![1]).unwrap().into_array().unwrap();
        assert_eq!(row.backend_kind(), BackendKind::Chunked);
        assert_eq!(a.reshape(&[9]).unwrap().backend_kind(), BackendKind::Chunked);
    }

    #[test]
    fn test_copy_is_deep() {
        let a = sample().with_attr("units", "m");
        let mut b = a.copy();
        b.set(&[0, 0], 99).unwrap();
        b.attrs_mut().insert("units".into(), "cm".into());
        assert_eq!(a.get(&[0, 0]).unwrap(), 1);
        assert_eq!(a.attrs()["units"], Value::from("m"));
    }

    #[test]
    fn test_iterators() {
        let a = sample();
        assert_eq!(a.iter().rev().collect::<Vec<_>>(), vec![6, 5, 4, 3, 2, 1]);
        let pairs: Vec<_> = a.indexed_iter().take(4).collect();
        assert_eq!(pairs[3], (vec![1, 0], 4));
        assert_eq!(a.iter().len(), 6);
    }

    #[test]
    fn test_equality_ignores_backend() {
        let config = ArrayConfig::new(Arc::new(FixedSelector::new(BackendKind::Sparse)));
        let a = NdArray::from_flat_with_config(vec![0, 0, 3], &[3], config).unwrap();
        let b = NdArray::from_vec(vec![0, 0, 3]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, b.reshape(&[3, 1]).unwrap());
    }
}
