//! Storage backends for array data.
//!
//! ```text
//! StorageBackend<T> (trait object)
//! ├── DenseBackend<T>   - one contiguous copy-on-write buffer
//! ├── ChunkedBackend<T> - fixed-length blocks for very large arrays
//! └── SparseBackend<T>  - fill value + explicitly set positions
//! ```
//!
//! Which backend an array gets is decided by an injected
//! [`BackendSelector`], never by the array itself.
//!
//! Backends are mutated only through `&mut` by their owning array. Parallel
//! dispatch borrows arrays immutably and ships copies to workers, so a
//! backend is never written while a worker reads it.

mod buffer;
mod chunked;
mod dense;
mod select;
mod sparse;

use std::borrow::Cow;
use std::fmt::Debug;

use crate::element::Element;
use crate::error::Result;
use crate::shape::Shape;
use crate::slice::{ResolvedSlice, result_dims};
use crate::strides::increment_indices;

pub use buffer::SharedBuffer;
pub use chunked::ChunkedBackend;
pub use dense::DenseBackend;
pub use select::{BackendSelector, DefaultSelector, FixedSelector};
pub use sparse::SparseBackend;

/// Identifies a concrete backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Dense,
    Chunked,
    Sparse,
}

/// Initial contents handed to a [`BackendSelector`].
#[derive(Debug, Clone, PartialEq)]
pub enum InitialData<T> {
    /// Every element equals this value.
    Fill(T),
    /// Row-major values; length must equal the shape size.
    Values(Vec<T>),
}

/// Element storage for one shape.
///
/// Implementations hold exactly `shape().size()` logical elements in
/// row-major order.
pub trait StorageBackend<T: Element>: Debug + Send + Sync {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Shape of the stored data.
    fn shape(&self) -> &Shape;

    /// Element at a flat row-major offset.
    fn get_flat(&self, flat: usize) -> Result<T>;

    /// Overwrite the element at a flat row-major offset.
    fn set_flat(&mut self, flat: usize, value: T) -> Result<()>;

    /// Row-major contents.
    ///
    /// With `copy = false` a backend may lend its internal buffer; callers
    /// must treat the result as read-only. With `copy = true` the result is
    /// always owned.
    fn flat_data(&self, copy: bool) -> Cow<'_, [T]>;

    /// New backend holding only the selected sub-range.
    ///
    /// Values of the result equal direct multi-indexing into `self`.
    fn slice(&self, resolved: &[ResolvedSlice]) -> Result<Box<dyn StorageBackend<T>>>;

    /// Deep copy.
    fn clone_box(&self) -> Box<dyn StorageBackend<T>>;

    /// Estimated heap footprint in bytes.
    fn memory_usage(&self) -> usize;

    /// The shared flat buffer, for backends that can alias it cheaply.
    fn shared_buffer(&self) -> Option<SharedBuffer<T>> {
        None
    }

    /// Element at multi-dimensional `indices`.
    fn get(&self, indices: &[usize]) -> Result<T> {
        let flat = self.shape().to_flat_index(indices)?;
        self.get_flat(flat)
    }

    /// Overwrite the element at multi-dimensional `indices`.
    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let flat = self.shape().to_flat_index(indices)?;
        self.set_flat(flat, value)
    }
}

impl<T: Element> Clone for Box<dyn StorageBackend<T>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Collect the values selected by `resolved` in row-major result order.
///
/// Shared by every backend's `slice`; single axes are held fixed at their
/// position and contribute no result axis.
pub(crate) fn gather<T, F>(
    shape: &Shape,
    resolved: &[ResolvedSlice],
    mut fetch: F,
) -> Result<(Shape, Vec<T>)>
where
    F: FnMut(usize) -> Result<T>,
{
    let out_shape = Shape::new(&result_dims(resolved));
    let total = out_shape.size();
    let mut data = Vec::with_capacity(total);
    if total == 0 {
        return Ok((out_shape, data));
    }

    let counts: Vec<usize> = resolved.iter().map(|r| r.len).collect();
    let mut positions = vec![0usize; resolved.len()];
    loop {
        let flat: usize = positions
            .iter()
            .zip(resolved.iter())
            .zip(shape.strides().iter())
            .map(|((&i, r), &stride)| r.source_index(i) * stride)
            .sum();
        data.push(fetch(flat)?);
        if !increment_indices(&mut positions, &counts) {
            break;
        }
    }
    Ok((out_shape, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{SliceSpec, resolve_all};

    #[test]
    fn test_gather_drops_single_axes() {
        let shape = Shape::new(&[3, 3]);
        let data: Vec<i32> = (1..=9).collect();
        let resolved = resolve_all(&[SliceSpec::Single(1)], &shape).unwrap();
        let (out, values) = gather(&shape, &resolved, |i| Ok(data[i])).unwrap();
        assert_eq!(out.dims(), &[3]);
        assert_eq!(values, vec![4, 5, 6]);
    }

    #[test]
    fn test_gather_stepped() {
        let shape = Shape::new(&[2, 5]);
        let data: Vec<i32> = (0..10).collect();
        let resolved =
            resolve_all(&[SliceSpec::All, SliceSpec::stepped(0, 5, 2)], &shape).unwrap();
        let (out, values) = gather(&shape, &resolved, |i| Ok(data[i])).unwrap();
        assert_eq!(out.dims(), &[2, 3]);
        assert_eq!(values, vec![0, 2, 4, 5, 7, 9]);
    }

    #[test]
    fn test_gather_empty_range() {
        let shape = Shape::new(&[4]);
        let resolved = resolve_all(&[SliceSpec::range(2, 2)], &shape).unwrap();
        let (out, values) = gather(&shape, &resolved, |_| Ok(0i32)).unwrap();
        assert_eq!(out.dims(), &[0]);
        assert!(values.is_empty());
    }
}
