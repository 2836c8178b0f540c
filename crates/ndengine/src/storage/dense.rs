//! Dense storage backend.

use std::borrow::Cow;
use std::mem::size_of;

use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use crate::slice::ResolvedSlice;
use crate::storage::{BackendKind, SharedBuffer, StorageBackend, gather};

/// Dense storage - one contiguous row-major buffer.
///
/// The buffer is a [`SharedBuffer`], so a reshape under copy-on-write can
/// alias it; the first write detaches.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBackend<T: Element> {
    shape: Shape,
    buffer: SharedBuffer<T>,
}

impl<T: Element> DenseBackend<T> {
    /// Create dense storage from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::LengthMismatch`] if `data.len() != shape.size()`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::Shape;
    /// use ndengine::storage::{DenseBackend, StorageBackend};
    ///
    /// let d = DenseBackend::from_vec(Shape::new(&[2, 2]), vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(d.get(&[1, 0]).unwrap(), 3);
    /// ```
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self> {
        Self::from_shared(shape, SharedBuffer::new(data))
    }

    /// Dense storage filled with `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        let buffer = SharedBuffer::filled(shape.size(), value);
        Self { shape, buffer }
    }

    /// Wrap an existing (possibly shared) buffer.
    pub fn from_shared(shape: Shape, buffer: SharedBuffer<T>) -> Result<Self> {
        if buffer.len() != shape.size() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.size(),
                actual: buffer.len(),
            });
        }
        Ok(Self { shape, buffer })
    }

    /// Underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &SharedBuffer<T> {
        &self.buffer
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    fn check_flat(&self, flat: usize) -> Result<()> {
        if flat >= self.buffer.len() {
            return Err(ArrayError::FlatIndexOutOfRange {
                index: flat,
                size: self.buffer.len(),
            });
        }
        Ok(())
    }
}

impl<T: Element> StorageBackend<T> for DenseBackend<T> {
    fn kind(&self) -> BackendKind {
        BackendKind::Dense
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get_flat(&self, flat: usize) -> Result<T> {
        self.check_flat(flat)?;
        Ok(self.buffer.as_slice()[flat].clone())
    }

    fn set_flat(&mut self, flat: usize, value: T) -> Result<()> {
        self.check_flat(flat)?;
        self.buffer.make_mut()[flat] = value;
        Ok(())
    }

    fn flat_data(&self, copy: bool) -> Cow<'_, [T]> {
        if copy {
            Cow::Owned(self.buffer.as_slice().to_vec())
        } else {
            Cow::Borrowed(self.buffer.as_slice())
        }
    }

    fn slice(&self, resolved: &[ResolvedSlice]) -> Result<Box<dyn StorageBackend<T>>> {
        let data = self.buffer.as_slice();
        let (shape, values) = gather(&self.shape, resolved, |i| Ok(data[i].clone()))?;
        Ok(Box::new(DenseBackend::from_vec(shape, values)?))
    }

    fn clone_box(&self) -> Box<dyn StorageBackend<T>> {
        Box::new(Self {
            shape: self.shape.clone(),
            buffer: self.buffer.deep_clone(),
        })
    }

    fn memory_usage(&self) -> usize {
        self.buffer.len() * size_of::<T>()
    }

    fn shared_buffer(&self) -> Option<SharedBuffer<T>> {
        Some(self.buffer.clone())
    }
}
