//! Reference-counted flat buffer with copy-on-write mutation.

use std::sync::Arc;

use crate::element::Element;

/// Flat row-major buffer that can be shared between arrays.
///
/// Cloning a `SharedBuffer` is cheap and aliases the same allocation.
/// The first mutation through a shared handle copies the data, so writers
/// never affect other holders.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedBuffer<T: Element> {
    data: Arc<Vec<T>>,
}

impl<T: Element> SharedBuffer<T> {
    /// Wrap an owned vector.
    #[inline]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Buffer of `len` copies of `value`.
    pub fn filled(len: usize, value: T) -> Self {
        Self::new(vec![value; len])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access; detaches from other holders first.
    #[inline]
    pub fn make_mut(&mut self) -> &mut Vec<T> {
        Arc::make_mut(&mut self.data)
    }

    /// Whether both handles point at the same allocation.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Whether any other handle aliases this allocation.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.data) > 1
    }

    /// Owned copy of the contents, avoiding a clone when unshared.
    pub fn into_vec(self) -> Vec<T> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Independent copy that shares nothing with `self`.
    pub fn deep_clone(&self) -> Self {
        Self::new(self.data.as_ref().clone())
    }
}
