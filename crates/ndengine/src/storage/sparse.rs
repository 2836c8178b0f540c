//! Sparse storage backend.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::mem::size_of;

use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use crate::slice::ResolvedSlice;
use crate::storage::{BackendKind, StorageBackend, gather};

/// Sparse storage - a fill value plus explicitly stored positions.
///
/// Suited to large arrays that are mostly one constant. Writing the fill
/// value removes the stored entry, so `nnz` counts only real deviations.
///
/// # Example
///
/// ```
/// use ndengine::Shape;
/// use ndengine::storage::{SparseBackend, StorageBackend};
///
/// let mut s = SparseBackend::filled(Shape::new(&[1000, 1000]), 0.0);
/// s.set(&[3, 4], 2.5).unwrap();
/// assert_eq!(s.nnz(), 1);
/// assert_eq!(s.get(&[3, 4]).unwrap(), 2.5);
/// assert_eq!(s.get(&[0, 0]).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SparseBackend<T: Element> {
    shape: Shape,
    fill: T,
    entries: BTreeMap<usize, T>,
}

impl<T: Element> SparseBackend<T> {
    /// Sparse storage where every element is `fill`.
    pub fn filled(shape: Shape, fill: T) -> Self {
        Self {
            shape,
            fill,
            entries: BTreeMap::new(),
        }
    }

    /// Sparse storage from dense row-major data, storing only values that
    /// differ from `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::LengthMismatch`] if `data.len() != shape.size()`.
    pub fn from_vec(shape: Shape, data: Vec<T>, fill: T) -> Result<Self> {
        if data.len() != shape.size() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.size(),
                actual: data.len(),
            });
        }
        let entries = data
            .into_iter()
            .enumerate()
            .filter(|(_, v)| *v != fill)
            .collect();
        Ok(Self {
            shape,
            fill,
            entries,
        })
    }

    /// The implicit value of unset positions.
    pub fn fill_value(&self) -> &T {
        &self.fill
    }

    /// Number of explicitly stored elements.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    fn check_flat(&self, flat: usize) -> Result<()> {
        let size = self.shape.size();
        if flat >= size {
            return Err(ArrayError::FlatIndexOutOfRange { index: flat, size });
        }
        Ok(())
    }
}

impl<T: Element> StorageBackend<T> for SparseBackend<T> {
    fn kind(&self) -> BackendKind {
        BackendKind::Sparse
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get_flat(&self, flat: usize) -> Result<T> {
        self.check_flat(flat)?;
        Ok(self.entries.get(&flat).unwrap_or(&self.fill).clone())
    }

    fn set_flat(&mut self, flat: usize, value: T) -> Result<()> {
        self.check_flat(flat)?;
        if value == self.fill {
            self.entries.remove(&flat);
        } else {
            self.entries.insert(flat, value);
        }
        Ok(())
    }

    fn flat_data(&self, _copy: bool) -> Cow<'_, [T]> {
        let mut data = vec![self.fill.clone(); self.shape.size()];
        for (&i, v) in &self.entries {
            data[i] = v.clone();
        }
        Cow::Owned(data)
    }

    fn slice(&self, resolved: &[ResolvedSlice]) -> Result<Box<dyn StorageBackend<T>>> {
        let (shape, values) = gather(&self.shape, resolved, |i| self.get_flat(i))?;
        Ok(Box::new(SparseBackend::from_vec(
            shape,
            values,
            self.fill.clone(),
        )?))
    }

    fn clone_box(&self) -> Box<dyn StorageBackend<T>> {
        Box::new(self.clone())
    }

    fn memory_usage(&self) -> usize {
        size_of::<T>() + self.entries.len() * (size_of::<usize>() + size_of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{SliceSpec, resolve_all};

    #[test]
    fn test_from_vec_stores_only_deviations() {
        let s = SparseBackend::from_vec(Shape::new(&[5]), vec![0, 3, 0, 0, 4], 0).unwrap();
        assert_eq!(s.nnz(), 2);
        assert_eq!(s.flat_data(false).as_ref(), &[0, 3, 0, 0, 4]);
    }

    #[test]
    fn test_writing_fill_removes_entry() {
        let mut s = SparseBackend::filled(Shape::new(&[4]), 0);
        s.set_flat(2, 5).unwrap();
        assert_eq!(s.nnz(), 1);
        s.set_flat(2, 0).unwrap();
        assert_eq!(s.nnz(), 0);
    }

    #[test]
    fn test_bounds() {
        let s = SparseBackend::filled(Shape::new(&[2, 2]), 1.0);
        assert!(s.get(&[2, 0]).is_err());
        assert!(s.get_flat(4).is_err());
    }

    #[test]
    fn test_slice_keeps_fill() {
        let mut s = SparseBackend::filled(Shape::new(&[3, 3]), -1);
        s.set(&[1, 2], 8).unwrap();
        let resolved = resolve_all(&[SliceSpec::Single(1)], s.shape()).unwrap();
        let sliced = s.slice(&resolved).unwrap();
        assert_eq!(sliced.kind(), BackendKind::Sparse);
        assert_eq!(sliced.flat_data(false).as_ref(), &[-1, -1, 8]);
    }

    #[test]
    fn test_memory_usage_grows_with_entries() {
        let mut s = SparseBackend::filled(Shape::new(&[100]), 0u64);
        let before = s.memory_usage();
        s.set_flat(10, 1).unwrap();
        assert!(s.memory_usage() > before);
    }
}
