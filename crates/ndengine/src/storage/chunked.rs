//! Chunked storage backend.

use std::borrow::Cow;
use std::mem::size_of;

use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use crate::slice::ResolvedSlice;
use crate::storage::{BackendKind, StorageBackend, gather};

/// Default number of elements per block.
pub const DEFAULT_BLOCK_LEN: usize = 64 * 1024;

/// Chunked storage - row-major data split into fixed-length blocks.
///
/// Avoids a single huge allocation for very large arrays. Every block except
/// the last holds exactly `block_len` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedBackend<T: Element> {
    shape: Shape,
    block_len: usize,
    blocks: Vec<Vec<T>>,
}

impl<T: Element> ChunkedBackend<T> {
    /// Split row-major `data` into blocks of `block_len` elements.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::LengthMismatch`] if `data.len() != shape.size()`
    /// - [`ArrayError::InvalidArgument`] if `block_len == 0`
    pub fn from_vec(shape: Shape, data: Vec<T>, block_len: usize) -> Result<Self> {
        if block_len == 0 {
            return Err(ArrayError::invalid_argument("block length must be positive"));
        }
        if data.len() != shape.size() {
            return Err(ArrayError::LengthMismatch {
                expected: shape.size(),
                actual: data.len(),
            });
        }
        let blocks = data.chunks(block_len).map(<[T]>::to_vec).collect();
        Ok(Self {
            shape,
            block_len,
            blocks,
        })
    }

    /// Chunked storage filled with `value`.
    pub fn filled(shape: Shape, value: T, block_len: usize) -> Result<Self> {
        if block_len == 0 {
            return Err(ArrayError::invalid_argument("block length must be positive"));
        }
        let size = shape.size();
        let blocks = (0..size.div_ceil(block_len))
            .map(|b| vec![value.clone(); block_len.min(size - b * block_len)])
            .collect();
        Ok(Self {
            shape,
            block_len,
            blocks,
        })
    }

    /// Elements per block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Number of allocated blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn locate(&self, flat: usize) -> Result<(usize, usize)> {
        let size = self.shape.size();
        if flat >= size {
            return Err(ArrayError::FlatIndexOutOfRange { index: flat, size });
        }
        Ok((flat / self.block_len, flat % self.block_len))
    }
}

impl<T: Element> StorageBackend<T> for ChunkedBackend<T> {
    fn kind(&self) -> BackendKind {
        BackendKind::Chunked
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn get_flat(&self, flat: usize) -> Result<T> {
        let (block, offset) = self.locate(flat)?;
        Ok(self.blocks[block][offset].clone())
    }

    fn set_flat(&mut self, flat: usize, value: T) -> Result<()> {
        let (block, offset) = self.locate(flat)?;
        self.blocks[block][offset] = value;
        Ok(())
    }

    fn flat_data(&self, _copy: bool) -> Cow<'_, [T]> {
        Cow::Owned(self.blocks.concat())
    }

    fn slice(&self, resolved: &[ResolvedSlice]) -> Result<Box<dyn StorageBackend<T>>> {
        let (shape, values) = gather(&self.shape, resolved, |i| self.get_flat(i))?;
        Ok(Box::new(ChunkedBackend::from_vec(
            shape,
            values,
            self.block_len,
        )?))
    }

    fn clone_box(&self) -> Box<dyn StorageBackend<T>> {
        Box::new(self.clone())
    }

    fn memory_usage(&self) -> usize {
        self.shape.size() * size_of::<T>() + self.blocks.len() * size_of::<Vec<T>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{SliceSpec, resolve_all};

    #[test]
    fn test_blocks_split() {
        let c = ChunkedBackend::from_vec(Shape::new(&[10]), (0..10).collect(), 4).unwrap();
        assert_eq!(c.num_blocks(), 3);
        assert_eq!(c.get_flat(9).unwrap(), 9);
        assert_eq!(c.flat_data(false).as_ref(), (0..10).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_filled_last_block_shorter() {
        let c = ChunkedBackend::filled(Shape::new(&[2, 5]), 1.5, 4).unwrap();
        assert_eq!(c.num_blocks(), 3);
        assert_eq!(c.flat_data(false).len(), 10);
    }

    #[test]
    fn test_set_across_blocks() {
        let mut c = ChunkedBackend::filled(Shape::new(&[3, 3]), 0, 2).unwrap();
        c.set(&[2, 1], 7).unwrap();
        assert_eq!(c.get_flat(7).unwrap(), 7);
        assert!(c.set_flat(9, 1).is_err());
    }

    #[test]
    fn test_slice_matches_direct_indexing() {
        let c = ChunkedBackend::from_vec(Shape::new(&[4, 4]), (0..16).collect(), 3).unwrap();
        let resolved = resolve_all(&[SliceSpec::stepped(0, 4, 2), SliceSpec::Single(3)], c.shape())
            .unwrap();
        let s = c.slice(&resolved).unwrap();
        assert_eq!(s.kind(), BackendKind::Chunked);
        assert_eq!(s.flat_data(false).as_ref(), &[3, 11]);
    }

    #[test]
    fn test_zero_block_len_rejected() {
        assert!(ChunkedBackend::<i32>::filled(Shape::new(&[2]), 0, 0).is_err());
    }
}
