//! Sequential chunk streaming along one axis.

use crate::array::NdArray;
use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::slice::SliceSpec;

/// A contiguous run of positions `[start, start + len)` along `axis`.
///
/// `array` keeps every other axis whole, so its rank equals the source rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<T: Element> {
    pub axis: usize,
    pub start: usize,
    pub len: usize,
    pub array: NdArray<T>,
}

/// Iterator over [`Chunk`]s, created by [`NdArray::axis_chunks`].
///
/// Chunks are sliced from the source one at a time as the iterator advances.
#[derive(Debug)]
pub struct AxisChunks<'a, T: Element> {
    array: &'a NdArray<T>,
    axis: usize,
    chunk_size: usize,
    next_start: usize,
}

impl<'a, T: Element> AxisChunks<'a, T> {
    pub(crate) fn new(array: &'a NdArray<T>, axis: usize, chunk_size: usize) -> Result<Self> {
        if axis >= array.ndim() {
            return Err(ArrayError::InvalidAxis {
                axis,
                ndim: array.ndim(),
            });
        }
        if chunk_size == 0 {
            return Err(ArrayError::invalid_argument("chunk size must be positive"));
        }
        Ok(Self {
            array,
            axis,
            chunk_size,
            next_start: 0,
        })
    }

    fn axis_len(&self) -> usize {
        self.array.dims()[self.axis]
    }

    fn slice_chunk(&self, start: usize, len: usize) -> Result<Chunk<T>> {
        let mut specs = vec![SliceSpec::All; self.axis];
        specs.push(SliceSpec::range(start as isize, (start + len) as isize));
        let array = self.array.slice(&specs)?.into_array()?;
        Ok(Chunk {
            axis: self.axis,
            start,
            len,
            array,
        })
    }
}

impl<T: Element> Iterator for AxisChunks<'_, T> {
    type Item = Result<Chunk<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let axis_len = self.axis_len();
        if self.next_start >= axis_len {
            return None;
        }
        let start = self.next_start;
        let len = self.chunk_size.min(axis_len - start);
        self.next_start += len;
        Some(self.slice_chunk(start, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.axis_len() - self.next_start.min(self.axis_len())).div_ceil(self.chunk_size);
        (remaining, Some(remaining))
    }
}

impl<T: Element> NdArray<T> {
    /// Ordered, non-overlapping chunks of at most `chunk_size` positions
    /// along `axis`; the last chunk may be shorter.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument`-kind error for `axis >= ndim` or
    /// `chunk_size == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat((0..10).collect(), &[5, 2]).unwrap();
    /// let lens: Vec<usize> = a
    ///     .axis_chunks(0, 2)
    ///     .unwrap()
    ///     .map(|c| c.unwrap().len)
    ///     .collect();
    /// assert_eq!(lens, vec![2, 2, 1]);
    /// ```
    pub fn axis_chunks(&self, axis: usize, chunk_size: usize) -> Result<AxisChunks<'_, T>> {
        AxisChunks::new(self, axis, chunk_size)
    }

    /// Fold `f` over the chunks along `axis`, in order, on the calling thread.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_flat((1..=12).collect::<Vec<i64>>(), &[6, 2]).unwrap();
    /// let total = a.fold_chunks(0, 4, 0, |acc, chunk| Ok(acc + chunk.array.sum())).unwrap();
    /// assert_eq!(total, 78);
    /// ```
    pub fn fold_chunks<B, F>(&self, axis: usize, chunk_size: usize, init: B, mut f: F) -> Result<B>
    where
        F: FnMut(B, Chunk<T>) -> Result<B>,
    {
        let mut acc = init;
        for chunk in self.axis_chunks(axis, chunk_size)? {
            acc = f(acc, chunk?)?;
        }
        Ok(acc)
    }
}
