//! Chunk splitting, worker payloads and reassembly.

use std::borrow::Borrow;

use crate::array::{Chunk, NdArray, concatenate};
use crate::config::ArrayConfig;
use crate::element::Element;
use crate::error::Result;
use crate::shape::Shape;

/// Split `array` into ordered, non-overlapping chunks along `axis`.
///
/// Every chunk holds `chunk_size` positions except possibly the last; the
/// chunks cover `[0, axis_len)` exactly.
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
/// use ndengine::parallel::divide_into_chunks;
///
/// let a = NdArray::from_flat((0..14).collect(), &[7, 2]).unwrap();
/// let chunks = divide_into_chunks(&a, 0, 3).unwrap();
/// let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
/// assert_eq!(starts, vec![0, 3, 6]);
/// assert_eq!(chunks[2].array.dims(), &[1, 2]);
/// ```
pub fn divide_into_chunks<T: Element>(
    array: &NdArray<T>,
    axis: usize,
    chunk_size: usize,
) -> Result<Vec<Chunk<T>>> {
    array.axis_chunks(axis, chunk_size)?.collect()
}

/// Reassemble per-chunk outputs along `axis`, in order.
///
/// The outputs must agree on every dimension except `axis`; matching the
/// shape a caller expects is the processor's responsibility.
pub fn concatenate_chunks<T, A>(outputs: &[A], axis: usize) -> Result<NdArray<T>>
where
    T: Element,
    A: Borrow<NdArray<T>>,
{
    concatenate(outputs, axis)
}

/// Owned copy of one chunk, shipped to a worker.
///
/// Holds no reference into the source data. The config travels with it so
/// the rebuilt chunk uses the source's backend selection.
#[derive(Debug, Clone)]
pub struct ChunkPayload<T: Element> {
    pub data: Vec<T>,
    pub shape: Shape,
    pub config: ArrayConfig<T>,
}

impl<T: Element> ChunkPayload<T> {
    pub fn from_chunk(chunk: &Chunk<T>) -> Self {
        Self {
            data: chunk.array.to_flat_vec(),
            shape: chunk.array.shape().clone(),
            config: chunk.array.config().clone(),
        }
    }

    /// Rebuild the chunk as a standalone array.
    ///
    /// # Errors
    ///
    /// A `ShapeMismatch`-kind error if `data` does not fill `shape`.
    pub fn into_array(self) -> Result<NdArray<T>> {
        NdArray::from_flat_with_config(self.data, self.shape.dims(), self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::{BackendKind, FixedSelector};
    use std::sync::Arc;

    #[test]
    fn test_chunks_are_ordered_and_cover() {
        let a = NdArray::from_flat((0..30).collect(), &[3, 10]).unwrap();
        let chunks = divide_into_chunks(&a, 1, 4).unwrap();
        let spans: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.len)).collect();
        assert_eq!(spans, vec![(0, 4), (4, 4), (8, 2)]);
        assert!(chunks.iter().all(|c| c.axis == 1));
    }

    #[test]
    fn test_identity_round_trip() {
        let a = NdArray::from_flat((0..30).collect(), &[3, 10]).unwrap();
        for axis in 0..2 {
            let chunks = divide_into_chunks(&a, axis, 4).unwrap();
            let arrays: Vec<NdArray<i32>> = chunks.into_iter().map(|c| c.array).collect();
            assert_eq!(concatenate_chunks(&arrays, axis).unwrap(), a);
        }
    }

    #[test]
    fn test_invalid_split() {
        let a = NdArray::from_vec(vec![1, 2, 3]).unwrap();
        assert_eq!(divide_into_chunks(&a, 1, 2).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(divide_into_chunks(&a, 0, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_payload_round_trip() {
        let a = NdArray::from_flat((0..6).collect(), &[3, 2]).unwrap();
        let chunk = divide_into_chunks(&a, 0, 2).unwrap().remove(1);
        let payload = ChunkPayload::from_chunk(&chunk);
        assert_eq!(payload.data, vec![4, 5]);
        assert_eq!(payload.into_array().unwrap(), chunk.array);
    }

    #[test]
    fn test_payload_keeps_backend_selection() {
        let config = ArrayConfig::default().with_selector(Arc::new(FixedSelector::new(BackendKind::Sparse)));
        let a = NdArray::from_flat_with_config((0..12).collect::<Vec<i32>>(), &[4, 3], config).unwrap();
        let chunk = divide_into_chunks(&a, 0, 3).unwrap().remove(0);
        let rebuilt = ChunkPayload::from_chunk(&chunk).into_array().unwrap();
        assert_eq!(rebuilt.backend_kind(), BackendKind::Sparse);
        assert_eq!(rebuilt, chunk.array);
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let payload = ChunkPayload {
            data: vec![1, 2, 3],
            shape: Shape::new(&[2, 2]),
            config: ArrayConfig::default(),
        };
        assert_eq!(payload.into_array().unwrap_err().kind(), ErrorKind::ShapeMismatch);
    }
}
