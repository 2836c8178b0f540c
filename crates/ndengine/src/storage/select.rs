//! Backend selection strategies.

use std::fmt::Debug;

use log::debug;

use crate::element::Element;
use crate::error::Result;
use crate::shape::Shape;
use crate::storage::chunked::DEFAULT_BLOCK_LEN;
use crate::storage::{
    BackendKind, ChunkedBackend, DenseBackend, InitialData, SparseBackend, StorageBackend,
};

/// Strategy deciding which backend stores a new array.
///
/// Injected through [`ArrayConfig`](crate::ArrayConfig); the array core never
/// picks a backend on its own.
pub trait BackendSelector<T: Element>: Debug + Send + Sync {
    /// Build storage for `shape` holding `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::LengthMismatch`](crate::ArrayError::LengthMismatch) when `initial` holds values
    /// whose count differs from `shape.size()`.
    fn select_backend(
        &self,
        shape: Shape,
        initial: InitialData<T>,
    ) -> Result<Box<dyn StorageBackend<T>>>;
}

/// Size-based heuristics.
///
/// - fills of at least `sparse_threshold` elements go to [`SparseBackend`]
/// - anything of at least `chunk_threshold` elements goes to [`ChunkedBackend`]
/// - everything else is [`DenseBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSelector {
    pub sparse_threshold: usize,
    pub chunk_threshold: usize,
    pub block_len: usize,
}

impl Default for DefaultSelector {
    fn default() -> Self {
        Self {
            sparse_threshold: 1 << 24,
            chunk_threshold: 1 << 26,
            block_len: DEFAULT_BLOCK_LEN,
        }
    }
}

impl DefaultSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sparse_threshold(mut self, elements: usize) -> Self {
        self.sparse_threshold = elements;
        self
    }

    pub fn with_chunk_threshold(mut self, elements: usize) -> Self {
        self.chunk_threshold = elements;
        self
    }

    pub fn with_block_len(mut self, block_len: usize) -> Self {
        self.block_len = block_len;
        self
    }

    /// The backend kind these heuristics pick.
    pub fn choose<T>(&self, shape: &Shape, initial: &InitialData<T>) -> BackendKind {
        let size = shape.size();
        match initial {
            InitialData::Fill(_) if size >= self.sparse_threshold => BackendKind::Sparse,
            _ if size >= self.chunk_threshold => BackendKind::Chunked,
            _ => BackendKind::Dense,
        }
    }
}

impl<T: Element> BackendSelector<T> for DefaultSelector {
    fn select_backend(
        &self,
        shape: Shape,
        initial: InitialData<T>,
    ) -> Result<Box<dyn StorageBackend<T>>> {
        let kind = self.choose(&shape, &initial);
        debug!("selected {kind:?} backend for shape {shape}");
        build(kind, shape, initial, self.block_len)
    }
}

/// Always builds the same backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSelector {
    pub kind: BackendKind,
    pub block_len: usize,
}

impl FixedSelector {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            block_len: DEFAULT_BLOCK_LEN,
        }
    }

    pub fn with_block_len(mut self, block_len: usize) -> Self {
        self.block_len = block_len;
        self
    }
}

impl<T: Element> BackendSelector<T> for FixedSelector {
    fn select_backend(
        &self,
        shape: Shape,
        initial: InitialData<T>,
    ) -> Result<Box<dyn StorageBackend<T>>> {
        build(self.kind, shape, initial, self.block_len)
    }
}

fn build<T: Element>(
    kind: BackendKind,
    shape: Shape,
    initial: InitialData<T>,
    block_len: usize,
) -> Result<Box<dyn StorageBackend<T>>> {
    let backend: Box<dyn StorageBackend<T>> = match (kind, initial) {
        (BackendKind::Dense, InitialData::Fill(v)) => Box::new(DenseBackend::filled(shape, v)),
        (BackendKind::Dense, InitialData::Values(data)) => {
            Box::new(DenseBackend::from_vec(shape, data)?)
        }
        (BackendKind::Chunked, InitialData::Fill(v)) => {
            Box::new(ChunkedBackend::filled(shape, v, block_len)?)
        }
        (BackendKind::Chunked, InitialData::Values(data)) => {
            Box::new(ChunkedBackend::from_vec(shape, data, block_len)?)
        }
        (BackendKind::Sparse, InitialData::Fill(v)) => Box::new(SparseBackend::filled(shape, v)),
        (BackendKind::Sparse, InitialData::Values(data)) => match data.first().cloned() {
            Some(fill) => Box::new(SparseBackend::from_vec(shape, data, fill)?),
            // No value to use as the fill; an empty array needs no storage anyway.
            None => Box::new(DenseBackend::from_vec(shape, data)?),
        },
    };
    Ok(backend)
}
