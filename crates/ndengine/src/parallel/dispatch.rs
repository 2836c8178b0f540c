//! Bounded worker pool dispatch over array chunks.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, mpsc};
use std::thread;

use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::array::{Chunk, NdArray};
use crate::element::{Element, Scalar};
use crate::error::{ArrayError, Result};
use crate::parallel::chunks::{ChunkPayload, concatenate_chunks, divide_into_chunks};

const DEFAULT_CHUNK_SIZE: usize = 1024;

type PoolSlot = Arc<OnceLock<std::result::Result<ThreadPool, ThreadPoolBuildError>>>;

/// Splits an array along one axis and runs a processor over the chunks on a
/// bounded worker pool.
///
/// # Example
///
/// ```
/// use ndengine::{ChunkDispatcher, NdArray};
///
/// let a = NdArray::from_flat((0..12).collect::<Vec<i64>>(), &[6, 2]).unwrap();
/// let dispatcher = ChunkDispatcher::new().with_max_workers(2).unwrap().with_chunk_size(2).unwrap();
///
/// let sums = dispatcher.map_chunks(&a, |chunk| Ok(chunk.sum())).unwrap();
/// assert_eq!(sums, vec![6, 22, 38]);
/// ```
///
/// The worker pool is built on first use and reused by later calls and by
/// clones of the dispatcher.
#[derive(Debug, Clone)]
pub struct ChunkDispatcher {
    max_workers: usize,
    chunk_size: usize,
    axis: usize,
    pool: PoolSlot,
}

impl Default for ChunkDispatcher {
    fn default() -> Self {
        Self {
            max_workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            chunk_size: DEFAULT_CHUNK_SIZE,
            axis: 0,
            pool: PoolSlot::default(),
        }
    }
}

impl ChunkDispatcher {
    /// One worker per available core, chunks of 1024 positions along axis 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidArgument`] if `max_workers` is zero.
    pub fn with_max_workers(mut self, max_workers: usize) -> Result<Self> {
        if max_workers == 0 {
            return Err(ArrayError::invalid_argument("max_workers must be positive"));
        }
        if max_workers != self.max_workers {
            self.max_workers = max_workers;
            self.pool = PoolSlot::default();
        }
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidArgument`] if `chunk_size` is zero.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ArrayError::invalid_argument("chunk size must be positive"));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Axis to split along; validated against the array at dispatch time.
    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Run `processor` on every chunk and return its outputs in chunk order.
    ///
    /// Chunks are submitted in batches of at most `max_workers`; each batch
    /// is joined before the next one starts. A chunk whose worker panics or
    /// cannot rebuild its input, or every chunk if the pool cannot be built,
    /// is rerun on the calling thread.
    ///
    /// # Errors
    ///
    /// Splitting errors (bad axis), and the first `Err` returned by
    /// `processor` in chunk order.
    pub fn map_chunks<T, R, F>(&self, array: &NdArray<T>, processor: F) -> Result<Vec<R>>
    where
        T: Element,
        R: Send,
        F: Fn(&NdArray<T>) -> Result<R> + Send + Sync,
    {
        let chunks = divide_into_chunks(array, self.axis, self.chunk_size)?;
        debug!(
            "dispatching {} chunks of shape {} along axis {} to {} workers",
            chunks.len(),
            array.shape(),
            self.axis,
            self.max_workers
        );

        let pool = match self.pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("worker pool unavailable ({e}), running {} chunks synchronously", chunks.len());
                None
            }
        };

        let mut results = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.max_workers) {
            let outcomes = match pool {
                Some(pool) => run_batch(pool, batch, &processor),
                None => batch.iter().map(|_| None).collect(),
            };
            for (chunk, outcome) in batch.iter().zip(outcomes) {
                let result = match outcome {
                    Some(result) => result,
                    None => {
                        if pool.is_some() {
                            warn!(
                                "worker failed on chunk [{}, {}) along axis {}, retrying on the calling thread",
                                chunk.start,
                                chunk.start + chunk.len,
                                chunk.axis
                            );
                        }
                        processor(&chunk.array)
                    }
                };
                results.push(result?);
            }
        }
        Ok(results)
    }

    /// [`map_chunks`](Self::map_chunks) followed by `combiner` over the
    /// ordered outputs.
    pub fn process<T, R, O, F, C>(&self, array: &NdArray<T>, processor: F, combiner: C) -> Result<O>
    where
        T: Element,
        R: Send,
        F: Fn(&NdArray<T>) -> Result<R> + Send + Sync,
        C: FnOnce(Vec<R>) -> Result<O>,
    {
        combiner(self.map_chunks(array, processor)?)
    }

    /// Run an array-to-array `processor` per chunk and concatenate the
    /// outputs along the dispatch axis.
    ///
    /// Outputs must agree on every dimension except the dispatch axis. The
    /// result carries the source attributes. An empty dispatch axis yields
    /// an empty array of the source shape without calling `processor`.
    pub fn map_array<T, U, F>(&self, array: &NdArray<T>, processor: F) -> Result<NdArray<U>>
    where
        T: Element,
        U: Element,
        F: Fn(&NdArray<T>) -> Result<NdArray<U>> + Send + Sync,
    {
        let outputs = self.map_chunks(array, processor)?;
        let mut result = if outputs.is_empty() {
            NdArray::from_flat(Vec::new(), array.dims())?
        } else {
            concatenate_chunks(&outputs, self.axis)?
        };
        *result.attrs_mut() = array.attrs().clone();
        Ok(result)
    }

    fn pool(&self) -> &std::result::Result<ThreadPool, ThreadPoolBuildError> {
        self.pool.get_or_init(|| {
            debug!("building worker pool with {} threads", self.max_workers);
            ThreadPoolBuilder::new()
                .num_threads(self.max_workers)
                .thread_name(|i| format!("ndengine-worker-{i}"))
                .build()
        })
    }
}

/// Rebuild `payload` and run `processor` on it; `None` if the chunk cannot
/// be rebuilt.
fn run_payload<T, R, F>(payload: ChunkPayload<T>, processor: &F) -> Option<Result<R>>
where
    T: Element,
    F: Fn(&NdArray<T>) -> Result<R>,
{
    match payload.into_array() {
        Ok(chunk) => Some(processor(&chunk)),
        Err(e) => {
            warn!("could not rebuild chunk on worker: {e}");
            None
        }
    }
}

/// Run one batch on `pool`; `None` marks a chunk whose worker failed.
fn run_batch<T, R, F>(pool: &ThreadPool, batch: &[Chunk<T>], processor: &F) -> Vec<Option<Result<R>>>
where
    T: Element,
    R: Send,
    F: Fn(&NdArray<T>) -> Result<R> + Send + Sync,
{
    let (tx, rx) = mpsc::channel();
    pool.scope(|scope| {
        for (slot, chunk) in batch.iter().enumerate() {
            let payload = ChunkPayload::from_chunk(chunk);
            let tx = tx.clone();
            scope.spawn(move |_| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_payload(payload, processor)))
                    .ok()
                    .flatten();
                // The receiver outlives the scope.
                let _ = tx.send((slot, outcome));
            });
        }
    });
    drop(tx);

    let mut outcomes: Vec<Option<Result<R>>> = batch.iter().map(|_| None).collect();
    for (slot, outcome) in rx {
        outcomes[slot] = outcome;
    }
    outcomes
}

/// Sum of all elements, one partial sum per chunk.
pub fn parallel_sum<T: Scalar>(array: &NdArray<T>, dispatcher: &ChunkDispatcher) -> Result<T> {
    dispatcher.process(
        array,
        |chunk| Ok(chunk.sum()),
        |partials| Ok(partials.into_iter().fold(T::zero(), |acc, x| acc + x)),
    )
}

/// Element-wise `f` applied chunk by chunk; equal to `array.map(f)`.
pub fn parallel_map<T, F>(array: &NdArray<T>, dispatcher: &ChunkDispatcher, f: F) -> Result<NdArray<T>>
where
    T: Element,
    F: Fn(&T) -> T + Send + Sync,
{
    dispatcher.map_array(array, |chunk| chunk.map(&f))
}
