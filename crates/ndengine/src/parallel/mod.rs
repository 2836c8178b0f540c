//! Chunked parallel processing.
//!
//! ```text
//! divide_into_chunks ──► [Chunk 0][Chunk 1]...[Chunk n]
//!                           │ ChunkPayload (copied data, shape, config)
//!                           ▼
//!        worker pool, batches of at most `max_workers`
//!                           │ results indexed by submission order
//!                           ▼
//!              combiner / concatenate_chunks
//! ```
//!
//! Workers never see the source array: each receives an owned copy of its
//! chunk plus a shared reference to the processor. A chunk whose worker
//! cannot run it (pool unavailable, worker panic) is retried synchronously on
//! the calling thread, with a warning logged. An `Err` returned by the
//! processor is a logic error and propagates unchanged.

mod chunks;
mod dispatch;

pub use chunks::{ChunkPayload, concatenate_chunks, divide_into_chunks};
pub use dispatch::{ChunkDispatcher, parallel_map, parallel_sum};
