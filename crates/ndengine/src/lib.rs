//! ndengine - n-dimensional array engine
//!
//! Row-major n-dimensional arrays over pluggable storage backends, with lazy
//! fused element-wise operations and chunked parallel dispatch.
//!
//! # Architecture
//!
//! ```text
//! NdArray<T>                       shape, attributes, config
//!     │
//!     ├── ArrayConfig              injected backend selector, copy-on-write flag
//!     │       └── BackendSelector  picks Dense / Chunked / Sparse per array
//!     │
//!     └── Box<dyn StorageBackend>  get / set / slice / copy / memory_usage
//!
//! LazyNdArray<T>                   deferred Map / Binary / Scalar graph
//!     └── optimize                 fuses map chains
//!
//! ChunkDispatcher                  split along an axis, bounded worker pool,
//!                                  ordered reassembly
//! ```
//!
//! # Example
//!
//! ```
//! use ndengine::{NdArray, SliceResult, s};
//!
//! let a = NdArray::from_flat((1..=12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
//! assert_eq!(a.get(&[1, 2]).unwrap(), 7);
//!
//! // Selecting a row drops an axis.
//! let row = a.slice(&s![1]).unwrap();
//! assert!(matches!(row, SliceResult::Vector(_)));
//!
//! // Lazy operations evaluate on demand.
//! let lazy = a.lazy_scalar_mul(10).map(|x| x + 1);
//! assert_eq!(lazy.get(&[0, 0]).unwrap(), 11);
//! ```

pub mod error;
pub mod strides;
pub mod storage;
pub mod parallel;

mod array;
mod config;
mod element;
mod lazy;
mod shape;
mod slice;
mod value;

pub use array::{AxisChunks, Chunk, NdArray, Nested, RandomNormal, RandomUniform, SliceResult, Values, concatenate};
pub use config::ArrayConfig;
pub use element::{Element, Scalar};
pub use error::{ArrayError, ErrorKind, Result};
pub use lazy::{BinaryFn, LazyNdArray, LazyOp, LazySource, UnaryFn};
pub use parallel::{ChunkDispatcher, ChunkPayload, concatenate_chunks, divide_into_chunks, parallel_map, parallel_sum};
pub use shape::Shape;
pub use slice::{ResolvedSlice, SliceSpec};
pub use value::{Attributes, Value};
