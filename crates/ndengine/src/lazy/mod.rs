//! Deferred element-wise computation.
//!
//! ```text
//! LazyNdArray
//! ├── op: LazyOp                       element-wise recipe
//! │   ├── Map    { source, f }
//! │   ├── Binary { left, right, op }
//! │   └── Scalar { source, scalar, op }
//! └── materialized: Option<NdArray>    set once, never cleared
//! ```
//!
//! Sources are snapshots of concrete arrays or other lazy arrays. Element
//! functions return [`Result`](crate::Result), so a failure inside one (for
//! example an integer division by zero) surfaces only when the offending
//! element is evaluated.
//!
//! [`LazyNdArray::optimize`] collapses chains of maps into one node. Binary
//! and scalar nodes optimize their children but are never fused.

mod array;
mod op;

pub use array::LazyNdArray;
pub use op::{BinaryFn, LazyOp, LazySource, UnaryFn};
