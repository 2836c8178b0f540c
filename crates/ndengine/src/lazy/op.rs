//! Lazy operation graph nodes.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::array::NdArray;
use crate::element::Element;
use crate::error::{ArrayError, Result};
use crate::lazy::LazyNdArray;
use crate::shape::Shape;

/// Fallible element function of a `Map` node.
pub type UnaryFn<T> = Arc<dyn Fn(T) -> Result<T> + Send + Sync>;

/// Fallible element combiner of `Binary` and `Scalar` nodes.
pub type BinaryFn<T> = Arc<dyn Fn(T, T) -> Result<T> + Send + Sync>;

/// Input of a lazy node.
#[derive(Clone)]
pub enum LazySource<T: Element> {
    /// Snapshot of a concrete array.
    Array(Arc<NdArray<T>>),
    /// Another lazy array, owned by this graph.
    Lazy(Box<LazyNdArray<T>>),
}

impl<T: Element> LazySource<T> {
    pub fn shape(&self) -> &Shape {
        match self {
            LazySource::Array(array) => array.shape(),
            LazySource::Lazy(lazy) => lazy.shape(),
        }
    }

    /// Element at `indices`, computing it if the source is pending.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        match self {
            LazySource::Array(array) => array.get(indices),
            LazySource::Lazy(lazy) => lazy.get(indices),
        }
    }

    fn optimize(self) -> Self {
        match self {
            LazySource::Lazy(lazy) => LazySource::Lazy(Box::new(lazy.optimize())),
            array => array,
        }
    }

    fn op_count(&self) -> usize {
        match self {
            LazySource::Array(_) => 0,
            LazySource::Lazy(lazy) => lazy.op_count(),
        }
    }
}

impl<T: Element> From<NdArray<T>> for LazySource<T> {
    fn from(array: NdArray<T>) -> Self {
        LazySource::Array(Arc::new(array))
    }
}

impl<T: Element> From<&NdArray<T>> for LazySource<T> {
    fn from(array: &NdArray<T>) -> Self {
        LazySource::Array(Arc::new(array.snapshot()))
    }
}

impl<T: Element> From<Arc<NdArray<T>>> for LazySource<T> {
    fn from(array: Arc<NdArray<T>>) -> Self {
        LazySource::Array(array)
    }
}

impl<T: Element> From<LazyNdArray<T>> for LazySource<T> {
    fn from(lazy: LazyNdArray<T>) -> Self {
        LazySource::Lazy(Box::new(lazy))
    }
}

impl<T: Element> fmt::Debug for LazySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazySource::Array(array) => f.debug_tuple("Array").field(array.shape()).finish(),
            LazySource::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
        }
    }
}

/// An element-wise recipe over one or two sources.
#[derive(Clone)]
pub enum LazyOp<T: Element> {
    /// `f(source[i])`.
    Map { source: LazySource<T>, f: UnaryFn<T> },
    /// `op(left[i], right[i])`; both sources share one shape.
    Binary {
        left: LazySource<T>,
        right: LazySource<T>,
        op: BinaryFn<T>,
    },
    /// `op(source[i], scalar)`.
    Scalar {
        source: LazySource<T>,
        scalar: T,
        op: BinaryFn<T>,
    },
}

impl<T: Element> LazyOp<T> {
    /// Binary node over equally shaped sources.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] if the source shapes differ.
    pub fn binary(left: LazySource<T>, right: LazySource<T>, op: BinaryFn<T>) -> Result<Self> {
        if left.shape() != right.shape() {
            return Err(ArrayError::ShapeMismatch {
                expected: left.shape().dims().to_vec(),
                actual: right.shape().dims().to_vec(),
            });
        }
        Ok(LazyOp::Binary { left, right, op })
    }

    /// Shape of the values this node produces.
    pub fn shape(&self) -> &Shape {
        match self {
            LazyOp::Map { source, .. } | LazyOp::Scalar { source, .. } => source.shape(),
            LazyOp::Binary { left, .. } => left.shape(),
        }
    }

    /// Compute the element at `indices`.
    pub fn compute(&self, indices: &[usize]) -> Result<T> {
        match self {
            LazyOp::Map { source, f } => f(source.get(indices)?),
            LazyOp::Binary { left, right, op } => op(left.get(indices)?, right.get(indices)?),
            LazyOp::Scalar { source, scalar, op } => op(source.get(indices)?, scalar.clone()),
        }
    }

    /// Number of pending nodes in this graph.
    pub fn op_count(&self) -> usize {
        match self {
            LazyOp::Map { source, .. } | LazyOp::Scalar { source, .. } => 1 + source.op_count(),
            LazyOp::Binary { left, right, .. } => 1 + left.op_count() + right.op_count(),
        }
    }

    /// Rewrite `Map(Map(x, g), f)` into `Map(x, f . g)`, recursively.
    ///
    /// Children are optimized first, so a chain of any length collapses into
    /// one node. Materialized lazy sources are left in place.
    pub(crate) fn optimize(self) -> Self {
        match self {
            LazyOp::Map { source, f } => match source.optimize() {
                LazySource::Lazy(inner) => match *inner {
                    LazyNdArray {
                        op: LazyOp::Map { source, f: g },
                        materialized: None,
                        ..
                    } => {
                        debug!("fused map into map over shape {}", source.shape());
                        LazyOp::Map {
                            source,
                            f: compose(g, f),
                        }
                    }
                    inner => LazyOp::Map {
                        source: LazySource::Lazy(Box::new(inner)),
                        f,
                    },
                },
                source => LazyOp::Map { source, f },
            },
            LazyOp::Binary { left, right, op } => LazyOp::Binary {
                left: left.optimize(),
                right: right.optimize(),
                op,
            },
            LazyOp::Scalar { source, scalar, op } => LazyOp::Scalar {
                source: source.optimize(),
                scalar,
                op,
            },
        }
    }
}

/// `outer . inner`; the first error short-circuits.
fn compose<T: Element>(inner: UnaryFn<T>, outer: UnaryFn<T>) -> UnaryFn<T> {
    Arc::new(move |x: T| -> Result<T> { outer(inner(x)?) })
}

impl<T: Element> fmt::Debug for LazyOp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazyOp::Map { source, .. } => f
                .debug_struct("Map")
                .field("source", source)
                .finish_non_exhaustive(),
            LazyOp::Binary { left, right, .. } => f
                .debug_struct("Binary")
                .field("left", left)
                .field("right", right)
                .finish_non_exhaustive(),
            LazyOp::Scalar { source, scalar, .. } => f
                .debug_struct("Scalar")
                .field("source", source)
                .field("scalar", scalar)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> LazySource<i32> {
        NdArray::from_vec(vec![1, 2, 3]).unwrap().into()
    }

    #[test]
    fn test_compute_variants() {
        let map = LazyOp::Map {
            source: source(),
            f: Arc::new(|x| Ok(x * 10)),
        };
        assert_eq!(map.compute(&[1]).unwrap(), 20);

        let add: BinaryFn<i32> = Arc::new(|a, b| Ok(a + b));
        let scalar = LazyOp::Scalar {
            source: source(),
            scalar: 5,
            op: add.clone(),
        };
        assert_eq!(scalar.compute(&[2]).unwrap(), 8);

        let binary = LazyOp::binary(source(), source(), add).unwrap();
        assert_eq!(binary.compute(&[0]).unwrap(), 2);
        assert_eq!(binary.op_count(), 1);
    }

    #[test]
    fn test_binary_rejects_shape_mismatch() {
        let other: LazySource<i32> = NdArray::from_vec(vec![1, 2]).unwrap().into();
        let e = LazyOp::binary(source(), other, Arc::new(|a, b| Ok(a + b))).unwrap_err();
        assert_eq!(
            e,
            ArrayError::ShapeMismatch {
                expected: vec![3],
                actual: vec![2]
            }
        );
    }

    #[test]
    fn test_compose_order() {
        let add_one: UnaryFn<i32> = Arc::new(|x| Ok(x + 1));
        let double: UnaryFn<i32> = Arc::new(|x| Ok(x * 2));
        assert_eq!(compose(add_one, double)(3).unwrap(), 8);
    }

    #[test]
    fn test_debug_omits_functions() {
        let map = LazyOp::Map {
            source: source(),
            f: Arc::new(|x| Ok(x * 2)),
        };
        assert_eq!(format!("{map:?}"), "Map { source: Array(Shape([3])), .. }");
    }
}
