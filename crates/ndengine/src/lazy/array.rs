//! Lazily evaluated arrays.

use std::fmt;
use std::sync::Arc;

use log::debug;
use num_traits::Zero;

use crate::array::NdArray;
use crate::config::ArrayConfig;
use crate::element::{Element, Scalar};
use crate::error::{ArrayError, Result};
use crate::lazy::op::{BinaryFn, LazyOp, LazySource, UnaryFn};
use crate::shape::Shape;
use crate::strides::increment_indices;

/// An array defined by a [`LazyOp`] graph, evaluated on demand.
///
/// The array starts pending. [`get`](Self::get) computes single elements
/// without changing state; [`materialize`](Self::materialize) and
/// [`set`](Self::set) evaluate the whole graph once and cache the result.
/// A materialized array never returns to pending.
///
/// # Example
///
/// ```
/// use ndengine::{NdArray, nested};
///
/// let a = NdArray::from_nested(nested![[1, 2], [3, 4]]).unwrap();
/// let b = NdArray::from_nested(nested![[5, 6], [7, 8]]).unwrap();
///
/// let mut sum = a.lazy_add(&b).unwrap().scalar_mul(10);
/// assert!(!sum.is_materialized());
/// assert_eq!(sum.get(&[0, 1]).unwrap(), 80);
///
/// let values = sum.materialize().unwrap().to_flat_vec();
/// assert_eq!(values, vec![60, 80, 100, 120]);
/// ```
#[derive(Clone)]
pub struct LazyNdArray<T: Element> {
    pub(super) op: LazyOp<T>,
    pub(super) materialized: Option<NdArray<T>>,
    pub(super) config: ArrayConfig<T>,
}

impl<T: Element> LazyNdArray<T> {
    /// Pending array over `op`; `config` builds the materialized result.
    pub fn new(op: LazyOp<T>, config: ArrayConfig<T>) -> Self {
        Self {
            op,
            materialized: None,
            config,
        }
    }

    /// Pending identity map over `array`.
    pub fn from_array(array: NdArray<T>) -> Self {
        let config = array.config().clone();
        let identity: UnaryFn<T> = Arc::new(Ok::<T, ArrayError>);
        Self::new(
            LazyOp::Map {
                source: array.into(),
                f: identity,
            },
            config,
        )
    }

    pub fn shape(&self) -> &Shape {
        match &self.materialized {
            Some(array) => array.shape(),
            None => self.op.shape(),
        }
    }

    pub fn dims(&self) -> &[usize] {
        self.shape().dims()
    }

    pub fn ndim(&self) -> usize {
        self.shape().ndim()
    }

    pub fn size(&self) -> usize {
        self.shape().size()
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized.is_some()
    }

    /// The operation graph.
    pub fn op(&self) -> &LazyOp<T> {
        &self.op
    }

    /// Pending graph nodes; zero once materialized.
    pub fn op_count(&self) -> usize {
        if self.is_materialized() {
            0
        } else {
            self.op.op_count()
        }
    }

    /// Element at `indices`.
    ///
    /// Reads the cached result once materialized; otherwise computes just
    /// this element and leaves the array pending.
    ///
    /// # Errors
    ///
    /// - an `IndexOutOfRange`-kind error for bad indices
    /// - whatever an element function returns for this element
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        if let Some(array) = &self.materialized {
            return array.get(indices);
        }
        self.shape().check_indices(indices)?;
        self.op.compute(indices)
    }

    /// Materialize, then overwrite the element at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        self.materialize_mut()?.set(indices, value)
    }

    /// Evaluate the graph once and cache the result.
    ///
    /// Later calls return the cached array without recomputing.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an element function; the array then
    /// stays pending.
    pub fn materialize(&mut self) -> Result<&NdArray<T>> {
        self.materialize_mut().map(|array| &*array)
    }

    fn materialize_mut(&mut self) -> Result<&mut NdArray<T>> {
        let array = match self.materialized.take() {
            Some(array) => array,
            None => evaluate(&self.op, &self.config)?,
        };
        Ok(self.materialized.insert(array))
    }

    /// The concrete array, evaluating if still pending.
    pub fn into_array(self) -> Result<NdArray<T>> {
        match self.materialized {
            Some(array) => Ok(array),
            None => evaluate(&self.op, &self.config),
        }
    }

    /// Collapse map chains in the pending graph.
    ///
    /// Materialized arrays are returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a = NdArray::from_vec(vec![1, 2, 3]).unwrap();
    /// let chain = a.lazy_map(|x| x + 1).map(|x| x * 2).map(|x| x - 3);
    /// assert_eq!(chain.op_count(), 3);
    ///
    /// let fused = chain.optimize();
    /// assert_eq!(fused.op_count(), 1);
    /// assert_eq!(fused.into_array().unwrap().to_flat_vec(), vec![1, 3, 5]);
    /// ```
    pub fn optimize(self) -> Self {
        if self.is_materialized() {
            return self;
        }
        let before = self.op.op_count();
        let op = self.op.optimize();
        debug!("optimized lazy graph from {before} to {} nodes", op.op_count());
        Self {
            op,
            materialized: None,
            config: self.config,
        }
    }

    /// Pending map of `f` over this array.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.try_map(move |x| Ok(f(x)))
    }

    /// Pending map of a fallible `f`; errors surface at evaluation.
    pub fn try_map<F>(self, f: F) -> Self
    where
        F: Fn(T) -> Result<T> + Send + Sync + 'static,
    {
        let config = self.config.clone();
        Self::new(
            LazyOp::Map {
                source: self.into(),
                f: Arc::new(f),
            },
            config,
        )
    }

    /// Pending element-wise combination with `other`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] immediately if the shapes differ.
    pub fn zip_with<S, F>(self, other: S, op: F) -> Result<Self>
    where
        S: Into<LazySource<T>>,
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        let config = self.config.clone();
        let op = LazyOp::binary(self.into(), other.into(), Arc::new(op))?;
        Ok(Self::new(op, config))
    }

    /// Pending combination of every element with `scalar`.
    pub fn scalar_op<F>(self, scalar: T, op: F) -> Self
    where
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        let config = self.config.clone();
        Self::new(
            LazyOp::Scalar {
                source: self.into(),
                scalar,
                op: Arc::new(op),
            },
            config,
        )
    }
}

impl<T: Scalar> LazyNdArray<T> {
    pub fn add<S: Into<LazySource<T>>>(self, other: S) -> Result<Self> {
        self.zip_with(other, |a, b| Ok(a + b))
    }

    pub fn sub<S: Into<LazySource<T>>>(self, other: S) -> Result<Self> {
        self.zip_with(other, |a, b| Ok(a - b))
    }

    pub fn mul<S: Into<LazySource<T>>>(self, other: S) -> Result<Self> {
        self.zip_with(other, |a, b| Ok(a * b))
    }

    /// Element-wise quotient; a zero divisor fails when that element is evaluated.
    pub fn div<S: Into<LazySource<T>>>(self, other: S) -> Result<Self> {
        self.zip_with(other, checked_div)
    }

    pub fn scalar_add(self, scalar: T) -> Self {
        self.scalar_op(scalar, |a, b| Ok(a + b))
    }

    pub fn scalar_sub(self, scalar: T) -> Self {
        self.scalar_op(scalar, |a, b| Ok(a - b))
    }

    pub fn scalar_mul(self, scalar: T) -> Self {
        self.scalar_op(scalar, |a, b| Ok(a * b))
    }

    pub fn scalar_div(self, scalar: T) -> Self {
        self.scalar_op(scalar, checked_div)
    }
}

impl<T: Element> fmt::Debug for LazyNdArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyNdArray")
            .field("shape", self.shape())
            .field("materialized", &self.is_materialized())
            .field("op", &self.op)
            .finish()
    }
}

impl<T: Element> NdArray<T> {
    /// Pending identity over a snapshot of this array.
    ///
    /// Later writes to `self` are not seen by the lazy array. A dense
    /// source is shared, not copied; see [`snapshot`](Self::snapshot).
    pub fn lazy(&self) -> LazyNdArray<T> {
        LazyNdArray::from_array(self.snapshot())
    }

    /// Like [`lazy`](Self::lazy), consuming the array instead of copying it.
    pub fn into_lazy(self) -> LazyNdArray<T> {
        LazyNdArray::from_array(self)
    }

    /// Pending map of `f` over a snapshot of this array.
    pub fn lazy_map<F>(&self, f: F) -> LazyNdArray<T>
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.lazy_try_map(move |x| Ok(f(x)))
    }

    /// Pending map of a fallible `f`; errors surface at evaluation.
    pub fn lazy_try_map<F>(&self, f: F) -> LazyNdArray<T>
    where
        F: Fn(T) -> Result<T> + Send + Sync + 'static,
    {
        LazyNdArray::new(
            LazyOp::Map {
                source: self.into(),
                f: Arc::new(f),
            },
            self.config().clone(),
        )
    }

    /// Pending element-wise combination of snapshots of `self` and `other`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::ShapeMismatch`] immediately if the shapes differ.
    pub fn lazy_zip_with<F>(&self, other: &NdArray<T>, op: F) -> Result<LazyNdArray<T>>
    where
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        let op = LazyOp::binary(self.into(), other.into(), Arc::new(op))?;
        Ok(LazyNdArray::new(op, self.config().clone()))
    }

    fn lazy_scalar_op<F>(&self, scalar: T, op: F) -> LazyNdArray<T>
    where
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        let op: BinaryFn<T> = Arc::new(op);
        LazyNdArray::new(
            LazyOp::Scalar {
                source: self.into(),
                scalar,
                op,
            },
            self.config().clone(),
        )
    }
}

impl<T: Scalar> NdArray<T> {
    pub fn lazy_add(&self, other: &NdArray<T>) -> Result<LazyNdArray<T>> {
        self.lazy_zip_with(other, |a, b| Ok(a + b))
    }

    pub fn lazy_sub(&self, other: &NdArray<T>) -> Result<LazyNdArray<T>> {
        self.lazy_zip_with(other, |a, b| Ok(a - b))
    }

    pub fn lazy_mul(&self, other: &NdArray<T>) -> Result<LazyNdArray<T>> {
        self.lazy_zip_with(other, |a, b| Ok(a * b))
    }

    /// Pending quotient; a zero divisor fails when that element is evaluated.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::{ErrorKind, NdArray};
    ///
    /// let a = NdArray::from_vec(vec![6, 8]).unwrap();
    /// let b = NdArray::from_vec(vec![3, 0]).unwrap();
    /// let q = a.lazy_div(&b).unwrap();
    ///
    /// assert_eq!(q.get(&[0]).unwrap(), 2);
    /// assert_eq!(q.get(&[1]).unwrap_err().kind(), ErrorKind::Computation);
    /// ```
    pub fn lazy_div(&self, other: &NdArray<T>) -> Result<LazyNdArray<T>> {
        self.lazy_zip_with(other, checked_div)
    }

    pub fn lazy_scalar_add(&self, scalar: T) -> LazyNdArray<T> {
        self.lazy_scalar_op(scalar, |a, b| Ok(a + b))
    }

    pub fn lazy_scalar_sub(&self, scalar: T) -> LazyNdArray<T> {
        self.lazy_scalar_op(scalar, |a, b| Ok(a - b))
    }

    pub fn lazy_scalar_mul(&self, scalar: T) -> LazyNdArray<T> {
        self.lazy_scalar_op(scalar, |a, b| Ok(a * b))
    }

    pub fn lazy_scalar_div(&self, scalar: T) -> LazyNdArray<T> {
        self.lazy_scalar_op(scalar, checked_div)
    }
}

fn checked_div<T: Scalar>(a: T, b: T) -> Result<T> {
    if b.is_zero() {
        return Err(ArrayError::computation(format!("division of {a:?} by zero")));
    }
    Ok(a / b)
}

/// Compute every element of `op` in row-major order.
fn evaluate<T: Element>(op: &LazyOp<T>, config: &ArrayConfig<T>) -> Result<NdArray<T>> {
    let shape = op.shape().clone();
    let mut data = Vec::with_capacity(shape.size());
    if shape.size() > 0 {
        let mut indices = vec![0usize; shape.ndim()];
        loop {
            data.push(op.compute(&indices)?);
            if !increment_indices(&mut indices, shape.dims()) {
                break;
            }
        }
    }
    debug!("materialized {} lazy nodes into shape {shape}", op.op_count());
    NdArray::from_flat_with_config(data, shape.dims(), config.clone())
}
