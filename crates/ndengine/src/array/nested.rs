//! Nested-list conversion.

use crate::array::NdArray;
use crate::element::Element;
use crate::error::{ArrayError, Result};

/// A nested list of elements; the exchange format of
/// [`NdArray::from_nested`] and [`NdArray::to_nested`].
///
/// Usually built with the [`nested!`](crate::nested) macro.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Leaf(T),
    List(Vec<Nested<T>>),
}

impl<T: Element> Nested<T> {
    /// Dimensions inferred from the first element at each depth.
    pub fn infer_dims(&self) -> Vec<usize> {
        let mut dims = Vec::new();
        let mut node = self;
        while let Nested::List(items) = node {
            dims.push(items.len());
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        dims
    }

    /// Dimensions and depth-first flattened values.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::InvalidArgument`] if any list is empty
    /// - [`ArrayError::ShapeMismatch`] if a list length or nesting depth differs
    ///   from the inferred shape
    pub fn into_flat(self) -> Result<(Vec<usize>, Vec<T>)> {
        let dims = self.infer_dims();
        if dims.contains(&0) {
            return Err(ArrayError::invalid_argument("nested list contains an empty list"));
        }
        let mut data = Vec::with_capacity(dims.iter().product());
        self.flatten_into(&dims, 0, &mut data)?;
        Ok((dims, data))
    }

    fn flatten_into(self, dims: &[usize], depth: usize, out: &mut Vec<T>) -> Result<()> {
        match self {
            Nested::Leaf(value) if depth == dims.len() => {
                out.push(value);
                Ok(())
            }
            Nested::List(items) if depth < dims.len() && items.len() == dims[depth] => {
                for item in items {
                    item.flatten_into(dims, depth + 1, out)?;
                }
                Ok(())
            }
            other => {
                let mut actual = dims[..depth].to_vec();
                actual.extend(other.infer_dims());
                Err(ArrayError::ShapeMismatch {
                    expected: dims.to_vec(),
                    actual,
                })
            }
        }
    }
}

impl<T: Element> NdArray<T> {
    /// Contents as a nested list; a 0-d array gives a bare leaf.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::{NdArray, nested};
    ///
    /// let a = NdArray::from_flat(vec![1, 2, 3, 4], &[2, 2]).unwrap();
    /// assert_eq!(a.to_nested(), nested![[1, 2], [3, 4]]);
    /// ```
    pub fn to_nested(&self) -> Nested<T> {
        let data = self.flat_data(false);
        let mut values = data.iter().cloned();
        build(self.dims(), &mut values)
    }
}

fn build<T, I: Iterator<Item = T>>(dims: &[usize], values: &mut I) -> Nested<T> {
    match dims.split_first() {
        None => match values.next() {
            Some(value) => Nested::Leaf(value),
            None => Nested::List(Vec::new()),
        },
        Some((&len, rest)) => Nested::List((0..len).map(|_| build(rest, values)).collect()),
    }
}

/// Build a [`Nested`] list from bracketed literals.
///
/// ```
/// use ndengine::{Nested, nested};
///
/// let n = nested![[1, 2], [3, 4]];
/// assert_eq!(
///     n,
///     Nested::List(vec![
///         Nested::List(vec![Nested::Leaf(1), Nested::Leaf(2)]),
///         Nested::List(vec![Nested::Leaf(3), Nested::Leaf(4)]),
///     ])
/// );
/// ```
#[macro_export]
macro_rules! nested {
    ($([$($inner:tt)*]),+ $(,)?) => {
        $crate::Nested::List(::std::vec![$($crate::nested![$($inner)*]),+])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Nested::List(::std::vec![$($crate::Nested::Leaf($value)),+])
    };
}
