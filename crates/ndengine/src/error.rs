//! Error types for ndengine.
//!
//! Every fallible operation returns [`ArrayError`]. Variants carry structured
//! context; [`ArrayError::kind`] folds them into the four-way taxonomy that
//! callers usually branch on.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Shapes or lengths disagree (reshape, binary ops, masks, `from_flat`).
    ShapeMismatch,
    /// Point access or `put`/`put_at` outside the array.
    IndexOutOfRange,
    /// Malformed slice request (too many axes, non-positive step).
    InvalidSliceSpec,
    /// Malformed argument (empty/zero shape, bad axis, bad permutation).
    InvalidArgument,
    /// A user-supplied element or chunk function reported a failure.
    Computation,
}

/// Errors that can occur in array operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrayError {
    /// Data length does not match the element count of a shape.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two shapes were required to be equal.
    #[error("shape mismatch: expected shape {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Index out of bounds along one axis.
    #[error("index {index} is out of range for axis {axis} with length {len}")]
    IndexOutOfRange { index: isize, axis: usize, len: usize },

    /// Flat (row-major) offset out of bounds.
    #[error("flat index {index} is out of range for size {size}")]
    FlatIndexOutOfRange { index: usize, size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// More slice specs than axes.
    #[error("too many slice specs: array has {ndim} axes, got {actual}")]
    TooManySliceSpecs { ndim: usize, actual: usize },

    /// Step of a range slice must be positive.
    #[error("invalid slice step {step} on axis {axis}: step must be positive")]
    InvalidStep { axis: usize, step: isize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for array with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Axis outside `0..ndim`.
    #[error("axis {axis} is out of range for array with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    /// Any other malformed argument.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Failure raised inside a user-supplied function.
    #[error("computation failed: {message}")]
    Computation { message: String },
}

impl ArrayError {
    /// Shorthand for [`ArrayError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`ArrayError::Computation`].
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. } | Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::IndexOutOfRange { .. }
            | Self::FlatIndexOutOfRange { .. }
            | Self::WrongNumberOfIndices { .. } => ErrorKind::IndexOutOfRange,
            Self::TooManySliceSpecs { .. } | Self::InvalidStep { .. } => {
                ErrorKind::InvalidSliceSpec
            }
            Self::InvalidPermutation { .. }
            | Self::InvalidAxis { .. }
            | Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Computation { .. } => ErrorKind::Computation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let e = ArrayError::LengthMismatch {
            expected: 6,
            actual: 5,
        };
        assert_eq!(e.kind(), ErrorKind::ShapeMismatch);

        let e = ArrayError::WrongNumberOfIndices {
            expected: 2,
            actual: 3,
        };
        assert_eq!(e.kind(), ErrorKind::IndexOutOfRange);

        let e = ArrayError::InvalidStep { axis: 0, step: 0 };
        assert_eq!(e.kind(), ErrorKind::InvalidSliceSpec);

        let e = ArrayError::InvalidAxis { axis: 3, ndim: 2 };
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_display() {
        let e = ArrayError::IndexOutOfRange {
            index: 5,
            axis: 1,
            len: 3,
        };
        assert_eq!(
            e.to_string(),
            "index 5 is out of range for axis 1 with length 3"
        );
    }
}
