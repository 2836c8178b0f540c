//! Per-axis slice descriptors.
//!
//! A slice request is a list of [`SliceSpec`]s, one per leading axis. Missing
//! trailing axes default to [`SliceSpec::All`]. Each spec resolves against a
//! concrete axis length into a [`ResolvedSlice`].

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::{ArrayError, Result};
use crate::shape::Shape;

/// Selection along one axis.
///
/// Negative positions count from the end of the axis, as in `-1` for the last
/// element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceSpec {
    /// A single position; removes the axis from the result.
    Single(isize),
    /// `start..stop` every `step` elements; `None` bounds mean the axis ends.
    Range {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
    /// The whole axis.
    All,
}

/// A spec resolved against an axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSlice {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
    /// Number of positions selected.
    pub len: usize,
    /// Whether the axis is dropped from the result.
    pub single: bool,
}

impl ResolvedSlice {
    /// Source position of the `i`-th selected element.
    #[inline]
    pub fn source_index(&self, i: usize) -> usize {
        self.start + i * self.step
    }
}

impl SliceSpec {
    /// `start..stop` with unit step.
    pub fn range(start: isize, stop: isize) -> Self {
        SliceSpec::Range {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }

    /// `start..stop` with an explicit step.
    pub fn stepped(start: isize, stop: isize, step: isize) -> Self {
        SliceSpec::Range {
            start: Some(start),
            stop: Some(stop),
            step,
        }
    }

    /// Whether this spec removes its axis.
    pub fn is_single(&self) -> bool {
        matches!(self, SliceSpec::Single(_))
    }

    /// Resolve against `axis_len`, reporting errors against `axis`.
    ///
    /// Range bounds are clamped to `[0, axis_len]`; the selected length is
    /// `max(0, ceil((stop - start) / step))`.
    ///
    /// # Errors
    ///
    /// - [`ArrayError::IndexOutOfRange`] for a `Single` position outside the axis
    /// - [`ArrayError::InvalidStep`] for a non-positive step
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::SliceSpec;
    ///
    /// let r = SliceSpec::stepped(1, 100, 3).resolve(10, 0).unwrap();
    /// assert_eq!((r.start, r.stop, r.step, r.len), (1, 10, 3, 3));
    /// ```
    pub fn resolve(&self, axis_len: usize, axis: usize) -> Result<ResolvedSlice> {
        match *self {
            SliceSpec::Single(index) => {
                let pos = normalize_index(index, axis_len).ok_or(ArrayError::IndexOutOfRange {
                    index,
                    axis,
                    len: axis_len,
                })?;
                Ok(ResolvedSlice {
                    start: pos,
                    stop: pos + 1,
                    step: 1,
                    len: 1,
                    single: true,
                })
            }
            SliceSpec::Range { start, stop, step } => {
                if step <= 0 {
                    return Err(ArrayError::InvalidStep { axis, step });
                }
                let step = step as usize;
                let start = start.map_or(0, |s| clamp_bound(s, axis_len));
                let stop = stop.map_or(axis_len, |s| clamp_bound(s, axis_len));
                let len = if stop > start {
                    (stop - start).div_ceil(step)
                } else {
                    0
                };
                Ok(ResolvedSlice {
                    start,
                    stop: stop.max(start),
                    step,
                    len,
                    single: false,
                })
            }
            SliceSpec::All => Ok(ResolvedSlice {
                start: 0,
                stop: axis_len,
                step: 1,
                len: axis_len,
                single: false,
            }),
        }
    }
}

/// Resolve a full spec list against `shape`, padding trailing axes with `All`.
///
/// # Errors
///
/// Returns [`ArrayError::TooManySliceSpecs`] when `specs` is longer than the
/// rank, plus any per-axis resolution error.
pub fn resolve_all(specs: &[SliceSpec], shape: &Shape) -> Result<Vec<ResolvedSlice>> {
    if specs.len() > shape.ndim() {
        return Err(ArrayError::TooManySliceSpecs {
            ndim: shape.ndim(),
            actual: specs.len(),
        });
    }
    shape
        .dims()
        .iter()
        .enumerate()
        .map(|(axis, &len)| specs.get(axis).unwrap_or(&SliceSpec::All).resolve(len, axis))
        .collect()
}

/// Result dimensions of a resolved slice (single axes dropped).
pub fn result_dims(resolved: &[ResolvedSlice]) -> Vec<usize> {
    resolved
        .iter()
        .filter(|r| !r.single)
        .map(|r| r.len)
        .collect()
}

fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let pos = if index < 0 {
        len as isize + index
    } else {
        index
    };
    (pos >= 0 && (pos as usize) < len).then_some(pos as usize)
}

fn clamp_bound(bound: isize, len: usize) -> usize {
    if bound < 0 {
        (len as isize + bound).max(0) as usize
    } else {
        (bound as usize).min(len)
    }
}

impl From<isize> for SliceSpec {
    fn from(index: isize) -> Self {
        SliceSpec::Single(index)
    }
}

impl From<i32> for SliceSpec {
    fn from(index: i32) -> Self {
        SliceSpec::Single(index as isize)
    }
}

impl From<usize> for SliceSpec {
    fn from(index: usize) -> Self {
        SliceSpec::Single(index as isize)
    }
}

impl From<Range<isize>> for SliceSpec {
    fn from(r: Range<isize>) -> Self {
        SliceSpec::range(r.start, r.end)
    }
}

impl From<RangeFrom<isize>> for SliceSpec {
    fn from(r: RangeFrom<isize>) -> Self {
        SliceSpec::Range {
            start: Some(r.start),
            stop: None,
            step: 1,
        }
    }
}

impl From<RangeTo<isize>> for SliceSpec {
    fn from(r: RangeTo<isize>) -> Self {
        SliceSpec::Range {
            start: None,
            stop: Some(r.end),
            step: 1,
        }
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        SliceSpec::All
    }
}

impl From<Option<isize>> for SliceSpec {
    fn from(index: Option<isize>) -> Self {
        index.map_or(SliceSpec::All, SliceSpec::Single)
    }
}

/// Build a `Vec<SliceSpec>` from indices and ranges.
///
/// ```
/// use ndengine::{s, SliceSpec};
///
/// let specs = s![1, .., 0..2];
/// assert_eq!(specs[0], SliceSpec::Single(1));
/// assert_eq!(specs[1], SliceSpec::All);
/// assert_eq!(specs[2], SliceSpec::range(0, 2));
/// ```
#[macro_export]
macro_rules! s {
    ($($spec:expr),* $(,)?) => {
        ::std::vec![$($crate::SliceSpec::from($spec)),*]
    };
}
