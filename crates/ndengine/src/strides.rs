//! Stride computation utilities.
//!
//! The whole engine uses row-major (C) order: the last axis varies fastest.
//! These helpers do no bounds checking; [`Shape`](crate::Shape) wraps them
//! with validation.

/// Compute row-major strides from dimensions.
///
/// For dims `[d0, d1, d2]`, returns `[d1*d2, d2, 1]`.
///
/// # Examples
///
/// ```
/// use ndengine::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![20, 5, 1]);
/// assert_eq!(compute_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    let mut stride = 1;

    for (axis, &dim) in dims.iter().enumerate().rev() {
        strides[axis] = stride;
        stride *= dim;
    }

    strides
}

/// Convert cartesian indices to a flat offset.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Convert a flat offset to cartesian indices using row-major order.
pub fn linear_to_cartesian(mut linear: usize, dims: &[usize]) -> Vec<usize> {
    let mut indices = vec![0usize; dims.len()];

    for (axis, &dim) in dims.iter().enumerate().rev() {
        if dim == 0 {
            continue;
        }
        indices[axis] = linear % dim;
        linear /= dim;
    }

    indices
}

/// Advance `indices` to the next position in row-major order.
///
/// Returns `false` once the iteration wraps around past the last element.
pub fn increment_indices(indices: &mut [usize], dims: &[usize]) -> bool {
    for axis in (0..dims.len()).rev() {
        indices[axis] += 1;
        if indices[axis] < dims[axis] {
            return true;
        }
        indices[axis] = 0;
    }
    false
}
