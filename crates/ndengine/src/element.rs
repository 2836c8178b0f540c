//! Element traits for array contents.

use std::fmt::Debug;

use num_traits::{Num, NumCast, ToPrimitive};

/// Any type that can be stored in an [`NdArray`](crate::NdArray).
///
/// Elements are cloned in and out of storage and may be shipped to parallel
/// workers, so they must be `Send + Sync + 'static`.
pub trait Element: Clone + Debug + PartialEq + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Debug + PartialEq + Send + Sync + 'static {}

/// Numeric element types.
///
/// Unlocks `zeros`, `ones`, arithmetic lazy operations and reductions.
pub trait Scalar: Element + Copy + Num + NumCast + PartialOrd {
    /// Lossy conversion to `f64`, used by `mean`.
    fn to_f64_lossy(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
}

impl<T> Scalar for T where T: Element + Copy + Num + NumCast + PartialOrd {}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_one<T: Scalar>() -> (T, T) {
        (T::zero(), T::one())
    }

    #[test]
    fn test_zero_one() {
        assert_eq!(zero_one::<f64>(), (0.0, 1.0));
        assert_eq!(zero_one::<i32>(), (0, 1));
        assert_eq!(zero_one::<u8>(), (0, 1));
    }

    #[test]
    fn test_to_f64_lossy() {
        assert_eq!(3i64.to_f64_lossy(), 3.0);
        assert_eq!(2.5f32.to_f64_lossy(), 2.5);
    }
}
