//! Random array construction.

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use rand_distr::StandardNormal;

use crate::array::NdArray;
use crate::config::ArrayConfig;
use crate::element::Scalar;
use crate::error::Result;

/// Element types that can be sampled uniformly from `[0, 1)`.
pub trait RandomUniform: Scalar {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomUniform for f64 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardUniform.sample(rng)
    }
}

impl RandomUniform for f32 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardUniform.sample(rng)
    }
}

/// Element types that can be sampled from the standard normal distribution.
pub trait RandomNormal: Scalar {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomNormal for f64 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }
}

impl RandomNormal for f32 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }
}

impl<T: RandomUniform> NdArray<T> {
    /// Array of uniform random values in `[0, 1)` from the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidArgument`](crate::ArrayError::InvalidArgument)
    /// for an empty shape or any zero dimension.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    ///
    /// let a: NdArray<f64> = NdArray::random_uniform(&[2, 3]).unwrap();
    /// assert!(a.all(|&v| (0.0..1.0).contains(&v)));
    /// ```
    pub fn random_uniform(dims: &[usize]) -> Result<Self> {
        Self::random_uniform_with_rng(dims, &mut rand::rng())
    }

    /// Uniform random array from a caller-supplied RNG, for reproducible runs.
    ///
    /// # Example
    ///
    /// ```
    /// use ndengine::NdArray;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let a: NdArray<f64> = NdArray::random_uniform_with_rng(&[4], &mut StdRng::seed_from_u64(7)).unwrap();
    /// let b: NdArray<f64> = NdArray::random_uniform_with_rng(&[4], &mut StdRng::seed_from_u64(7)).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn random_uniform_with_rng<R: Rng + ?Sized>(dims: &[usize], rng: &mut R) -> Result<Self> {
        Self::random_uniform_with_config(dims, rng, ArrayConfig::default())
    }

    pub fn random_uniform_with_config<R: Rng + ?Sized>(
        dims: &[usize],
        rng: &mut R,
        config: ArrayConfig<T>,
    ) -> Result<Self> {
        Self::generate_with_config(dims, |_| T::sample_uniform(rng), config)
    }
}

impl<T: RandomNormal> NdArray<T> {
    /// Array of standard normal random values from the thread-local RNG.
    pub fn randn(dims: &[usize]) -> Result<Self> {
        Self::randn_with_rng(dims, &mut rand::rng())
    }

    pub fn randn_with_rng<R: Rng + ?Sized>(dims: &[usize], rng: &mut R) -> Result<Self> {
        Self::generate(dims, |_| T::sample_normal(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_uniform_range() {
        let a: NdArray<f32> = NdArray::random_uniform(&[10, 10]).unwrap();
        assert_eq!(a.size(), 100);
        assert!(a.all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_random_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(12345);
        let a: NdArray<f64> = NdArray::random_uniform_with_rng(&[3, 4], &mut rng1).unwrap();
        let mut rng2 = StdRng::seed_from_u64(12345);
        let b: NdArray<f64> = NdArray::random_uniform_with_rng(&[3, 4], &mut rng2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_randn_moments() {
        let mut rng = StdRng::seed_from_u64(54321);
        let a: NdArray<f64> = NdArray::randn_with_rng(&[400], &mut rng).unwrap();
        let mean = a.mean().unwrap();
        assert!(mean.abs() < 0.3, "mean {mean} too far from 0");
        let var = a.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 400.0;
        assert!(var > 0.5 && var < 1.5, "variance {var} too far from 1");
    }

    #[test]
    fn test_random_rejects_empty_shape() {
        assert!(NdArray::<f64>::random_uniform(&[]).is_err());
    }
}
