//! Random initial values for tensors.
//!
//! Sampling is generic over [`RandomScalar`], which ties a scalar type to
//! the `rand` and `rand_distr` distributions it can be drawn from.

use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::scalar::Scalar;
use crate::shape::shape_size;
use crate::storage::Dense;
use crate::tensor::Tensor;

/// Scalars that can be sampled from the standard uniform and normal distributions.
pub trait RandomScalar: Scalar {
    /// Sample from the uniform distribution on [0, 1).
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Sample from the standard normal distribution.
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomScalar for f64 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }

    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomScalar for f32 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }

    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl<ElT: RandomScalar> Tensor<ElT, Dense<ElT>> {
    /// Uniform samples on [0, 1) from the thread-local generator.
    ///
    /// ```
    /// use tensorgrad::Tensor;
    ///
    /// let noise: Tensor<f32> = Tensor::random(&[4]);
    /// assert!(noise.data().iter().all(|v| (0.0..1.0).contains(v)));
    /// ```
    pub fn random(shape: &[usize]) -> Self {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// Uniform samples on [0, 1) drawn from `rng`.
    ///
    /// Seeding `rng` makes the result reproducible:
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use tensorgrad::Tensor;
    ///
    /// let draw = |seed| Tensor::<f64>::random_with_rng(&[3], &mut StdRng::seed_from_u64(seed));
    /// assert_eq!(draw(5), draw(5));
    /// ```
    pub fn random_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        Self::sampled(shape, || ElT::sample_uniform(rng))
    }

    /// Standard normal samples from the thread-local generator.
    pub fn randn(shape: &[usize]) -> Self {
        Self::randn_with_rng(shape, &mut rand::rng())
    }

    /// Standard normal samples drawn from `rng`.
    pub fn randn_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        Self::sampled(shape, || ElT::sample_normal(rng))
    }

    fn sampled(shape: &[usize], sample: impl FnMut() -> ElT) -> Self {
        let n = shape_size(shape);
        let data = std::iter::repeat_with(sample).take(n).collect();
        Self::from_vec(data, shape).expect("sampled tensor: shape unchanged")
    }
}
