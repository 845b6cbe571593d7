//! Inverse-transform sampling of the Beta(1,2) distribution
//!
//! Uniform samples `u ∈ [0, 1)` are mapped through the closed-form inverse of
//! the cumulative distribution function
//!
//! $$ F(x) = 2x - x^2 $$
//!
//! which gives `x = 1 - √(1 - u)`. The resulting samples follow the density
//! `f(x) = 2(1 - x)` on `[0, 1]`.
//!
//! ```
//! # use beta_sampler::{generate_uniform, transform_all, histogram::Histogram, SamplingError};
//! # use rand::SeedableRng;
//! # fn main() -> Result<(), SamplingError> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let u = generate_uniform(&mut rng, 1000);
//! let x = transform_all(&u)?;
//!
//! let hist = Histogram::new(&x, 10, 0.0..1.0)?;
//! for (lo, hi, density) in hist.bins() {
//!     println!("[{lo}, {hi}) {density}");
//! }
//! # Ok(())}
//! ```
//!
use rand::Rng;
use thiserror::Error;

pub mod histogram;
pub mod inversion;
pub mod render;

///
/// Error raised when arguments of a sampling operation are invalid
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Sample count must not be negative (got {0})")]
    NegativeCount(i64),
    #[error("Number of histogram bins must be positive")]
    InvalidBinCount,
    #[error("Histogram range [{start}, {end}] must be finite and have positive width")]
    InvalidRange { start: f64, end: f64 },
    #[error("Value {0} is outside the domain [0, 1] of the inverse cdf")]
    OutOfDomain(f64),
    #[error("Values in a grid are not sorted")]
    UnsortedGrid,
    #[error("Negative values present in probability density function")]
    NegativeDensity,
    #[error("Lengths of arrays to form a table are different")]
    LengthMismatch,
    #[error("Probability density function has no mass")]
    ZeroMass,
    #[error("Tolerance {0} must be positive")]
    InvalidTolerance(f64),
    #[error("Root finding failed: {0}")]
    RootFinding(String),
}

///
/// Convert a signed sample count into `usize`
///
/// Counts coming from the command line are signed so that a negative request
/// can be reported instead of rejected by the parser with a generic message.
///
pub fn checked_count(n: i64) -> Result<usize, SamplingError> {
    usize::try_from(n).map_err(|_| SamplingError::NegativeCount(n))
}

/// Draw `n` independent samples from the uniform distribution on `[0, 1)`
///
pub fn generate_uniform<R>(rng: &mut R, n: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    (0..n).map(|_| rng.gen::<f64>()).collect()
}

///
/// Inverse of the Beta(1,2) cumulative distribution function
///
/// Computes `x = 1 - √(1 - u)`.
///
/// # Errors
/// [SamplingError::OutOfDomain] if `u` is NaN or lies outside `[0, 1]`.
///
pub fn inverse_cdf(u: f64) -> Result<f64, SamplingError> {
    if !(0.0..=1.0).contains(&u) {
        return Err(SamplingError::OutOfDomain(u));
    }
    Ok(1.0 - f64::sqrt(1.0 - u))
}

/// Apply [inverse_cdf] to every element of `samples`
///
/// Order and length are preserved. Fails on the first value outside the domain.
///
pub fn transform_all(samples: &[f64]) -> Result<Vec<f64>, SamplingError> {
    samples.iter().map(|u| inverse_cdf(*u)).collect()
}

/// Cumulative distribution function `F(x) = 2x - x²` of Beta(1,2)
///
pub fn cdf(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else if x >= 1.0 {
        1.0
    } else {
        x * (2.0 - x)
    }
}

/// Probability density function `f(x) = 2(1 - x)` of Beta(1,2)
///
pub fn pdf(x: f64) -> f64 {
    if (0.0..=1.0).contains(&x) {
        2.0 * (1.0 - x)
    } else {
        0.0
    }
}

///
/// Beta(1,2) distribution sampled with the inverse-transform method
///
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseBeta;

impl rand::distributions::Distribution<f64> for InverseBeta {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // `gen` is in [0, 1) so the square root argument stays positive
        let u: f64 = rng.gen();
        1.0 - f64::sqrt(1.0 - u)
    }
}
