//! Numerical inverse of a cumulative distribution function
//!
//! When the inverse of a cdf has no closed form, the quantile `x = F⁻¹(u)` can
//! still be found by solving `F(x) - u = 0` on the support. Brent's method is
//! used since it only requires the cdf to be continuous and non-decreasing.
//!
use crate::SamplingError;
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::brent::BrentRoot;
use rand::Rng;
use std::ops::Range;

/// Maximum number of Brent iterations per quantile
const MAX_ITERS: u64 = 200;

///
/// Root of `F(x) - target`
///
struct QuantileProblem<'a, F> {
    cdf: &'a F,
    target: f64,
}

impl<'a, F> CostFunction for QuantileProblem<'a, F>
where
    F: Fn(f64) -> f64,
{
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok((self.cdf)(*x) - self.target)
    }
}

///
/// Inverse of an arbitrary continuous cdf with a finite support
///
/// ```
/// # use beta_sampler::{inversion::NumericInverse, SamplingError};
/// # fn main() -> Result<(), SamplingError> {
/// let inverse = NumericInverse::new(|x: f64| x * x, 0.0..1.0, 1.0e-12)?;
/// let x = inverse.quantile(0.25)?;
/// assert!((x - 0.5).abs() < 1.0e-10);
/// # Ok(())}
/// ```
///
#[derive(Debug, Clone)]
pub struct NumericInverse<F> {
    cdf: F,
    support: Range<f64>,
    tolerance: f64,
}

impl<F> NumericInverse<F>
where
    F: Fn(f64) -> f64,
{
    ///
    /// Create a new inverse
    ///
    /// # Arguments
    /// - `cdf` - non-decreasing function with `cdf(support.start) = 0` and
    ///   `cdf(support.end) = 1`
    /// - `support` - finite interval on which the cdf rises from 0 to 1
    /// - `tolerance` - absolute tolerance on the returned quantile
    ///
    pub fn new(cdf: F, support: Range<f64>, tolerance: f64) -> Result<Self, SamplingError> {
        let Range { start, end } = support;
        let span = end - start;
        if !(span.is_finite() && span > 0.0) {
            return Err(SamplingError::InvalidRange { start, end });
        } else if !(tolerance > 0.0) {
            return Err(SamplingError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            cdf,
            support,
            tolerance,
        })
    }

    ///
    /// Find `x` such that `cdf(x) = u`
    ///
    /// # Errors
    /// - [SamplingError::OutOfDomain] if `u` is not in `[0, 1]`
    /// - [SamplingError::RootFinding] if the solver fails, e.g. when the cdf
    ///   does not bracket `u` on the support
    ///
    pub fn quantile(&self, u: f64) -> Result<f64, SamplingError> {
        if !(0.0..=1.0).contains(&u) {
            return Err(SamplingError::OutOfDomain(u));
        } else if u == 0.0 {
            return Ok(self.support.start);
        } else if u == 1.0 {
            return Ok(self.support.end);
        }

        let problem = QuantileProblem {
            cdf: &self.cdf,
            target: u,
        };
        let solver = BrentRoot::new(self.support.start, self.support.end, self.tolerance);

        let res = Executor::new(problem, solver)
            .configure(|state| state.max_iters(MAX_ITERS))
            .run()
            .map_err(|e| SamplingError::RootFinding(e.to_string()))?;

        let iters = res.state().get_iter();
        let x = res
            .state()
            .get_best_param()
            .copied()
            .ok_or_else(|| SamplingError::RootFinding(format!("no estimate for u = {u}")))?;

        tracing::trace!(u, x, iters, "quantile found");
        Ok(x)
    }

    /// Draw a sample by inverting a uniform variate
    ///
    pub fn sample<R>(&self, rng: &mut R) -> Result<f64, SamplingError>
    where
        R: Rng + ?Sized,
    {
        self.quantile(rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_tests;
    use approx;
    use rand::SeedableRng;

    #[test]
    fn test_matches_closed_form() {
        let inverse = NumericInverse::new(crate::cdf, 0.0..1.0, 1.0e-13).unwrap();

        for u in [0.0, 0.01, 0.2, 0.5, 0.75, 0.999, 1.0] {
            let reference = crate::inverse_cdf(u).unwrap();
            approx::assert_abs_diff_eq!(reference, inverse.quantile(u).unwrap(), epsilon = 1.0e-10);
        }
    }

    #[test]
    fn test_shifted_support() {
        // Uniform on [2, 6]
        let inverse = NumericInverse::new(|x: f64| (x - 2.0) / 4.0, 2.0..6.0, 1.0e-12).unwrap();

        approx::assert_abs_diff_eq!(2.0, inverse.quantile(0.0).unwrap());
        approx::assert_abs_diff_eq!(3.0, inverse.quantile(0.25).unwrap(), epsilon = 1.0e-9);
        approx::assert_abs_diff_eq!(6.0, inverse.quantile(1.0).unwrap());
    }

    #[test]
    fn test_errors() {
        assert!(
            NumericInverse::new(crate::cdf, 1.0..1.0, 1.0e-12).is_err(),
            "Failed to detect empty support"
        );
        assert_eq!(
            Err(SamplingError::InvalidRange {
                start: -1.0e308,
                end: 1.0e308
            }),
            NumericInverse::new(crate::cdf, -1.0e308..1.0e308, 1.0e-12).map(|_| ())
        );
        assert_eq!(
            Err(SamplingError::InvalidTolerance(0.0)),
            NumericInverse::new(crate::cdf, 0.0..1.0, 0.0).map(|_| ())
        );

        let inverse = NumericInverse::new(crate::cdf, 0.0..1.0, 1.0e-12).unwrap();
        assert_eq!(Err(SamplingError::OutOfDomain(1.2)), inverse.quantile(1.2));
        assert!(inverse.quantile(f64::NAN).is_err());
    }

    #[test]
    fn test_unbracketed_root() {
        // The cdf never reaches 0.5 on the support
        let inverse = NumericInverse::new(|x: f64| 0.1 * x, 0.0..1.0, 1.0e-12).unwrap();
        assert!(matches!(
            inverse.quantile(0.5),
            Err(SamplingError::RootFinding(_))
        ));
    }

    #[test]
    fn test_numeric_sampling() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(31415);
        let inverse = NumericInverse::new(crate::cdf, 0.0..1.0, 1.0e-10).unwrap();

        let samples = (0..2000)
            .map(|_| inverse.sample(&mut rng))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let ks_res = stat_tests::ks1_test(|x| crate::cdf(*x), samples).unwrap();

        println!("{:?}", ks_res);
        assert!(ks_res.p_value() > 0.01)
    }
}
