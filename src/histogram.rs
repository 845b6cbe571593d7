//! Fixed-range density histograms
//!
//! [Histogram] summarises a set of samples as a step approximation to their
//! probability density. [HistogramDistribution] turns such a step density
//! back into something that can be sampled, again with the inverse-transform
//! method.
//!
use crate::SamplingError;
use is_sorted::IsSorted;
use std::ops::Range;

///
/// Density histogram with equal-width bins over a declared range
///
/// Bins are half-open `[lo, hi)` with the exception of the last one, which
/// also includes the upper end of the range. Samples outside the range (and
/// NaNs) are not counted.
///
#[derive(Debug, Clone)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
    density: Vec<f64>,
}

impl Histogram {
    ///
    /// Bin `samples` into `bins` intervals spanning `range`
    ///
    /// # Errors
    /// - [SamplingError::InvalidBinCount] if `bins` is zero
    /// - [SamplingError::InvalidRange] if the range is not finite or its width
    ///   is not positive
    ///
    pub fn new(samples: &[f64], bins: usize, range: Range<f64>) -> Result<Self, SamplingError> {
        let Range { start, end } = range;

        if bins == 0 {
            return Err(SamplingError::InvalidBinCount);
        }
        // Finite ends may still overflow the width
        let span = end - start;
        if !(span.is_finite() && span > 0.0) {
            return Err(SamplingError::InvalidRange { start, end });
        }

        let width = span / bins as f64;
        let mut edges = (0..bins)
            .map(|i| start + i as f64 * width)
            .collect::<Vec<_>>();
        edges.push(end);

        let mut counts = vec![0; bins];
        for x in samples {
            if let Some(idx) = bin_index(&edges, *x) {
                counts[idx] += 1;
            }
        }

        let total: usize = counts.iter().sum();
        let density = if total == 0 {
            vec![0.0; bins]
        } else {
            let norm = total as f64 * width;
            counts.iter().map(|c| *c as f64 / norm).collect()
        };

        tracing::debug!(bins, total, ignored = samples.len() - total, "histogram filled");

        Ok(Self {
            edges,
            counts,
            density,
        })
    }

    /// Iterate over `(bin_lo, bin_hi, density)` triples
    ///
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        std::iter::zip(self.edges.windows(2), &self.density).map(|(w, d)| (w[0], w[1], *d))
    }

    /// Bin edges, one more than the number of bins
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of samples in each bin
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Normalised density of each bin
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Number of samples that fell inside the range
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Width of a single bin
    pub fn bin_width(&self) -> f64 {
        (self.edges[self.edges.len() - 1] - self.edges[0]) / self.counts.len() as f64
    }

    ///
    /// Probability mass that `cdf` assigns to each bin
    ///
    /// Gives the expected probabilities for [crate::stat_tests::chi2_test].
    ///
    pub fn bin_mass(&self, cdf: impl Fn(f64) -> f64) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|w| cdf(w[1]) - cdf(w[0]))
            .collect()
    }

    /// Largest density over all bins
    pub fn max_density(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }

    ///
    /// Create a distribution that samples from the step density of the histogram
    ///
    /// # Errors
    /// [SamplingError::ZeroMass] if no sample fell inside the range.
    ///
    pub fn to_distribution(&self) -> Result<HistogramDistribution, SamplingError> {
        HistogramDistribution::new(self.edges.clone(), self.density.clone())
    }
}

///
/// Find the bin containing `val`
///
/// The index is first estimated arithmetically and then corrected against the
/// edges, since the arithmetic estimate may be off by one due to rounding.
/// Returns `None` if `val` lies outside `[edges[0], edges[last]]` or is NaN.
///
fn bin_index(edges: &[f64], val: f64) -> Option<usize> {
    let first = *edges.first()?;
    let last = *edges.last()?;
    let bins = edges.len() - 1;

    if !(first..=last).contains(&val) {
        return None;
    }
    if val == last {
        return Some(bins - 1);
    }

    let mut idx = (((val - first) / (last - first)) * bins as f64) as usize;
    idx = idx.min(bins - 1);

    if val < edges[idx] {
        idx -= 1;
    } else if idx + 1 < bins && val >= edges[idx + 1] {
        idx += 1;
    }
    Some(idx)
}

///
/// Piecewise-uniform distribution defined by a step density
///
#[derive(Debug, Clone)]
pub struct HistogramDistribution {
    edges: Vec<f64>,
    density: Vec<f64>,
    cdf: Vec<f64>,
}

/// Calculate non-normalised cdf at the edges of a step density
///
/// # Panics
/// if `edges` is not one longer than `density`
///
fn histogram_cdf(edges: &[f64], density: &[f64]) -> Vec<f64> {
    if edges.len() != density.len() + 1 {
        panic! {"Length mismatch"}
    }

    let mut cdf = Vec::with_capacity(edges.len());
    cdf.push(0.0);

    let dx_iter = edges.windows(2).map(|w| w[1] - w[0]);

    let mut top = 0.0;
    for (dx, p) in std::iter::zip(dx_iter, density.iter()) {
        top += *p * dx;
        cdf.push(top)
    }
    cdf
}

impl HistogramDistribution {
    ///
    /// Create a new distribution from bin `edges` and the `density` in each bin
    ///
    /// # Errors
    /// - [SamplingError::UnsortedGrid] if `edges` are not sorted
    /// - [SamplingError::NegativeDensity] if any density is negative
    /// - [SamplingError::LengthMismatch] unless `edges.len() == density.len() + 1`
    /// - [SamplingError::ZeroMass] if the density integrates to zero
    ///
    pub fn new(edges: Vec<f64>, density: Vec<f64>) -> Result<Self, SamplingError> {
        // Check preconditions
        if !IsSorted::is_sorted(&mut edges.iter()) {
            return Err(SamplingError::UnsortedGrid);
        } else if density.iter().any(|v| *v < 0.0) {
            return Err(SamplingError::NegativeDensity);
        } else if edges.len() != density.len() + 1 {
            return Err(SamplingError::LengthMismatch);
        }

        let cdf = histogram_cdf(&edges, &density);
        match cdf.last() {
            Some(mass) if *mass > 0.0 => Ok(Self {
                edges,
                density,
                cdf,
            }),
            _ => Err(SamplingError::ZeroMass),
        }
    }

    /// Cumulative distribution function of the normalised step density
    ///
    pub fn cdf(&self, x: f64) -> f64 {
        let last = self.edges.len() - 1;
        if x.is_nan() || x <= self.edges[0] {
            return 0.0;
        } else if x >= self.edges[last] {
            return 1.0;
        }

        let idx = self.edges.partition_point(|e| *e <= x) - 1;
        let mass = self.cdf[last];
        (self.cdf[idx] + self.density[idx] * (x - self.edges[idx])) / mass
    }
}

/// Draws samples from the histogram distribution
///
impl rand::distributions::Distribution<f64> for HistogramDistribution {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // Construction guarantees a positive total mass
        let mass = self.cdf[self.cdf.len() - 1];
        let val = rng.gen_range(0.0..mass);

        // Last edge with cdf <= val, skips over empty bins
        let idx = self.cdf.partition_point(|c| *c <= val) - 1;

        let x0 = self.edges[idx];
        let p0 = self.density[idx];
        let c0 = self.cdf[idx];
        (val - c0) / p0 + x0
    }
}
