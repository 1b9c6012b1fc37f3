//! Histogram density estimation.
//!
//! Uniform bins padded by one empty bin on each side so the estimated
//! density falls to zero at the data boundary. The result is returned as a
//! piecewise-linear spline through the bin centres, keeping downstream code
//! agnostic of the estimation method.

use porewalk_core::{PorewalkError, Result};
use porewalk_geometry::{linear_interp_1d, SplineCurve1D};

use crate::zero_spline;

/// Histogram estimator with a fixed bin width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramDensityEstimator {
    pub bin_width: f64,
}

impl HistogramDensityEstimator {
    pub fn new(bin_width: f64) -> Result<Self> {
        if bin_width <= 0.0 {
            return Err(PorewalkError::config(format!(
                "histogram bin width must be positive, got {}",
                bin_width
            )));
        }
        Ok(HistogramDensityEstimator { bin_width })
    }

    /// Estimates the probability density of `samples`.
    pub fn estimate(&self, samples: &[f64]) -> Result<SplineCurve1D> {
        if samples.is_empty() {
            return zero_spline();
        }

        let w = self.bin_width;
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        // one guaranteed-empty bin on each side of the data range:
        let lo = min - w;
        let n_bins = ((max - min) / w).floor() as usize + 3;

        let mut counts = vec![0u64; n_bins];
        for &x in samples {
            let idx = (((x - lo) / w).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        let norm = samples.len() as f64 * w;
        let centres: Vec<f64> = (0..n_bins).map(|i| lo + (i as f64 + 0.5) * w).collect();
        let densities: Vec<f64> = counts.iter().map(|&c| c as f64 / norm).collect();

        linear_interp_1d(&centres, &densities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use porewalk_geometry::adaptive_quadrature;

    #[test]
    fn rejects_non_positive_bin_width() {
        assert!(HistogramDensityEstimator::new(0.0).is_err());
        assert!(HistogramDensityEstimator::new(-0.1).is_err());
    }

    #[test]
    fn empty_input_gives_flat_zero() {
        let estimator = HistogramDensityEstimator::new(0.5).unwrap();
        let density = estimator.estimate(&[]).unwrap();
        assert_eq!(density.evaluate(0.5, 0), 0.0);
    }

    #[test]
    fn uniform_samples_give_flat_density() {
        // equidistant samples on [0, 1): the interior bins all hold the same
        // count, so the density is flat there.
        let samples: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let estimator = HistogramDensityEstimator::new(0.1).unwrap();
        let density = estimator.estimate(&samples).unwrap();
        for &x in &[0.25, 0.45, 0.65] {
            assert_relative_eq!(density.evaluate(x, 0), 1.0, epsilon = 0.05);
        }
    }

    #[test]
    fn density_vanishes_outside_data() {
        let samples = vec![0.0, 0.1, 0.2, 0.3];
        let estimator = HistogramDensityEstimator::new(0.1).unwrap();
        let density = estimator.estimate(&samples).unwrap();
        let (lo, _) = density.domain();
        assert_relative_eq!(density.evaluate(lo, 0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn integrates_to_one_approximately() {
        let samples: Vec<f64> = (0..500).map(|i| (i as f64 * 0.613) % 3.0).collect();
        let estimator = HistogramDensityEstimator::new(0.2).unwrap();
        let density = estimator.estimate(&samples).unwrap();
        let (lo, hi) = density.domain();
        let integral = adaptive_quadrature(&|x| density.evaluate(x, 0), lo, hi, 1e-8);
        // linear interpolation through bin centres loses a little mass at
        // the edges, nothing more:
        assert_relative_eq!(integral, 1.0, epsilon = 0.05);
    }
}
