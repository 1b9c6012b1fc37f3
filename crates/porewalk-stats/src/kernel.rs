//! Gaussian kernel density estimation and kernel smoothing.
//!
//! Densities are evaluated on a regular grid extended `eval_range_cutoff`
//! bandwidths beyond the sample range (so the estimate decays smoothly to
//! zero) and returned as a cubic spline. The weighted variant is a
//! Nadaraya-Watson smoother: a local weighted average rather than a
//! density, used for hydrophobicity profiles.

use porewalk_core::{PorewalkError, Result};
use porewalk_geometry::{cubic_interp_1d, BoundaryCondition, SplineCurve1D};

use crate::zero_spline;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

pub(crate) fn gauss_kernel(u: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * u * u).exp()
}

/// Shared evaluation-grid parameters of the kernel estimators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// Kernel bandwidth `h`.
    pub bandwidth: f64,
    /// Maximum spacing of density evaluation points.
    pub eval_point_spacing: f64,
    /// Grid extension beyond the data range, in multiples of `h`.
    pub eval_range_cutoff: f64,
}

impl KernelParams {
    fn validate(&self) -> Result<()> {
        if self.bandwidth <= 0.0 {
            return Err(PorewalkError::config(format!(
                "kernel bandwidth must be positive, got {}",
                self.bandwidth
            )));
        }
        if self.eval_point_spacing <= 0.0 {
            return Err(PorewalkError::config(format!(
                "evaluation point spacing must be positive, got {}",
                self.eval_point_spacing
            )));
        }
        if self.eval_range_cutoff < 0.0 {
            return Err(PorewalkError::config(format!(
                "evaluation range cutoff must be non-negative, got {}",
                self.eval_range_cutoff
            )));
        }
        Ok(())
    }

    /// Evaluation grid covering the sample range plus the cutoff margin.
    fn grid(&self, samples: &[f64]) -> Vec<f64> {
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut lo = min - self.eval_range_cutoff * self.bandwidth;
        let mut hi = max + self.eval_range_cutoff * self.bandwidth;
        if hi <= lo {
            // degenerate range (single sample, zero cutoff):
            lo -= self.eval_point_spacing;
            hi += self.eval_point_spacing;
        }
        let n = (((hi - lo) / self.eval_point_spacing).ceil() as usize).max(1) + 1;
        let dx = (hi - lo) / (n - 1) as f64;
        (0..n).map(|i| lo + i as f64 * dx).collect()
    }
}

/// Gaussian kernel density estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelDensityEstimator {
    pub params: KernelParams,
}

impl KernelDensityEstimator {
    pub fn new(params: KernelParams) -> Result<Self> {
        params.validate()?;
        Ok(KernelDensityEstimator { params })
    }

    /// Estimates the probability density of `samples` as a cubic spline.
    pub fn estimate(&self, samples: &[f64]) -> Result<SplineCurve1D> {
        if samples.is_empty() {
            return zero_spline();
        }

        let h = self.params.bandwidth;
        let grid = self.params.grid(samples);
        let norm = 1.0 / (samples.len() as f64 * h);
        let densities: Vec<f64> = grid
            .iter()
            .map(|&x| norm * samples.iter().map(|&xi| gauss_kernel((x - xi) / h)).sum::<f64>())
            .collect();

        cubic_interp_1d(&grid, &densities, &BoundaryCondition::Natural)
    }
}

/// Nadaraya-Watson kernel smoother over weighted samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedKernelDensityEstimator {
    pub params: KernelParams,
}

impl WeightedKernelDensityEstimator {
    pub fn new(params: KernelParams) -> Result<Self> {
        params.validate()?;
        Ok(WeightedKernelDensityEstimator { params })
    }

    /// Smooths the weights `ws` observed at positions `xs`. Where the local
    /// kernel mass vanishes the smoother is zero.
    pub fn estimate(&self, xs: &[f64], ws: &[f64]) -> Result<SplineCurve1D> {
        if xs.len() != ws.len() {
            return Err(PorewalkError::InputSizeMismatch {
                left: xs.len(),
                right: ws.len(),
            });
        }
        if xs.is_empty() {
            return zero_spline();
        }

        let h = self.params.bandwidth;
        let grid = self.params.grid(xs);
        let values: Vec<f64> = grid
            .iter()
            .map(|&x| {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for (&xi, &wi) in xs.iter().zip(ws.iter()) {
                    let k = gauss_kernel((x - xi) / h);
                    numerator += wi * k;
                    denominator += k;
                }
                if denominator > 1e-12 {
                    numerator / denominator
                } else {
                    0.0
                }
            })
            .collect();

        cubic_interp_1d(&grid, &values, &BoundaryCondition::Natural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use porewalk_geometry::adaptive_quadrature;

    fn params(h: f64) -> KernelParams {
        KernelParams {
            bandwidth: h,
            eval_point_spacing: 0.05,
            eval_range_cutoff: 5.0,
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(KernelDensityEstimator::new(params(0.0)).is_err());
        let mut p = params(0.1);
        p.eval_point_spacing = 0.0;
        assert!(KernelDensityEstimator::new(p).is_err());
    }

    #[test]
    fn single_sample_recovers_the_kernel() {
        let estimator = KernelDensityEstimator::new(params(0.5)).unwrap();
        let density = estimator.estimate(&[1.0]).unwrap();
        // density at the sample is the kernel mode 1/(h sqrt(2 pi)):
        assert_relative_eq!(
            density.evaluate(1.0, 0),
            INV_SQRT_2PI / 0.5,
            epsilon = 1e-4
        );
    }

    #[test]
    fn density_integrates_to_one() {
        let samples: Vec<f64> = (0..200).map(|i| (i as f64 * 0.317) % 2.0).collect();
        let estimator = KernelDensityEstimator::new(params(0.2)).unwrap();
        let density = estimator.estimate(&samples).unwrap();
        let (lo, hi) = density.domain();
        let integral = adaptive_quadrature(&|x| density.evaluate(x, 0), lo, hi, 1e-8);
        assert_relative_eq!(integral, 1.0, epsilon = 0.01);
    }

    #[test]
    fn smoother_reproduces_constant_weights() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64 * 0.1).collect();
        let ws = vec![2.5; xs.len()];
        let smoother = WeightedKernelDensityEstimator::new(params(0.3)).unwrap();
        let profile = smoother.estimate(&xs, &ws).unwrap();
        // anywhere near the data, the weighted average of a constant is the
        // constant:
        for &x in &[0.5, 2.0, 3.5] {
            assert_relative_eq!(profile.evaluate(x, 0), 2.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn smoother_rejects_length_mismatch() {
        let smoother = WeightedKernelDensityEstimator::new(params(0.3)).unwrap();
        assert!(smoother.estimate(&[0.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn smoother_interpolates_between_two_levels() {
        let xs = vec![0.0, 0.1, 0.2, 1.8, 1.9, 2.0];
        let ws = vec![0.0, 0.0, 0.0, 4.0, 4.0, 4.0];
        let smoother = WeightedKernelDensityEstimator::new(params(0.2)).unwrap();
        let profile = smoother.estimate(&xs, &ws).unwrap();
        assert!(profile.evaluate(0.1, 0) < 0.5);
        assert!(profile.evaluate(1.9, 0) > 3.5);
        let mid = profile.evaluate(1.0, 0);
        assert!(mid > 0.5 && mid < 3.5, "mid level {}", mid);
    }
}
