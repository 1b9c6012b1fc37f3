//! Streaming statistics and 1D density estimation along the pathway.
//!
//! All estimators return their result as a `SplineCurve1D` so downstream
//! code (per-frame records, the aggregator) is agnostic of the estimation
//! method.

pub mod bandwidth;
pub mod energy;
pub mod histogram;
pub mod kernel;
pub mod number_density;
pub mod summary;

pub use bandwidth::AmiseOptimalBandwidthEstimator;
pub use energy::BoltzmannEnergyCalculator;
pub use histogram::HistogramDensityEstimator;
pub use kernel::{KernelDensityEstimator, KernelParams, WeightedKernelDensityEstimator};
pub use number_density::NumberDensityCalculator;
pub use summary::SummaryStatistics;

use porewalk_core::Result;
use porewalk_geometry::{linear_interp_1d, SplineCurve1D};

/// Flat zero profile over a unit interval, the well-defined result of
/// estimating from an empty sample (frames without solvent in the pathway).
pub(crate) fn zero_spline() -> Result<SplineCurve1D> {
    linear_interp_1d(&[0.0, 1.0], &[0.0, 0.0])
}
