//! Conversion of a 1D probability density along the pathway into a
//! volumetric number density.
//!
//! With `n` particles inside the sampled region, the number density at arc
//! length `s` is `n p(s) / (pi R(s)^2)`: the probability mass per unit arc
//! length divided by the local cross-section area.

use porewalk_core::Result;
use porewalk_geometry::{cubic_interp_1d, BoundaryCondition, SplineCurve1D};

/// Minimum usable pathway radius; below this the cross-section is treated
/// as closed and the number density set to zero.
const MIN_RADIUS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberDensityCalculator;

impl NumberDensityCalculator {
    /// Pointwise conversion of density samples with matching radius samples.
    pub fn samples(&self, densities: &[f64], radii: &[f64], n_particles: usize) -> Vec<f64> {
        assert_eq!(
            densities.len(),
            radii.len(),
            "density and radius sample vectors differ in length"
        );
        densities
            .iter()
            .zip(radii.iter())
            .map(|(&p, &r)| {
                if r > MIN_RADIUS {
                    n_particles as f64 * p / (std::f64::consts::PI * r * r)
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Spline form: evaluates both inputs at the density spline's unique
    /// knots and re-interpolates the converted values.
    pub fn spline(
        &self,
        probability_density: &SplineCurve1D,
        radius: &SplineCurve1D,
        n_particles: usize,
    ) -> Result<SplineCurve1D> {
        let support = probability_density.unique_knots();
        let densities = probability_density.evaluate_multiple(&support, 0);
        let radii = radius.evaluate_multiple(&support, 0);
        let converted = self.samples(&densities, &radii, n_particles);
        cubic_interp_1d(&support, &converted, &BoundaryCondition::Natural)
    }
}
