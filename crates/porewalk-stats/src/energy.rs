//! Boltzmann inversion of a 1D density into a free-energy profile.
//!
//! `E(s) = -k ln(rho(s))` in reduced units (`k = 1`). Vanishing or negative
//! densities would produce infinite energies; those points are assigned the
//! largest finite energy observed in the profile, which keeps the aggregated
//! statistics well defined. The aggregator later anchors the profile to zero
//! at the pathway mouths.

#[derive(Debug, Clone, Copy, Default)]
pub struct BoltzmannEnergyCalculator;

impl BoltzmannEnergyCalculator {
    /// Converts density samples into energies.
    pub fn calculate(&self, densities: &[f64]) -> Vec<f64> {
        let mut energies: Vec<f64> = densities
            .iter()
            .map(|&d| if d > 0.0 { -d.ln() } else { f64::INFINITY })
            .collect();

        let max_finite = energies
            .iter()
            .cloned()
            .filter(|e| e.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        let ceiling = if max_finite.is_finite() { max_finite } else { 0.0 };
        for e in energies.iter_mut() {
            if !e.is_finite() {
                *e = ceiling;
            }
        }
        energies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverts_density() {
        let energies = BoltzmannEnergyCalculator.calculate(&[1.0, std::f64::consts::E]);
        assert_relative_eq!(energies[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(energies[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_density_clamped_to_profile_maximum() {
        let energies = BoltzmannEnergyCalculator.calculate(&[0.5, 0.0, 0.1]);
        let max_finite = (1.0f64 / 0.1).ln();
        assert_relative_eq!(energies[1], max_finite, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_densities_give_flat_zero() {
        let energies = BoltzmannEnergyCalculator.calculate(&[0.0, 0.0]);
        assert_eq!(energies, vec![0.0, 0.0]);
    }
}
