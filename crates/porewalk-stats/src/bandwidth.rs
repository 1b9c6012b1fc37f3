//! AMISE-optimal bandwidth selection for Gaussian kernel density
//! estimation.
//!
//! Sheather-Jones plug-in: pilot bandwidths from normal-reference estimates
//! of the sixth and eighth density functionals, kernel estimates of the
//! fourth and sixth functionals at those pilots, then a bisection solve of
//! the implicit AMISE equation
//!
//! ```text
//!     h = ( 1 / (2 sqrt(pi) n phi4(gamma(h))) )^(1/5)
//! ```
//!
//! Falls back to the Silverman rule when the implicit equation has no root
//! in the search bracket.

use log::warn;
use porewalk_core::{PorewalkError, Result};

use crate::kernel::gauss_kernel;

const SQRT_PI: f64 = 1.772_453_850_905_516;
const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

/// Plug-in bandwidth estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmiseOptimalBandwidthEstimator;

impl AmiseOptimalBandwidthEstimator {
    /// Estimates the AMISE-optimal bandwidth for `samples`.
    ///
    /// Requires at least two distinct samples.
    pub fn estimate(&self, samples: &[f64]) -> Result<f64> {
        let n = samples.len();
        if n < 2 {
            return Err(PorewalkError::InsufficientSamples {
                required: 2,
                actual: n,
            });
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let sigma = var.sqrt();
        if sigma <= 0.0 {
            return Err(PorewalkError::InsufficientSamples {
                required: 2,
                actual: 1,
            });
        }

        let binned = BinnedSamples::new(samples);

        // normal-reference sixth and eighth functionals:
        let phi6 = -15.0 / (16.0 * SQRT_PI) * sigma.powi(-7);
        let phi8 = 105.0 / (32.0 * SQRT_PI) * sigma.powi(-9);

        // pilot bandwidths:
        let g1 = (-6.0 / (SQRT_2PI * n as f64 * phi6)).powf(1.0 / 7.0);
        let g2 = (30.0 / (SQRT_2PI * n as f64 * phi8)).powf(1.0 / 9.0);

        // kernel estimates of the fourth and sixth functionals:
        let phi4_g1 = functional(&binned, g1, 4);
        let phi6_g2 = functional(&binned, g2, 6);
        if phi4_g1 <= 0.0 || phi6_g2 >= 0.0 {
            let h = silverman(sigma, n);
            warn!("degenerate plug-in functionals, falling back to Silverman bandwidth {h:.4}");
            return Ok(h);
        }

        let gamma_factor = (-6.0 * std::f64::consts::SQRT_2 * phi4_g1 / phi6_g2).powf(1.0 / 7.0);
        let implicit = |h: f64| -> f64 {
            let gamma = gamma_factor * h.powf(5.0 / 7.0);
            let phi4 = functional(&binned, gamma, 4);
            if phi4 <= 0.0 {
                return f64::NAN;
            }
            (1.0 / (2.0 * SQRT_PI * n as f64 * phi4)).powf(0.2) - h
        };

        // bracket the root around the Silverman rule:
        let h0 = silverman(sigma, n);
        let mut lo = 0.05 * h0;
        let mut hi = 5.0 * h0;
        let f_lo = implicit(lo);
        let f_hi = implicit(hi);
        if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo.signum() == f_hi.signum() {
            warn!("AMISE equation has no root in bracket, falling back to Silverman bandwidth {h0:.4}");
            return Ok(h0);
        }

        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let f_mid = implicit(mid);
            if !f_mid.is_finite() {
                break;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-12 * h0 {
                break;
            }
        }

        Ok(0.5 * (lo + hi))
    }
}

/// Silverman's rule-of-thumb bandwidth.
pub fn silverman(sigma: f64, n: usize) -> f64 {
    1.06 * sigma * (n as f64).powf(-0.2)
}

/// Samples reduced to equal-width bin counts so the pairwise functional
/// sums run over bin distances instead of raw sample pairs.
struct BinnedSamples {
    counts: Vec<f64>,
    bin_width: f64,
    n: usize,
}

const N_BINS: usize = 1000;

impl BinnedSamples {
    fn new(samples: &[f64]) -> Self {
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let bin_width = ((max - min) / N_BINS as f64).max(f64::MIN_POSITIVE);
        let mut counts = vec![0.0f64; N_BINS + 1];
        for &x in samples {
            let idx = (((x - min) / bin_width) as usize).min(N_BINS);
            counts[idx] += 1.0;
        }
        BinnedSamples {
            counts,
            bin_width,
            n: samples.len(),
        }
    }

    /// `sum_d counts[a] * counts[a+d]` for each bin distance `d`.
    fn pair_count(&self, d: usize) -> f64 {
        self.counts[..self.counts.len() - d]
            .iter()
            .zip(self.counts[d..].iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Kernel estimate of the density functional `phi_r = int f^(r) f` via the
/// identity `phi_r(g) = (n (n-1) g^(r+1))^-1 sum_{i != j} phi^(r)((x_i -
/// x_j)/g)`. Derivatives of the Gaussian are expressed through Hermite
/// polynomials. Pair distances are taken between bin centres; pairs beyond
/// ten bandwidths are dropped (the Gaussian tail there is negligible).
fn functional(binned: &BinnedSamples, g: f64, r: usize) -> f64 {
    let n = binned.n;
    let max_d = ((10.0 * g / binned.bin_width) as usize).min(binned.counts.len() - 1);

    let hermite: fn(f64) -> f64 = match r {
        4 => |x| x.powi(4) - 6.0 * x * x + 3.0,
        6 => |x| x.powi(6) - 15.0 * x.powi(4) + 45.0 * x * x - 15.0,
        _ => unreachable!("unsupported functional order"),
    };
    let phi_r = |x: f64| hermite(x) * gauss_kernel(x);

    // zero-distance bin pairs include the i = j diagonal, which the
    // functional excludes; subtract it explicitly.
    let mut sum = (binned.pair_count(0) - n as f64) * phi_r(0.0);
    for d in 1..=max_d {
        sum += 2.0 * binned.pair_count(d) * phi_r(d as f64 * binned.bin_width / g);
    }

    sum / (n as f64 * (n - 1) as f64 * g.powi(r as i32 + 1))
}
