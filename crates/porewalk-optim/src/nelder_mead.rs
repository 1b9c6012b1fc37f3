//! Nelder-Mead downhill simplex, used to polish the annealer's optimum.
//!
//! Standard coefficients (reflection 1, expansion 2, contraction 0.5,
//! shrink 0.5). Formulated as a maximiser to match the annealing module.

use crate::annealing::OptimPoint;

/// Parameters of a simplex run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Iteration bound.
    pub max_iter: usize,
    /// Per-coordinate shift used to build the initial simplex around the
    /// seed vertex.
    pub init_shift: f64,
}

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Maximises `objective` from `init` and returns the best vertex.
pub fn maximise(
    config: &NelderMeadConfig,
    init: &[f64],
    objective: impl Fn(&[f64]) -> f64,
) -> OptimPoint {
    let dim = init.len();

    // initial simplex: seed vertex plus one shifted vertex per coordinate:
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((init.to_vec(), objective(init)));
    for i in 0..dim {
        let mut vertex = init.to_vec();
        vertex[i] += config.init_shift;
        let value = objective(&vertex);
        simplex.push((vertex, value));
    }

    for _ in 0..config.max_iter {
        // order best-to-worst (maximisation):
        simplex.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let worst = simplex.len() - 1;

        // centroid of all vertices except the worst:
        let mut centroid = vec![0.0; dim];
        for (vertex, _) in simplex.iter().take(worst) {
            for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                *c += v;
            }
        }
        for c in centroid.iter_mut() {
            *c /= worst as f64;
        }

        let reflect: Vec<f64> = centroid
            .iter()
            .zip(simplex[worst].0.iter())
            .map(|(c, w)| c + ALPHA * (c - w))
            .collect();
        let reflect_val = objective(&reflect);

        if reflect_val > simplex[0].1 {
            // try expanding further along the reflection direction:
            let expand: Vec<f64> = centroid
                .iter()
                .zip(reflect.iter())
                .map(|(c, r)| c + GAMMA * (r - c))
                .collect();
            let expand_val = objective(&expand);
            simplex[worst] = if expand_val > reflect_val {
                (expand, expand_val)
            } else {
                (reflect, reflect_val)
            };
        } else if reflect_val > simplex[worst - 1].1 {
            simplex[worst] = (reflect, reflect_val);
        } else {
            // contract towards the centroid:
            let contract: Vec<f64> = centroid
                .iter()
                .zip(simplex[worst].0.iter())
                .map(|(c, w)| c + RHO * (w - c))
                .collect();
            let contract_val = objective(&contract);
            if contract_val > simplex[worst].1 {
                simplex[worst] = (contract, contract_val);
            } else {
                // shrink everything towards the best vertex:
                let best = simplex[0].0.clone();
                for (vertex, value) in simplex.iter_mut().skip(1) {
                    for (v, b) in vertex.iter_mut().zip(best.iter()) {
                        *v = b + SIGMA * (*v - b);
                    }
                    *value = objective(vertex);
                }
            }
        }
    }

    simplex.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let (state, value) = simplex.swap_remove(0);
    OptimPoint { state, value }
}
