//! B-spline basis functions over an open knot vector.
//!
//! Cox-de Boor recursion with the convention `0/0 = 0`. Basis supports are
//! half-open intervals, except that the rightmost knot is included in the
//! support of the last basis function so the partition of unity holds on the
//! closed domain.

/// Largest degree the evaluator supports. Pathway analysis uses cubics;
/// higher degrees appear only in property tests.
pub const MAX_DEGREE: usize = 5;

/// Evaluates the zero-degree basis (interval indicator) for knot span `j`.
fn indicator(knots: &[f64], j: usize, x: f64) -> f64 {
    let t_max = knots[knots.len() - 1];
    if knots[j] <= x && x < knots[j + 1] {
        1.0
    } else if x == t_max && knots[j] < knots[j + 1] && knots[j + 1] == t_max {
        // close the last non-empty interval at the rightmost knot:
        1.0
    } else {
        0.0
    }
}

/// Evaluates `B_{i,degree}(x)` over `knots`.
///
/// Runs the triangular Cox-de Boor scheme over a fixed-size scratch array of
/// `degree + 1` entries, O(degree^2) time and no heap allocation.
pub fn basis(knots: &[f64], degree: usize, i: usize, x: f64) -> f64 {
    assert!(degree <= MAX_DEGREE, "unsupported spline degree {}", degree);
    assert!(
        i + degree + 1 < knots.len(),
        "basis index {} out of range for {} knots, degree {}",
        i,
        knots.len(),
        degree
    );

    let mut scratch = [0.0f64; MAX_DEGREE + 1];
    for (j, slot) in scratch.iter_mut().enumerate().take(degree + 1) {
        *slot = indicator(knots, i + j, x);
    }

    for k in 1..=degree {
        for j in 0..=(degree - k) {
            let idx = i + j;

            let left_denom = knots[idx + k] - knots[idx];
            let alpha = if left_denom > 0.0 {
                (x - knots[idx]) / left_denom
            } else {
                0.0
            };

            let right_denom = knots[idx + k + 1] - knots[idx + 1];
            let beta = if right_denom > 0.0 {
                (knots[idx + k + 1] - x) / right_denom
            } else {
                0.0
            };

            scratch[j] = alpha * scratch[j] + beta * scratch[j + 1];
        }
    }

    scratch[0]
}

/// Evaluates the `order`-th derivative of `B_{i,degree}(x)`.
///
/// Uses the standard derivative identity
/// `B'_{i,k} = k (B_{i,k-1}/(t_{i+k}-t_i) - B_{i+1,k-1}/(t_{i+k+1}-t_{i+1}))`
/// applied recursively, with vanishing terms where the knot differences are
/// zero.
pub fn basis_derivative(knots: &[f64], degree: usize, i: usize, x: f64, order: usize) -> f64 {
    if order == 0 {
        return basis(knots, degree, i, x);
    }
    if degree == 0 {
        return 0.0;
    }

    let k = degree as f64;
    let left_denom = knots[i + degree] - knots[i];
    let left = if left_denom > 0.0 {
        basis_derivative(knots, degree - 1, i, x, order - 1) / left_denom
    } else {
        0.0
    };
    let right_denom = knots[i + degree + 1] - knots[i + 1];
    let right = if right_denom > 0.0 {
        basis_derivative(knots, degree - 1, i + 1, x, order - 1) / right_denom
    } else {
        0.0
    };

    k * (left - right)
}

/// Builds an open (clamped) knot vector from strictly increasing break
/// points: first and last breaks are repeated `degree + 1` times.
pub fn open_knot_vector(breaks: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(breaks.len() + 2 * degree);
    for _ in 0..degree {
        knots.push(breaks[0]);
    }
    knots.extend_from_slice(breaks);
    for _ in 0..degree {
        knots.push(breaks[breaks.len() - 1]);
    }
    knots
}

/// Number of basis functions over an open knot vector built from `n_breaks`
/// break points.
pub fn basis_count(n_breaks: usize, degree: usize) -> usize {
    n_breaks + degree - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // knot layout from "A very short note on B-splines" (Sinha); evaluation
    // points probe both knot values and interior points.
    const BREAKS: [f64; 5] = [-4.0, -0.5, 0.0, 0.5, 4.0];

    fn eval_points() -> Vec<f64> {
        vec![-4.0, -2.5, 0.0, 0.5, -1.0, std::f64::consts::SQRT_2, 4.0]
    }

    #[test]
    fn partition_of_unity_up_to_degree_five() {
        for degree in 0..=MAX_DEGREE {
            let knots = open_knot_vector(&BREAKS, degree);
            let n_basis = basis_count(BREAKS.len(), degree);
            for &x in &eval_points() {
                let unity: f64 = (0..n_basis).map(|i| basis(&knots, degree, i, x)).sum();
                assert_relative_eq!(unity, 1.0, epsilon = 8.0 * f64::EPSILON);
            }
        }
    }

    #[test]
    fn non_negativity() {
        for degree in 0..=MAX_DEGREE {
            let knots = open_knot_vector(&BREAKS, degree);
            let n_basis = basis_count(BREAKS.len(), degree);
            for &x in &eval_points() {
                for i in 0..n_basis {
                    assert!(basis(&knots, degree, i, x) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let degree = 3;
        let knots = open_knot_vector(&BREAKS, degree);
        let h = 1e-6;
        for i in 0..basis_count(BREAKS.len(), degree) {
            for &x in &[-2.0, -0.25, 0.25, 1.7] {
                let analytic = basis_derivative(&knots, degree, i, x, 1);
                let numeric = (basis(&knots, degree, i, x + h) - basis(&knots, degree, i, x - h))
                    / (2.0 * h);
                assert_relative_eq!(analytic, numeric, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn derivatives_of_degree_zero_vanish() {
        let knots = open_knot_vector(&BREAKS, 0);
        assert_eq!(basis_derivative(&knots, 0, 1, -0.25, 1), 0.0);
    }
}
