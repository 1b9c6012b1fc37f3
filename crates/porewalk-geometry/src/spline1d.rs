//! Scalar spline curves `S(t) -> R` in B-spline form.

use porewalk_core::{PorewalkError, Result};
use porewalk_optim::brent;

use crate::basis::{basis_derivative, MAX_DEGREE};

/// A scalar B-spline curve: open knot vector plus control points.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve1D {
    degree: usize,
    knots: Vec<f64>,
    ctrl: Vec<f64>,
}

impl SplineCurve1D {
    /// Builds a curve, validating the knot/control-point cardinality and
    /// knot monotonicity.
    pub fn new(degree: usize, knots: Vec<f64>, ctrl: Vec<f64>) -> Result<Self> {
        validate_spline(degree, &knots, ctrl.len())?;
        Ok(SplineCurve1D { degree, knots, ctrl })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn ctrl_points(&self) -> &[f64] {
        &self.ctrl
    }

    /// Evaluable parameter range `[t_degree, t_{m-degree-1}]`.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.knots.len() - 1 - self.degree],
        )
    }

    /// Knots with multiplicity collapsed. Used for spline export.
    pub fn unique_knots(&self) -> Vec<f64> {
        unique_knots(&self.knots)
    }

    /// Evaluates the `d`-th derivative at `x`.
    ///
    /// Outside the knot range the curve is continued linearly from the
    /// boundary value and first derivative, so profile evaluation on a
    /// common support grid never panics. Second and higher derivatives of
    /// the continuation are zero.
    pub fn evaluate(&self, x: f64, d: usize) -> f64 {
        let (lo, hi) = self.domain();
        if x < lo {
            return extrapolate(x, lo, |xx, dd| self.evaluate_inside(xx, dd), d);
        }
        if x > hi {
            return extrapolate(x, hi, |xx, dd| self.evaluate_inside(xx, dd), d);
        }
        self.evaluate_inside(x, d)
    }

    /// Evaluates a batch of (typically ordered) points, amortising the knot
    /// span search across consecutive evaluations.
    pub fn evaluate_multiple(&self, xs: &[f64], d: usize) -> Vec<f64> {
        let (lo, hi) = self.domain();
        let mut span = self.degree;
        let mut out = Vec::with_capacity(xs.len());
        for &x in xs {
            if x < lo || x > hi {
                out.push(self.evaluate(x, d));
                continue;
            }
            if x < self.knots[span] {
                span = self.find_span(x);
            } else {
                while span < self.knots.len() - self.degree - 2 && self.knots[span + 1] <= x {
                    span += 1;
                }
            }
            out.push(self.evaluate_at_span(span, x, d));
        }
        out
    }

    /// Returns `(argmin, min)` of the curve on `range` by sampling at knot
    /// midpoints and refining the best bracket with Brent's method.
    pub fn minimum(&self, range: (f64, f64)) -> (f64, f64) {
        let (lo, hi) = (range.0.min(range.1), range.0.max(range.1));

        // candidate abscissas: range ends, clipped knots, knot midpoints:
        let mut samples = vec![lo, hi];
        let uk = self.unique_knots();
        for w in uk.windows(2) {
            let mid = 0.5 * (w[0] + w[1]);
            for &c in &[w[0], mid, w[1]] {
                if c > lo && c < hi {
                    samples.push(c);
                }
            }
        }
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
        samples.dedup();

        let values: Vec<f64> = samples.iter().map(|&s| self.evaluate(s, 0)).collect();
        let best = values
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap_or(0);

        let left = if best > 0 { samples[best - 1] } else { lo };
        let right = if best + 1 < samples.len() {
            samples[best + 1]
        } else {
            hi
        };
        if left >= right {
            return (samples[best], values[best]);
        }

        let refined = brent::minimise(|x| self.evaluate(x, 0), left, right, 1e-10, 100);
        if refined.value < values[best] {
            (refined.x, refined.value)
        } else {
            (samples[best], values[best])
        }
    }

    /// Returns a new curve with `offset` added to every control point
    /// (knots preserved).
    pub fn shift(&self, offset: f64) -> SplineCurve1D {
        SplineCurve1D {
            degree: self.degree,
            knots: self.knots.clone(),
            ctrl: self.ctrl.iter().map(|c| c + offset).collect(),
        }
    }

    /// Translates the parameter axis by `delta` (all knots shifted).
    pub fn translate_parameter(&mut self, delta: f64) {
        for t in self.knots.iter_mut() {
            *t += delta;
        }
    }

    fn evaluate_inside(&self, x: f64, d: usize) -> f64 {
        self.evaluate_at_span(self.find_span(x), x, d)
    }

    fn evaluate_at_span(&self, span: usize, x: f64, d: usize) -> f64 {
        let mut value = 0.0;
        for j in 0..=self.degree {
            let i = span - self.degree + j;
            value += self.ctrl[i] * basis_derivative(&self.knots, self.degree, i, x, d);
        }
        value
    }

    /// Largest span index `m` with `knots[m] <= x`, clamped to the evaluable
    /// range, via binary search.
    fn find_span(&self, x: f64) -> usize {
        find_span(&self.knots, self.degree, x)
    }
}

pub(crate) fn validate_spline(degree: usize, knots: &[f64], n_ctrl: usize) -> Result<()> {
    if degree > MAX_DEGREE {
        return Err(PorewalkError::config(format!(
            "spline degree {} exceeds the supported maximum {}",
            degree, MAX_DEGREE
        )));
    }
    if knots.len() != n_ctrl + degree + 1 {
        return Err(PorewalkError::InputSizeMismatch {
            left: knots.len(),
            right: n_ctrl + degree + 1,
        });
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(PorewalkError::InputNotMonotonic);
    }
    Ok(())
}

pub(crate) fn unique_knots(knots: &[f64]) -> Vec<f64> {
    let mut unique: Vec<f64> = Vec::with_capacity(knots.len());
    for &t in knots {
        if unique.last().map_or(true, |&last| t > last) {
            unique.push(t);
        }
    }
    unique
}

pub(crate) fn find_span(knots: &[f64], degree: usize, x: f64) -> usize {
    let hi_span = knots.len() - degree - 2;
    if x >= knots[hi_span + 1] {
        // walk left over any repeated end knots:
        let mut m = hi_span;
        while m > degree && knots[m] == knots[m + 1] {
            m -= 1;
        }
        return m;
    }
    let mut lo = degree;
    let mut hi = hi_span;
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if knots[mid] <= x {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

pub(crate) fn extrapolate(x: f64, boundary: f64, eval: impl Fn(f64, usize) -> f64, d: usize) -> f64 {
    match d {
        0 => eval(boundary, 0) + eval(boundary, 1) * (x - boundary),
        1 => eval(boundary, 1),
        _ => 0.0,
    }
}
