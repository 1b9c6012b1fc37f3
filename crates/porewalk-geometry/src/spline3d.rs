//! Vector-valued spline curves `C(t) -> R^3` and their differential
//! geometry: arc length, arc-length reparameterisation and transported
//! normal frames.

use porewalk_core::{Result, Vec3};

use crate::basis::basis_derivative;
use crate::interp::{cubic_interp_3d_with_params, BoundaryCondition3};
use crate::quadrature::adaptive_quadrature;
use crate::spline1d::{extrapolate, find_span, unique_knots, validate_spline};

/// Relative tolerance for arc-length quadrature.
const LENGTH_REL_TOL: f64 = 1e-6;

/// A 3D B-spline curve: open knot vector plus vector control points.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve3D {
    degree: usize,
    knots: Vec<f64>,
    ctrl: Vec<Vec3>,
}

impl SplineCurve3D {
    pub fn new(degree: usize, knots: Vec<f64>, ctrl: Vec<Vec3>) -> Result<Self> {
        validate_spline(degree, &knots, ctrl.len())?;
        Ok(SplineCurve3D { degree, knots, ctrl })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn ctrl_points(&self) -> &[Vec3] {
        &self.ctrl
    }

    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.knots.len() - 1 - self.degree],
        )
    }

    pub fn unique_knots(&self) -> Vec<f64> {
        unique_knots(&self.knots)
    }

    /// Evaluates the `d`-th derivative at `t`, continuing linearly outside
    /// the knot range (see `SplineCurve1D::evaluate`).
    pub fn evaluate(&self, t: f64, d: usize) -> Vec3 {
        let (lo, hi) = self.domain();
        if t < lo || t > hi {
            let boundary = if t < lo { lo } else { hi };
            let x = extrapolate(t, boundary, |tt, dd| self.evaluate_inside(tt, dd).x, d);
            let y = extrapolate(t, boundary, |tt, dd| self.evaluate_inside(tt, dd).y, d);
            let z = extrapolate(t, boundary, |tt, dd| self.evaluate_inside(tt, dd).z, d);
            return Vec3::new(x, y, z);
        }
        self.evaluate_inside(t, d)
    }

    /// Speed `|C'(t)|`.
    pub fn speed(&self, t: f64) -> f64 {
        self.evaluate(t, 1).norm()
    }

    /// Arc length between two parameter values by adaptive Gauss-Legendre
    /// quadrature of the speed.
    pub fn length_between(&self, t0: f64, t1: f64) -> f64 {
        adaptive_quadrature(&|t| self.speed(t), t0, t1, LENGTH_REL_TOL)
    }

    /// Total arc length over the evaluable domain.
    pub fn length(&self) -> f64 {
        let (lo, hi) = self.domain();
        self.length_between(lo, hi)
    }

    /// Replaces the curve parameter by arc length.
    ///
    /// Computes cumulative arc length at every unique knot and refits a
    /// cubic through the same curve points with clamped unit-tangent end
    /// conditions, so `|C'(s)| ~ 1` everywhere on the new parameterisation.
    pub fn arc_length_reparameterise(&self) -> Result<SplineCurve3D> {
        let breaks = self.unique_knots();
        let mut arc = Vec::with_capacity(breaks.len());
        let mut points = Vec::with_capacity(breaks.len());
        let mut total = 0.0;
        arc.push(0.0);
        points.push(self.evaluate(breaks[0], 0));
        for w in breaks.windows(2) {
            total += self.length_between(w[0], w[1]);
            arc.push(total);
            points.push(self.evaluate(w[1], 0));
        }

        let start_tangent = normalise_or(self.evaluate(breaks[0], 1), Vec3::new(0.0, 0.0, 1.0));
        let end_tangent = normalise_or(
            self.evaluate(breaks[breaks.len() - 1], 1),
            Vec3::new(0.0, 0.0, 1.0),
        );

        cubic_interp_3d_with_params(
            &arc,
            &points,
            &BoundaryCondition3::Clamped {
                start: start_tangent,
                end: end_tangent,
            },
        )
    }

    /// Adds `offset` to every control point.
    pub fn shift(&mut self, offset: Vec3) {
        for c in self.ctrl.iter_mut() {
            *c += offset;
        }
    }

    /// Translates the parameter axis by `delta`.
    pub fn translate_parameter(&mut self, delta: f64) {
        for t in self.knots.iter_mut() {
            *t += delta;
        }
    }

    fn evaluate_inside(&self, t: f64, d: usize) -> Vec3 {
        let span = find_span(&self.knots, self.degree, t);
        let mut value = Vec3::zeros();
        for j in 0..=self.degree {
            let i = span - self.degree + j;
            value += self.ctrl[i] * basis_derivative(&self.knots, self.degree, i, t, d);
        }
        value
    }
}

/// An orthonormal frame transported along the curve: tangent plus two
/// normal directions spanning the plane perpendicular to it.
#[derive(Debug, Clone, Copy)]
pub struct PathFrame {
    pub s: f64,
    pub tangent: Vec3,
    pub normal1: Vec3,
    pub normal2: Vec3,
}

/// Builds parallel-transported frames at roughly `step`-spaced parameter
/// values over the curve domain. The first normal is seeded from the
/// coordinate axis least aligned with the initial tangent and projected
/// onto each successive normal plane, which avoids the sudden flips a
/// Frenet frame suffers at inflection points.
pub fn transported_frames(curve: &SplineCurve3D, step: f64) -> Vec<PathFrame> {
    let (lo, hi) = curve.domain();
    let n = (((hi - lo) / step).ceil() as usize).max(1) + 1;
    let dt = (hi - lo) / (n - 1) as f64;

    let mut frames = Vec::with_capacity(n);
    let mut tangent = normalise_or(curve.evaluate(lo, 1), Vec3::new(0.0, 0.0, 1.0));
    let mut normal1 = seed_normal(tangent);

    for i in 0..n {
        let s = lo + i as f64 * dt;
        if i > 0 {
            tangent = normalise_or(curve.evaluate(s, 1), tangent);
            // transport the previous normal into the new normal plane:
            let projected = normal1 - tangent * normal1.dot(&tangent);
            normal1 = if projected.norm() > 1e-12 {
                projected.normalize()
            } else {
                seed_normal(tangent)
            };
        }
        let normal2 = tangent.cross(&normal1);
        frames.push(PathFrame {
            s,
            tangent,
            normal1,
            normal2,
        });
    }
    frames
}

fn seed_normal(tangent: Vec3) -> Vec3 {
    let axis = if tangent.x.abs() <= tangent.y.abs() && tangent.x.abs() <= tangent.z.abs() {
        Vec3::new(1.0, 0.0, 0.0)
    } else if tangent.y.abs() <= tangent.z.abs() {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    let projected = axis - tangent * axis.dot(&tangent);
    projected.normalize()
}

fn normalise_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let n = v.norm();
    if n > 1e-12 {
        v / n
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::open_knot_vector;
    use crate::interp::{cubic_interp_3d, CurveParameterisation};
    use approx::assert_relative_eq;

    fn straight_line() -> SplineCurve3D {
        // linear curve along z scaled by 2: C(t) = (0, 0, 2t) on [0, 1]
        let knots = open_knot_vector(&[0.0, 1.0], 1);
        SplineCurve3D::new(
            1,
            knots,
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0)],
        )
        .unwrap()
    }

    #[test]
    fn length_of_straight_segment() {
        let c = straight_line();
        assert_relative_eq!(c.length(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(c.length_between(0.25, 0.75), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_length_reparameterisation_gives_unit_speed() {
        // helix-like arc sampled finely enough that the cubic refit's
        // derivative error stays below the unit-speed tolerance:
        let points: Vec<Vec3> = (0..26)
            .map(|i| {
                let t = i as f64 * 0.08;
                Vec3::new(t.cos(), t.sin(), 0.3 * t)
            })
            .collect();
        let c = cubic_interp_3d(&points, CurveParameterisation::ChordLength).unwrap();
        let r = c.arc_length_reparameterise().unwrap();

        let (lo, hi) = r.domain();
        for i in 0..=20 {
            let s = lo + (hi - lo) * i as f64 / 20.0;
            assert_relative_eq!(r.speed(s), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn transported_frames_stay_orthonormal() {
        let points: Vec<Vec3> = (0..6)
            .map(|i| {
                let t = i as f64 * 0.4;
                Vec3::new(0.5 * t.sin(), 0.2 * t, t)
            })
            .collect();
        let c = cubic_interp_3d(&points, CurveParameterisation::ChordLength).unwrap();
        let frames = transported_frames(&c, 0.05);
        assert!(frames.len() > 10);
        for f in &frames {
            assert_relative_eq!(f.tangent.norm(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(f.normal1.norm(), 1.0, epsilon = 1e-9);
            assert!(f.tangent.dot(&f.normal1).abs() < 1e-9);
            assert!(f.normal1.dot(&f.normal2).abs() < 1e-9);
        }
        // the frame varies smoothly: consecutive normals stay close.
        for w in frames.windows(2) {
            assert!(w[0].normal1.dot(&w[1].normal1) > 0.99);
        }
    }

    #[test]
    fn shift_translates_evaluations() {
        let mut c = straight_line();
        c.shift(Vec3::new(1.0, -1.0, 0.0));
        let p = c.evaluate(0.5, 0);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);
    }
}
