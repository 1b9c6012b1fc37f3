//! Spline interpolation in B-spline form.
//!
//! Cubic interpolation solves the collocation system over a clamped knot
//! vector: one interpolation condition per data point plus two endpoint
//! conditions (vanishing second derivative for natural splines, prescribed
//! first derivative for clamped ones). The system is banded; with the data
//! sizes seen per frame a dense LU factorisation is plenty.

use nalgebra::{DMatrix, DVector};
use porewalk_core::{PorewalkError, Result, Vec3};

use crate::basis::{basis, basis_derivative, open_knot_vector};
use crate::spline1d::SplineCurve1D;
use crate::spline3d::SplineCurve3D;

/// Endpoint policy for cubic interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    /// Second derivative vanishes at both ends.
    Natural,
    /// First derivative prescribed at both ends.
    Clamped { start: f64, end: f64 },
}

/// Endpoint policy for componentwise 3D interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition3 {
    Natural,
    Clamped { start: Vec3, end: Vec3 },
}

/// Parameter assignment for interpolating a 3D point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveParameterisation {
    /// `t_i = i`
    Uniform,
    /// `t_i = t_{i-1} + |P_i - P_{i-1}|`
    ChordLength,
    /// `t_i = t_{i-1} + sqrt(|P_i - P_{i-1}|)`
    Centripetal,
}

/// Cubic spline through `(xs[i], ys[i])` with the given endpoint policy.
pub fn cubic_interp_1d(xs: &[f64], ys: &[f64], bc: &BoundaryCondition) -> Result<SplineCurve1D> {
    validate_interp_input(xs, ys.len())?;

    let degree = 3;
    let n = xs.len();
    let knots = open_knot_vector(xs, degree);
    let n_ctrl = n + 2;

    let mut a = DMatrix::<f64>::zeros(n_ctrl, n_ctrl);
    let mut rhs = DVector::<f64>::zeros(n_ctrl);

    // first row: endpoint condition at xs[0] (only the first three basis
    // functions are non-zero there):
    match bc {
        BoundaryCondition::Natural => {
            for i in 0..3 {
                a[(0, i)] = basis_derivative(&knots, degree, i, xs[0], 2);
            }
            rhs[0] = 0.0;
        }
        BoundaryCondition::Clamped { start, .. } => {
            for i in 0..3 {
                a[(0, i)] = basis_derivative(&knots, degree, i, xs[0], 1);
            }
            rhs[0] = *start;
        }
    }

    // interpolation conditions:
    for (j, (&x, &y)) in xs.iter().zip(ys.iter()).enumerate() {
        for i in 0..n_ctrl {
            let b = basis(&knots, degree, i, x);
            if b != 0.0 {
                a[(j + 1, i)] = b;
            }
        }
        rhs[j + 1] = y;
    }

    // last row: endpoint condition at xs[n-1]:
    match bc {
        BoundaryCondition::Natural => {
            for i in (n_ctrl - 3)..n_ctrl {
                a[(n_ctrl - 1, i)] = basis_derivative(&knots, degree, i, xs[n - 1], 2);
            }
            rhs[n_ctrl - 1] = 0.0;
        }
        BoundaryCondition::Clamped { end, .. } => {
            for i in (n_ctrl - 3)..n_ctrl {
                a[(n_ctrl - 1, i)] = basis_derivative(&knots, degree, i, xs[n - 1], 1);
            }
            rhs[n_ctrl - 1] = *end;
        }
    }

    let ctrl = a
        .lu()
        .solve(&rhs)
        .ok_or_else(|| PorewalkError::internal("singular spline collocation system"))?;

    SplineCurve1D::new(degree, knots, ctrl.iter().copied().collect())
}

/// Piecewise-linear spline through `(xs[i], ys[i])` (degree-1 B-spline).
///
/// Preferred where cubic overshoot is undesirable, e.g. energy profiles.
pub fn linear_interp_1d(xs: &[f64], ys: &[f64]) -> Result<SplineCurve1D> {
    validate_interp_input(xs, ys.len())?;
    let knots = open_knot_vector(xs, 1);
    SplineCurve1D::new(1, knots, ys.to_vec())
}

/// Cubic curve through a 3D point sequence with automatic parameter
/// assignment and natural end conditions.
pub fn cubic_interp_3d(
    points: &[Vec3],
    parameterisation: CurveParameterisation,
) -> Result<SplineCurve3D> {
    let ts = assign_parameters(points, parameterisation)?;
    cubic_interp_3d_with_params(&ts, points, &BoundaryCondition3::Natural)
}

/// Cubic curve through `(ts[i], points[i])` with explicit parameters.
pub fn cubic_interp_3d_with_params(
    ts: &[f64],
    points: &[Vec3],
    bc: &BoundaryCondition3,
) -> Result<SplineCurve3D> {
    validate_interp_input(ts, points.len())?;

    let component_bc = |axis: usize| match bc {
        BoundaryCondition3::Natural => BoundaryCondition::Natural,
        BoundaryCondition3::Clamped { start, end } => BoundaryCondition::Clamped {
            start: start[axis],
            end: end[axis],
        },
    };

    let mut component_splines = Vec::with_capacity(3);
    for axis in 0..3 {
        let values: Vec<f64> = points.iter().map(|p| p[axis]).collect();
        component_splines.push(cubic_interp_1d(ts, &values, &component_bc(axis))?);
    }

    let knots = component_splines[0].knots().to_vec();
    let n_ctrl = component_splines[0].ctrl_points().len();
    let ctrl: Vec<Vec3> = (0..n_ctrl)
        .map(|i| {
            Vec3::new(
                component_splines[0].ctrl_points()[i],
                component_splines[1].ctrl_points()[i],
                component_splines[2].ctrl_points()[i],
            )
        })
        .collect();

    SplineCurve3D::new(3, knots, ctrl)
}

/// Computes parameter values for a 3D point sequence.
pub fn assign_parameters(
    points: &[Vec3],
    parameterisation: CurveParameterisation,
) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Err(PorewalkError::InsufficientSamples {
            required: 2,
            actual: points.len(),
        });
    }
    let mut ts = Vec::with_capacity(points.len());
    ts.push(0.0);
    for (i, w) in points.windows(2).enumerate() {
        let dist = (w[1] - w[0]).norm();
        let increment = match parameterisation {
            CurveParameterisation::Uniform => 1.0,
            CurveParameterisation::ChordLength => dist,
            CurveParameterisation::Centripetal => dist.sqrt(),
        };
        if increment <= 0.0 {
            return Err(PorewalkError::input(format!(
                "coincident path points at index {} break the curve parameterisation",
                i
            )));
        }
        ts.push(ts[i] + increment);
    }
    Ok(ts)
}

fn validate_interp_input(xs: &[f64], n_values: usize) -> Result<()> {
    if xs.len() != n_values {
        return Err(PorewalkError::InputSizeMismatch {
            left: xs.len(),
            right: n_values,
        });
    }
    if xs.len() < 2 {
        return Err(PorewalkError::InsufficientSamples {
            required: 2,
            actual: xs.len(),
        });
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(PorewalkError::InputNotMonotonic);
    }
    Ok(())
}
