//! The molecular pathway: centreline and radius profile built from the
//! pathfinder's probe sequence, plus the curvilinear mapping of particles
//! onto it.

use std::collections::BTreeMap;

use porewalk_core::{MappedCoord, PorewalkError, Probe, Result, Vec3};
use porewalk_geometry::{
    adaptive_quadrature, cubic_interp_1d, cubic_interp_3d, transported_frames, BoundaryCondition,
    CurveParameterisation, PathFrame, SplineCurve1D, SplineCurve3D,
};
use porewalk_optim::brent;

/// Relative tolerance for the pathway volume integral.
const VOLUME_REL_TOL: f64 = 1e-6;

/// Spacing of the precomputed transported frames used for azimuth
/// computation.
const FRAME_STEP: f64 = 0.02;

/// Parameters of the position-onto-pathway mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingParams {
    /// Coarse sampling resolution along the centreline.
    pub sample_step: f64,
    /// Absolute tolerance of the Brent refinement.
    pub map_tol: f64,
    /// How far beyond the pathway ends the mapping may extrapolate.
    pub extrap_dist: f64,
    /// Iteration budget of the refinement.
    pub max_iter: usize,
}

impl Default for MappingParams {
    fn default() -> Self {
        MappingParams {
            sample_step: 0.05,
            map_tol: 1e-7,
            extrap_dist: 0.0,
            max_iter: 100,
        }
    }
}

/// A channel pathway for one frame: arc-length-parameterised centreline,
/// radius profile, pore domain and the original probe sequence.
#[derive(Debug, Clone)]
pub struct MolecularPath {
    centre_line: SplineCurve3D,
    radius: SplineCurve1D,
    s_lo: f64,
    s_hi: f64,
    probe_points: Vec<Vec3>,
    probe_radii: Vec<f64>,
    frames: Vec<PathFrame>,
}

impl MolecularPath {
    /// Builds the pathway from an ordered probe sequence.
    ///
    /// The centreline is a cubic through the probe centres with
    /// chord-length parameterisation, reparameterised by arc length; the
    /// radius profile is a cubic through `(s_i, r_i)`. Probes whose radius
    /// saturated at `max_probe_radius` (the exit probes) stay in the fit
    /// but are excluded from the pore domain `[s_lo, s_hi]`.
    pub fn from_probes(probes: &[Probe], max_probe_radius: f64) -> Result<Self> {
        if probes.len() < 2 {
            return Err(PorewalkError::InsufficientSamples {
                required: 2,
                actual: probes.len(),
            });
        }

        let centres: Vec<Vec3> = probes.iter().map(|p| p.centre).collect();
        let radii: Vec<f64> = probes.iter().map(|p| p.radius).collect();

        let centre_line = cubic_interp_3d(&centres, CurveParameterisation::ChordLength)?
            .arc_length_reparameterise()?;

        // the reparameterised break points are the probes' arc-length
        // coordinates:
        let arc = centre_line.unique_knots();
        debug_assert_eq!(arc.len(), centres.len());
        let radius = cubic_interp_1d(&arc, &radii, &BoundaryCondition::Natural)?;

        let interior: Vec<usize> = radii
            .iter()
            .enumerate()
            .filter(|(_, &r)| r < max_probe_radius)
            .map(|(i, _)| i)
            .collect();
        let (s_lo, s_hi) = match (interior.first(), interior.last()) {
            (Some(&first), Some(&last)) if first < last => (arc[first], arc[last]),
            // degenerate pore (e.g. the naive finder's uniform ladder):
            // fall back to the full arc range.
            _ => (arc[0], arc[arc.len() - 1]),
        };

        let frames = transported_frames(&centre_line, FRAME_STEP);

        Ok(MolecularPath {
            centre_line,
            radius,
            s_lo,
            s_hi,
            probe_points: centres,
            probe_radii: radii,
            frames,
        })
    }

    pub fn s_lo(&self) -> f64 {
        self.s_lo
    }

    pub fn s_hi(&self) -> f64 {
        self.s_hi
    }

    /// Arc-length range covered by the centreline spline, including the
    /// exit probes (the bulk sampling regime).
    pub fn full_domain(&self) -> (f64, f64) {
        self.centre_line.domain()
    }

    pub fn centre_line(&self) -> &SplineCurve3D {
        &self.centre_line
    }

    pub fn radius_spline(&self) -> &SplineCurve1D {
        &self.radius
    }

    pub fn path_points(&self) -> &[Vec3] {
        &self.probe_points
    }

    pub fn path_radii(&self) -> &[f64] {
        &self.probe_radii
    }

    /// Local pathway radius at arc length `s`.
    pub fn radius(&self, s: f64) -> f64 {
        self.radius.evaluate(s, 0)
    }

    /// Pore length `s_hi - s_lo`.
    pub fn length(&self) -> f64 {
        self.s_hi - self.s_lo
    }

    /// Pore volume, `int pi R(s)^2 ds` over the pore domain.
    pub fn volume(&self) -> f64 {
        adaptive_quadrature(
            &|s| {
                let r = self.radius(s);
                std::f64::consts::PI * r * r
            },
            self.s_lo,
            self.s_hi,
            VOLUME_REL_TOL,
        )
    }

    /// `(argmin, min)` of the radius profile over the pore domain.
    pub fn min_radius(&self) -> (f64, f64) {
        self.radius.minimum((self.s_lo, self.s_hi))
    }

    /// Radius profile sampled at the given arc-length coordinates.
    pub fn sample_radii(&self, ss: &[f64]) -> Vec<f64> {
        self.radius.evaluate_multiple(ss, 0)
    }

    /// Centreline points at the given arc-length coordinates.
    pub fn sample_points(&self, ss: &[f64]) -> Vec<Vec3> {
        ss.iter().map(|&s| self.centre_line.evaluate(s, 0)).collect()
    }

    /// Maps 3D positions onto curvilinear coordinates `(s, rho, phi)`.
    ///
    /// For each position the closest centreline point is located by coarse
    /// sampling at `params.sample_step` followed by Brent refinement of the
    /// bracketed minimum; `rho` is the residual distance and `phi` the
    /// azimuth of the offset in the transported normal frame.
    pub fn map_positions(
        &self,
        positions: &[Vec3],
        params: &MappingParams,
    ) -> Result<Vec<MappedCoord>> {
        let (d_lo, d_hi) = self.centre_line.domain();
        let lo = d_lo - params.extrap_dist;
        let hi = d_hi + params.extrap_dist;

        let n = (((hi - lo) / params.sample_step).ceil() as usize).max(1) + 1;
        let ds = (hi - lo) / (n - 1) as f64;
        let grid: Vec<f64> = (0..n).map(|i| lo + i as f64 * ds).collect();
        let grid_points: Vec<Vec3> = grid
            .iter()
            .map(|&s| self.centre_line.evaluate(s, 0))
            .collect();

        let mut mapped = Vec::with_capacity(positions.len());
        for &p in positions {
            let coarse = grid_points
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    (a.1 - p)
                        .norm_squared()
                        .partial_cmp(&(b.1 - p).norm_squared())
                        .unwrap()
                })
                .map(|(i, _)| i)
                .unwrap_or(0);

            let left = grid[coarse.saturating_sub(1)];
            let right = grid[(coarse + 1).min(n - 1)];
            let refined = brent::minimise(
                |s| (self.centre_line.evaluate(s, 0) - p).norm_squared(),
                left,
                right,
                params.map_tol,
                params.max_iter,
            );
            if !refined.converged {
                return Err(PorewalkError::MappingDidNotConverge {
                    max_iter: params.max_iter,
                });
            }

            let s = refined.x;
            let delta = p - self.centre_line.evaluate(s, 0);
            let rho = delta.norm();
            let phi = if rho > 1e-9 {
                let frame = self.frame_at(s);
                (frame.normal2.dot(&delta)).atan2(frame.normal1.dot(&delta))
            } else {
                0.0
            };
            mapped.push(MappedCoord { s, rho, phi });
        }
        Ok(mapped)
    }

    /// Flags each mapped particle as inside the pathway over the given
    /// arc-length range: `rho <= R(s) + margin` and `s` within range.
    pub fn check_if_inside(
        &self,
        mapped: &BTreeMap<i64, MappedCoord>,
        margin: f64,
        range: (f64, f64),
    ) -> BTreeMap<i64, bool> {
        mapped
            .iter()
            .map(|(&id, coord)| {
                let inside = coord.s >= range.0
                    && coord.s <= range.1
                    && coord.rho <= self.radius(coord.s) + margin;
                (id, inside)
            })
            .collect()
    }

    /// Subtracts `p` from every control point of the centreline and from
    /// the stored probe points (spatial alignment).
    pub fn shift(&mut self, p: Vec3) {
        self.centre_line.shift(-p);
        for q in self.probe_points.iter_mut() {
            *q -= p;
        }
    }

    /// Moves the arc-length origin to `s0`, so profiles are centred on the
    /// mapped initial probe position.
    pub fn centre_arc_origin(&mut self, s0: f64) {
        self.centre_line.translate_parameter(-s0);
        self.radius.translate_parameter(-s0);
        self.s_lo -= s0;
        self.s_hi -= s0;
        for f in self.frames.iter_mut() {
            f.s -= s0;
        }
    }

    /// Transported frame closest to arc length `s`.
    fn frame_at(&self, s: f64) -> &PathFrame {
        let idx = self
            .frames
            .partition_point(|f| f.s < s)
            .min(self.frames.len() - 1);
        if idx > 0 && (self.frames[idx - 1].s - s).abs() < (self.frames[idx].s - s).abs() {
            &self.frames[idx - 1]
        } else {
            &self.frames[idx]
        }
    }
}
