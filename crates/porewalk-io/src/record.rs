//! Per-frame stream records.
//!
//! Each analysed frame serialises to one JSON line consumed by the
//! aggregator's second pass. Splines travel in sampled form: values at the
//! unique knots, re-interpolated on read. Field names follow the layout of
//! the final results document (`pathSummary`, `residuePositions`, ...).

use porewalk_core::{PorewalkError, Result};
use porewalk_geometry::{cubic_interp_1d, BoundaryCondition, SplineCurve1D, SplineCurve3D};
use serde::{Deserialize, Serialize};

/// Aggregate scalars of one frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub time_stamp: f64,
    pub arg_min_radius: f64,
    pub min_radius: f64,
    pub length: f64,
    pub volume: f64,
    /// Solvent particles inside the pore (`[s_lo, s_hi]`).
    pub num_pathway: f64,
    /// Solvent particles inside the sampled pathway (pore plus bulk ends).
    pub num_sample: f64,
    pub solvent_range_lo: f64,
    pub solvent_range_hi: f64,
    pub arg_min_solvent_density: f64,
    pub min_solvent_density: f64,
    pub arc_length_lo: f64,
    pub arc_length_hi: f64,
    pub band_width: f64,
}

/// A scalar spline in sampled form: one value per unique knot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplineSample {
    pub knots: Vec<f64>,
    pub values: Vec<f64>,
}

impl SplineSample {
    pub fn from_spline(spline: &SplineCurve1D) -> Self {
        let knots = spline.unique_knots();
        let values = spline.evaluate_multiple(&knots, 0);
        SplineSample { knots, values }
    }

    /// Rebuilds a cubic spline through the sampled points.
    pub fn to_spline(&self) -> Result<SplineCurve1D> {
        if self.knots.len() < 2 {
            return Err(PorewalkError::InsufficientSamples {
                required: 2,
                actual: self.knots.len(),
            });
        }
        cubic_interp_1d(&self.knots, &self.values, &BoundaryCondition::Natural)
    }
}

/// The centreline spline in sampled form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreLineSample {
    pub knots: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl CentreLineSample {
    pub fn from_spline(curve: &SplineCurve3D) -> Self {
        let knots = curve.unique_knots();
        let points: Vec<_> = knots.iter().map(|&s| curve.evaluate(s, 0)).collect();
        CentreLineSample {
            knots,
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            z: points.iter().map(|p| p.z).collect(),
        }
    }
}

/// The pathfinder's original probe positions and radii.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTable {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub radius: Vec<f64>,
}

/// Per-residue mapping results, column-oriented.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidueTable {
    pub res_id: Vec<i64>,
    pub res_name: Vec<String>,
    pub s: Vec<f64>,
    pub rho: Vec<f64>,
    pub phi: Vec<f64>,
    pub pore_lining: Vec<bool>,
    pub pore_facing: Vec<bool>,
    pub pore_radius: Vec<f64>,
    pub solvent_density: Vec<f64>,
    pub hydrophobicity: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Per-solvent-particle mapping results, column-oriented.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolventTable {
    pub id: Vec<i64>,
    pub s: Vec<f64>,
    pub rho: Vec<f64>,
    pub phi: Vec<f64>,
    pub inside_pore: Vec<bool>,
    pub inside_sample: Vec<bool>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// One frame's complete analysis output: a line of the stream file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayRecord {
    pub path_summary: PathSummary,
    pub path_points: ProbeTable,
    pub centre_line_spline: CentreLineSample,
    pub radius_spline: SplineSample,
    pub solvent_density_spline: SplineSample,
    pub pl_hydrophobicity_spline: SplineSample,
    pub pf_hydrophobicity_spline: SplineSample,
    pub residue_positions: ResidueTable,
    pub solvent_positions: SolventTable,
}

impl PathwayRecord {
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_line(line: &str, line_no: usize) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| PorewalkError::MalformedFrameRecord {
            line: line_no,
            message: e.to_string(),
        })
    }
}
