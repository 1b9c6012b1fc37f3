//! Wavefront OBJ export of the pathway surface.
//!
//! The surface is a tube of vertex rings around sampled centreline points,
//! with the ring plane spanned by the transported normal frame and the ring
//! radius taken from the local radius profile. Faces are quads between
//! consecutive rings, collected under a single group.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use porewalk_core::Result;
use porewalk_geometry::{transported_frames, SplineCurve1D, SplineCurve3D};

/// Tube mesh resolution.
#[derive(Debug, Clone, Copy)]
pub struct ObjExportParams {
    /// Axial spacing of the vertex rings.
    pub axial_spacing: f64,
    /// Vertices per ring.
    pub ring_vertices: usize,
}

impl Default for ObjExportParams {
    fn default() -> Self {
        ObjExportParams {
            axial_spacing: 0.05,
            ring_vertices: 24,
        }
    }
}

/// Minimum ring radius; keeps the mesh non-degenerate where the profile
/// pinches to zero.
const MIN_RING_RADIUS: f64 = 1e-3;

/// Writes the pathway surface between `s_lo` and `s_hi` to `out_path`.
pub fn export_pathway_surface(
    out_path: &Path,
    centre_line: &SplineCurve3D,
    radius: &SplineCurve1D,
    s_lo: f64,
    s_hi: f64,
    params: &ObjExportParams,
) -> Result<()> {
    let n_rings = (((s_hi - s_lo) / params.axial_spacing).ceil() as usize).max(1) + 1;
    let ds = (s_hi - s_lo) / (n_rings - 1) as f64;
    let frames = transported_frames(centre_line, ds.max(1e-6));

    let mut out = BufWriter::new(File::create(out_path)?);
    writeln!(out, "# produced by porewalk")?;
    writeln!(out)?;

    let m = params.ring_vertices;
    for i in 0..n_rings {
        let s = s_lo + i as f64 * ds;
        let centre = centre_line.evaluate(s, 0);
        let r = radius.evaluate(s, 0).max(MIN_RING_RADIUS);

        // nearest transported frame along the curve:
        let fi = frames
            .partition_point(|f| f.s < s)
            .min(frames.len() - 1);
        let frame = &frames[fi];

        for j in 0..m {
            let theta = 2.0 * std::f64::consts::PI * j as f64 / m as f64;
            let v = centre + r * (theta.cos() * frame.normal1 + theta.sin() * frame.normal2);
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "g pathway_surface")?;
    for i in 0..(n_rings - 1) {
        let base = i * m;
        for j in 0..m {
            // OBJ indices are 1-based:
            let a = base + j + 1;
            let b = base + (j + 1) % m + 1;
            let c = base + m + (j + 1) % m + 1;
            let d = base + m + j + 1;
            writeln!(out, "f {} {} {} {}", a, b, c, d)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use porewalk_core::Vec3;
    use porewalk_geometry::{cubic_interp_3d_with_params, linear_interp_1d, BoundaryCondition3};

    #[test]
    fn writes_vertices_and_quads() {
        let ts: Vec<f64> = (0..=4).map(|i| i as f64).collect();
        let points: Vec<Vec3> = ts.iter().map(|&t| Vec3::new(0.0, 0.0, t)).collect();
        let centre =
            cubic_interp_3d_with_params(&ts, &points, &BoundaryCondition3::Natural).unwrap();
        let radius = linear_interp_1d(&ts, &[0.5; 5]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.obj");
        let params = ObjExportParams {
            axial_spacing: 1.0,
            ring_vertices: 8,
        };
        export_pathway_surface(&path, &centre, &radius, 0.0, 4.0, &params).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let n_vertices = content.lines().filter(|l| l.starts_with("v ")).count();
        let n_faces = content.lines().filter(|l| l.starts_with("f ")).count();
        assert_eq!(n_vertices, 5 * 8);
        assert_eq!(n_faces, 4 * 8);
        assert!(content.contains("g pathway_surface"));

        // ring vertices sit at the tube radius:
        let first_vertex = content
            .lines()
            .find(|l| l.starts_with("v "))
            .unwrap()
            .split_whitespace()
            .skip(1)
            .map(|t| t.parse::<f64>().unwrap())
            .collect::<Vec<_>>();
        let rho = (first_vertex[0] * first_vertex[0] + first_vertex[1] * first_vertex[1]).sqrt();
        assert!((rho - 0.5).abs() < 1e-9);
    }
}
