//! Shared geometric and trajectory types.
//!
//! Positions are in nanometres, following the conventions of the upstream
//! trajectory provider. All analysis runs in `f64`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 3D position/direction vector.
pub type Vec3 = nalgebra::Vector3<f64>;

/// A spherical probe recorded by the pathfinder: centre plus free radius
/// (distance to the nearest obstacle surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub centre: Vec3,
    pub radius: f64,
}

impl Probe {
    pub fn new(centre: Vec3, radius: f64) -> Self {
        Probe { centre, radius }
    }
}

/// Curvilinear coordinates of a point relative to the pathway centreline:
/// arc length `s`, perpendicular distance `rho`, azimuth `phi` in the
/// transported normal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappedCoord {
    pub s: f64,
    pub rho: f64,
    pub phi: f64,
}

/// One atom of the reference (pathway-defining) selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomRecord {
    pub id: i64,
    pub res_id: i64,
    pub res_name: String,
    pub atom_name: String,
    pub element: String,
    #[serde(default = "default_mass")]
    pub mass: f64,
    pub pos: Vec3,
}

fn default_mass() -> f64 {
    1.0
}

/// One solvent particle (mapping target only, no chemistry attached).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolventRecord {
    pub id: i64,
    pub pos: Vec3,
}

/// A single trajectory frame: the reference selection plus the optional
/// solvent selection, as delivered by the trajectory provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub atoms: Vec<AtomRecord>,
    #[serde(default)]
    pub solvent: Vec<SolventRecord>,
}

/// A residue of the reference selection, assembled from its atoms.
#[derive(Debug, Clone)]
pub struct Residue {
    pub id: i64,
    pub name: String,
    /// Centre of geometry of all residue atoms.
    pub cog: Vec3,
    /// Position of the C-alpha atom, if the residue has one.
    pub c_alpha: Option<Vec3>,
}

impl Frame {
    /// Mass-weighted centre of mass of the reference selection.
    pub fn centre_of_mass(&self) -> Option<Vec3> {
        centre_of_mass(self.atoms.iter())
    }

    /// Mass-weighted centre of mass restricted to the given residue ids.
    pub fn centre_of_mass_of(&self, res_ids: &[i64]) -> Option<Vec3> {
        centre_of_mass(self.atoms.iter().filter(|a| res_ids.contains(&a.res_id)))
    }

    /// Groups the reference selection into residues, ordered by residue id.
    pub fn residues(&self) -> Vec<Residue> {
        let mut grouped: BTreeMap<i64, (String, Vec3, usize, Option<Vec3>)> = BTreeMap::new();
        for atom in &self.atoms {
            let entry = grouped
                .entry(atom.res_id)
                .or_insert_with(|| (atom.res_name.clone(), Vec3::zeros(), 0, None));
            entry.1 += atom.pos;
            entry.2 += 1;
            if atom.atom_name == "CA" {
                entry.3 = Some(atom.pos);
            }
        }
        grouped
            .into_iter()
            .map(|(id, (name, sum, count, c_alpha))| Residue {
                id,
                name,
                cog: sum / count as f64,
                c_alpha,
            })
            .collect()
    }
}

fn centre_of_mass<'a>(atoms: impl Iterator<Item = &'a AtomRecord>) -> Option<Vec3> {
    let mut total_mass = 0.0;
    let mut com = Vec3::zeros();
    for atom in atoms {
        total_mass += atom.mass;
        com += atom.mass * atom.pos;
    }
    if total_mass > 0.0 {
        Some(com / total_mass)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(id: i64, res_id: i64, name: &str, pos: [f64; 3]) -> AtomRecord {
        AtomRecord {
            id,
            res_id,
            res_name: "ALA".to_string(),
            atom_name: name.to_string(),
            element: name.chars().next().unwrap().to_string(),
            mass: 12.0,
            pos: Vec3::new(pos[0], pos[1], pos[2]),
        }
    }

    #[test]
    fn residue_grouping() {
        let frame = Frame {
            time: 0.0,
            atoms: vec![
                atom(1, 1, "CA", [0.0, 0.0, 0.0]),
                atom(2, 1, "CB", [1.0, 0.0, 0.0]),
                atom(3, 2, "N", [5.0, 0.0, 0.0]),
            ],
            solvent: vec![],
        };

        let residues = frame.residues();
        assert_eq!(residues.len(), 2);
        assert_eq!(residues[0].id, 1);
        assert_eq!(residues[0].cog, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(residues[0].c_alpha, Some(Vec3::new(0.0, 0.0, 0.0)));
        assert!(residues[1].c_alpha.is_none());
    }

    #[test]
    fn centre_of_mass_weighting() {
        let mut a = atom(1, 1, "CA", [0.0, 0.0, 0.0]);
        let mut b = atom(2, 1, "CB", [2.0, 0.0, 0.0]);
        a.mass = 1.0;
        b.mass = 3.0;
        let frame = Frame {
            time: 0.0,
            atoms: vec![a, b],
            solvent: vec![],
        };
        let com = frame.centre_of_mass().unwrap();
        assert!((com.x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn frame_deserialises_from_jsonl_shape() {
        let line = r#"{"time": 1.5, "atoms": [{"id": 1, "res_id": 1, "res_name": "GLY",
            "atom_name": "CA", "element": "C", "mass": 12.011, "pos": [0.1, 0.2, 0.3]}],
            "solvent": [{"id": 100, "pos": [1.0, 1.0, 1.0]}]}"#;
        let frame: Frame = serde_json::from_str(line).unwrap();
        assert_eq!(frame.atoms.len(), 1);
        assert_eq!(frame.solvent.len(), 1);
        assert!((frame.atoms[0].pos.z - 0.3).abs() < 1e-12);
    }
}
