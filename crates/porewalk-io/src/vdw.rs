//! Van der Waals radius lookup.
//!
//! Radii come from a built-in database (subsets of the radius sets shipped
//! with the HOLE programme, in nanometres) or a user-supplied JSON file of
//! the same shape:
//!
//! ```json
//! {
//!     "residues": [
//!         {"resname": "CYS", "atomname": "SG", "radius": 0.2}
//!     ],
//!     "elements": {"C": 0.185, "N": 0.175}
//! }
//! ```
//!
//! Lookup precedence: exact `(resname, atomname)` entry, then element, then
//! the configured fallback radius. A miss without fallback is an input-data
//! error naming the atom.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use porewalk_core::{PorewalkError, Result};
use serde::Deserialize;

/// Built-in radius databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdwRadiusDatabase {
    HoleSimple,
    HoleAmberuni,
    User,
}

const HOLE_SIMPLE_JSON: &str = r#"{
    "residues": [],
    "elements": {
        "C": 0.185,
        "N": 0.175,
        "O": 0.165,
        "S": 0.200,
        "H": 0.100,
        "P": 0.210
    }
}"#;

const HOLE_AMBERUNI_JSON: &str = r#"{
    "residues": [
        {"resname": "CYS", "atomname": "SG", "radius": 0.200},
        {"resname": "MET", "atomname": "SD", "radius": 0.200},
        {"resname": "LYS", "atomname": "NZ", "radius": 0.175},
        {"resname": "ARG", "atomname": "NH1", "radius": 0.175},
        {"resname": "ARG", "atomname": "NH2", "radius": 0.175},
        {"resname": "HIS", "atomname": "ND1", "radius": 0.175},
        {"resname": "HIS", "atomname": "NE2", "radius": 0.175},
        {"resname": "SER", "atomname": "OG", "radius": 0.160},
        {"resname": "THR", "atomname": "OG1", "radius": 0.160},
        {"resname": "TYR", "atomname": "OH", "radius": 0.160},
        {"resname": "ASP", "atomname": "OD1", "radius": 0.160},
        {"resname": "ASP", "atomname": "OD2", "radius": 0.160},
        {"resname": "GLU", "atomname": "OE1", "radius": 0.160},
        {"resname": "GLU", "atomname": "OE2", "radius": 0.160}
    ],
    "elements": {
        "C": 0.185,
        "N": 0.175,
        "O": 0.165,
        "S": 0.200,
        "H": 0.100,
        "P": 0.210,
        "F": 0.147,
        "CL": 0.175
    }
}"#;

#[derive(Debug, Deserialize)]
struct RadiusEntry {
    resname: String,
    atomname: String,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct RadiusFile {
    #[serde(default)]
    residues: Vec<RadiusEntry>,
    #[serde(default)]
    elements: HashMap<String, f64>,
}

/// Immutable radius table, shared read-only by all frame tasks.
#[derive(Debug, Clone)]
pub struct VdwRadiusTable {
    by_atom: HashMap<(String, String), f64>,
    by_element: HashMap<String, f64>,
    fallback: Option<f64>,
}

impl VdwRadiusTable {
    /// Loads one of the built-in databases. `User` requires a file and is
    /// rejected here.
    pub fn builtin(database: VdwRadiusDatabase) -> Result<Self> {
        let json = match database {
            VdwRadiusDatabase::HoleSimple => HOLE_SIMPLE_JSON,
            VdwRadiusDatabase::HoleAmberuni => HOLE_AMBERUNI_JSON,
            VdwRadiusDatabase::User => {
                return Err(PorewalkError::config(
                    "van der Waals database 'user' requires a radius JSON file",
                ))
            }
        };
        Self::from_json_str(json)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RadiusFile = serde_json::from_str(json)?;
        let by_atom = file
            .residues
            .into_iter()
            .map(|e| ((e.resname, e.atomname), e.radius))
            .collect();
        Ok(VdwRadiusTable {
            by_atom,
            by_element: file.elements,
            fallback: None,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Sets the fallback radius for atoms missing from the table. A
    /// negative value disables the fallback.
    pub fn with_fallback(mut self, fallback: Option<f64>) -> Self {
        self.fallback = fallback.filter(|&r| r > 0.0);
        self
    }

    /// Looks up the radius for one atom.
    pub fn lookup(&self, res_name: &str, atom_name: &str, element: &str) -> Result<f64> {
        if let Some(&r) = self
            .by_atom
            .get(&(res_name.to_string(), atom_name.to_string()))
        {
            return Ok(r);
        }
        if let Some(&r) = self.by_element.get(&element.to_uppercase()) {
            return Ok(r);
        }
        self.fallback.ok_or_else(|| {
            PorewalkError::input(format!(
                "no van der Waals radius for atom {} in residue {} (element {}) and no fallback configured",
                atom_name, res_name, element
            ))
        })
    }
}
