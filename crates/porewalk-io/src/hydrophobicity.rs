//! Residue hydrophobicity scales.
//!
//! Built-in scales (Wimley-White interface, Kyte-Doolittle) map residue
//! names to a scalar; a user scale can be supplied as JSON of the shape
//! `{"scale": {"ALA": -0.17, ...}}`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use porewalk_core::{PorewalkError, Result};
use serde::Deserialize;

/// Built-in hydrophobicity databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrophobicityDatabase {
    WimleyWhite1996,
    KyteDoolittle1982,
    User,
}

/// Wimley & White (1996) interface scale, kcal/mol.
const WIMLEY_WHITE_1996_JSON: &str = r#"{"scale": {
    "ALA": -0.17, "ARG": -0.81, "ASN": -0.42, "ASP": -1.23, "CYS":  0.24,
    "GLN": -0.58, "GLU": -2.02, "GLY": -0.01, "HIS": -0.17, "ILE":  0.31,
    "LEU":  0.56, "LYS": -0.99, "MET":  0.23, "PHE":  1.13, "PRO": -0.45,
    "SER": -0.13, "THR": -0.14, "TRP":  1.85, "TYR":  0.94, "VAL": -0.07
}}"#;

/// Kyte & Doolittle (1982) hydropathy index.
const KYTE_DOOLITTLE_1982_JSON: &str = r#"{"scale": {
    "ALA":  1.8, "ARG": -4.5, "ASN": -3.5, "ASP": -3.5, "CYS":  2.5,
    "GLN": -3.5, "GLU": -3.5, "GLY": -0.4, "HIS": -3.2, "ILE":  4.5,
    "LEU":  3.8, "LYS": -3.9, "MET":  1.9, "PHE":  2.8, "PRO": -1.6,
    "SER": -0.8, "THR": -0.7, "TRP": -0.9, "TYR": -1.3, "VAL":  4.2
}}"#;

#[derive(Debug, Deserialize)]
struct ScaleFile {
    scale: HashMap<String, f64>,
}

/// Immutable hydrophobicity scale, shared read-only by all frame tasks.
#[derive(Debug, Clone)]
pub struct HydrophobicityScale {
    scale: HashMap<String, f64>,
    fallback: Option<f64>,
}

impl HydrophobicityScale {
    pub fn builtin(database: HydrophobicityDatabase) -> Result<Self> {
        let json = match database {
            HydrophobicityDatabase::WimleyWhite1996 => WIMLEY_WHITE_1996_JSON,
            HydrophobicityDatabase::KyteDoolittle1982 => KYTE_DOOLITTLE_1982_JSON,
            HydrophobicityDatabase::User => {
                return Err(PorewalkError::config(
                    "hydrophobicity database 'user' requires a scale JSON file",
                ))
            }
        };
        Self::from_json_str(json)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ScaleFile = serde_json::from_str(json)?;
        Ok(HydrophobicityScale {
            scale: file.scale,
            fallback: None,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Sets the fallback value for residues missing from the scale.
    pub fn with_fallback(mut self, fallback: Option<f64>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn lookup(&self, res_name: &str) -> Result<f64> {
        if let Some(&value) = self.scale.get(res_name) {
            return Ok(value);
        }
        self.fallback.ok_or_else(|| {
            PorewalkError::input(format!(
                "no hydrophobicity value for residue {} and no fallback configured",
                res_name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scales_cover_standard_residues() {
        let ww = HydrophobicityScale::builtin(HydrophobicityDatabase::WimleyWhite1996).unwrap();
        assert_eq!(ww.lookup("TRP").unwrap(), 1.85);
        let kd = HydrophobicityScale::builtin(HydrophobicityDatabase::KyteDoolittle1982).unwrap();
        assert_eq!(kd.lookup("ILE").unwrap(), 4.5);
    }

    #[test]
    fn missing_residue_without_fallback_is_an_error() {
        let ww = HydrophobicityScale::builtin(HydrophobicityDatabase::WimleyWhite1996).unwrap();
        assert!(ww.lookup("POP").is_err());
        let with_fallback = ww.with_fallback(Some(0.0));
        assert_eq!(with_fallback.lookup("POP").unwrap(), 0.0);
    }
}
