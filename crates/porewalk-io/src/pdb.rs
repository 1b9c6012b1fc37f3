//! Annotated PDB output.
//!
//! Writes the reference selection of one frame as ATOM records with the
//! time-averaged pore-lining flag in the occupancy column and the
//! pore-facing flag in the B-factor column, so molecular viewers can colour
//! the pore surface directly. Positions are converted from nanometres to
//! Angstroms.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use porewalk_core::{Frame, Result};

/// Writes `frame`'s atoms with per-residue lining/facing annotations.
pub fn write_annotated_pdb(
    out_path: &Path,
    frame: &Frame,
    pore_lining: &BTreeMap<i64, f64>,
    pore_facing: &BTreeMap<i64, f64>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(out_path)?);
    writeln!(out, "REMARK   generated by porewalk")?;
    writeln!(
        out,
        "REMARK   occupancy: pore-lining fraction, B-factor: pore-facing fraction"
    )?;

    for (serial, atom) in frame.atoms.iter().enumerate() {
        let occupancy = pore_lining.get(&atom.res_id).copied().unwrap_or(0.0);
        let bfactor = pore_facing.get(&atom.res_id).copied().unwrap_or(0.0);
        writeln!(
            out,
            "ATOM  {:>5} {:<4} {:<3} A{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            (serial + 1) % 100_000,
            atom.atom_name,
            atom.res_name,
            atom.res_id % 10_000,
            atom.pos.x * 10.0,
            atom.pos.y * 10.0,
            atom.pos.z * 10.0,
            occupancy,
            bfactor,
            atom.element
        )?;
    }
    writeln!(out, "END")?;
    out.flush()?;
    Ok(())
}
