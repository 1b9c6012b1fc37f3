//! Input/output layer of porewalk.
//!
//! Static lookup tables (van der Waals radii, hydrophobicity scales), the
//! JSONL trajectory reader, the per-frame stream record, the final results
//! document and the thin OBJ/PDB serialisers. Everything here is a
//! collaborator of the analysis core, not part of it.

pub mod hydrophobicity;
pub mod obj;
pub mod pdb;
pub mod record;
pub mod results;
pub mod trajectory;
pub mod vdw;

pub use hydrophobicity::{HydrophobicityDatabase, HydrophobicityScale};
pub use obj::{export_pathway_surface, ObjExportParams};
pub use pdb::write_annotated_pdb;
pub use record::{
    CentreLineSample, PathSummary, PathwayRecord, ProbeTable, ResidueTable, SolventTable,
    SplineSample,
};
pub use results::{
    write_results, PathwayProfile, ProfileRecord, ResidueSummaryTable, ResultsDocument,
    RunMetadata, ScalarTimeSeries, SummaryRecord,
};
pub use trajectory::TrajectoryReader;
pub use vdw::{VdwRadiusDatabase, VdwRadiusTable};
