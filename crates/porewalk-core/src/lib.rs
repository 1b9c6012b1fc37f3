//! Core types for the porewalk channel analysis engine.
//!
//! Everything downstream of the trajectory provider shares this crate:
//! the unified error enum, the frame/atom/residue records, and the small
//! geometric value types (probes, curvilinear coordinates).

pub mod errors;
pub mod types;

pub use errors::{PorewalkError, Result};
pub use types::{AtomRecord, Frame, MappedCoord, Probe, Residue, SolventRecord, Vec3};
