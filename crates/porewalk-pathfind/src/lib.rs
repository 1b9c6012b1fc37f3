//! Probe-based channel pathfinding.
//!
//! A pathfinder walks a spherical probe through the frame's obstacle set
//! (atoms with van der Waals radii) along the channel direction, producing
//! an ordered probe sequence. `MolecularPath` turns that sequence into the
//! pathway geometry every downstream profile is expressed against.

pub mod finder;
pub mod obstacles;
pub mod path;

pub use finder::{
    InplaneOptimisedPathFinder, NaiveCylindricalPathFinder, PathFinder, PathFindingConfig,
    PathFindingMethod, PathFindingResult,
};
pub use obstacles::ObstacleSet;
pub use path::{MappingParams, MolecularPath};
