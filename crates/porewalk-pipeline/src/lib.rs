//! Frame analysis orchestration.
//!
//! `FrameAnalyzer` runs one frame end to end; `run_frames` drives many
//! frames in parallel with ordered stream output; `aggregate` is the
//! sequential second pass that folds the stream into time-averaged
//! results.

pub mod aggregate;
pub mod analyzer;
pub mod runner;

pub use aggregate::{aggregate, AggregatedResults, AggregationConfig};
pub use analyzer::{
    AnalysisOptions, DensityMethod, DensityOptions, FrameAnalyzer, PathAlignmentMethod,
};
pub use runner::{run_frames, RunSummary};
