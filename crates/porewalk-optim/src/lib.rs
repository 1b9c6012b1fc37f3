//! Optimisers for the porewalk pathfinder.
//!
//! The in-plane probe placement is a two-dimensional maximisation of the
//! clearance to the nearest obstacle surface: a seeded simulated-annealing
//! sweep followed by a Nelder-Mead polish. Brent's method serves the scalar
//! problems (spline extrema, curvilinear mapping refinement).

pub mod annealing;
pub mod brent;
pub mod nelder_mead;

pub use annealing::{AnnealingConfig, OptimPoint, SimulatedAnnealing};
pub use brent::ScalarMinimum;
pub use nelder_mead::NelderMeadConfig;
