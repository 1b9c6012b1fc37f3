//! Obstacle sets: atoms treated as spheres with van der Waals radii.
//!
//! Borrowed per frame from the trajectory provider; the pathfinder only
//! reads them, so a single obstacle set is shared by all in-plane
//! optimisations of a frame.

use porewalk_core::{PorewalkError, Result, Vec3};

/// Read-only view of the frame's obstacle spheres.
#[derive(Debug, Clone, Copy)]
pub struct ObstacleSet<'a> {
    positions: &'a [Vec3],
    radii: &'a [f64],
}

impl<'a> ObstacleSet<'a> {
    pub fn new(positions: &'a [Vec3], radii: &'a [f64]) -> Result<Self> {
        if positions.len() != radii.len() {
            return Err(PorewalkError::InputSizeMismatch {
                left: positions.len(),
                right: radii.len(),
            });
        }
        if radii.iter().any(|&r| r <= 0.0) {
            return Err(PorewalkError::input(
                "obstacle van der Waals radii must be positive",
            ));
        }
        Ok(ObstacleSet { positions, radii })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Signed distance from `p` to the nearest obstacle surface; infinite
    /// for an empty set, negative inside an obstacle.
    pub fn clearance(&self, p: Vec3) -> f64 {
        self.positions
            .iter()
            .zip(self.radii.iter())
            .map(|(a, r)| (p - a).norm() - r)
            .fold(f64::INFINITY, f64::min)
    }

    /// Clearance restricted to a pre-selected obstacle subset.
    pub fn clearance_indexed(&self, p: Vec3, indices: &[usize]) -> f64 {
        indices
            .iter()
            .map(|&i| (p - self.positions[i]).norm() - self.radii[i])
            .fold(f64::INFINITY, f64::min)
    }

    /// Indices of obstacles whose centre lies within `cutoff` of `p`.
    pub fn within(&self, p: Vec3, cutoff: f64) -> Vec<usize> {
        let cutoff_sq = cutoff * cutoff;
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, a)| (p - *a).norm_squared() <= cutoff_sq)
            .map(|(i, _)| i)
            .collect()
    }
}
