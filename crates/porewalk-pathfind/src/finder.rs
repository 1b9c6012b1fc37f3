//! Probe-based pathfinders.
//!
//! Two variants behind a closed enum. The naive cylindrical finder emits a
//! uniform probe ladder along the channel direction with a fixed radius.
//! The inplane-optimised finder implements the HOLE-style walk: starting
//! from the initial position it advances a probe sphere in both channel
//! directions, at each step maximising the in-plane clearance to the
//! nearest obstacle surface with a simulated-annealing sweep followed by a
//! Nelder-Mead polish.

use log::warn;
use porewalk_core::{PorewalkError, Probe, Result, Vec3};
use porewalk_optim::{nelder_mead, AnnealingConfig, NelderMeadConfig, SimulatedAnnealing};

use crate::obstacles::ObstacleSet;

/// Pathfinding method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFindingMethod {
    NaiveCylindrical,
    InplaneOptimised,
}

/// Shared pathfinder configuration.
#[derive(Debug, Clone)]
pub struct PathFindingConfig {
    /// Start of both probe walks.
    pub init_pos: Vec3,
    /// Channel direction; normalised internally.
    pub chan_dir: Vec3,
    /// Step length of the probe walk.
    pub probe_step: f64,
    /// Maximum free distance: the walk has exited the pore once the probe
    /// radius saturates here.
    pub max_probe_radius: f64,
    /// Step budget per walk direction.
    pub max_probe_steps: usize,
    /// Optional neighbourhood-search cutoff; `None` evaluates all
    /// obstacles.
    pub cutoff: Option<f64>,
    /// In-plane annealing parameters.
    pub annealing: AnnealingConfig,
    /// In-plane polish parameters.
    pub nelder_mead: NelderMeadConfig,
}

impl PathFindingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.probe_step <= 0.0 {
            return Err(PorewalkError::config(format!(
                "probe step must be positive, got {}",
                self.probe_step
            )));
        }
        if self.max_probe_radius <= 0.0 {
            return Err(PorewalkError::config(format!(
                "maximum probe radius must be positive, got {}",
                self.max_probe_radius
            )));
        }
        if self.max_probe_steps == 0 {
            return Err(PorewalkError::MissingParameter("max_probe_steps"));
        }
        if self.chan_dir.norm() <= 0.0 {
            return Err(PorewalkError::config(
                "channel direction vector must be non-zero",
            ));
        }
        self.annealing.validate()
    }
}

/// Outcome of a pathfinder run.
///
/// A walk that exits the pore without accepting a single step has found no
/// feasible direction on its side of the initial position; its probes are
/// excluded from `probes` and the condition is reported here so callers can
/// attach frame context. Both walks degenerate is a hard
/// `NoFeasibleDirection` error instead.
#[derive(Debug, Clone)]
pub struct PathFindingResult {
    /// Probes ordered along the channel direction.
    pub probes: Vec<Probe>,
    /// The walk along +direction accepted no steps.
    pub forward_infeasible: bool,
    /// The walk along -direction accepted no steps.
    pub backward_infeasible: bool,
}

impl PathFindingResult {
    fn feasible(probes: Vec<Probe>) -> Self {
        PathFindingResult {
            probes,
            forward_infeasible: false,
            backward_infeasible: false,
        }
    }
}

/// The closed set of pathfinder variants.
#[derive(Debug, Clone)]
pub enum PathFinder {
    NaiveCylindrical(NaiveCylindricalPathFinder),
    InplaneOptimised(InplaneOptimisedPathFinder),
}

impl PathFinder {
    pub fn new(method: PathFindingMethod, config: PathFindingConfig) -> Result<Self> {
        config.validate()?;
        Ok(match method {
            PathFindingMethod::NaiveCylindrical => {
                PathFinder::NaiveCylindrical(NaiveCylindricalPathFinder { config })
            }
            PathFindingMethod::InplaneOptimised => {
                PathFinder::InplaneOptimised(InplaneOptimisedPathFinder { config })
            }
        })
    }

    /// Runs the finder against the frame's obstacle set.
    pub fn find_path(&self, obstacles: &ObstacleSet<'_>) -> Result<PathFindingResult> {
        match self {
            PathFinder::NaiveCylindrical(f) => f.find_path(),
            PathFinder::InplaneOptimised(f) => f.find_path(obstacles),
        }
    }

    pub fn config(&self) -> &PathFindingConfig {
        match self {
            PathFinder::NaiveCylindrical(f) => &f.config,
            PathFinder::InplaneOptimised(f) => &f.config,
        }
    }
}

/// Uniform probe ladder along the channel direction, all radii fixed at the
/// maximum probe radius. Useful as a baseline and for bulk-like systems.
#[derive(Debug, Clone)]
pub struct NaiveCylindricalPathFinder {
    config: PathFindingConfig,
}

impl NaiveCylindricalPathFinder {
    fn find_path(&self) -> Result<PathFindingResult> {
        let dir = self.config.chan_dir.normalize();
        let n = self.config.max_probe_steps as i64;
        let probes = (-n..=n)
            .map(|k| {
                Probe::new(
                    self.config.init_pos + k as f64 * self.config.probe_step * dir,
                    self.config.max_probe_radius,
                )
            })
            .collect();
        Ok(PathFindingResult::feasible(probes))
    }
}

/// HOLE-style walk with per-plane clearance maximisation.
#[derive(Debug, Clone)]
pub struct InplaneOptimisedPathFinder {
    config: PathFindingConfig,
}

impl InplaneOptimisedPathFinder {
    fn find_path(&self, obstacles: &ObstacleSet<'_>) -> Result<PathFindingResult> {
        let dir = self.config.chan_dir.normalize();
        let (u, v) = plane_basis(dir);

        let init_clearance = obstacles.clearance(self.config.init_pos);
        if init_clearance < 0.0 {
            return Err(PorewalkError::InitialPositionInObstacle {
                clearance: init_clearance,
            });
        }

        let annealer = SimulatedAnnealing::new(self.config.annealing)?;

        // optimise within the initial plane first; both walks start from
        // the optimised centre:
        let origin = self.optimise_in_plane(self.config.init_pos, u, v, obstacles, &annealer);

        let forward = self.walk(origin.centre, dir, u, v, obstacles, &annealer);
        let backward = self.walk(origin.centre, -dir, u, v, obstacles, &annealer);

        // a walk whose very first probe saturated accepted no steps: no
        // feasible direction on that side. Its probes carry no pathway
        // information and are excluded.
        let forward_infeasible =
            walk_exited_immediately(&forward, self.config.max_probe_radius);
        let backward_infeasible =
            walk_exited_immediately(&backward, self.config.max_probe_radius);
        if forward_infeasible && backward_infeasible {
            return Err(PorewalkError::NoFeasibleDirection);
        }
        if forward_infeasible {
            warn!("probe walk along +channel direction accepted no steps");
        }
        if backward_infeasible {
            warn!("probe walk along -channel direction accepted no steps");
        }

        // arc-length order: reversed backward walk, origin, forward walk.
        let mut probes: Vec<Probe> = if backward_infeasible {
            Vec::new()
        } else {
            backward.into_iter().rev().collect()
        };
        probes.push(origin);
        if !forward_infeasible {
            probes.extend(forward);
        }

        if probes.len() < 2 {
            return Err(PorewalkError::NoFeasibleDirection);
        }
        Ok(PathFindingResult {
            probes,
            forward_infeasible,
            backward_infeasible,
        })
    }

    fn walk(
        &self,
        start: Vec3,
        dir: Vec3,
        u: Vec3,
        v: Vec3,
        obstacles: &ObstacleSet<'_>,
        annealer: &SimulatedAnnealing,
    ) -> Vec<Probe> {
        let mut probes = Vec::new();
        let mut p = start;
        for _ in 0..self.config.max_probe_steps {
            p += self.config.probe_step * dir;
            let probe = self.optimise_in_plane(p, u, v, obstacles, annealer);
            p = probe.centre;
            probes.push(probe);
            if probe.radius >= self.config.max_probe_radius {
                break;
            }
        }
        probes
    }

    /// Maximises the clearance over the plane through `p` perpendicular to
    /// the channel direction, seeded at the in-plane origin.
    fn optimise_in_plane(
        &self,
        p: Vec3,
        u: Vec3,
        v: Vec3,
        obstacles: &ObstacleSet<'_>,
        annealer: &SimulatedAnnealing,
    ) -> Probe {
        let r_max = self.config.max_probe_radius;

        // neighbourhood pruning: anything farther than the cutoff plus the
        // largest reachable radius plus one step cannot bound the result.
        let active = self
            .config
            .cutoff
            .filter(|&c| c > 0.0)
            .map(|c| obstacles.within(p, c + r_max + self.config.probe_step));

        let cost = |state: &[f64]| -> f64 {
            let q = p + state[0] * u + state[1] * v;
            let clearance = match &active {
                Some(indices) => obstacles.clearance_indexed(q, indices),
                None => obstacles.clearance(q),
            };
            clearance.min(r_max)
        };

        let coarse = annealer.maximise(&[0.0, 0.0], &cost);
        let polished = nelder_mead::maximise(&self.config.nelder_mead, &coarse.state, &cost);
        let best = if polished.value >= coarse.value {
            polished
        } else {
            coarse
        };

        Probe::new(p + best.state[0] * u + best.state[1] * v, best.value)
    }
}

fn walk_exited_immediately(walk: &[Probe], max_probe_radius: f64) -> bool {
    walk.first().map_or(true, |p| p.radius >= max_probe_radius)
}

/// Two orthonormal vectors spanning the plane perpendicular to `dir`,
/// seeded from the coordinate axis least aligned with it.
fn plane_basis(dir: Vec3) -> (Vec3, Vec3) {
    let axis = if dir.x.abs() <= dir.y.abs() && dir.x.abs() <= dir.z.abs() {
        Vec3::new(1.0, 0.0, 0.0)
    } else if dir.y.abs() <= dir.z.abs() {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    let u = dir.cross(&axis).normalize();
    let v = dir.cross(&u);
    (u, v)
}
