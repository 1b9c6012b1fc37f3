//! Per-frame analysis.
//!
//! Orchestrates one frame end to end: obstacle set, pathfinding, pathway
//! construction and alignment, residue and solvent mapping, hydrophobicity
//! smoothing, density estimation, and assembly of the frame's stream
//! record.

use std::collections::BTreeMap;

use log::{debug, warn};
use porewalk_core::{Frame, MappedCoord, PorewalkError, Result, Vec3};
use porewalk_io::{
    CentreLineSample, HydrophobicityScale, PathSummary, PathwayRecord, ProbeTable, ResidueTable,
    SolventTable, SplineSample, VdwRadiusTable,
};
use porewalk_optim::{AnnealingConfig, NelderMeadConfig};
use porewalk_pathfind::{
    MappingParams, MolecularPath, ObstacleSet, PathFinder, PathFindingConfig, PathFindingMethod,
};
use porewalk_stats::{
    AmiseOptimalBandwidthEstimator, HistogramDensityEstimator, KernelDensityEstimator,
    KernelParams, NumberDensityCalculator, WeightedKernelDensityEstimator,
};

/// Pathway alignment across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAlignmentMethod {
    /// Leave each frame's arc-length origin where the pathfinder put it.
    None,
    /// Centre the arc-length origin on the mapped initial probe position.
    Ipp,
}

/// Density estimation method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityMethod {
    Histogram,
    Kernel,
}

/// Density estimation options.
#[derive(Debug, Clone, Copy)]
pub struct DensityOptions {
    pub method: DensityMethod,
    /// Bin width (histogram) or evaluation point spacing (kernel).
    pub resolution: f64,
    /// Kernel bandwidth; non-positive requests AMISE selection.
    pub bandwidth: f64,
    /// Scale applied to the (possibly estimated) bandwidth.
    pub bandwidth_scale: f64,
    /// Kernel evaluation range cutoff, in bandwidths.
    pub eval_range_cutoff: f64,
}

/// Everything the analyser needs besides the frame itself.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub pf_method: PathFindingMethod,
    /// Explicit initial probe position; otherwise the centre of mass of
    /// the initial-position selection (or the whole reference) is used.
    pub init_probe_pos: Option<Vec3>,
    /// Residue ids of a dedicated initial-position selection.
    pub ipp_res_ids: Option<Vec<i64>>,
    pub chan_dir: Vec3,
    pub probe_step: f64,
    pub max_probe_radius: f64,
    pub max_probe_steps: usize,
    pub cutoff: Option<f64>,
    pub annealing: AnnealingConfig,
    pub nelder_mead: NelderMeadConfig,
    pub align_method: PathAlignmentMethod,
    pub mapping: MappingParams,
    /// Margin on the local radius for the pore-lining test.
    pub pore_mapping_margin: f64,
    pub density: DensityOptions,
    pub hydrophobicity_bandwidth: f64,
}

/// The per-frame orchestrator. Holds only read-only state and is shared by
/// all worker threads.
#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    options: AnalysisOptions,
    vdw: VdwRadiusTable,
    hydrophobicity: HydrophobicityScale,
}

impl FrameAnalyzer {
    pub fn new(
        options: AnalysisOptions,
        vdw: VdwRadiusTable,
        hydrophobicity: HydrophobicityScale,
    ) -> Self {
        FrameAnalyzer {
            options,
            vdw,
            hydrophobicity,
        }
    }

    /// Analyses one frame into its stream record.
    pub fn analyze(&self, frame: &Frame) -> Result<PathwayRecord> {
        if frame.atoms.is_empty() {
            return Err(PorewalkError::input("frame has an empty reference selection"));
        }

        // initial probe position: explicit, or centre of mass of the
        // configured selection:
        let init_pos = match self.options.init_probe_pos {
            Some(p) => p,
            None => {
                let com = match &self.options.ipp_res_ids {
                    Some(ids) => frame.centre_of_mass_of(ids),
                    None => frame.centre_of_mass(),
                };
                com.ok_or_else(|| {
                    PorewalkError::input("initial-position selection has zero total mass")
                })?
            }
        };

        // obstacle set from the reference selection:
        let mut positions = Vec::with_capacity(frame.atoms.len());
        let mut radii = Vec::with_capacity(frame.atoms.len());
        for atom in &frame.atoms {
            positions.push(atom.pos);
            radii.push(
                self.vdw
                    .lookup(&atom.res_name, &atom.atom_name, &atom.element)?,
            );
        }
        let obstacles = ObstacleSet::new(&positions, &radii)?;

        // pathfinding and pathway construction:
        let finder = PathFinder::new(
            self.options.pf_method,
            PathFindingConfig {
                init_pos,
                chan_dir: self.options.chan_dir,
                probe_step: self.options.probe_step,
                max_probe_radius: self.options.max_probe_radius,
                max_probe_steps: self.options.max_probe_steps,
                cutoff: self.options.cutoff,
                annealing: self.options.annealing,
                nelder_mead: self.options.nelder_mead,
            },
        )?;
        let found = finder.find_path(&obstacles)?;
        if found.forward_infeasible {
            warn!(
                "frame at t={}: no feasible direction along +channel, one-sided pathway",
                frame.time
            );
        }
        if found.backward_infeasible {
            warn!(
                "frame at t={}: no feasible direction along -channel, one-sided pathway",
                frame.time
            );
        }
        let mut path = MolecularPath::from_probes(&found.probes, self.options.max_probe_radius)?;

        if self.options.align_method == PathAlignmentMethod::Ipp {
            let mapped = path.map_positions(&[init_pos], &self.options.mapping)?;
            path.centre_arc_origin(mapped[0].s);
        }

        // residue mapping (centre of geometry and C-alpha):
        let residues = frame.residues();
        let cog_positions: Vec<Vec3> = residues.iter().map(|r| r.cog).collect();
        let ca_positions: Vec<Vec3> = residues
            .iter()
            .map(|r| r.c_alpha.unwrap_or(r.cog))
            .collect();
        let cog_mapped = path.map_positions(&cog_positions, &self.options.mapping)?;
        let ca_mapped = path.map_positions(&ca_positions, &self.options.mapping)?;

        let cog_by_id: BTreeMap<i64, MappedCoord> = residues
            .iter()
            .zip(cog_mapped.iter())
            .map(|(r, m)| (r.id, *m))
            .collect();

        let pore_lining = path.check_if_inside(
            &cog_by_id,
            self.options.pore_mapping_margin,
            path.full_domain(),
        );

        // pore-facing: pore-lining residues whose side chain points inward
        // (centre of geometry closer to the centreline than the C-alpha):
        let mut pore_facing: BTreeMap<i64, bool> = BTreeMap::new();
        for ((residue, cog), ca) in residues.iter().zip(cog_mapped.iter()).zip(ca_mapped.iter()) {
            let facing = pore_lining[&residue.id] && cog.rho < ca.rho;
            pore_facing.insert(residue.id, facing);
        }

        // hydrophobicity smoothers over the pore-lining / pore-facing
        // residues, zero-padded half a bandwidth beyond the residue range:
        let hydrophobicity: Vec<f64> = residues
            .iter()
            .map(|r| self.hydrophobicity.lookup(&r.name))
            .collect::<Result<_>>()?;

        let mut pl_s = Vec::new();
        let mut pl_h = Vec::new();
        let mut pf_s = Vec::new();
        let mut pf_h = Vec::new();
        let mut res_s_min = f64::INFINITY;
        let mut res_s_max = f64::NEG_INFINITY;
        for ((residue, cog), &h) in residues.iter().zip(cog_mapped.iter()).zip(&hydrophobicity) {
            if pore_lining[&residue.id] {
                pl_s.push(cog.s);
                pl_h.push(h);
            }
            if pore_facing[&residue.id] {
                pf_s.push(cog.s);
                pf_h.push(h);
            }
            res_s_min = res_s_min.min(cog.s);
            res_s_max = res_s_max.max(cog.s);
        }
        if res_s_min.is_finite() {
            let pad = 0.5 * self.options.hydrophobicity_bandwidth;
            for list in [&mut pl_s, &mut pf_s] {
                list.push(res_s_min - pad);
                list.push(res_s_max + pad);
            }
            for list in [&mut pl_h, &mut pf_h] {
                list.push(0.0);
                list.push(0.0);
            }
        }

        let smoother = WeightedKernelDensityEstimator::new(KernelParams {
            bandwidth: self.options.hydrophobicity_bandwidth,
            eval_point_spacing: self.options.density.resolution,
            eval_range_cutoff: self.options.density.eval_range_cutoff,
        })?;
        let pl_hydrophobicity = smoother.estimate(&pl_s, &pl_h)?;
        let pf_hydrophobicity = smoother.estimate(&pf_s, &pf_h)?;

        // solvent mapping:
        let solvent_positions: Vec<Vec3> = frame.solvent.iter().map(|s| s.pos).collect();
        let solvent_mapped = path.map_positions(&solvent_positions, &self.options.mapping)?;
        let solvent_by_id: BTreeMap<i64, MappedCoord> = frame
            .solvent
            .iter()
            .zip(solvent_mapped.iter())
            .map(|(s, m)| (s.id, *m))
            .collect();

        let inside_sample = path.check_if_inside(&solvent_by_id, 0.0, path.full_domain());
        let inside_pore = path.check_if_inside(&solvent_by_id, 0.0, (path.s_lo(), path.s_hi()));
        let num_sample = inside_sample.values().filter(|&&v| v).count();
        let num_pathway = inside_pore.values().filter(|&&v| v).count();

        // density estimation along the arc-length coordinate:
        let sample_s: Vec<f64> = frame
            .solvent
            .iter()
            .zip(solvent_mapped.iter())
            .filter(|(s, _)| inside_sample[&s.id])
            .map(|(_, m)| m.s)
            .collect();
        let pore_s: Vec<f64> = frame
            .solvent
            .iter()
            .zip(solvent_mapped.iter())
            .filter(|(s, _)| inside_pore[&s.id])
            .map(|(_, m)| m.s)
            .collect();

        let (solvent_density, band_width) = self.estimate_density(&sample_s, &pore_s)?;

        let solvent_knots = solvent_density.unique_knots();
        let solvent_range_lo = solvent_knots.first().copied().unwrap_or(0.0);
        let solvent_range_hi = solvent_knots.last().copied().unwrap_or(0.0);

        // instantaneous number density and its minimum inside the pore:
        let number_density =
            NumberDensityCalculator.spline(&solvent_density, path.radius_spline(), num_sample)?;
        let (arg_min_density, min_density) = number_density.minimum((path.s_lo(), path.s_hi()));

        // per-residue local radius and density:
        let pore_radius_at_res: Vec<f64> = cog_mapped.iter().map(|m| path.radius(m.s)).collect();
        let density_at_res: Vec<f64> = cog_mapped
            .iter()
            .map(|m| solvent_density.evaluate(m.s, 0))
            .collect();

        let (arg_min_radius, min_radius) = path.min_radius();
        debug!(
            "frame at t={}: min radius {:.4} at s={:.3}, {} solvent inside pore",
            frame.time, min_radius, arg_min_radius, num_pathway
        );

        Ok(PathwayRecord {
            path_summary: PathSummary {
                time_stamp: frame.time,
                arg_min_radius,
                min_radius,
                length: path.length(),
                volume: path.volume(),
                num_pathway: num_pathway as f64,
                num_sample: num_sample as f64,
                solvent_range_lo,
                solvent_range_hi,
                arg_min_solvent_density: arg_min_density,
                min_solvent_density: min_density,
                arc_length_lo: path.s_lo(),
                arc_length_hi: path.s_hi(),
                band_width,
            },
            path_points: ProbeTable {
                x: path.path_points().iter().map(|p| p.x).collect(),
                y: path.path_points().iter().map(|p| p.y).collect(),
                z: path.path_points().iter().map(|p| p.z).collect(),
                radius: path.path_radii().to_vec(),
            },
            centre_line_spline: CentreLineSample::from_spline(path.centre_line()),
            radius_spline: SplineSample::from_spline(path.radius_spline()),
            solvent_density_spline: SplineSample::from_spline(&solvent_density),
            pl_hydrophobicity_spline: SplineSample::from_spline(&pl_hydrophobicity),
            pf_hydrophobicity_spline: SplineSample::from_spline(&pf_hydrophobicity),
            residue_positions: ResidueTable {
                res_id: residues.iter().map(|r| r.id).collect(),
                res_name: residues.iter().map(|r| r.name.clone()).collect(),
                s: cog_mapped.iter().map(|m| m.s).collect(),
                rho: cog_mapped.iter().map(|m| m.rho).collect(),
                phi: cog_mapped.iter().map(|m| m.phi).collect(),
                pore_lining: residues.iter().map(|r| pore_lining[&r.id]).collect(),
                pore_facing: residues.iter().map(|r| pore_facing[&r.id]).collect(),
                pore_radius: pore_radius_at_res,
                solvent_density: density_at_res,
                hydrophobicity,
                x: residues.iter().map(|r| r.cog.x).collect(),
                y: residues.iter().map(|r| r.cog.y).collect(),
                z: residues.iter().map(|r| r.cog.z).collect(),
            },
            solvent_positions: SolventTable {
                id: frame.solvent.iter().map(|s| s.id).collect(),
                s: solvent_mapped.iter().map(|m| m.s).collect(),
                rho: solvent_mapped.iter().map(|m| m.rho).collect(),
                phi: solvent_mapped.iter().map(|m| m.phi).collect(),
                inside_pore: frame.solvent.iter().map(|s| inside_pore[&s.id]).collect(),
                inside_sample: frame.solvent.iter().map(|s| inside_sample[&s.id]).collect(),
                x: frame.solvent.iter().map(|s| s.pos.x).collect(),
                y: frame.solvent.iter().map(|s| s.pos.y).collect(),
                z: frame.solvent.iter().map(|s| s.pos.z).collect(),
            },
        })
    }

    /// Runs the configured density estimator, returning the density spline
    /// and the effective bandwidth recorded for this frame.
    fn estimate_density(
        &self,
        sample_s: &[f64],
        pore_s: &[f64],
    ) -> Result<(porewalk_geometry::SplineCurve1D, f64)> {
        let de = &self.options.density;
        match de.method {
            DensityMethod::Histogram => {
                let estimator = HistogramDensityEstimator::new(de.resolution)?;
                Ok((estimator.estimate(sample_s)?, 0.0))
            }
            DensityMethod::Kernel => {
                if sample_s.is_empty() {
                    // nothing to estimate from; an empty-sample kernel
                    // estimate is a flat zero.
                    let estimator = HistogramDensityEstimator::new(de.resolution)?;
                    return Ok((estimator.estimate(sample_s)?, 0.0));
                }
                let base = if de.bandwidth > 0.0 {
                    de.bandwidth
                } else {
                    // bandwidth selection uses the particles inside the
                    // pore proper, falling back to the full sample:
                    let bw_samples = if pore_s.len() >= 2 { pore_s } else { sample_s };
                    AmiseOptimalBandwidthEstimator.estimate(bw_samples)?
                };
                let band_width = base * de.bandwidth_scale;
                let estimator = KernelDensityEstimator::new(KernelParams {
                    bandwidth: band_width,
                    eval_point_spacing: de.resolution,
                    eval_range_cutoff: de.eval_range_cutoff,
                })?;
                Ok((estimator.estimate(sample_s)?, band_width))
            }
        }
    }
}
