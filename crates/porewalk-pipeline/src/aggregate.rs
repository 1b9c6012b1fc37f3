//! Second-pass aggregation over the per-frame stream.
//!
//! Two sequential passes over the stream file. The first collects scalar
//! summaries and time series and fixes the support grid from the observed
//! arc-length range; the second re-evaluates each frame's profile splines
//! on that common grid and folds them into per-support-point summary
//! statistics, converting solvent density to a number density and inverting
//! it into an energy profile. After the pass the energy profile is shifted
//! so the mean energy at the two anchor points (the extreme pathway mouths)
//! is zero.
//!
//! Unreadable lines are skipped and counted; any non-zero count fails the
//! run at the top level without corrupting the aggregates.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use porewalk_core::{PorewalkError, Result};
use porewalk_io::PathwayRecord;
use porewalk_geometry::linear_interp_1d;
use porewalk_stats::{BoltzmannEnergyCalculator, NumberDensityCalculator, SummaryStatistics};

/// Aggregation options.
#[derive(Debug, Clone, Copy)]
pub struct AggregationConfig {
    /// Number of support points of the common profile grid.
    pub num_out_points: usize,
    /// Extension of the grid beyond the observed arc-length range.
    pub extrap_dist: f64,
}

/// Everything the results document is built from.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResults {
    pub frames_read: usize,
    pub malformed_lines: usize,
    pub time_stamps: Vec<f64>,
    pub scalar_summaries: BTreeMap<String, SummaryStatistics>,
    pub scalar_time_series: BTreeMap<String, Vec<f64>>,
    pub support_points: Vec<f64>,
    pub radius_profile: Vec<SummaryStatistics>,
    pub density_profile: Vec<SummaryStatistics>,
    pub energy_profile: Vec<SummaryStatistics>,
    pub pl_hydrophobicity_profile: Vec<SummaryStatistics>,
    pub pf_hydrophobicity_profile: Vec<SummaryStatistics>,
    pub profile_time_series: BTreeMap<String, Vec<Vec<f64>>>,
    pub residue_ids: Vec<i64>,
    pub residue_names: Vec<String>,
    pub residue_hydrophobicity: Vec<f64>,
    pub residue_summaries: BTreeMap<String, Vec<SummaryStatistics>>,
}

/// Scalar fields aggregated from each frame's path summary.
const SCALAR_KEYS: [&str; 9] = [
    "argMinRadius",
    "minRadius",
    "length",
    "volume",
    "numPathway",
    "numSample",
    "argMinSolventDensity",
    "minSolventDensity",
    "bandWidth",
];

/// Per-residue fields aggregated across frames.
const RESIDUE_KEYS: [&str; 10] = [
    "s",
    "rho",
    "phi",
    "poreLining",
    "poreFacing",
    "poreRadius",
    "solventDensity",
    "x",
    "y",
    "z",
];

/// Runs both aggregation passes over the stream file.
pub fn aggregate(stream_path: &Path, config: &AggregationConfig) -> Result<AggregatedResults> {
    if config.num_out_points < 2 {
        return Err(PorewalkError::config(format!(
            "number of output support points must be at least 2, got {}",
            config.num_out_points
        )));
    }

    let mut results = AggregatedResults::default();
    for key in SCALAR_KEYS {
        results
            .scalar_summaries
            .insert(key.to_string(), SummaryStatistics::new());
        results
            .scalar_time_series
            .insert(key.to_string(), Vec::new());
    }
    let mut arc_length_lo = SummaryStatistics::new();
    let mut arc_length_hi = SummaryStatistics::new();
    let mut solvent_range_lo = SummaryStatistics::new();
    let mut solvent_range_hi = SummaryStatistics::new();

    // FIRST PASS: scalar summaries, time series, grid extent.
    let mut malformed_first_pass = 0usize;
    for_each_record(stream_path, &mut malformed_first_pass, |record| {
        let summary = &record.path_summary;
        let values = [
            ("argMinRadius", summary.arg_min_radius),
            ("minRadius", summary.min_radius),
            ("length", summary.length),
            ("volume", summary.volume),
            ("numPathway", summary.num_pathway),
            ("numSample", summary.num_sample),
            ("argMinSolventDensity", summary.arg_min_solvent_density),
            ("minSolventDensity", summary.min_solvent_density),
            ("bandWidth", summary.band_width),
        ];
        for (key, value) in values {
            results.scalar_summaries.get_mut(key).unwrap().update(value);
            results
                .scalar_time_series
                .get_mut(key)
                .unwrap()
                .push(value);
        }
        arc_length_lo.update(summary.arc_length_lo);
        arc_length_hi.update(summary.arc_length_hi);
        solvent_range_lo.update(summary.solvent_range_lo);
        solvent_range_hi.update(summary.solvent_range_hi);
        results.time_stamps.push(summary.time_stamp);

        if results.frames_read == 0 {
            results.residue_ids = record.residue_positions.res_id.clone();
            results.residue_names = record.residue_positions.res_name.clone();
            results.residue_hydrophobicity = record.residue_positions.hydrophobicity.clone();
        }
        results.frames_read += 1;
        Ok(())
    })?;
    results.malformed_lines = malformed_first_pass;

    if results.frames_read == 0 {
        warn!("per-frame stream holds no readable records, nothing to aggregate");
        return Ok(results);
    }

    // common support grid over the observed arc-length range:
    let lo = arc_length_lo.min() - config.extrap_dist;
    let hi = arc_length_hi.max() + config.extrap_dist;
    let step = (hi - lo) / (config.num_out_points - 1) as f64;
    results.support_points = (0..config.num_out_points)
        .map(|i| lo + i as f64 * step)
        .collect();

    // energy anchor points: the extreme pathway mouths.
    let anchor_lo = arc_length_lo.min();
    let anchor_hi = arc_length_hi.max();
    let mut anchor_energy_lo = SummaryStatistics::new();
    let mut anchor_energy_hi = SummaryStatistics::new();

    let n_support = results.support_points.len();
    results.radius_profile = vec![SummaryStatistics::new(); n_support];
    results.density_profile = vec![SummaryStatistics::new(); n_support];
    results.energy_profile = vec![SummaryStatistics::new(); n_support];
    results.pl_hydrophobicity_profile = vec![SummaryStatistics::new(); n_support];
    results.pf_hydrophobicity_profile = vec![SummaryStatistics::new(); n_support];
    let n_residues = results.residue_ids.len();
    for key in RESIDUE_KEYS {
        results
            .residue_summaries
            .insert(key.to_string(), vec![SummaryStatistics::new(); n_residues]);
    }
    for key in ["radius", "density", "plHydrophobicity", "pfHydrophobicity"] {
        results
            .profile_time_series
            .insert(key.to_string(), Vec::new());
    }

    // SECOND PASS: profiles on the common grid plus residue summaries.
    let support = results.support_points.clone();
    let mut skipped_second_pass = 0usize;
    for_each_record(stream_path, &mut skipped_second_pass, |record| {
        let radius_sample = record.radius_spline.to_spline()?.evaluate_multiple(&support, 0);
        SummaryStatistics::update_multiple(&mut results.radius_profile, &radius_sample);

        let pl_sample = record
            .pl_hydrophobicity_spline
            .to_spline()?
            .evaluate_multiple(&support, 0);
        SummaryStatistics::update_multiple(&mut results.pl_hydrophobicity_profile, &pl_sample);

        let pf_sample = record
            .pf_hydrophobicity_spline
            .to_spline()?
            .evaluate_multiple(&support, 0);
        SummaryStatistics::update_multiple(&mut results.pf_hydrophobicity_profile, &pf_sample);

        // probability density -> volumetric number density on the grid:
        let total_number = record.path_summary.num_sample as usize;
        let prob_sample = record
            .solvent_density_spline
            .to_spline()?
            .evaluate_multiple(&support, 0);
        let density_sample =
            NumberDensityCalculator.samples(&prob_sample, &radius_sample, total_number);
        SummaryStatistics::update_multiple(&mut results.density_profile, &density_sample);

        // Boltzmann inversion and anchor energies:
        let energy_sample = BoltzmannEnergyCalculator.calculate(&density_sample);
        SummaryStatistics::update_multiple(&mut results.energy_profile, &energy_sample);
        let energy_spline = linear_interp_1d(&support, &energy_sample)?;
        anchor_energy_lo.update(energy_spline.evaluate(anchor_lo, 0));
        anchor_energy_hi.update(energy_spline.evaluate(anchor_hi, 0));

        for key in ["radius", "density", "plHydrophobicity", "pfHydrophobicity"] {
            let sample = match key {
                "radius" => &radius_sample,
                "density" => &density_sample,
                "plHydrophobicity" => &pl_sample,
                _ => &pf_sample,
            };
            results
                .profile_time_series
                .get_mut(key)
                .unwrap()
                .push(sample.clone());
        }

        // residue summaries, matched by position (the residue set is fixed
        // across frames):
        let residues = &record.residue_positions;
        if residues.res_id.len() == n_residues {
            let columns: [(&str, Vec<f64>); 10] = [
                ("s", residues.s.clone()),
                ("rho", residues.rho.clone()),
                ("phi", residues.phi.clone()),
                (
                    "poreLining",
                    residues.pore_lining.iter().map(|&b| b as u8 as f64).collect(),
                ),
                (
                    "poreFacing",
                    residues.pore_facing.iter().map(|&b| b as u8 as f64).collect(),
                ),
                ("poreRadius", residues.pore_radius.clone()),
                (
                    "solventDensity",
                    residues
                        .solvent_density
                        .iter()
                        .zip(residues.pore_radius.iter())
                        .map(|(&d, &r)| {
                            if r > 1e-6 {
                                d * total_number as f64 / (std::f64::consts::PI * r * r)
                            } else {
                                0.0
                            }
                        })
                        .collect(),
                ),
                ("x", residues.x.clone()),
                ("y", residues.y.clone()),
                ("z", residues.z.clone()),
            ];
            for (key, values) in columns {
                SummaryStatistics::update_multiple(
                    results.residue_summaries.get_mut(key).unwrap(),
                    &values,
                );
            }
        } else {
            warn!(
                "residue table size changed between frames ({} vs {}), skipping residue update",
                residues.res_id.len(),
                n_residues
            );
        }
        Ok(())
    })?;

    // pin the aggregated energy profile to zero at the anchor points:
    let shift = -0.5 * (anchor_energy_lo.mean() + anchor_energy_hi.mean());
    for stats in results.energy_profile.iter_mut() {
        stats.shift(shift);
    }

    info!(
        "aggregated {} frames ({} malformed lines skipped)",
        results.frames_read, results.malformed_lines
    );
    Ok(results)
}

/// Applies `body` to every parseable record in the stream, counting
/// unreadable lines instead of failing on them. I/O errors are fatal.
fn for_each_record(
    stream_path: &Path,
    malformed: &mut usize,
    mut body: impl FnMut(&PathwayRecord) -> Result<()>,
) -> Result<()> {
    let reader = BufReader::new(File::open(stream_path)?);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match PathwayRecord::from_json_line(&line, line_no + 1) {
            Ok(record) => body(&record)?,
            Err(err) => {
                warn!("skipping unreadable stream line: {}", err);
                *malformed += 1;
            }
        }
    }
    Ok(())
}
