//! porewalk: channel pathway annotation for biomolecular trajectories.

mod config;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use log::{error, info};
use porewalk_core::{PorewalkError, Result};
use porewalk_geometry::{cubic_interp_3d_with_params, BoundaryCondition3};
use porewalk_io::{
    export_pathway_surface, write_annotated_pdb, write_results, ObjExportParams, PathwayProfile,
    PathwayRecord, ProfileRecord, ResidueSummaryTable, ResultsDocument, RunMetadata,
    ScalarTimeSeries, SummaryRecord, TrajectoryReader,
};
use porewalk_pipeline::{aggregate, run_frames, AggregatedResults, FrameAnalyzer, RunSummary};

use config::Cli;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("porewalk: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let vdw = cli.vdw_table()?;
    let hydrophobicity = cli.hydrophobicity_scale()?;
    let options = cli.analysis_options()?;
    let analyzer = FrameAnalyzer::new(options, vdw, hydrophobicity);

    let out_json = PathBuf::from(format!("{}.json", cli.out_filename));
    let stream_path = PathBuf::from(format!("stream_{}.json", cli.out_filename));
    let out_obj = PathBuf::from(format!("{}.obj", cli.out_filename));
    let out_pdb = PathBuf::from(format!("{}.pdb", cli.out_filename));

    // FIRST PASS: analyse frames in parallel, streaming one record per
    // frame in frame order.
    let reader = TrajectoryReader::open(&cli.trajectory)?;
    let cancel = AtomicBool::new(false);
    let summary = run_frames(
        reader,
        &analyzer,
        &stream_path,
        cli.worker_threads(),
        &cancel,
    )?;
    if summary.analysed == 0 {
        return Err(PorewalkError::input(format!(
            "no frames could be analysed from {}",
            cli.trajectory.display()
        )));
    }

    // the pathway surface comes from the last analysed frame; grab its
    // record before the stream file is consumed and deleted.
    let last_record = read_last_record(&stream_path)?;

    // SECOND PASS: sequential aggregation over the stream.
    let results = aggregate(&stream_path, &cli.aggregation_config())?;

    let document = build_document(&results, &summary);
    write_results(&out_json, &document, &stream_path)?;
    export_surface(&out_obj, &last_record)?;
    write_pdb(&out_pdb, &cli.trajectory, &results)?;

    info!(
        "{} frames analysed, {} failed",
        summary.analysed, summary.failed
    );
    println!(
        "{} frames analysed, {} failed",
        summary.analysed, summary.failed
    );

    if results.malformed_lines > 0 {
        return Err(PorewalkError::input(format!(
            "{} unreadable per-frame records were skipped during aggregation",
            results.malformed_lines
        )));
    }
    if summary.failed > 0 {
        return Err(PorewalkError::FailedFrames {
            failed: summary.failed,
            total: summary.failed + summary.analysed,
        });
    }
    Ok(())
}

/// Assembles the results document from the aggregation output.
fn build_document(results: &AggregatedResults, summary: &RunSummary) -> ResultsDocument {
    let mut pathway_summary = BTreeMap::new();
    for (key, stats) in &results.scalar_summaries {
        pathway_summary.insert(key.clone(), SummaryRecord::from(stats));
    }

    let mut residue_fields = BTreeMap::new();
    for (key, stats) in &results.residue_summaries {
        residue_fields.insert(key.clone(), ProfileRecord::from(stats.as_slice()));
    }

    ResultsDocument {
        metadata: RunMetadata::new(summary.analysed, summary.failed),
        pathway_summary,
        pathway_profile: PathwayProfile {
            support_points: results.support_points.clone(),
            radius: ProfileRecord::from(results.radius_profile.as_slice()),
            density: ProfileRecord::from(results.density_profile.as_slice()),
            energy: ProfileRecord::from(results.energy_profile.as_slice()),
            pl_hydrophobicity: ProfileRecord::from(results.pl_hydrophobicity_profile.as_slice()),
            pf_hydrophobicity: ProfileRecord::from(results.pf_hydrophobicity_profile.as_slice()),
        },
        pathway_scalar_time_series: ScalarTimeSeries {
            time: results.time_stamps.clone(),
            series: results.scalar_time_series.clone(),
        },
        pathway_profile_time_series: results.profile_time_series.clone(),
        residue_summary: ResidueSummaryTable {
            res_id: results.residue_ids.clone(),
            res_name: results.residue_names.clone(),
            hydrophobicity: results.residue_hydrophobicity.clone(),
            fields: residue_fields,
        },
    }
}

/// Reads the final record of the per-frame stream.
fn read_last_record(stream_path: &Path) -> Result<PathwayRecord> {
    let reader = BufReader::new(File::open(stream_path)?);
    let mut last: Option<(usize, String)> = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            last = Some((i + 1, line));
        }
    }
    let (line_no, line) = last.ok_or_else(|| {
        PorewalkError::input("per-frame stream is empty, cannot export pathway surface")
    })?;
    PathwayRecord::from_json_line(&line, line_no)
}

/// Rebuilds the last frame's pathway splines and writes the OBJ surface.
fn export_surface(out_obj: &Path, record: &PathwayRecord) -> Result<()> {
    let sample = &record.centre_line_spline;
    let points: Vec<porewalk_core::Vec3> = sample
        .x
        .iter()
        .zip(sample.y.iter())
        .zip(sample.z.iter())
        .map(|((&x, &y), &z)| porewalk_core::Vec3::new(x, y, z))
        .collect();
    let centre_line =
        cubic_interp_3d_with_params(&sample.knots, &points, &BoundaryCondition3::Natural)?;
    let radius = record.radius_spline.to_spline()?;

    export_pathway_surface(
        out_obj,
        &centre_line,
        &radius,
        record.path_summary.arc_length_lo,
        record.path_summary.arc_length_hi,
        &ObjExportParams::default(),
    )
}

/// Writes the annotated PDB from the first readable trajectory frame and
/// the aggregated per-residue lining/facing fractions.
fn write_pdb(out_pdb: &Path, trajectory: &Path, results: &AggregatedResults) -> Result<()> {
    let first_frame = TrajectoryReader::open(trajectory)?
        .find_map(|f| f.ok())
        .ok_or_else(|| PorewalkError::input("trajectory holds no readable frame"))?;

    let mean_map = |key: &str| -> BTreeMap<i64, f64> {
        results
            .residue_summaries
            .get(key)
            .map(|stats| {
                results
                    .residue_ids
                    .iter()
                    .zip(stats.iter())
                    .map(|(&id, s)| (id, s.mean()))
                    .collect()
            })
            .unwrap_or_default()
    };

    write_annotated_pdb(
        out_pdb,
        &first_frame,
        &mean_map("poreLining"),
        &mean_map("poreFacing"),
    )
}
