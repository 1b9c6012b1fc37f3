//! End-to-end pipeline test: a small cylindrical channel analysed over two
//! identical frames must aggregate to zero-spread statistics equal to the
//! per-frame values.

use std::sync::atomic::AtomicBool;

use porewalk_core::{AtomRecord, Frame, SolventRecord, Vec3};
use porewalk_io::{
    HydrophobicityDatabase, HydrophobicityScale, PathwayRecord, VdwRadiusDatabase, VdwRadiusTable,
};
use porewalk_optim::{AnnealingConfig, NelderMeadConfig};
use porewalk_pathfind::{MappingParams, PathFindingMethod};
use porewalk_pipeline::{
    aggregate, run_frames, AggregationConfig, AnalysisOptions, DensityMethod, DensityOptions,
    FrameAnalyzer, PathAlignmentMethod,
};

/// A ring-walled channel around the z-axis with a handful of water oxygens
/// inside.
fn test_frame(time: f64) -> Frame {
    let mut atoms = Vec::new();
    let mut id = 0;
    let n_ring = 8;
    let mut res_id = 0;
    let mut z = -1.0;
    while z <= 1.0 + 1e-9 {
        res_id += 1;
        for k in 0..n_ring {
            id += 1;
            let phi = 2.0 * std::f64::consts::PI * k as f64 / n_ring as f64;
            atoms.push(AtomRecord {
                id,
                res_id,
                res_name: "LEU".to_string(),
                atom_name: if k == 0 {
                    "CA".to_string()
                } else {
                    format!("C{}", k)
                },
                element: "C".to_string(),
                mass: 12.0,
                pos: Vec3::new(0.8 * phi.cos(), 0.8 * phi.sin(), z),
            });
        }
        z += 0.2;
    }

    let solvent = (0..20)
        .map(|i| SolventRecord {
            id: 1000 + i,
            pos: Vec3::new(0.05, -0.05, -0.9 + i as f64 * 0.1),
        })
        .collect();

    Frame {
        time,
        atoms,
        solvent,
    }
}

fn analyzer() -> FrameAnalyzer {
    let options = AnalysisOptions {
        pf_method: PathFindingMethod::InplaneOptimised,
        init_probe_pos: Some(Vec3::new(0.0, 0.0, 0.0)),
        ipp_res_ids: None,
        chan_dir: Vec3::new(0.0, 0.0, 1.0),
        probe_step: 0.1,
        max_probe_radius: 1.2,
        max_probe_steps: 12,
        cutoff: None,
        annealing: AnnealingConfig {
            seed: 42,
            max_cooling_iter: 300,
            init_temp: 0.1,
            cooling_factor: 0.98,
            step_length_factor: 0.01,
        },
        nelder_mead: NelderMeadConfig {
            max_iter: 40,
            init_shift: 0.01,
        },
        align_method: PathAlignmentMethod::Ipp,
        mapping: MappingParams::default(),
        pore_mapping_margin: 0.75,
        density: DensityOptions {
            method: DensityMethod::Kernel,
            resolution: 0.05,
            bandwidth: 0.25,
            bandwidth_scale: 1.0,
            eval_range_cutoff: 3.0,
        },
        hydrophobicity_bandwidth: 0.35,
    };
    let vdw = VdwRadiusTable::builtin(VdwRadiusDatabase::HoleSimple).unwrap();
    let hydrophobicity =
        HydrophobicityScale::builtin(HydrophobicityDatabase::WimleyWhite1996).unwrap();
    FrameAnalyzer::new(options, vdw, hydrophobicity)
}

#[test]
fn identical_frames_aggregate_with_zero_spread() {
    let analyzer = analyzer();
    let dir = tempfile::tempdir().unwrap();
    let stream_path = dir.path().join("stream_output.json");

    let frames = vec![Ok(test_frame(0.0)), Ok(test_frame(1.0))];
    let cancel = AtomicBool::new(false);
    let summary = run_frames(
        frames.into_iter(),
        &analyzer,
        &stream_path,
        2,
        &cancel,
    )
    .unwrap();
    assert_eq!(summary.analysed, 2);
    assert_eq!(summary.failed, 0);

    // the stream holds two identical records apart from the time stamp:
    let content = std::fs::read_to_string(&stream_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first = PathwayRecord::from_json_line(lines[0], 1).unwrap();
    let second = PathwayRecord::from_json_line(lines[1], 2).unwrap();
    assert_eq!(first.path_summary.time_stamp, 0.0);
    assert_eq!(second.path_summary.time_stamp, 1.0);
    assert_eq!(
        first.path_summary.min_radius,
        second.path_summary.min_radius
    );

    let results = aggregate(
        &stream_path,
        &AggregationConfig {
            num_out_points: 120,
            extrap_dist: 0.0,
        },
    )
    .unwrap();

    assert_eq!(results.frames_read, 2);
    assert_eq!(results.malformed_lines, 0);
    assert_eq!(results.time_stamps, vec![0.0, 1.0]);

    // two identical observations: mean equals the per-frame value and the
    // spread collapses.
    let min_radius = &results.scalar_summaries["minRadius"];
    assert_eq!(min_radius.count(), 2);
    assert_eq!(min_radius.mean(), first.path_summary.min_radius);
    assert_eq!(min_radius.sd(), 0.0);
    assert_eq!(min_radius.min(), min_radius.max());

    let volume = &results.scalar_summaries["volume"];
    assert_eq!(volume.mean(), first.path_summary.volume);
    assert_eq!(volume.sd(), 0.0);

    // profiles collapse pointwise as well:
    for stats in &results.radius_profile {
        assert_eq!(stats.count(), 2);
        assert!(stats.sd() < 1e-12);
    }

    // the channel wall sits near 0.8 minus the carbon radius, so the mean
    // radius profile inside the pore is sensible:
    let mid = results.radius_profile.len() / 2;
    let mid_radius = results.radius_profile[mid].mean();
    assert!(
        mid_radius > 0.4 && mid_radius < 0.8,
        "mid-pore radius {}",
        mid_radius
    );

    // residue summaries cover every wall residue:
    assert_eq!(results.residue_ids.len(), 11);
    let lining = &results.residue_summaries["poreLining"];
    assert!(lining.iter().any(|s| s.mean() > 0.5));
}

#[test]
fn failed_frames_are_counted_and_skipped() {
    let analyzer = analyzer();
    let dir = tempfile::tempdir().unwrap();
    let stream_path = dir.path().join("stream_output.json");

    let frames = vec![
        Ok(test_frame(0.0)),
        // an empty reference selection cannot be analysed:
        Ok(Frame {
            time: 1.0,
            atoms: vec![],
            solvent: vec![],
        }),
        Ok(test_frame(2.0)),
    ];
    let cancel = AtomicBool::new(false);
    let summary = run_frames(frames.into_iter(), &analyzer, &stream_path, 2, &cancel).unwrap();
    assert_eq!(summary.analysed, 2);
    assert_eq!(summary.failed, 1);

    // the failed frame contributes no stream line, and order is preserved:
    let content = std::fs::read_to_string(&stream_path).unwrap();
    let times: Vec<f64> = content
        .lines()
        .map(|l| {
            PathwayRecord::from_json_line(l, 1)
                .unwrap()
                .path_summary
                .time_stamp
        })
        .collect();
    assert_eq!(times, vec![0.0, 2.0]);
}

#[test]
fn cancellation_stops_the_pump() {
    let analyzer = analyzer();
    let dir = tempfile::tempdir().unwrap();
    let stream_path = dir.path().join("stream_output.json");

    let cancel = AtomicBool::new(true);
    let frames = (0..100).map(|i| Ok(test_frame(i as f64)));
    let summary = run_frames(frames, &analyzer, &stream_path, 2, &cancel).unwrap();
    // the pump never forwards a frame once cancellation is set:
    assert_eq!(summary.analysed + summary.failed, 0);
}
