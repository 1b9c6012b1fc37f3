//! End-to-end pathfinder scenarios with analytically known geometry.

use porewalk_core::Vec3;
use porewalk_optim::{AnnealingConfig, NelderMeadConfig};
use porewalk_pathfind::{
    MappingParams, MolecularPath, ObstacleSet, PathFinder, PathFindingConfig, PathFindingMethod,
};

fn annealing(max_iter: usize, step: f64) -> AnnealingConfig {
    AnnealingConfig {
        seed: 20180117,
        max_cooling_iter: max_iter,
        init_temp: 0.1,
        cooling_factor: 0.98,
        step_length_factor: step,
    }
}

#[test]
fn single_central_obstacle() {
    // one sphere at the origin; the probe starts off-axis and walks along
    // z, so the narrowest point sits in the obstacle's plane with radius
    // |init| - r = 0.7. The optimisation budget is kept small so the probe
    // stays near its seed instead of drifting into open space.
    let positions = [Vec3::new(0.0, 0.0, 0.0)];
    let radii = [0.3];
    let obstacles = ObstacleSet::new(&positions, &radii).unwrap();

    let config = PathFindingConfig {
        init_pos: Vec3::new(1.0, 0.0, 0.0),
        chan_dir: Vec3::new(0.0, 0.0, 1.0),
        probe_step: 0.1,
        max_probe_radius: 2.0,
        max_probe_steps: 50,
        cutoff: None,
        annealing: annealing(100, 0.001),
        nelder_mead: NelderMeadConfig {
            max_iter: 5,
            init_shift: 0.001,
        },
    };

    let finder = PathFinder::new(PathFindingMethod::InplaneOptimised, config).unwrap();
    let found = finder.find_path(&obstacles).unwrap();
    assert!(!found.forward_infeasible && !found.backward_infeasible);
    let mut path = MolecularPath::from_probes(&found.probes, 2.0).unwrap();

    // centre the arc-length origin on the initial probe position:
    let mapped = path
        .map_positions(&[Vec3::new(1.0, 0.0, 0.0)], &MappingParams::default())
        .unwrap();
    path.centre_arc_origin(mapped[0].s);

    let (arg_min, min_radius) = path.min_radius();
    assert!(
        (min_radius - 0.7).abs() < 0.05,
        "min radius {} should be close to 0.7",
        min_radius
    );
    assert!(
        arg_min.abs() < 0.25,
        "narrowest point at s = {} should sit near the obstacle plane",
        arg_min
    );
}

#[test]
fn straight_cylinder_channel() {
    // obstacle rings of radius 1 around the z-axis: the optimal probe
    // track is the axis itself and the radius profile is close to 1
    // everywhere.
    let mut positions = Vec::new();
    let mut radii = Vec::new();
    let n_ring = 12;
    let mut z = -2.5;
    while z <= 2.5 {
        for k in 0..n_ring {
            let phi = 2.0 * std::f64::consts::PI * k as f64 / n_ring as f64;
            positions.push(Vec3::new(phi.cos(), phi.sin(), z));
            radii.push(0.01);
        }
        z += 0.25;
    }
    let obstacles = ObstacleSet::new(&positions, &radii).unwrap();

    let config = PathFindingConfig {
        init_pos: Vec3::new(0.0, 0.0, 0.0),
        chan_dir: Vec3::new(0.0, 0.0, 1.0),
        probe_step: 0.1,
        max_probe_radius: 1.5,
        max_probe_steps: 20,
        cutoff: None,
        annealing: annealing(500, 0.01),
        nelder_mead: NelderMeadConfig {
            max_iter: 50,
            init_shift: 0.01,
        },
    };

    let finder = PathFinder::new(PathFindingMethod::InplaneOptimised, config).unwrap();
    let found = finder.find_path(&obstacles).unwrap();
    let probes = &found.probes;
    assert_eq!(probes.len(), 41);

    // centreline colinear with the z-axis:
    for probe in probes {
        let off_axis = (probe.centre.x * probe.centre.x + probe.centre.y * probe.centre.y).sqrt();
        assert!(
            off_axis < 0.05,
            "probe at z = {} sits {} off axis",
            probe.centre.z,
            off_axis
        );
        assert!(
            (probe.radius - 1.0).abs() < 0.05,
            "probe radius {} should be close to 1",
            probe.radius
        );
    }

    let path = MolecularPath::from_probes(probes, 1.5).unwrap();
    for i in 0..=40 {
        let s = path.s_lo() + path.length() * i as f64 / 40.0;
        assert!(
            (path.radius(s) - 1.0).abs() < 0.05,
            "radius {} at s = {}",
            path.radius(s),
            s
        );
    }

    // volume of a unit-radius cylinder of this length:
    let expected = std::f64::consts::PI * path.length();
    assert!(
        (path.volume() - expected).abs() / expected < 0.1,
        "volume {} vs cylinder {}",
        path.volume(),
        expected
    );
}
