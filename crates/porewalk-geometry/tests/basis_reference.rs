//! Basis-function values checked against the `bs()` method of the R spline
//! package, for the knot layout from "A very short note on B-splines"
//! (Sinha). Evaluation points probe values at and between the original
//! knots.

use porewalk_geometry::basis::{basis, basis_count, basis_derivative, open_knot_vector};

const BREAKS: [f64; 5] = [-4.0, -0.5, 0.0, 0.5, 4.0];

fn eval_points() -> Vec<f64> {
    vec![-4.0, -2.5, 0.0, 0.5, -1.0, 2.0_f64.sqrt(), 4.0]
}

#[test]
fn quadratic_basis_matches_r_reference() {
    let degree = 2;
    let knots = open_knot_vector(&BREAKS, degree);
    let n_basis = basis_count(BREAKS.len(), degree);
    assert_eq!(n_basis, 6);

    #[rustfmt::skip]
    let reference = [
        1.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.326_530_60, 0.512_755_10, 0.160_714_30, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.500_000_00, 0.500_000_00, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.875_000_00, 0.125_000_00, 0.000_000_00,
        0.020_408_16, 0.336_734_69, 0.642_857_14, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.477_592_25, 0.454_180_29, 0.068_227_46,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 1.000_000_00,
    ];

    for (j, &x) in eval_points().iter().enumerate() {
        for i in 0..n_basis {
            let b = basis(&knots, degree, i, x);
            let r = reference[j * n_basis + i];
            assert!(
                (b - r).abs() < 1e-7,
                "B_{{{},{}}}({}) = {}, reference {}",
                i,
                degree,
                x,
                b,
                r
            );
        }
    }
}

#[test]
fn cubic_basis_matches_r_reference() {
    let degree = 3;
    let knots = open_knot_vector(&BREAKS, degree);
    let n_basis = basis_count(BREAKS.len(), degree);
    assert_eq!(n_basis, 7);

    #[rustfmt::skip]
    let reference = [
        1.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.186_588_92, 0.460_413_63, 0.299_426_02, 0.053_571_43, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.055_555_56, 0.888_888_89, 0.055_555_56, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.680_555_60, 0.303_819_40, 0.015_625_00, 0.000_000_00,
        0.002_915_45, 0.101_676_39, 0.466_836_74, 0.428_571_43, 0.000_000_00, 0.000_000_00, 0.000_000_00,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.274_433_68, 0.496_761_88, 0.210_983_17, 0.017_821_28,
        0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 0.000_000_00, 1.000_000_00,
    ];

    for (j, &x) in eval_points().iter().enumerate() {
        for i in 0..n_basis {
            let b = basis(&knots, degree, i, x);
            let r = reference[j * n_basis + i];
            assert!(
                (b - r).abs() < 1e-7,
                "B_{{{},{}}}({}) = {}, reference {}",
                i,
                degree,
                x,
                b,
                r
            );
        }
    }
}

#[test]
fn cubic_basis_derivative_matches_r_reference() {
    let degree = 3;
    let knots = open_knot_vector(&BREAKS, degree);
    let n_basis = basis_count(BREAKS.len(), degree);

    #[rustfmt::skip]
    let reference = [
        -0.857_142_86,  0.857_142_9,  0.000_000_0,  0.000_000_0,  0.000_000_00,  0.000_000_0, 0.000_000_00,
        -0.279_883_38, -0.104_682_9,  0.277_423_5,  0.107_142_9,  0.000_000_00,  0.000_000_0, 0.000_000_00,
         0.000_000_00,  0.000_000_0, -0.333_333_3,  0.000_000_0,  0.333_333_33,  0.000_000_0, 0.000_000_00,
         0.000_000_00,  0.000_000_0,  0.000_000_0, -0.583_333_3,  0.489_583_33,  0.093_750_0, 0.000_000_00,
        -0.017_492_71, -0.235_058_3, -0.176_020_4,  0.428_571_4,  0.000_000_00,  0.000_000_0, 0.000_000_00,
         0.000_000_00,  0.000_000_0,  0.000_000_0, -0.318_394_8, -0.022_240_38,  0.282_154_5, 0.058_480_68,
         0.000_000_00,  0.000_000_0,  0.000_000_0,  0.000_000_0,  0.000_000_00, -0.857_142_9, 0.857_142_86,
    ];

    for (j, &x) in eval_points().iter().enumerate() {
        for i in 0..n_basis {
            let d = basis_derivative(&knots, degree, i, x, 1);
            let r = reference[j * n_basis + i];
            assert!(
                (d - r).abs() < 1e-6,
                "B'_{{{},{}}}({}) = {}, reference {}",
                i,
                degree,
                x,
                d,
                r
            );
        }
    }
}
