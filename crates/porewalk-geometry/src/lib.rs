//! Spline geometry for pathway analysis.
//!
//! Everything is expressed over B-spline bases on open knot vectors: scalar
//! profiles (`SplineCurve1D`), centrelines (`SplineCurve3D`) and the cubic /
//! linear interpolators that construct them from data. The arc-length
//! machinery (adaptive quadrature, reparameterisation, transported frames)
//! lives next to the 3D curve it serves.

pub mod basis;
pub mod interp;
pub mod quadrature;
pub mod spline1d;
pub mod spline3d;

pub use interp::{
    assign_parameters, cubic_interp_1d, cubic_interp_3d, cubic_interp_3d_with_params,
    linear_interp_1d, BoundaryCondition, BoundaryCondition3, CurveParameterisation,
};
pub use quadrature::adaptive_quadrature;
pub use spline1d::SplineCurve1D;
pub use spline3d::{transported_frames, PathFrame, SplineCurve3D};
