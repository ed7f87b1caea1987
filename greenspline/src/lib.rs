/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for Green's function spline interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Scattered-data interpolation with Green's function splines.
//!
//! A Green's function spline writes the interpolant as a weighted sum of
//! the Green's function of a differential operator, one term centred on
//! every data constraint. Solving for the weights is a dense linear system,
//! so memory grows as **O(N²)** and the solve as **O(N³)** in the number of
//! constraints. Direct solves are practical up to a few thousand
//! constraints on a typical machine.
//!
//! Constraints are either observed values or observed directional
//! derivatives (slopes). Before solving, the observations can have their
//! mean, a least-squares linear trend and their range removed; the inverse
//! transform is applied exactly when the spline is evaluated.
//!
//! # Features
//! - Minimum curvature and tension splines in 1D, 2D and 3D Cartesian space
//! - Minimum curvature and tension splines on the sphere, with an optional
//!   tabulated kernel for large problems
//! - Value and slope constraints, with slopes given as azimuths,
//!   components or unit vectors
//! - Gauss-Jordan or truncated SVD solves, the latter reporting the
//!   singular value spectrum for choosing a cutoff
//! - Parallel evaluation of values and slopes at many locations
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra
//!
//! # Examples
//!
//! ```
//! use faer::Mat;
//! use greenspline::{
//!     DistanceMode, GreenSpline, SplineFamily, SplineSettings, generate_random_points,
//! };
//!
//! // Generate some random data in the unit square
//! let points = generate_random_points(50, 2, Some(42));
//! let values: Vec<f64> = (0..points.nrows())
//!     .map(|i| (3.0 * points[(i, 0)]).sin() * points[(i, 1)])
//!     .collect();
//!
//! // A continuous curvature spline in tension
//! let settings = SplineSettings::builder(SplineFamily::ContinuousCurvatureTension, DistanceMode::Cartesian2D)
//!     .tension(0.25)
//!     .build()
//!     .unwrap();
//!
//! // Solve by Gauss-Jordan elimination
//! let spline = GreenSpline::builder(points.clone(), values.clone(), settings)
//!     .build()
//!     .unwrap()
//!     .into_model()
//!     .unwrap();
//!
//! // The spline passes through the data
//! let fitted = spline.evaluate_points(&points).unwrap();
//! let max_diff = fitted
//!     .values
//!     .iter()
//!     .zip(&values)
//!     .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));
//!
//! assert!(max_diff < 1e-6);
//!
//! // Evaluate on a small grid
//! let grid = Mat::from_fn(25, 2, |i, k| match k {
//!     0 => (i % 5) as f64 / 4.0,
//!     _ => (i / 5) as f64 / 4.0,
//! });
//! assert_eq!(spline.evaluate_points(&grid).unwrap().values.len(), 25);
//! ```
//!
//! # References
//! 1.  Sandwell, D. T., 1987. Biharmonic spline interpolation of GEOS-3 and
//!     SEASAT altimeter data. Geophys. Res. Lett., 14(2), 139–142.
//! 2.  Wessel, P., and D. Bercovici, 1998. Interpolation with splines in tension:
//!     a Green's function approach. Math. Geol., 30(1), 77–93.
//! 3.  Mitasova, H., and L. Mitas, 1993. Interpolation by regularized spline
//!     with tension: I. Theory and implementation. Math. Geol., 25(6), 641–655.
//! 4.  Parker, R. L., 1994. Geophysical Inverse Theory. Princeton University Press.
//! 5.  Wessel, P., and J. M. Becker, 2008. Interpolation using a generalized
//!     Green's function for a spherical surface spline in tension.
//!     Geophys. J. Int., 174, 21–28.
//! 6.  Wessel, P., 2009. A general-purpose Green's function-based interpolator.
//!     Computers & Geosciences, 35, 1247–1254.
pub mod config;

pub mod linalg;

pub mod progress;

mod common;

mod constraints;

mod errors;

mod normalize;

mod spline;

mod system;

pub use {
    common::{RadiusRange, format_memory, generate_random_points},
    config::{
        NormalizationMode, SolverConfig, SolverConfigBuilder, SolverMethod, SplineFamily,
        SplineSettings, SplineSettingsBuilder,
    },
    constraints::{GradientConstraints, GradientInput},
    errors::{GreenSplineError, Result},
    normalize::NormalizationCoefficients,
    spline::{
        BatchEvaluation, Evaluation, GreenSpline, GreenSplineBuilder, SolveDiagnostics,
        SolveOutcome,
    },
};

pub use greenspline_utils::{DistanceMode, EarthModel, KernelType, LookupTable, Metric};
