/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the Green's function kernels, special functions and metrics used by the greenspline crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Kernel utilities for the [`greenspline`] crate
//!
//! Green's functions for minimum curvature and tension splines in one to
//! three Cartesian dimensions and on the sphere, the special functions they
//! rely on, and the distance metric that turns a pair of points into the
//! kernel argument.
//!
//! Kernels are selected at runtime through [`KernelType`] and
//! [`KernelParams`], and evaluated through the enum-dispatched
//! [`GreenKernel`].
//!
//! [`greenspline`]: https://docs.rs/greenspline
mod constants;
mod errors;
mod green_kernels;
mod kernel_helpers;
mod lookup;
mod metric;
pub mod special;
mod traits;
mod utils;

/// Implemented Green's function kernels for use in the [`greenspline`] crate.
///
/// [`greenspline`]: https://docs.rs/greenspline
pub mod kernels {
    pub use super::green_kernels::*;
    pub use super::lookup::*;
}

pub use {
    constants::{DEFAULT_LOOKUP_SIZE, EARTH_RADIUS_KM, EULER_GAMMA, WGS84_FLATTENING},
    errors::KernelError,
    kernel_helpers::{KernelParams, KernelParamsBuilder, LookupTable},
    metric::{DistanceMode, EarthModel, Metric},
    traits::{GreensFunction, KernelFromParams},
    utils::{GreenKernel, KernelType, tabulate_kernel},
};
