/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the traits shared by every Green's function kernel.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{errors::KernelError, kernel_helpers::KernelParams};

/// Converts a shared [`KernelParams`] configuration into a concrete kernel type.
pub trait KernelFromParams: Sized {
    /// Constructs `Self` from a set of uniform kernel parameters, computing
    /// any derived constants once.
    fn from_params(p: &KernelParams) -> Result<Self, KernelError>;
}

/// A Green's function and its radial derivative.
///
/// For the Cartesian kernels `r` is a distance. For the spherical kernels
/// `r` is the cosine of the angular separation and [`GreensFunction::dgdr`]
/// returns the derivative with respect to the separation angle in radians.
pub trait GreensFunction {
    /// Evaluates `G(r)`.
    fn g(&self, r: f64) -> f64;

    /// Evaluates `dG/dr`.
    fn dgdr(&self, r: f64) -> f64;
}
