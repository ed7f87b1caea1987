/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error type returned when configuring, solving or evaluating a Green's spline.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use greenspline_utils::KernelError;
use thiserror::Error;

/// Errors raised while setting up, solving or evaluating a [`GreenSpline`].
///
/// Every error fails the whole call. Nothing is retried and no partial model
/// is returned, so the caller decides whether to adjust the tension, cutoff
/// or solver and try again.
///
/// [`GreenSpline`]: crate::GreenSpline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GreenSplineError {
    /// Inconsistent or unsupported settings, shapes or inputs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Gauss-Jordan elimination met an exactly zero pivot.
    #[error("singular matrix encountered during Gauss-Jordan elimination")]
    SingularSystem,

    /// The truncated SVD kept none of the singular values.
    #[error("no singular value ratio exceeds the cutoff {cutoff}")]
    DegenerateCutoff { cutoff: f64 },

    /// The `n x n` system cannot be allocated.
    #[error("cannot allocate the {size} x {size} system: {reason}")]
    Allocation { size: usize, reason: String },

    /// faer's singular value decomposition reached its iteration limit.
    #[error("singular value decomposition did not converge")]
    SvdNoConvergence,

    /// The kernel rejected its parameters.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GreenSplineError>;

impl GreenSplineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        GreenSplineError::Configuration(message.into())
    }
}
