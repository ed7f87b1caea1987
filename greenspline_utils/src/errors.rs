/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type raised while configuring Green's function kernels.
//
// Created on: 17 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::KernelType;
use thiserror::Error;

/// Errors raised when kernel parameters cannot produce a valid Green's function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Tension must lie in the half-open interval `[0, 1)`.
    #[error("tension must lie in [0, 1), got {0}")]
    InvalidTension(f64),

    /// The length scale must be strictly positive and finite.
    #[error("length scale must be positive and finite, got {0}")]
    InvalidLengthScale(f64),

    /// The tension family of kernels degenerates to zero at `t = 0`.
    #[error("{0:?} requires a strictly positive tension")]
    ZeroTension(KernelType),

    /// A lookup table needs at least two nodes to interpolate between.
    #[error("lookup table needs at least 2 nodes, got {0}")]
    LookupTooSmall(usize),

    /// The lookup range must be a non-empty interval inside `[-1, 1]`.
    #[error("lookup range [{0}, {1}] must be a non-empty interval inside [-1, 1]")]
    InvalidLookupRange(f64, f64),

    /// A Legendre function series was still changing after the term cap.
    #[error("Legendre series did not converge within {0} terms")]
    SeriesNoConvergence(usize),

    /// The tension is so close to one that the kernel overflows.
    #[error("kernel is not finite for tension {0}")]
    NonFiniteKernel(f64),
}
