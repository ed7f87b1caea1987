/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides parameter and builder types for configuring Green's function kernels.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{constants::DEFAULT_LOOKUP_SIZE, errors::KernelError, utils::KernelType};
use serde::{Deserialize, Serialize};

/// Layout of a precomputed table standing in for the closed-form
/// spherical tension kernel.
///
/// ### Default Values
/// - `size`: `100001`
/// - `range`: `(-1.0, 1.0)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    /// Number of equally spaced nodes, including both end points.
    pub size: usize,

    /// Range of cosine arguments covered by the table.
    pub range: (f64, f64),
}

impl Default for LookupTable {
    fn default() -> Self {
        LookupTable {
            size: DEFAULT_LOOKUP_SIZE,
            range: (-1.0, 1.0),
        }
    }
}

impl LookupTable {
    /// Checks that the table can be built.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.size < 2 {
            return Err(KernelError::LookupTooSmall(self.size));
        }
        let (lo, hi) = self.range;
        if !(lo >= -1.0 && hi <= 1.0 && lo < hi) {
            return Err(KernelError::InvalidLookupRange(lo, hi));
        }
        Ok(())
    }

    /// Spacing between consecutive nodes.
    #[inline]
    pub fn spacing(&self) -> f64 {
        (self.range.1 - self.range.0) / (self.size - 1) as f64
    }
}

/// Defines the [`KernelType`] to use, along with the tension and
/// length scale from which each kernel derives its constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    /// KernelType enum variant to use.
    pub kernel_type: KernelType,

    /// Tension in `[0, 1)`. Zero gives the minimum curvature solution,
    /// values approaching one give an increasingly local, stiffer surface.
    ///
    /// Ignored by the minimum curvature kernels.
    pub tension: f64,

    /// Characteristic length used to make the tension dimensionless.
    /// Usually comparable to the data spacing.
    ///
    /// Only used by the Cartesian tension kernels.
    pub length_scale: f64,

    /// Table layout for [`KernelType::WesselBeckerLookup`].
    pub lookup: LookupTable,
}

impl KernelParams {
    /// Begins building a [`KernelParams`] instance for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelParamsBuilder {
        KernelParamsBuilder {
            kernel_type,
            tension: 0.0,
            length_scale: 1.0,
            lookup: LookupTable::default(),
        }
    }

    /// Returns the dimensionless decay constant `sqrt(t / (1 - t))`,
    /// divided by the length scale.
    #[inline]
    pub fn decay(&self) -> f64 {
        (self.tension / (1.0 - self.tension)).sqrt() / self.length_scale
    }
}

/// Builder for [`KernelParams`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct KernelParamsBuilder {
    kernel_type: KernelType,
    tension: f64,
    length_scale: f64,
    lookup: LookupTable,
}

impl KernelParamsBuilder {
    /// Sets the `tension` parameter on the builder.
    pub fn tension(mut self, v: f64) -> Self {
        self.tension = v;
        self
    }

    /// Sets the `length_scale` parameter on the builder.
    pub fn length_scale(mut self, v: f64) -> Self {
        self.length_scale = v;
        self
    }

    /// Sets the lookup table layout on the builder.
    pub fn lookup(mut self, v: LookupTable) -> Self {
        self.lookup = v;
        self
    }

    /// Finalises the builder into a [`KernelParams`] value.
    pub fn build(self) -> Result<KernelParams, KernelError> {
        if !(0.0..1.0).contains(&self.tension) {
            return Err(KernelError::InvalidTension(self.tension));
        }
        if !(self.length_scale.is_finite() && self.length_scale > 0.0) {
            return Err(KernelError::InvalidLengthScale(self.length_scale));
        }
        if self.kernel_type == KernelType::WesselBeckerLookup {
            self.lookup.validate()?;
        }
        Ok(KernelParams {
            kernel_type: self.kernel_type,
            tension: self.tension,
            length_scale: self.length_scale,
            lookup: self.lookup,
        })
    }
}
