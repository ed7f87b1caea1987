/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the tabulated spherical tension kernel used to avoid repeated Legendre evaluations.
//
// Created on: 18 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    GreensFunction, KernelFromParams, KernelParams, errors::KernelError,
    green_kernels::WesselBeckerKernel, kernel_helpers::LookupTable,
};
use rayon::prelude::*;
use std::{fmt, sync::Arc};

/// [`WesselBeckerKernel`] sampled on an equally spaced grid of cosines and
/// evaluated by linear interpolation.
///
/// Both tables are built once, in parallel, when the kernel is created.
/// Cloning shares the tables. Arguments outside the tabulated range are
/// clamped to its end points.
#[derive(Clone)]
pub struct WesselBeckerLookupKernel {
    exact: WesselBeckerKernel,
    table: LookupTable,
    inv_dx: f64,
    values: Arc<[f64]>,
    gradients: Arc<[f64]>,
}

impl WesselBeckerLookupKernel {
    /// Returns the closed-form kernel the tables were sampled from.
    pub fn exact(&self) -> &WesselBeckerKernel {
        &self.exact
    }

    /// Returns the layout of the tables.
    pub fn table(&self) -> LookupTable {
        self.table
    }

    #[inline(always)]
    fn interpolate(&self, y: &[f64], x: f64) -> f64 {
        let last = (self.table.size - 1) as f64;
        let f = ((x - self.table.range.0) * self.inv_dx).clamp(0.0, last);
        let f0 = f.floor();
        let df = f - f0;
        let k = f0 as usize;
        if df == 0.0 {
            return y[k];
        }
        y[k] * (1.0 - df) + y[k + 1] * df
    }
}

impl fmt::Debug for WesselBeckerLookupKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WesselBeckerLookupKernel")
            .field("exact", &self.exact)
            .field("table", &self.table)
            .finish()
    }
}

impl GreensFunction for WesselBeckerLookupKernel {
    #[inline(always)]
    fn g(&self, x: f64) -> f64 {
        self.interpolate(&self.values, x)
    }

    #[inline(always)]
    fn dgdr(&self, x: f64) -> f64 {
        self.interpolate(&self.gradients, x)
    }
}

impl KernelFromParams for WesselBeckerLookupKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        p.lookup.validate()?;
        let exact = WesselBeckerKernel::from_params(p)?;
        let table = p.lookup;
        let dx = table.spacing();
        let node = |i: usize| match i == table.size - 1 {
            true => table.range.1,
            false => table.range.0 + i as f64 * dx,
        };

        let (values, gradients): (Vec<f64>, Vec<f64>) = (0..table.size)
            .into_par_iter()
            .map(|i| {
                let x = node(i);
                (exact.g(x), exact.dgdr(x))
            })
            .unzip();

        Ok(WesselBeckerLookupKernel {
            exact,
            table,
            inv_dx: 1.0 / dx,
            values: values.into(),
            gradients: gradients.into(),
        })
    }
}
