/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements Gauss-Jordan elimination and a truncated singular value decomposition solver.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Dense solvers for the spline system.
//!
//! Both solvers are generic over the scalar type so that the system can be
//! held in single or double precision. The `single-precision` feature picks
//! [`SolverScalar`] for the crate.
#![allow(non_snake_case)]

use crate::errors::{GreenSplineError, Result};
use faer::{Mat, MatRef, linalg::solvers};
use faer_traits::RealField;
use num_traits::Float;
use std::fmt::Debug;

/// Scalar type the system is assembled and solved in.
#[cfg(feature = "single-precision")]
pub type SolverScalar = f32;

/// Scalar type the system is assembled and solved in.
#[cfg(not(feature = "single-precision"))]
pub type SolverScalar = f64;

/// Floating point scalar usable by the solvers.
pub trait Real: Float + RealField + Debug + Send + Sync + 'static {
    /// Converts from `f64`, rounding if needed.
    fn of(x: f64) -> Self;

    /// Widens to `f64`.
    fn as_f64(self) -> f64;
}

impl Real for f64 {
    #[inline(always)]
    fn of(x: f64) -> Self {
        x
    }

    #[inline(always)]
    fn as_f64(self) -> f64 {
        self
    }
}

impl Real for f32 {
    #[inline(always)]
    fn of(x: f64) -> Self {
        x as f32
    }

    #[inline(always)]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

/// Solves `A x = b` in place by Gauss-Jordan elimination with full pivoting.
///
/// On success `b` holds the solution and `A` its inverse. Fails with
/// [`GreenSplineError::SingularSystem`] when a pivot is exactly zero or a
/// column is selected twice.
pub fn gauss_jordan<T: Real>(A: &mut Mat<T>, b: &mut [T]) -> Result<()> {
    let n = A.nrows();
    if A.ncols() != n || b.len() != n {
        return Err(GreenSplineError::config(format!(
            "Gauss-Jordan needs a square system, got {}x{} with {} right hand sides",
            A.nrows(),
            A.ncols(),
            b.len()
        )));
    }

    let zero = T::zero();
    let mut ipiv = vec![0usize; n];
    let mut indxr = vec![0usize; n];
    let mut indxc = vec![0usize; n];

    for i in 0..n {
        let mut big = zero;
        let (mut irow, mut icol) = (0, 0);
        for j in 0..n {
            if ipiv[j] == 1 {
                continue;
            }
            for k in 0..n {
                match ipiv[k] {
                    0 => {
                        let v = A[(j, k)].abs();
                        if v >= big {
                            big = v;
                            irow = j;
                            icol = k;
                        }
                    }
                    1 => {}
                    _ => return Err(GreenSplineError::SingularSystem),
                }
            }
        }
        ipiv[icol] += 1;

        if irow != icol {
            for l in 0..n {
                let tmp = A[(irow, l)];
                A[(irow, l)] = A[(icol, l)];
                A[(icol, l)] = tmp;
            }
            b.swap(irow, icol);
        }
        indxr[i] = irow;
        indxc[i] = icol;

        if A[(icol, icol)] == zero {
            return Err(GreenSplineError::SingularSystem);
        }
        let pivinv = T::one() / A[(icol, icol)];
        A[(icol, icol)] = T::one();
        for l in 0..n {
            A[(icol, l)] = A[(icol, l)] * pivinv;
        }
        b[icol] = b[icol] * pivinv;

        for ll in 0..n {
            if ll == icol {
                continue;
            }
            let dum = A[(ll, icol)];
            A[(ll, icol)] = zero;
            for l in 0..n {
                let v = A[(icol, l)] * dum;
                A[(ll, l)] = A[(ll, l)] - v;
            }
            b[ll] = b[ll] - b[icol] * dum;
        }
    }

    // Undo the column interchanges on the inverse.
    for l in (0..n).rev() {
        if indxr[l] != indxc[l] {
            for k in 0..n {
                let tmp = A[(k, indxr[l])];
                A[(k, indxr[l])] = A[(k, indxc[l])];
                A[(k, indxc[l])] = tmp;
            }
        }
    }
    Ok(())
}

/// Singular value decomposition `A = U diag(w) V^T` of an `m x n` matrix, `m >= n`.
#[derive(Debug, Clone)]
pub struct Svd<T: Real> {
    factors: solvers::Svd<T>,

    /// Singular values in non-increasing order.
    w: Vec<T>,
}

impl<T: Real> Svd<T> {
    /// Decomposes `A` with faer's thin SVD.
    ///
    /// Fails with [`GreenSplineError::SvdNoConvergence`] if faer's iteration
    /// does not converge.
    pub fn new(a: Mat<T>) -> Result<Self> {
        let (m, n) = (a.nrows(), a.ncols());
        if m < n {
            return Err(GreenSplineError::config(format!(
                "SVD needs at least as many rows as columns, got {}x{}",
                m, n
            )));
        }

        let factors = a
            .thin_svd()
            .map_err(|_| GreenSplineError::SvdNoConvergence)?;
        let w = factors.S().column_vector().iter().cloned().collect();
        Ok(Svd { factors, w })
    }

    /// `m x n` left singular vectors.
    pub fn u(&self) -> MatRef<'_, T> {
        self.factors.U()
    }

    /// `n x n` right singular vectors (not transposed).
    pub fn v(&self) -> MatRef<'_, T> {
        self.factors.V()
    }

    /// Singular values in non-increasing order.
    pub fn singular_values(&self) -> &[T] {
        &self.w
    }

    /// Largest singular value.
    pub fn max_singular_value(&self) -> T {
        self.w.iter().fold(T::zero(), |acc, &x| acc.max(x))
    }

    /// Ratios `w[i] / w_max` sorted in descending order.
    ///
    /// A zero spectrum gives zero ratios.
    pub fn spectrum(&self) -> Vec<f64> {
        let wmax = self.max_singular_value().as_f64();
        let mut ratios: Vec<f64> = self
            .w
            .iter()
            .map(|&w| match wmax > 0.0 {
                true => w.as_f64() / wmax,
                false => 0.0,
            })
            .collect();
        ratios.sort_by(|a, b| b.total_cmp(a));
        ratios
    }

    /// Solves `A x = b` through the pseudo-inverse, dropping singular values
    /// with `w / w_max <= cutoff`.
    ///
    /// Returns the solution and the number of singular values used. Fails
    /// with [`GreenSplineError::DegenerateCutoff`] if none survive.
    pub fn solve(&self, b: &[T], cutoff: f64) -> Result<(Vec<T>, usize)> {
        let (u, v) = (self.u(), self.v());
        let (m, n) = (u.nrows(), u.ncols());
        if b.len() != m {
            return Err(GreenSplineError::config(format!(
                "right hand side has {} rows, expected {}",
                b.len(),
                m
            )));
        }

        let wmax = self.max_singular_value().as_f64();
        let winv: Vec<T> = self
            .w
            .iter()
            .map(|&w| match wmax > 0.0 && w.as_f64() / wmax > cutoff {
                true => T::one() / w,
                false => T::zero(),
            })
            .collect();
        let rank = winv.iter().filter(|&&x| x != T::zero()).count();
        if rank == 0 {
            return Err(GreenSplineError::DegenerateCutoff { cutoff });
        }

        // x = V diag(1/w) U^T b
        let mut tmp = vec![T::zero(); n];
        for j in 0..n {
            if winv[j] == T::zero() {
                continue;
            }
            let mut s = T::zero();
            for i in 0..m {
                s = s + u[(i, j)] * b[i];
            }
            tmp[j] = s * winv[j];
        }
        let mut x = vec![T::zero(); n];
        for (k, xk) in x.iter_mut().enumerate() {
            let mut s = T::zero();
            for j in 0..n {
                s = s + v[(k, j)] * tmp[j];
            }
            *xk = s;
        }
        Ok((x, rank))
    }
}
