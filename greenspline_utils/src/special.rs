/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the special functions behind the spherical spline kernels.
//
// Created on: 17 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Special functions used by the spherical Green's functions.
//!
//! - [`dilog`]: the dilogarithm in Parker's convention, `dilog(x) = Li2(1 - x)`.
//! - [`digamma`]: the digamma function for complex arguments.
//! - [`legendre_p`]: the Legendre function of the first kind with complex degree.
//! - [`legendre_series_switch`]: where [`legendre_p`] changes expansion.

use crate::{
    constants::{
        DILOG_DOMAIN_SLOP, EULER_GAMMA, LANCZOS_COEFFICIENTS, LANCZOS_G, LEGENDRE_LOG_SCALE,
        LEGENDRE_MAX_TERMS,
    },
    errors::KernelError,
};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Dilogarithm for `x >= 0`, with `dilog(0) = pi^2 / 6` and `dilog(1) = 0`.
///
/// Uses the polynomial of Parker (1994), Appendix A. Arguments that are
/// slightly negative through round-off are treated as zero; anything
/// further below zero returns `NaN`.
pub fn dilog(x: f64) -> f64 {
    if x < -DILOG_DOMAIN_SLOP {
        return f64::NAN;
    }

    let pisqon6 = PI * PI / 6.0;
    if x <= 0.0 {
        return pisqon6;
    }

    let series = |y: f64| {
        let ysq = y * y;
        y * (1.0
            + y * (-0.25
                + y * (0.027777777777213
                    + ysq
                        * (-2.7777776990e-04
                            + ysq * (4.724071696e-06 + ysq * (-9.1764954e-08 + 1.798670e-09 * ysq))))))
    };

    if x < 0.5 {
        let y = -(1.0 - x).ln();
        pisqon6 - series(y) + y * x.ln()
    } else if x < 2.0 {
        series(-x.ln())
    } else {
        let y = x.ln();
        -series(y) - 0.5 * y * y
    }
}

/// Complex cotangent evaluated through `exp(2iz)`, which stays finite for
/// arguments with a large positive imaginary part.
pub fn cot(z: Complex64) -> Complex64 {
    let e = (-2.0 * z.im).exp();
    let (s, c) = (2.0 * z.re).sin_cos();
    Complex64::new(-e * s, e * c + 1.0) / Complex64::new(e * c - 1.0, e * s)
}

/// Digamma function `psi(z) = d/dz ln(Gamma(z))` for complex `z`.
///
/// Lanczos approximation with reflection for `Re(z) < 0.5`. The poles at
/// non-positive integers return `NaN`.
pub fn digamma(z: Complex64) -> Complex64 {
    if z.im == 0.0 && z.re <= 0.0 && z.re.round() == z.re {
        return Complex64::new(f64::NAN, 0.0);
    }

    let reflect = z.re < 0.5;
    let w = if reflect { Complex64::new(1.0 - z.re, -z.im) } else { z };

    let mut n = Complex64::new(0.0, 0.0);
    let mut d = Complex64::new(0.0, 0.0);
    for k in (1..LANCZOS_COEFFICIENTS.len()).rev() {
        let dx = (w + (k as f64 - 1.0)).inv();
        let dd = dx * LANCZOS_COEFFICIENTS[k];
        d += dd;
        n -= dd * dx;
    }
    d += LANCZOS_COEFFICIENTS[0];

    let gg = w + (LANCZOS_G - 0.5);
    let mut f = gg.ln() + n / d - LANCZOS_G / gg;

    if reflect {
        f -= cot(z * PI) * PI;
    }
    f
}

/// Legendre function of the first kind `P_nu(x)` for real `-1 <= x <= 1`
/// and complex degree `nu`.
///
/// Away from `x = -1` this sums `P_nu(x) = F(-nu, nu + 1; 1; (1 - x) / 2)`.
/// Close to `x = -1` it sums the logarithmic expansion of the same
/// hypergeometric function about `x = -1` (Abramowitz & Stegun 15.3.10),
/// which carries the `ln(1 + x)` singularity in closed form, so the cost
/// does not grow near either end point. The logarithmic terms grow like
/// `exp(2 |nu + 1/2| sqrt(z))` before they cancel, so its region
/// `z = (1 + x) / 2 < 1/4` shrinks as `(6 / |nu + 1/2|)^2`
/// for large degree. Integer degrees use `P_n(-x) = (-1)^n P_n(x)` instead,
/// where the series about `x = 1` terminates.
///
/// The end points are only defined for real degree; complex degree at
/// `|x| = 1` returns `NaN`. Fails with [`KernelError::SeriesNoConvergence`]
/// when a series is still changing after a fixed number of terms, which
/// only happens for degrees with a very large imaginary part.
pub fn legendre_p(x: f64, nu: Complex64) -> Result<Complex64, KernelError> {
    let nan = Complex64::new(f64::NAN, 0.0);
    let integer = nu.im == 0.0 && nu.re.fract() == 0.0;
    // P_nu = P_(-nu-1)
    let nu = match integer && nu.re < 0.0 {
        true => Complex64::new(-nu.re - 1.0, 0.0),
        false => nu,
    };

    if x.abs() >= 1.0 {
        if nu.im != 0.0 || x.abs() > 1.0 {
            return Ok(nan);
        }
        if x == 1.0 {
            return Ok(Complex64::new(1.0, 0.0));
        }
        if !integer {
            return Ok(nan);
        }
        let sign = if nu.re % 2.0 == 0.0 { 1.0 } else { -1.0 };
        return Ok(Complex64::new(sign, 0.0));
    }

    if integer {
        if x >= 0.0 {
            return series_about_one(x, nu);
        }
        let sign = if nu.re % 2.0 == 0.0 { 1.0 } else { -1.0 };
        return series_about_one(-x, nu).map(|p| p * sign);
    }

    if x >= legendre_series_switch(nu) {
        return series_about_one(x, nu);
    }
    series_about_minus_one(x, nu)
}

/// Cosine below which [`legendre_p`] sums the logarithmic series about
/// `x = -1` for non-integer degree `nu`. Both series need the most terms
/// right at this point.
pub fn legendre_series_switch(nu: Complex64) -> f64 {
    let scale = (nu + 0.5).norm();
    let z_log = match scale > LEGENDRE_LOG_SCALE {
        true => 0.25f64.min((LEGENDRE_LOG_SCALE / scale).powi(2)),
        false => 0.25,
    };
    2.0 * z_log - 1.0
}

/// A series has converged once its terms shrink geometrically and the
/// remaining tail is below round-off.
#[inline(always)]
fn converged(ratio: Complex64, term: Complex64, sum: Complex64) -> bool {
    let r = ratio.norm();
    r < 1.0 && term.norm() <= f64::EPSILON * sum.norm() * (1.0 - r)
}

/// `F(-nu, nu + 1; 1; z)` with `z = (1 - x) / 2 < 1`.
fn series_about_one(x: f64, nu: Complex64) -> Result<Complex64, KernelError> {
    let z = 0.5 * (1.0 - x);
    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = term;
    for k in 0..LEGENDRE_MAX_TERMS {
        let k0 = k as f64;
        let k1 = k0 + 1.0;
        let ratio = (k0 - nu) * (nu + k1) * (z / (k1 * k1));
        term *= ratio;
        sum += term;
        // Polynomial degrees terminate exactly.
        if term.norm() == 0.0 || converged(ratio, term, sum) {
            return Ok(sum);
        }
    }
    Err(KernelError::SeriesNoConvergence(LEGENDRE_MAX_TERMS))
}

/// Logarithmic expansion about `x = -1` with `z = (1 + x) / 2 < 1/4`:
///
/// `P_nu(x) = -sin(nu pi) / pi * sum_n (-nu)_n (nu + 1)_n / (n!)^2
///     [2 psi(n + 1) - psi(n - nu) - psi(n + nu + 1) - ln z] z^n`.
///
/// Undefined for integer degree, where `psi(n - nu)` has poles.
fn series_about_minus_one(x: f64, nu: Complex64) -> Result<Complex64, KernelError> {
    let z = 0.5 * (1.0 + x);
    let ln_z = z.ln();
    let a = -nu;
    let b = nu + 1.0;

    let mut psi_1 = Complex64::new(-EULER_GAMMA, 0.0);
    let mut psi_a = digamma(a);
    let mut psi_b = digamma(b);
    let mut coeff = Complex64::new(1.0, 0.0);
    let mut sum = 2.0 * psi_1 - psi_a - psi_b - ln_z;

    let prefactor = -(nu * PI).sin() / PI;
    for n in 0..LEGENDRE_MAX_TERMS {
        let n0 = n as f64;
        let n1 = n0 + 1.0;
        let ratio = (a + n0) * (b + n0) * (z / (n1 * n1));
        psi_1 += 1.0 / n1;
        psi_a += (a + n0).inv();
        psi_b += (b + n0).inv();
        coeff *= ratio;
        let term = coeff * (2.0 * psi_1 - psi_a - psi_b - ln_z);
        sum += term;
        if converged(ratio, term, sum) {
            return Ok(sum * prefactor);
        }
    }
    Err(KernelError::SeriesNoConvergence(LEGENDRE_MAX_TERMS))
}
