/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the closed-form Green's functions and their radial derivatives.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    GreensFunction, KernelFromParams, KernelParams, KernelType,
    constants::{EULER_GAMMA, INV_SQRT_PI},
    errors::KernelError,
    special::{cot, digamma, dilog, legendre_p, legendre_series_switch},
};
use num_complex::Complex64;
use statrs::function::erf::erf;
use std::f64::consts::{LN_2, PI};

/// `6 / pi^2`, which scales the dilogarithm onto `[0, 1]`.
const PARKER_SCALE: f64 = 6.0 / (PI * PI);

/// Returns the decay constant for a tension kernel, rejecting zero tension.
#[inline]
fn positive_decay(p: &KernelParams, kernel_type: KernelType) -> Result<f64, KernelError> {
    if p.tension == 0.0 {
        return Err(KernelError::ZeroTension(kernel_type));
    }
    Ok(p.decay())
}

/// Minimum curvature spline in 1-D, `G(r) = r^3`.
#[derive(Clone, Debug, Copy)]
pub struct Sandwell1DKernel;

impl GreensFunction for Sandwell1DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        r * r * r
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        3.0 * r * r
    }
}

impl KernelFromParams for Sandwell1DKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Result<Self, KernelError> {
        Ok(Sandwell1DKernel)
    }
}

/// Minimum curvature spline in 2-D, `G(r) = r^2 (ln r - 1)`.
#[derive(Clone, Debug, Copy)]
pub struct Sandwell2DKernel;

impl GreensFunction for Sandwell2DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        match r == 0.0 {
            true => 0.0,
            false => r * r * (r.ln() - 1.0),
        }
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        match r == 0.0 {
            true => 0.0,
            false => r * (2.0 * r.ln() - 1.0),
        }
    }
}

impl KernelFromParams for Sandwell2DKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Result<Self, KernelError> {
        Ok(Sandwell2DKernel)
    }
}

/// Minimum curvature spline in 3-D, `G(r) = r`.
#[derive(Clone, Debug, Copy)]
pub struct Sandwell3DKernel;

impl GreensFunction for Sandwell3DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        r
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        match r == 0.0 {
            true => 0.0,
            false => 1.0,
        }
    }
}

impl KernelFromParams for Sandwell3DKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Result<Self, KernelError> {
        Ok(Sandwell3DKernel)
    }
}

/// Continuous curvature spline in tension in 1-D,
/// `G(r) = exp(-cr) + cr - 1`.
#[derive(Clone, Debug, Copy)]
pub struct WesselBercovici1DKernel {
    c: f64,
}

impl GreensFunction for WesselBercovici1DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let cx = self.c * r;
        (-cx).exp() + cx - 1.0
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        self.c * (1.0 - (-self.c * r).exp())
    }
}

impl KernelFromParams for WesselBercovici1DKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        Ok(WesselBercovici1DKernel {
            c: positive_decay(p, KernelType::WesselBercovici1D)?,
        })
    }
}

/// Continuous curvature spline in tension in 2-D,
/// `G(r) = K0(cr) + ln(cr)`, with `K0` the modified Bessel function of
/// the second kind.
///
/// `K0` and `K1` use the polynomial approximations of Abramowitz & Stegun
/// (9.8.5 to 9.8.8), switching to the asymptotic form beyond `r = 2 / c`.
#[derive(Clone, Debug, Copy)]
pub struct WesselBercovici2DKernel {
    c: f64,
    two_over_c: f64,
}

impl GreensFunction for WesselBercovici2DKernel {
    fn g(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let cx = self.c * r;
        if r <= self.two_over_c {
            let t = cx * cx;
            let y = 0.25 * t;
            let z = t / 14.0625;
            (-(0.5 * cx).ln()
                * (z * (3.5156229
                    + z * (3.0899424
                        + z * (1.2067492 + z * (0.2659732 + z * (0.360768e-1 + z * 0.45813e-2)))))))
                + (y * (0.42278420
                    + y * (0.23069756
                        + y * (0.3488590e-1 + y * (0.262698e-2 + y * (0.10750e-3 + y * 0.74e-5))))))
        } else {
            let y = self.two_over_c / r;
            ((-cx).exp() / cx.sqrt())
                * (1.25331414
                    + y * (-0.7832358e-1
                        + y * (0.2189568e-1
                            + y * (-0.1062446e-1
                                + y * (0.587872e-2 + y * (-0.251540e-2 + y * 0.53208e-3))))))
                + cx.ln()
                - LN_2
                + EULER_GAMMA
        }
    }

    fn dgdr(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let cx = self.c * r;
        let dgdx = if r <= self.two_over_c {
            let t = cx * cx;
            let y = 0.25 * t;
            let z = t / 14.0625;
            -((0.5 * cx).ln()
                * (cx
                    * (0.5
                        + z * (0.87890594
                            + z * (0.51498869
                                + z * (0.15084934
                                    + z * (0.2658733e-1 + z * (0.301532e-2 + z * 0.32411e-3)))))))
                + (1.0 / cx)
                    * (y * (0.15443144
                        + y * (-0.67278579
                            + y * (-0.18156897
                                + y * (-0.1919402e-1 + y * (-0.110404e-2 + y * (-0.4686e-4))))))))
        } else {
            let y = self.two_over_c / r;
            0.5 * y
                - ((-cx).exp() / cx.sqrt())
                    * (1.25331414
                        + y * (0.23498619
                            + y * (-0.3655620e-1
                                + y * (0.1504268e-1
                                    + y * (-0.780353e-2 + y * (0.325614e-2 + y * (-0.68245e-3)))))))
        };
        dgdx * self.c
    }
}

impl KernelFromParams for WesselBercovici2DKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        let c = positive_decay(p, KernelType::WesselBercovici2D)?;
        Ok(WesselBercovici2DKernel {
            c,
            two_over_c: 2.0 / c,
        })
    }
}

/// Continuous curvature spline in tension in 3-D,
/// `G(r) = (exp(-cr) - 1) / cr + 1`.
#[derive(Clone, Debug, Copy)]
pub struct WesselBercovici3DKernel {
    c: f64,
}

impl GreensFunction for WesselBercovici3DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let cx = self.c * r;
        ((-cx).exp() - 1.0) / cx + 1.0
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let cx = self.c * r;
        (1.0 - (-cx).exp() * (cx + 1.0)) / (cx * r)
    }
}

impl KernelFromParams for WesselBercovici3DKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        Ok(WesselBercovici3DKernel {
            c: positive_decay(p, KernelType::WesselBercovici3D)?,
        })
    }
}

/// Regularized spline in tension in 2-D, `G(u) = ln(u) + E1(u) + gamma`
/// with `u = p^2 r^2 / 4`.
///
/// The exponential integral uses Abramowitz & Stegun 5.1.53 for `u <= 1`
/// and the rational form 5.1.56 above.
#[derive(Clone, Debug, Copy)]
pub struct MitasovaMitas2DKernel {
    quarter_p2: f64,
}

impl GreensFunction for MitasovaMitas2DKernel {
    fn g(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let x = self.quarter_p2 * r * r;
        if x <= 1.0 {
            x * (0.99999193 + x * (-0.24991055 + x * (0.05519968 + x * (-0.00976004 + x * 0.00107857))))
        } else {
            let en = (((x + 8.5733287401) * x + 18.0590169730) * x + 8.6347608925) * x + 0.2677737343;
            let ed = (((x + 9.5733223454) * x + 25.6329561486) * x + 21.0996530827) * x + 3.9584869228;
            x.ln() + EULER_GAMMA + (en / ed) / (x * x.exp())
        }
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let u = self.quarter_p2 * r * r;
        -2.0 * (-u).exp_m1() / r
    }
}

impl KernelFromParams for MitasovaMitas2DKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        let phi = positive_decay(p, KernelType::MitasovaMitas2D)?;
        Ok(MitasovaMitas2DKernel {
            quarter_p2: 0.25 * phi * phi,
        })
    }
}

/// Regularized spline in tension in 3-D, `G(u) = erf(u / 2) / u - 1 / sqrt(pi)`
/// with `u = p r`.
///
/// Normalized so that `G` is zero at the origin.
#[derive(Clone, Debug, Copy)]
pub struct MitasovaMitas3DKernel {
    p: f64,
}

impl GreensFunction for MitasovaMitas3DKernel {
    #[inline(always)]
    fn g(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let x = self.p * r;
        erf(0.5 * x) / x - INV_SQRT_PI
    }

    #[inline(always)]
    fn dgdr(&self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let u = self.p * r;
        (u * INV_SQRT_PI * (-0.25 * u * u).exp() - erf(0.5 * u)) / (u * r)
    }
}

impl KernelFromParams for MitasovaMitas3DKernel {
    fn from_params(p: &KernelParams) -> Result<Self, KernelError> {
        Ok(MitasovaMitas3DKernel {
            p: positive_decay(p, KernelType::MitasovaMitas3D)?,
        })
    }
}

/// Minimum curvature spline on the sphere, `G(x) = dilog((1 - x) / 2)`
/// scaled onto `[0, 1]`, with `x` the cosine of the angular separation.
#[derive(Clone, Debug, Copy)]
pub struct ParkerKernel;

impl GreensFunction for ParkerKernel {
    fn g(&self, x: f64) -> f64 {
        if x == 1.0 {
            return 1.0;
        }
        if x == -1.0 {
            return 0.0;
        }
        dilog(0.5 - 0.5 * x) * PARKER_SCALE
    }

    fn dgdr(&self, x: f64) -> f64 {
        if x == 1.0 || x == -1.0 {
            return 0.0;
        }
        PARKER_SCALE * (0.5 - 0.5 * x).ln() * ((1.0 - x) / (1.0 + x)).sqrt()
    }
}

impl KernelFromParams for ParkerKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Result<Self, KernelError> {
        Ok(ParkerKernel)
    }
}

/// Spline in tension on the sphere,
/// `G(x) = pi P_nu(-x) / sin(nu pi) - ln(1 - x)`, scaled onto `[0, 1]`.
///
/// The degree `nu` solves `nu (nu + 1) = -p^2` with `p = sqrt(t / (1 - t))`.
/// It is real for `p <= 1/2` and `-1/2 + i tau` above, in which case
/// `sin(nu pi)` is the real number `-cosh(pi tau)`.
#[derive(Clone, Debug, Copy)]
pub struct WesselBeckerKernel {
    nu: Complex64,
    sin_nu_pi: f64,
    g_at_antipode: f64,
    inv_range: f64,
}

impl WesselBeckerKernel {
    /// Returns the Legendre degree used by the kernel.
    pub fn degree(&self) -> Complex64 {
        self.nu
    }

    /// Series that converged during construction converge everywhere, so
    /// the `NaN` fallback is never reached for a built kernel.
    #[inline(always)]
    fn legendre(&self, x: f64, nu: Complex64) -> Complex64 {
        legendre_p(x, nu).unwrap_or(Complex64::new(f64::NAN, 0.0))
    }

    /// Cosines this close to `+/-1` take the end point values.
    #[inline(always)]
    fn at_end(x: f64, end: f64) -> bool {
        (x - end).abs() <= f64::EPSILON
    }
}

impl GreensFunction for WesselBeckerKernel {
    fn g(&self, x: f64) -> f64 {
        if Self::at_end(x, 1.0) {
            return 1.0;
        }
        if Self::at_end(x, -1.0) {
            return 0.0;
        }
        let pv = self.legendre(-x, self.nu);
        let g = PI * (pv / self.sin_nu_pi).re - (1.0 - x).ln();
        (g - self.g_at_antipode) * self.inv_range
    }

    fn dgdr(&self, x: f64) -> f64 {
        if Self::at_end(x, 1.0) || Self::at_end(x, -1.0) {
            return 0.0;
        }
        let nu1 = self.nu + 1.0;
        let pv = self.legendre(-x, self.nu);
        let pv1 = self.legendre(-x, nu1);
        let z = nu1 * (pv * x + pv1) / self.sin_nu_pi;
        let dg = z.re * PI / (1.0 - x * x).sqrt() + ((1.0 + x) / (1.0 - x)).sqrt();
        -dg * self.inv_range
    }
}

impl KernelFromParams for WesselBeckerKernel {
    fn from_params(params: &KernelParams) -> Result<Self, KernelError> {
        if params.tension == 0.0 {
            return Err(KernelError::ZeroTension(KernelType::WesselBecker));
        }
        let p = (params.tension / (1.0 - params.tension)).sqrt();

        let (nu, sin_nu_pi, g_at_pole) = if p <= 0.5 {
            let nu = -0.5 + (0.25 - p * p).sqrt();
            let psi = digamma(Complex64::new(nu + 1.0, 0.0));
            let g1 = PI / (PI * nu).tan() - LN_2 + 2.0 * (EULER_GAMMA + psi.re);
            (Complex64::new(nu, 0.0), (PI * nu).sin(), g1)
        } else {
            let nu = Complex64::new(-0.5, (p * p - 0.25).sqrt());
            let cot_nu_pi = cot(nu * PI) * PI;
            let psi = (digamma(nu + 1.0) + EULER_GAMMA) * 2.0;
            // The imaginary parts cancel.
            let g1 = (cot_nu_pi + psi).re - LN_2;
            (nu, -(PI * nu.im).cosh(), g1)
        };

        let g_at_antipode = PI / sin_nu_pi - LN_2;

        let kernel = WesselBeckerKernel {
            nu,
            sin_nu_pi,
            g_at_antipode,
            inv_range: 1.0 / (g_at_pole - g_at_antipode),
        };

        // Both series are slowest on either side of their switch point.
        for degree in [nu, nu + 1.0] {
            let switch = legendre_series_switch(degree);
            for x in [switch, switch - 1e-9] {
                legendre_p(x, degree)?;
            }
        }
        let finite = kernel.inv_range.is_finite()
            && [-0.5, 0.0, 0.5, 1.0 - 1e-12]
                .into_iter()
                .all(|x| kernel.g(x).is_finite() && kernel.dgdr(x).is_finite());
        if !finite {
            return Err(KernelError::NonFiniteKernel(params.tension));
        }
        Ok(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn params(kernel_type: KernelType, tension: f64) -> KernelParams {
        KernelParams::builder(kernel_type)
            .tension(tension)
            .build()
            .unwrap()
    }

    fn assert_radial_derivative<K: GreensFunction>(k: &K, r: f64, tol: f64) {
        let h = 1e-4 * r.max(1.0);
        let numeric = (k.g(r + h) - k.g(r - h)) / (2.0 * h);
        let analytic = k.dgdr(r);
        assert!(
            (numeric - analytic).abs() <= tol * (1.0 + analytic.abs()),
            "r = {r}: numeric {numeric}, analytic {analytic}"
        );
    }

    fn assert_angular_derivative<K: GreensFunction>(k: &K, theta: f64, tol: f64) {
        let h = 1e-3;
        let numeric = (k.g((theta + h).cos()) - k.g((theta - h).cos())) / (2.0 * h);
        let analytic = k.dgdr(theta.cos());
        assert!(
            (numeric - analytic).abs() <= tol * (1.0 + analytic.abs()),
            "theta = {theta}: numeric {numeric}, analytic {analytic}"
        );
    }

    #[test]
    fn cartesian_kernels_vanish_at_zero_separation() {
        let wb1 = WesselBercovici1DKernel::from_params(&params(KernelType::WesselBercovici1D, 0.5)).unwrap();
        let wb2 = WesselBercovici2DKernel::from_params(&params(KernelType::WesselBercovici2D, 0.5)).unwrap();
        let wb3 = WesselBercovici3DKernel::from_params(&params(KernelType::WesselBercovici3D, 0.5)).unwrap();
        let mm2 = MitasovaMitas2DKernel::from_params(&params(KernelType::MitasovaMitas2D, 0.5)).unwrap();
        let mm3 = MitasovaMitas3DKernel::from_params(&params(KernelType::MitasovaMitas3D, 0.5)).unwrap();

        let kernels: [&dyn GreensFunction; 8] = [
            &Sandwell1DKernel,
            &Sandwell2DKernel,
            &Sandwell3DKernel,
            &wb1,
            &wb2,
            &wb3,
            &mm2,
            &mm3,
        ];
        for k in kernels {
            assert_eq!(k.g(0.0), 0.0);
            assert_eq!(k.dgdr(0.0), 0.0);
        }
    }

    #[test]
    fn sandwell_closed_forms() {
        assert_eq!(Sandwell1DKernel.g(2.0), 8.0);
        assert_eq!(Sandwell1DKernel.dgdr(2.0), 12.0);
        assert_abs_diff_eq!(Sandwell2DKernel.g(1.0), -1.0);
        assert_abs_diff_eq!(Sandwell2DKernel.dgdr(1.0), -1.0);
        assert_eq!(Sandwell3DKernel.g(3.5), 3.5);
        assert_eq!(Sandwell3DKernel.dgdr(3.5), 1.0);
    }

    #[test]
    fn cartesian_derivatives_match_finite_differences() {
        let wb1 = WesselBercovici1DKernel::from_params(&params(KernelType::WesselBercovici1D, 0.5)).unwrap();
        let wb2 = WesselBercovici2DKernel::from_params(&params(KernelType::WesselBercovici2D, 0.5)).unwrap();
        let wb3 = WesselBercovici3DKernel::from_params(&params(KernelType::WesselBercovici3D, 0.5)).unwrap();
        let mm2 = MitasovaMitas2DKernel::from_params(&params(KernelType::MitasovaMitas2D, 0.5)).unwrap();
        let mm3 = MitasovaMitas3DKernel::from_params(&params(KernelType::MitasovaMitas3D, 0.5)).unwrap();

        for r in [0.3, 1.7, 4.0] {
            assert_radial_derivative(&Sandwell1DKernel, r, 1e-6);
            assert_radial_derivative(&Sandwell2DKernel, r, 1e-6);
            assert_radial_derivative(&Sandwell3DKernel, r, 1e-6);
            assert_radial_derivative(&wb1, r, 1e-6);
            assert_radial_derivative(&wb2, r, 1e-4);
            assert_radial_derivative(&wb3, r, 1e-6);
            assert_radial_derivative(&mm2, r, 1e-4);
            assert_radial_derivative(&mm3, r, 1e-6);
        }
    }

    #[test]
    fn piecewise_approximations_are_continuous() {
        let wb2 = WesselBercovici2DKernel::from_params(&params(KernelType::WesselBercovici2D, 0.5)).unwrap();
        // c = 1 so the switch is at r = 2.
        assert_abs_diff_eq!(wb2.g(2.0 - 1e-9), wb2.g(2.0 + 1e-9), epsilon = 1e-6);
        assert_abs_diff_eq!(wb2.dgdr(2.0 - 1e-9), wb2.dgdr(2.0 + 1e-9), epsilon = 1e-6);

        let mm2 = MitasovaMitas2DKernel::from_params(&params(KernelType::MitasovaMitas2D, 0.5)).unwrap();
        // p^2 / 4 = 1/4 so the switch is at r = 2.
        assert_abs_diff_eq!(mm2.g(2.0 - 1e-9), mm2.g(2.0 + 1e-9), epsilon = 1e-6);
    }

    #[test]
    fn zero_tension_is_rejected_by_tension_kernels() {
        for kt in [
            KernelType::WesselBercovici1D,
            KernelType::WesselBercovici2D,
            KernelType::WesselBercovici3D,
            KernelType::MitasovaMitas2D,
            KernelType::MitasovaMitas3D,
            KernelType::WesselBecker,
        ] {
            let p = params(kt, 0.0);
            let err = match kt {
                KernelType::WesselBercovici1D => WesselBercovici1DKernel::from_params(&p).err(),
                KernelType::WesselBercovici2D => WesselBercovici2DKernel::from_params(&p).err(),
                KernelType::WesselBercovici3D => WesselBercovici3DKernel::from_params(&p).err(),
                KernelType::MitasovaMitas2D => MitasovaMitas2DKernel::from_params(&p).err(),
                KernelType::MitasovaMitas3D => MitasovaMitas3DKernel::from_params(&p).err(),
                _ => WesselBeckerKernel::from_params(&p).err(),
            };
            assert_eq!(err, Some(KernelError::ZeroTension(kt)));
        }
    }

    #[test]
    fn wessel_bercovici_tends_to_minimum_curvature_at_low_tension() {
        let tension: f64 = 1e-6;
        let c = (tension / (1.0 - tension)).sqrt();

        let wb1 = WesselBercovici1DKernel::from_params(&params(KernelType::WesselBercovici1D, tension)).unwrap();
        let wb3 = WesselBercovici3DKernel::from_params(&params(KernelType::WesselBercovici3D, tension)).unwrap();
        for r in [0.5, 1.0, 2.0] {
            let cubic = (c * c * r * r / 2.0 - wb1.g(r)) * 6.0 / (c * c * c);
            assert_relative_eq!(cubic, Sandwell1DKernel.g(r), max_relative = 1e-2);

            let linear = 2.0 * wb3.g(r) / c;
            assert_relative_eq!(linear, Sandwell3DKernel.g(r), max_relative = 1e-2);
        }

        // In 2-D the limit holds up to a multiple of r^2, which the
        // interpolation absorbs.
        let wb2 = WesselBercovici2DKernel::from_params(&params(KernelType::WesselBercovici2D, tension)).unwrap();
        let residual = |r: f64| (-4.0 * wb2.g(r) / (c * c) - Sandwell2DKernel.g(r)) / (r * r);
        let base = residual(1.0);
        for r in [0.5, 2.0] {
            assert_abs_diff_eq!(residual(r), base, epsilon = 1e-3);
        }
    }

    #[test]
    fn mitasova_mitas_tends_to_quadratic_at_low_tension() {
        let tension = 1e-6;
        let mm2 = MitasovaMitas2DKernel::from_params(&params(KernelType::MitasovaMitas2D, tension)).unwrap();
        let mm3 = MitasovaMitas3DKernel::from_params(&params(KernelType::MitasovaMitas3D, tension)).unwrap();
        for r in [0.5, 2.0, 3.0] {
            assert_relative_eq!(mm2.g(r) / mm2.g(1.0), r * r, max_relative = 1e-3);
            assert_relative_eq!(mm3.g(r) / mm3.g(1.0), r * r, max_relative = 1e-3);
        }
    }

    #[test]
    fn parker_end_points_and_shape() {
        assert_eq!(ParkerKernel.g(1.0), 1.0);
        assert_eq!(ParkerKernel.g(-1.0), 0.0);
        assert_eq!(ParkerKernel.dgdr(1.0), 0.0);
        assert_eq!(ParkerKernel.dgdr(-1.0), 0.0);
        assert_abs_diff_eq!(ParkerKernel.g(0.0), dilog(0.5) * PARKER_SCALE, epsilon = 1e-15);

        let mut last = ParkerKernel.g(-0.999);
        for i in 1..20 {
            let x = -0.999 + i as f64 * 0.1;
            let g = ParkerKernel.g(x);
            assert!(g > last);
            last = g;
        }
    }

    #[test]
    fn parker_derivative_is_per_radian() {
        for theta in [0.3, 1.2, 2.5] {
            assert_angular_derivative(&ParkerKernel, theta, 1e-5);
        }
    }

    #[test]
    fn wessel_becker_degree_branches() {
        let real = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, 0.1)).unwrap();
        assert_eq!(real.degree().im, 0.0);
        // p^2 = 1/9 so nu (nu + 1) = -1/9.
        let nu = real.degree().re;
        assert_abs_diff_eq!(nu * (nu + 1.0), -1.0 / 9.0, epsilon = 1e-14);

        let complex = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, 0.5)).unwrap();
        assert_eq!(complex.degree().re, -0.5);
        assert_abs_diff_eq!(complex.degree().im, 0.75f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn wessel_becker_is_normalized() {
        for tension in [0.1, 0.5, 0.9] {
            let k = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, tension)).unwrap();
            assert_eq!(k.g(1.0), 1.0);
            assert_eq!(k.g(-1.0), 0.0);
            assert_eq!(k.dgdr(1.0), 0.0);
            assert_eq!(k.dgdr(-1.0), 0.0);
            let mut last = 0.0;
            for i in 0..20 {
                let x = -0.95 + i as f64 * 0.1;
                let g = k.g(x);
                assert!(g > last && g < 1.0, "tension {tension}, x {x}: {g}");
                last = g;
            }
        }
    }

    #[test]
    fn wessel_becker_derivative_is_per_radian() {
        for tension in [0.1, 0.5] {
            let k = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, tension)).unwrap();
            for theta in [0.5, 1.5, 2.5] {
                assert_angular_derivative(&k, theta, 1e-3);
            }
        }
    }

    #[test]
    fn wessel_becker_resolves_nearly_coincident_sites() {
        // Sites about 1e-3 degrees apart.
        let theta = 1e-3f64.to_radians();
        for tension in [0.1, 0.5, 0.99] {
            let k = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, tension)).unwrap();
            let g = k.g(theta.cos());
            assert!(g < 1.0 && g > 0.9, "tension {tension}: {g}");
            assert!(k.g((2.0 * theta).cos()) < g);
            assert!(k.dgdr(theta.cos()).is_finite());
            assert!(k.dgdr(theta.cos()) < 0.0);
        }
    }

    #[test]
    fn wessel_becker_large_degree_is_normalized() {
        let k = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, 0.999)).unwrap();
        let mut last = 0.0;
        for i in 1..40 {
            let x = -1.0 + i as f64 * 0.05;
            let g = k.g(x);
            assert!(g >= last && g < 1.0, "x {x}: {g}");
            last = g;
        }
        assert_angular_derivative(&k, 0.3, 1e-3);
    }

    #[test]
    fn wessel_becker_rejects_extreme_tension() {
        let k = WesselBeckerKernel::from_params(&params(KernelType::WesselBecker, 1.0 - 1e-9));
        assert!(matches!(
            k,
            Err(KernelError::SeriesNoConvergence(_) | KernelError::NonFiniteKernel(_))
        ));
    }
}
