/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies the kernel registry, the runtime kernel dispatcher and kernel tabulation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{GreensFunction, KernelFromParams, KernelParams, errors::KernelError};
use faer::Mat;
use serde::{Deserialize, Serialize};

// K-free dispatcher generated from the kernel registry below.
// Assumes each kernel type implements `KernelFromParams` and `GreensFunction`.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path, $desc:literal) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum KernelType {
            $(
                #[doc = $desc]
                $V,
            )*
        }

        impl KernelType {
            /// Every registered kernel, in registry order.
            pub const ALL: &'static [KernelType] = &[ $( KernelType::$V, )* ];

            /// Human readable name of the kernel.
            pub fn description(&self) -> &'static str {
                match self {
                    $( KernelType::$V => $desc, )*
                }
            }
        }

        /// Runtime-erased wrapper so callers don't need to be generic over [`KernelType`].
        ///
        /// Derived constants (and the lookup tables) are computed once, here.
        #[derive(Debug, Clone)]
        pub enum GreenKernel {
            $( $V($Kty), )*
        }

        impl GreenKernel {
            /// Constructs the kernel selected by `params.kernel_type`.
            #[inline]
            pub fn new(params: &KernelParams) -> Result<Self, KernelError> {
                match params.kernel_type {
                    $(
                        KernelType::$V => {
                            // Convert uniform params -> concrete kernel type
                            let k = <$Kty as KernelFromParams>::from_params(params)?;
                            Ok(GreenKernel::$V(k))
                        }
                    ),*
                }
            }

            /// Returns the registry tag of the wrapped kernel.
            #[inline]
            pub fn kernel_type(&self) -> KernelType {
                match self {
                    $( Self::$V(_) => KernelType::$V, )*
                }
            }
        }

        impl GreensFunction for GreenKernel {
            #[inline(always)]
            fn g(&self, r: f64) -> f64 {
                match self {
                    $( Self::$V(k) => k.g(r), )*
                }
            }

            #[inline(always)]
            fn dgdr(&self, r: f64) -> f64 {
                match self {
                    $( Self::$V(k) => k.dgdr(r), )*
                }
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (Sandwell1D,         crate::kernels::Sandwell1DKernel,         "minimum curvature Cartesian spline [1-D]"),
        (Sandwell2D,         crate::kernels::Sandwell2DKernel,         "minimum curvature Cartesian spline [2-D]"),
        (Sandwell3D,         crate::kernels::Sandwell3DKernel,         "minimum curvature Cartesian spline [3-D]"),
        (WesselBercovici1D,  crate::kernels::WesselBercovici1DKernel,  "continuous curvature Cartesian spline in tension [1-D]"),
        (WesselBercovici2D,  crate::kernels::WesselBercovici2DKernel,  "continuous curvature Cartesian spline in tension [2-D]"),
        (WesselBercovici3D,  crate::kernels::WesselBercovici3DKernel,  "continuous curvature Cartesian spline in tension [3-D]"),
        (MitasovaMitas2D,    crate::kernels::MitasovaMitas2DKernel,    "regularized Cartesian spline in tension [2-D]"),
        (MitasovaMitas3D,    crate::kernels::MitasovaMitas3DKernel,    "regularized Cartesian spline in tension [3-D]"),
        (Parker,             crate::kernels::ParkerKernel,             "minimum curvature spherical spline"),
        (WesselBecker,       crate::kernels::WesselBeckerKernel,       "continuous curvature spherical spline in tension"),
        (WesselBeckerLookup, crate::kernels::WesselBeckerLookupKernel, "continuous curvature spherical spline in tension [lookup table]"),
    ]
}

impl KernelType {
    /// Returns `true` for kernels whose argument is the cosine of an
    /// angular separation rather than a distance.
    pub fn is_spherical(&self) -> bool {
        matches!(
            self,
            KernelType::Parker | KernelType::WesselBecker | KernelType::WesselBeckerLookup
        )
    }

    /// Returns `true` for kernels that take their constants from the tension.
    pub fn uses_tension(&self) -> bool {
        matches!(
            self,
            KernelType::WesselBercovici1D
                | KernelType::WesselBercovici2D
                | KernelType::WesselBercovici3D
                | KernelType::MitasovaMitas2D
                | KernelType::MitasovaMitas3D
                | KernelType::WesselBecker
                | KernelType::WesselBeckerLookup
        )
    }
}

/// Samples a kernel at `n` equally spaced arguments from `x0` to `x1`
/// inclusive.
///
/// Returns an `n x 3` matrix with columns `(x, G(x), dG/dr(x))`.
///
/// # Examples
///
/// ```
/// use greenspline_utils::{kernels::Sandwell1DKernel, tabulate_kernel};
///
/// let table = tabulate_kernel(&Sandwell1DKernel, 0.0, 2.0, 3);
///
/// assert_eq!(table.nrows(), 3);
/// assert_eq!(table[(2, 0)], 2.0);
/// assert_eq!(table[(2, 1)], 8.0);
/// assert_eq!(table[(2, 2)], 12.0);
/// ```
pub fn tabulate_kernel<K: GreensFunction + ?Sized>(kernel: &K, x0: f64, x1: f64, n: usize) -> Mat<f64> {
    let dx = match n > 1 {
        true => (x1 - x0) / (n - 1) as f64,
        false => 0.0,
    };
    let mut table = Mat::<f64>::zeros(n, 3);
    for i in 0..n {
        let x = match i + 1 == n && n > 1 {
            true => x1,
            false => x0 + i as f64 * dx,
        };
        table[(i, 0)] = x;
        table[(i, 1)] = kernel.g(x);
        table[(i, 2)] = kernel.dgdr(x);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel_helpers::LookupTable;

    fn params(kernel_type: KernelType) -> KernelParams {
        KernelParams::builder(kernel_type)
            .tension(0.25)
            .length_scale(2.0)
            .lookup(LookupTable {
                size: 101,
                range: (-1.0, 1.0),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn every_registered_kernel_builds_and_reports_its_type() {
        for &kt in KernelType::ALL {
            let k = GreenKernel::new(&params(kt)).unwrap();
            assert_eq!(k.kernel_type(), kt);
            assert!(!kt.description().is_empty());
        }
        assert_eq!(KernelType::ALL.len(), 11);
    }

    #[test]
    fn dispatch_matches_concrete_kernel() {
        let p = params(KernelType::WesselBercovici2D);
        let erased = GreenKernel::new(&p).unwrap();
        let concrete = crate::kernels::WesselBercovici2DKernel::from_params(&p).unwrap();
        for r in [0.1, 1.0, 9.0] {
            assert_eq!(erased.g(r), concrete.g(r));
            assert_eq!(erased.dgdr(r), concrete.dgdr(r));
        }
    }

    #[test]
    fn zero_tension_errors_pass_through_the_dispatcher() {
        let p = KernelParams::builder(KernelType::MitasovaMitas3D).build().unwrap();
        assert_eq!(
            GreenKernel::new(&p).err(),
            Some(KernelError::ZeroTension(KernelType::MitasovaMitas3D))
        );
    }

    #[test]
    fn spherical_kernels_are_flagged() {
        let spherical: Vec<_> = KernelType::ALL.iter().filter(|k| k.is_spherical()).collect();
        assert_eq!(
            spherical,
            vec![&KernelType::Parker, &KernelType::WesselBecker, &KernelType::WesselBeckerLookup]
        );
        assert!(!KernelType::Parker.uses_tension());
        assert!(KernelType::WesselBecker.uses_tension());
    }

    #[test]
    fn tabulation_covers_the_closed_interval() {
        let k = GreenKernel::new(&params(KernelType::Parker)).unwrap();
        let table = tabulate_kernel(&k, -1.0, 1.0, 5);
        assert_eq!(table.nrows(), 5);
        assert_eq!(table[(0, 0)], -1.0);
        assert_eq!(table[(4, 0)], 1.0);
        assert_eq!(table[(0, 1)], 0.0);
        assert_eq!(table[(4, 1)], 1.0);
        for i in 1..5 {
            assert!(table[(i, 1)] > table[(i - 1, 1)]);
        }

        let single = tabulate_kernel(&k, 0.5, 1.0, 1);
        assert_eq!(single[(0, 0)], 0.5);
    }
}
