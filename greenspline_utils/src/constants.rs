/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines numerical constants shared by the Green's function kernels and special functions.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Euler-Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// `1 / sqrt(pi)`.
pub const INV_SQRT_PI: f64 = 0.564_189_583_547_756_3;

/// Default number of nodes in the spherical tension lookup table.
pub const DEFAULT_LOOKUP_SIZE: usize = 100_001;

/// Mean radius of the Earth in km, used to convert arcs into lengths.
pub const EARTH_RADIUS_KM: f64 = 6371.008_771_4;

/// Flattening of the WGS-84 ellipsoid.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Latitudes closer than this to the equator are nudged off it before
/// the geocentric reduction, which is singular there.
pub(crate) const GEODESIC_MIN_LATITUDE: f64 = 1.0e-08;

/// Arguments below `-DILOG_DOMAIN_SLOP` are outside the dilogarithm's domain.
pub(crate) const DILOG_DOMAIN_SLOP: f64 = 1.0e-08;

/// Degree magnitude `|nu + 1/2|` above which the logarithmic Legendre series
/// is confined closer to `x = -1` to bound its cancellation.
pub(crate) const LEGENDRE_LOG_SCALE: f64 = 6.0;

/// Most terms summed by either hypergeometric series of the Legendre function.
pub(crate) const LEGENDRE_MAX_TERMS: usize = 10_000;

/// Shift `g` of the Lanczos approximation used by the complex digamma function.
pub(crate) const LANCZOS_G: f64 = 607.0 / 128.0;

/// Lanczos series coefficients matching [`LANCZOS_G`].
pub(crate) const LANCZOS_COEFFICIENTS: [f64; 15] = [
    0.99999999999999709182,
    57.156235665862923517,
    -59.597960355475491248,
    14.136097974741747174,
    -0.49191381609762019978,
    0.33994649984811888699e-4,
    0.46523628927048575665e-4,
    -0.98374475304879564677e-4,
    0.15808870322491248884e-3,
    -0.21026444172410488319e-3,
    0.21743961811521264320e-3,
    -0.16431810653676389022e-3,
    0.84418223983852743293e-4,
    -0.26190838401581408670e-4,
    0.36899182659531622704e-5,
];
