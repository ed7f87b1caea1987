/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements distances and direction cosines for Cartesian and geographic coordinates.
//
// Created on: 18 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Distance and direction computations shared by the system builder and
//! the evaluator.
//!
//! Geographic points hold longitude in column 0 and latitude in column 1,
//! both in degrees. Flat-earth and arc distances are returned in km.

use crate::constants::{EARTH_RADIUS_KM, GEODESIC_MIN_LATITUDE, WGS84_FLATTENING};
use faer::RowRef;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How coordinates are interpreted when measuring separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceMode {
    /// `|xi - xj|` on a line.
    Cartesian1D,

    /// Euclidean distance in the plane.
    Cartesian2D,

    /// Longitude/latitude scaled onto a local plane, in km.
    FlatEarth,

    /// Great circle arc length, in km.
    Spherical,

    /// Cosine of the great circle separation, as used by the spherical kernels.
    SphericalCosine,

    /// Euclidean distance in space.
    Cartesian3D,
}

impl DistanceMode {
    /// Number of coordinate columns each point must have.
    pub fn dimension(&self) -> usize {
        match self {
            DistanceMode::Cartesian1D => 1,
            DistanceMode::Cartesian3D => 3,
            _ => 2,
        }
    }

    /// Returns `true` for the longitude/latitude modes.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            DistanceMode::FlatEarth | DistanceMode::Spherical | DistanceMode::SphericalCosine
        )
    }
}

/// Shape of the Earth used by [`DistanceMode::Spherical`] and
/// [`DistanceMode::SphericalCosine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EarthModel {
    /// Perfect sphere of radius [`EARTH_RADIUS_KM`].
    #[default]
    Sphere,

    /// WGS-84 ellipsoid, with latitudes reduced to geocentric latitude.
    Wgs84,
}

/// A [`DistanceMode`] paired with the [`EarthModel`] used by its geographic variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metric {
    /// Interpretation of the point coordinates.
    pub mode: DistanceMode,

    /// Earth shape, ignored by the Cartesian and flat-earth modes.
    pub earth: EarthModel,
}

impl Metric {
    pub fn new(mode: DistanceMode) -> Self {
        Metric {
            mode,
            earth: EarthModel::default(),
        }
    }

    /// Sets the earth model.
    pub fn with_earth(mut self, earth: EarthModel) -> Self {
        self.earth = earth;
        self
    }

    #[inline(always)]
    pub fn dimension(&self) -> usize {
        self.mode.dimension()
    }

    /// Returns the separation of `xi` and `xj`.
    ///
    /// This is a distance for every mode except [`DistanceMode::SphericalCosine`],
    /// which returns the cosine of the angular separation, exactly `1` for
    /// identical points.
    pub fn get_radius(&self, xi: RowRef<f64>, xj: RowRef<f64>) -> f64 {
        match self.mode {
            DistanceMode::Cartesian1D => (xi[0] - xj[0]).abs(),
            DistanceMode::Cartesian2D => (xi[0] - xj[0]).hypot(xi[1] - xj[1]),
            DistanceMode::Cartesian3D => (xi[0] - xj[0])
                .hypot(xi[1] - xj[1])
                .hypot(xi[2] - xj[2]),
            DistanceMode::FlatEarth => {
                let (dx, dy) = flat_offsets(xi, xj);
                dx.hypot(dy) * EARTH_RADIUS_KM.to_radians()
            }
            DistanceMode::Spherical => self.arc(xi, xj) * EARTH_RADIUS_KM,
            DistanceMode::SphericalCosine => self.cosine(xi, xj),
        }
    }

    /// Projects the direction `d` onto the unit vector at `xi` that points
    /// away from `xj`, or at `xj` away from `xi` when `reverse` is set.
    ///
    /// This is the rate at which the separation grows when `xi` moves along
    /// `d`. Geographic directions are `(east, north)` components, so an
    /// azimuth `az` has direction `(sin az, cos az)`. Coincident points give 0.
    pub fn get_dircosine(&self, d: &[f64], xi: RowRef<f64>, xj: RowRef<f64>, reverse: bool) -> f64 {
        let (a, b) = match reverse {
            true => (xj, xi),
            false => (xi, xj),
        };
        match self.mode {
            DistanceMode::Cartesian1D => {
                let dx = a[0] - b[0];
                match dx == 0.0 {
                    true => 0.0,
                    false => d[0] * dx.signum(),
                }
            }
            DistanceMode::Cartesian2D => unit_dot(d, &[a[0] - b[0], a[1] - b[1]]),
            DistanceMode::Cartesian3D => unit_dot(d, &[a[0] - b[0], a[1] - b[1], a[2] - b[2]]),
            DistanceMode::FlatEarth => {
                let (dx, dy) = flat_offsets(a, b);
                unit_dot(d, &[dx, dy])
            }
            DistanceMode::Spherical | DistanceMode::SphericalCosine => {
                if a[0] == b[0] && a[1] == b[1] {
                    return 0.0;
                }
                let (s, c) = (self.azimuth_radians(a, b) + PI).sin_cos();
                d[0] * s + d[1] * c
            }
        }
    }

    /// Azimuth in degrees, clockwise from north in `[0, 360)`, of the great
    /// circle leaving `from` towards `to`.
    pub fn azimuth(&self, from: RowRef<f64>, to: RowRef<f64>) -> f64 {
        self.azimuth_radians(from, to).to_degrees().rem_euclid(360.0)
    }

    fn azimuth_radians(&self, from: RowRef<f64>, to: RowRef<f64>) -> f64 {
        let lat1 = self.latitude(from[1]);
        let lat2 = self.latitude(to[1]);
        let dlon = (to[0] - from[0]).to_radians();
        let (slat1, clat1) = lat1.sin_cos();
        let (slat2, clat2) = lat2.sin_cos();
        let (sdlon, cdlon) = dlon.sin_cos();
        (sdlon * clat2).atan2(clat1 * slat2 - slat1 * clat2 * cdlon)
    }

    /// Angular separation in radians, by the haversine formula.
    fn arc(&self, xi: RowRef<f64>, xj: RowRef<f64>) -> f64 {
        let lat1 = self.latitude(xi[1]);
        let lat2 = self.latitude(xj[1]);
        let sdlat = (0.5 * (lat2 - lat1)).sin();
        let sdlon = (0.5 * (xj[0] - xi[0]).to_radians()).sin();
        let h = sdlat * sdlat + lat1.cos() * lat2.cos() * sdlon * sdlon;
        2.0 * h.sqrt().min(1.0).asin()
    }

    fn cosine(&self, xi: RowRef<f64>, xj: RowRef<f64>) -> f64 {
        if xi[0] == xj[0] && xi[1] == xj[1] {
            return 1.0;
        }
        let lat1 = self.latitude(xi[1]);
        let lat2 = self.latitude(xj[1]);
        let dlon = (xj[0] - xi[0]).to_radians();
        let c = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos();
        c.clamp(-1.0, 1.0)
    }

    /// Latitude in radians, reduced to geocentric latitude on the ellipsoid.
    fn latitude(&self, lat_deg: f64) -> f64 {
        match self.earth {
            EarthModel::Sphere => lat_deg.to_radians(),
            EarthModel::Wgs84 => {
                let mut lat = lat_deg.to_radians();
                if lat.abs() < GEODESIC_MIN_LATITUDE {
                    lat = GEODESIC_MIN_LATITUDE.copysign(lat);
                }
                let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
                ((1.0 - e2) * lat.tan()).atan()
            }
        }
    }
}

/// Longitude and latitude offsets of `xi` from `xj` in degrees, with the
/// longitude offset wrapped to `[-180, 180)` and scaled by the cosine of
/// the mean latitude.
#[inline]
fn flat_offsets(xi: RowRef<f64>, xj: RowRef<f64>) -> (f64, f64) {
    let dlon = (xi[0] - xj[0] + 180.0).rem_euclid(360.0) - 180.0;
    let mean_lat = (0.5 * (xi[1] + xj[1])).to_radians();
    (dlon * mean_lat.cos(), xi[1] - xj[1])
}

#[inline]
fn unit_dot(d: &[f64], v: &[f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return 0.0;
    }
    d.iter().zip(v).map(|(a, b)| a * b).sum::<f64>() / norm
}
