/////////////////////////////////////////////////////////////////////////////////////////////
//
// Removes the mean, a least-squares trend and the range from observations, and restores them.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::NormalizationMode;
use faer::{Mat, MatRef, RowRef, linalg::solvers::Solve};
use greenspline_utils::{DistanceMode, EARTH_RADIUS_KM};
use serde::{Deserialize, Serialize};

/// Coefficients that map observations to the normalized values the system
/// is solved for, and back.
///
/// A value `w` produced by the spline at `x` is restored as
/// `w * scale + offset + slope . (x - centroid)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationCoefficients {
    /// Flags that were applied.
    pub mode: NormalizationMode,

    /// Mean coordinate of the value constraints. Zero unless a trend was removed.
    pub centroid: [f64; 3],

    /// Mean observation, plus the residual minimum when the range is scaled.
    pub offset: f64,

    /// Least-squares slopes per coordinate, per coordinate unit.
    pub slope: [f64; 3],

    /// Smallest residual after mean and trend removal.
    pub minimum: f64,

    /// Residual range when scaling, otherwise `1`.
    pub scale: f64,
}

impl NormalizationCoefficients {
    /// Coefficients that leave every value unchanged.
    pub fn identity() -> Self {
        NormalizationCoefficients {
            mode: NormalizationMode::NONE,
            centroid: [0.0; 3],
            offset: 0.0,
            slope: [0.0; 3],
            minimum: 0.0,
            scale: 1.0,
        }
    }

    /// Fits the coefficients to `obs` observed at the rows of `points` and
    /// returns them together with the normalized observations.
    ///
    /// The trend uses as many coordinates as `points` has columns (up to
    /// three). A degenerate trend fit, such as collinear points in 2-D,
    /// leaves the slopes at zero.
    pub fn fit(
        points: MatRef<f64>,
        obs: &[f64],
        mode: NormalizationMode,
    ) -> (NormalizationCoefficients, Vec<f64>) {
        let mut coeffs = NormalizationCoefficients::identity();
        coeffs.mode = mode;
        let mut w = obs.to_vec();
        let n = obs.len();
        if n == 0 || mode == NormalizationMode::NONE {
            return (coeffs, w);
        }

        let dim = points.ncols().min(3);
        let detrend = mode.contains(NormalizationMode::TREND);

        coeffs.offset = obs.iter().sum::<f64>() / n as f64;
        if detrend {
            for k in 0..dim {
                coeffs.centroid[k] = points.col(k).iter().sum::<f64>() / n as f64;
            }
            coeffs.slope = least_squares_slope(points, obs, &coeffs, dim);
        }

        for (i, wi) in w.iter_mut().enumerate() {
            *wi -= coeffs.trend(points.row(i));
        }

        if mode.contains(NormalizationMode::RANGE) {
            let (lo, hi) = w
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let range = hi - lo;
            coeffs.minimum = lo;
            coeffs.scale = match range == 0.0 {
                true => 1.0,
                false => range,
            };
            for wi in w.iter_mut() {
                *wi = (*wi - lo) / coeffs.scale;
            }
            coeffs.offset += lo;
        }

        (coeffs, w)
    }

    /// Restores an observation from the normalized value `w` at `x`.
    #[inline]
    pub fn denormalize(&self, x: RowRef<f64>, w: f64) -> f64 {
        w * self.scale + self.trend(x)
    }

    /// Restores a directional derivative along the unit direction `dir` at
    /// `x`, measured in the units of `mode`.
    ///
    /// The constant part of the normalization does not affect slopes. The
    /// trend contributes its own directional derivative, converted from
    /// degrees to km for the flat earth mode.
    pub fn denormalize_slope(&self, mode: DistanceMode, x: RowRef<f64>, dir: &[f64], w: f64) -> f64 {
        let grad = match mode {
            DistanceMode::FlatEarth => {
                let km_per_degree = EARTH_RADIUS_KM.to_radians();
                let cos_lat = x[1].to_radians().cos();
                let east = match cos_lat == 0.0 {
                    true => 0.0,
                    false => self.slope[0] / (km_per_degree * cos_lat),
                };
                [east, self.slope[1] / km_per_degree, 0.0]
            }
            _ => self.slope,
        };
        let trend: f64 = dir.iter().zip(grad).map(|(d, g)| d * g).sum();
        w * self.scale + trend
    }

    #[inline]
    fn trend(&self, x: RowRef<f64>) -> f64 {
        let mut t = self.offset;
        for k in 0..x.ncols().min(3) {
            t += self.slope[k] * (x[k] - self.centroid[k]);
        }
        t
    }
}

/// Smallest LU pivot, relative to the largest, for which the trend
/// covariance counts as full rank.
const TREND_PIVOT_TOLERANCE: f64 = 1e-12;

/// Solves the normal equations for the slopes of a hyperplane through the
/// centroid, by a fully pivoted LU of the `dim x dim` covariance.
fn least_squares_slope(
    points: MatRef<f64>,
    obs: &[f64],
    coeffs: &NormalizationCoefficients,
    dim: usize,
) -> [f64; 3] {
    let mut slope = [0.0; 3];
    let dim = dim.min(3);
    if dim == 0 {
        return slope;
    }

    let mut sxx = Mat::<f64>::zeros(dim, dim);
    let mut sxz = Mat::<f64>::zeros(dim, 1);
    for (i, &z) in obs.iter().enumerate() {
        let dz = z - coeffs.offset;
        let mut d = [0.0f64; 3];
        for k in 0..dim {
            d[k] = points[(i, k)] - coeffs.centroid[k];
        }
        for a in 0..dim {
            sxz[(a, 0)] += d[a] * dz;
            for b in 0..dim {
                sxx[(a, b)] += d[a] * d[b];
            }
        }
    }

    let lu = sxx.full_piv_lu();
    let u = lu.U();
    let largest = (0..dim).fold(0.0f64, |acc, k| acc.max(u[(k, k)].abs()));
    let smallest = (0..dim).fold(f64::INFINITY, |acc, k| acc.min(u[(k, k)].abs()));
    if !(smallest > largest * TREND_PIVOT_TOLERANCE) {
        return slope;
    }

    let x = lu.solve(sxz);
    for k in 0..dim {
        slope[k] = x[(k, 0)];
    }
    slope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_random_points;
    use approx::assert_abs_diff_eq;
    use faer::mat;

    fn all_modes() -> impl Iterator<Item = NormalizationMode> {
        (0..8u8).map(NormalizationMode::from_bits)
    }

    #[test]
    fn round_trip_for_every_mode_and_dimension() {
        for dim in 1..=3 {
            let points = generate_random_points(25, dim, Some(11 + dim as u64));
            let obs: Vec<f64> = (0..25)
                .map(|i| {
                    let p = points.row(i);
                    3.0 + 2.0 * p[0] - (5.0 * p[dim - 1]).sin()
                })
                .collect();

            for mode in all_modes() {
                let (coeffs, w) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);
                for i in 0..25 {
                    let back = coeffs.denormalize(points.row(i), w[i]);
                    assert_abs_diff_eq!(back, obs[i], epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn plane_is_removed_exactly() {
        let points = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.25f64]];
        let obs: Vec<f64> = (0..5)
            .map(|i| 4.0 + 2.0 * points[(i, 0)] - 3.0 * points[(i, 1)])
            .collect();
        let mode = NormalizationMode::MEAN | NormalizationMode::TREND;
        let (coeffs, w) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);

        assert_abs_diff_eq!(coeffs.slope[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(coeffs.slope[1], -3.0, epsilon = 1e-12);
        for wi in w {
            assert_abs_diff_eq!(wi, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn hyperplane_is_removed_in_three_dimensions() {
        let points = generate_random_points(12, 3, Some(5));
        let obs: Vec<f64> = (0..12)
            .map(|i| 1.0 + points[(i, 0)] + 2.0 * points[(i, 1)] - 0.5 * points[(i, 2)])
            .collect();
        let mode = NormalizationMode::MEAN | NormalizationMode::TREND;
        let (coeffs, w) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);

        assert_abs_diff_eq!(coeffs.slope[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(coeffs.slope[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(coeffs.slope[2], -0.5, epsilon = 1e-10);
        assert!(w.iter().all(|wi| wi.abs() < 1e-10));
    }

    #[test]
    fn range_scaling_maps_to_unit_interval() {
        let points = mat![[0.0], [1.0], [2.0], [3.0f64]];
        let obs = [1.0, 5.0, -3.0, 2.0];
        let (coeffs, w) =
            NormalizationCoefficients::fit(points.as_ref(), &obs, NormalizationMode::MEAN | NormalizationMode::RANGE);

        assert_abs_diff_eq!(coeffs.scale, 8.0);
        assert_abs_diff_eq!(w.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_abs_diff_eq!(w.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 1.0);
    }

    #[test]
    fn constant_data_keeps_unit_scale() {
        let points = Mat::from_fn(3, 1, |i, _| i as f64);
        let obs = [2.5; 3];
        let (coeffs, w) = NormalizationCoefficients::fit(points.as_ref(), &obs, NormalizationMode::from_bits(7));
        assert_eq!(coeffs.scale, 1.0);
        assert!(w.iter().all(|&v| v == 0.0));
        assert_abs_diff_eq!(coeffs.denormalize(points.row(1), 0.0), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points_leave_the_plane_flat() {
        let points = mat![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0f64]];
        let obs = [0.0, 1.0, 2.0];
        let mode = NormalizationMode::MEAN | NormalizationMode::TREND;
        let (coeffs, _) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);
        assert_eq!(coeffs.slope, [0.0; 3]);

        // Coplanar points in 3-D.
        let points = generate_random_points(12, 2, Some(8));
        let points = Mat::from_fn(12, 3, |i, k| match k {
            2 => 0.5 * points[(i, 0)] - points[(i, 1)],
            _ => points[(i, k)],
        });
        let obs: Vec<f64> = (0..12).map(|i| points[(i, 0)]).collect();
        let (coeffs, _) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);
        assert_eq!(coeffs.slope, [0.0; 3]);
    }

    #[test]
    fn slope_restoration_adds_the_trend_gradient() {
        let points = mat![[0.0], [1.0], [2.0f64]];
        let obs = [1.0, 3.0, 5.0];
        let mode = NormalizationMode::MEAN | NormalizationMode::TREND;
        let (coeffs, _) = NormalizationCoefficients::fit(points.as_ref(), &obs, mode);
        let slope = coeffs.denormalize_slope(DistanceMode::Cartesian1D, points.row(0), &[1.0], 0.0);
        assert_abs_diff_eq!(slope, 2.0, epsilon = 1e-12);
    }
}
