/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines gradient constraints and converts the common slope encodings into them.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::errors::{GreenSplineError, Result};
use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};

/// A slope observation in one of the encodings callers commonly hold.
///
/// Azimuths and angles are in degrees. In 2-D the direction of an azimuth
/// `az` (clockwise from north, or from `+y`) is `(sin az, cos az)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradientInput {
    /// 1-D slope along `+x`.
    Slope1D(f64),

    /// Azimuth followed by the slope magnitude.
    AzimuthMagnitude { azimuth: f64, magnitude: f64 },

    /// Slope magnitude followed by the azimuth.
    MagnitudeAzimuth { magnitude: f64, azimuth: f64 },

    /// Cartesian direction angle, counter-clockwise from `+x`, and magnitude.
    DirectionAngle { angle: f64, magnitude: f64 },

    /// 2-D gradient vector. The magnitude is its length.
    Components2D { gx: f64, gy: f64 },

    /// 2-D direction, normalized on conversion, and magnitude.
    UnitVector2D { ux: f64, uy: f64, magnitude: f64 },

    /// 3-D gradient vector. The magnitude is its length.
    Components3D { gx: f64, gy: f64, gz: f64 },

    /// 3-D direction, normalized on conversion, and magnitude.
    UnitVector3D { ux: f64, uy: f64, uz: f64, magnitude: f64 },
}

impl GradientInput {
    /// Number of coordinates the encoding applies to.
    pub fn dimension(&self) -> usize {
        match self {
            GradientInput::Slope1D(_) => 1,
            GradientInput::Components3D { .. } | GradientInput::UnitVector3D { .. } => 3,
            _ => 2,
        }
    }

    /// Converts to a unit direction and the slope along it.
    ///
    /// ```
    /// use greenspline::GradientInput;
    ///
    /// let (dir, magnitude) = GradientInput::Components2D { gx: 3.0, gy: 4.0 }.resolve().unwrap();
    /// assert_eq!(dir, vec![0.6, 0.8]);
    /// assert_eq!(magnitude, 5.0);
    /// ```
    pub fn resolve(&self) -> Result<(Vec<f64>, f64)> {
        match *self {
            GradientInput::Slope1D(slope) => Ok((vec![1.0], slope)),
            GradientInput::AzimuthMagnitude { azimuth, magnitude }
            | GradientInput::MagnitudeAzimuth { magnitude, azimuth } => {
                Ok((azimuth_direction(azimuth), magnitude))
            }
            GradientInput::DirectionAngle { angle, magnitude } => {
                Ok((azimuth_direction(90.0 - angle), magnitude))
            }
            GradientInput::Components2D { gx, gy } => unit(&[gx, gy]),
            GradientInput::UnitVector2D { ux, uy, magnitude } => {
                unit(&[ux, uy]).map(|(d, _)| (d, magnitude))
            }
            GradientInput::Components3D { gx, gy, gz } => unit(&[gx, gy, gz]),
            GradientInput::UnitVector3D { ux, uy, uz, magnitude } => {
                unit(&[ux, uy, uz]).map(|(d, _)| (d, magnitude))
            }
        }
    }
}

#[inline]
fn azimuth_direction(azimuth: f64) -> Vec<f64> {
    let (s, c) = azimuth.to_radians().sin_cos();
    vec![s, c]
}

/// Splits `v` into its direction and length.
pub(crate) fn unit(v: &[f64]) -> Result<(Vec<f64>, f64)> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if !(norm > 0.0 && norm.is_finite()) {
        return Err(GreenSplineError::config(format!(
            "gradient direction {:?} has no usable length",
            v
        )));
    }
    Ok((v.iter().map(|x| x / norm).collect(), norm))
}

/// Directional derivative observations.
///
/// Row `k` of `points` observed a slope of `magnitudes[k]` along the unit
/// vector in row `k` of `directions`. In the geographic modes directions are
/// `(east, north)` components and slopes are per km (per radian of arc for
/// the cosine mode).
#[derive(Debug, Clone, PartialEq)]
pub struct GradientConstraints {
    points: Mat<f64>,
    directions: Mat<f64>,
    magnitudes: Vec<f64>,
}

impl GradientConstraints {
    /// Creates constraints from explicit directions, which are normalized.
    pub fn new(points: Mat<f64>, directions: Mat<f64>, magnitudes: Vec<f64>) -> Result<Self> {
        let n = points.nrows();
        if directions.nrows() != n || magnitudes.len() != n {
            return Err(GreenSplineError::config(format!(
                "gradient constraints need one direction and magnitude per point: \
                 {} points, {} directions, {} magnitudes",
                n,
                directions.nrows(),
                magnitudes.len()
            )));
        }
        if directions.ncols() != points.ncols() {
            return Err(GreenSplineError::config(format!(
                "gradient directions have {} components for {}-D points",
                directions.ncols(),
                points.ncols()
            )));
        }

        let mut unit_directions = Mat::<f64>::zeros(n, points.ncols());
        for i in 0..n {
            let row: Vec<f64> = directions.row(i).iter().copied().collect();
            let (d, _) = unit(&row)?;
            for (k, dk) in d.into_iter().enumerate() {
                unit_directions[(i, k)] = dk;
            }
        }

        Ok(GradientConstraints {
            points,
            directions: unit_directions,
            magnitudes,
        })
    }

    /// Creates constraints from slope encodings, one per row of `points`.
    ///
    /// ```
    /// use faer::mat;
    /// use greenspline::{GradientConstraints, GradientInput};
    ///
    /// let points = mat![[0.0, 0.0], [1.0, 1.0]];
    /// let inputs = [
    ///     GradientInput::AzimuthMagnitude { azimuth: 90.0, magnitude: 2.0 },
    ///     GradientInput::Components2D { gx: 0.0, gy: -1.5 },
    /// ];
    /// let gradients = GradientConstraints::from_inputs(points, &inputs).unwrap();
    /// assert_eq!(gradients.len(), 2);
    /// assert_eq!(gradients.magnitudes(), &[2.0, 1.5]);
    /// ```
    pub fn from_inputs(points: Mat<f64>, inputs: &[GradientInput]) -> Result<Self> {
        let dim = points.ncols();
        if inputs.len() != points.nrows() {
            return Err(GreenSplineError::config(format!(
                "{} gradient inputs for {} points",
                inputs.len(),
                points.nrows()
            )));
        }

        let mut directions = Mat::<f64>::zeros(inputs.len(), dim);
        let mut magnitudes = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            if input.dimension() != dim {
                return Err(GreenSplineError::config(format!(
                    "{:?} is a {}-D gradient but the points are {}-D",
                    input,
                    input.dimension(),
                    dim
                )));
            }
            let (d, magnitude) = input.resolve()?;
            for (k, dk) in d.into_iter().enumerate() {
                directions[(i, k)] = dk;
            }
            magnitudes.push(magnitude);
        }

        Ok(GradientConstraints {
            points,
            directions,
            magnitudes,
        })
    }

    /// Number of gradient constraints.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Number of coordinates per point.
    pub fn dimension(&self) -> usize {
        self.points.ncols()
    }

    pub fn points(&self) -> MatRef<'_, f64> {
        self.points.as_ref()
    }

    /// Unit directions, one row per constraint.
    pub fn directions(&self) -> MatRef<'_, f64> {
        self.directions.as_ref()
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use faer::mat;

    #[test]
    fn azimuth_encodings_agree() {
        let a = GradientInput::AzimuthMagnitude {
            azimuth: 30.0,
            magnitude: 2.0,
        }
        .resolve()
        .unwrap();
        let b = GradientInput::MagnitudeAzimuth {
            magnitude: 2.0,
            azimuth: 30.0,
        }
        .resolve()
        .unwrap();
        let c = GradientInput::DirectionAngle {
            angle: 60.0,
            magnitude: 2.0,
        }
        .resolve()
        .unwrap();

        assert_eq!(a, b);
        assert_abs_diff_eq!(a.0[0], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(a.0[1], 0.75f64.sqrt(), epsilon = 1e-15);
        for k in 0..2 {
            assert_abs_diff_eq!(a.0[k], c.0[k], epsilon = 1e-15);
        }
        assert_eq!(c.1, 2.0);
    }

    #[test]
    fn direction_angle_zero_points_east() {
        let (d, _) = GradientInput::DirectionAngle {
            angle: 0.0,
            magnitude: 1.0,
        }
        .resolve()
        .unwrap();
        assert_abs_diff_eq!(d[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(d[1], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn components_give_direction_and_length() {
        let (d, m) = GradientInput::Components3D {
            gx: 2.0,
            gy: -1.0,
            gz: 2.0,
        }
        .resolve()
        .unwrap();
        assert_eq!(m, 3.0);
        assert_abs_diff_eq!(d[0], 2.0 / 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(d[1], -1.0 / 3.0, epsilon = 1e-15);

        let (d, m) = GradientInput::UnitVector2D {
            ux: 0.0,
            uy: 4.0,
            magnitude: -0.5,
        }
        .resolve()
        .unwrap();
        assert_eq!(d, vec![0.0, 1.0]);
        assert_eq!(m, -0.5);
    }

    #[test]
    fn zero_vectors_are_rejected() {
        assert!(GradientInput::Components2D { gx: 0.0, gy: 0.0 }.resolve().is_err());
        assert!(
            GradientInput::UnitVector3D {
                ux: 0.0,
                uy: 0.0,
                uz: 0.0,
                magnitude: 1.0
            }
            .resolve()
            .is_err()
        );
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let points = mat![[0.0, 0.0]];
        assert!(GradientConstraints::from_inputs(points.clone(), &[GradientInput::Slope1D(1.0)]).is_err());
        assert!(GradientConstraints::from_inputs(points.clone(), &[]).is_err());
        assert!(GradientConstraints::new(points.clone(), mat![[1.0]], vec![1.0]).is_err());
        assert!(GradientConstraints::new(points, mat![[1.0, 0.0]], vec![]).is_err());
    }

    #[test]
    fn explicit_directions_are_normalized() {
        let g = GradientConstraints::new(mat![[1.0, 2.0]], mat![[0.0, -2.0]], vec![0.7]).unwrap();
        assert_eq!(g.directions()[(0, 1)], -1.0);
        assert_eq!(g.dimension(), 2);
        assert!(!g.is_empty());
    }
}
