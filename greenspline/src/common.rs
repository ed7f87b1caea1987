/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation, radius tracking and memory reporting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same sequence of points will be generated
///     deterministically across runs and platforms (useful for reproducible tests).
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Returns
/// A `Mat<f64>` of shape `(n, d)` where each element lies in `[0.0, 1.0)`.
///
/// # Example
/// ```
/// use greenspline::generate_random_points;
///
/// // Generate 100 reproducible 2D points
/// let pts = generate_random_points(100, 2, Some(42));
/// assert_eq!(pts.ncols(), 2);
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

/// Formats a byte count in kb, Mb or Gb with one decimal place.
///
/// ```
/// use greenspline::format_memory;
///
/// assert_eq!(format_memory(2048), "2.0 kb");
/// assert_eq!(format_memory(3 * 1024 * 1024), "3.0 Mb");
/// ```
pub fn format_memory(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["kb", "Mb", "Gb"];
    let mut mem = bytes as f64 / 1024.0;
    let mut unit = 0;
    while mem > 1024.0 && unit < UNITS.len() - 1 {
        mem /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", mem, UNITS[unit])
}

/// Smallest and largest kernel argument met during a sweep over point pairs.
///
/// For the cosine distance mode these are cosines rather than lengths.
/// An empty range has `min = +inf` and `max = -inf`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl Default for RadiusRange {
    fn default() -> Self {
        RadiusRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RadiusRange {
    #[inline(always)]
    pub(crate) fn include(&mut self, r: f64) {
        self.min = self.min.min(r);
        self.max = self.max.max(r);
    }

    /// Combined range of `self` and `other`.
    pub fn merge(self, other: RadiusRange) -> RadiusRange {
        RadiusRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns `true` if no radius has been recorded.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_points_are_reproducible() {
        let a = generate_random_points(16, 3, Some(7));
        let b = generate_random_points(16, 3, Some(7));
        assert_eq!(a, b);
        assert!(a.col_iter().all(|c| c.iter().all(|&x| (0.0..1.0).contains(&x))));
    }

    #[test]
    fn memory_steps_through_units() {
        assert_eq!(format_memory(512), "0.5 kb");
        assert_eq!(format_memory(1024 * 1024), "1024.0 kb");
        assert_eq!(format_memory(5 * 1024 * 1024 * 1024), "5.0 Gb");
        assert_eq!(format_memory(4096 * 1024 * 1024 * 1024), "4096.0 Gb");
    }

    #[test]
    fn radius_range_tracks_and_merges() {
        let mut a = RadiusRange::default();
        assert!(a.is_empty());
        a.include(2.0);
        a.include(0.5);
        let mut b = RadiusRange::default();
        b.include(3.0);
        let c = a.merge(b);
        assert_eq!((c.min, c.max), (0.5, 3.0));
        assert_eq!(a.merge(RadiusRange::default()), a);
    }
}
