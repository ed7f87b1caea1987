/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles the dense linear system linking Green's function weights to value and slope constraints.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common::RadiusRange,
    config::SolverMethod,
    errors::{GreenSplineError, Result},
    linalg::Real,
};
use faer::{Mat, MatRef};
use greenspline_utils::{GreenKernel, GreensFunction, Metric};
use std::mem::size_of;

/// The square system `A alpha = b`.
///
/// Sites `0..n_values` carry value constraints and the remaining sites carry
/// slope constraints. Column `p` holds the influence of the Green's function
/// centred on site `p`.
#[derive(Debug, Clone)]
pub(crate) struct LinearSystem<T> {
    pub matrix: Mat<T>,
    pub rhs: Vec<T>,
    pub radius_range: RadiusRange,
}

/// Square matrices of the system size alive at the peak of faer's thin SVD:
/// the system, its bidiagonal working copy, the two bidiagonal singular
/// vector blocks and the returned `U` and `V`.
const SVD_PEAK_MATRICES: usize = 6;

/// Number of `n x n` matrices `method` holds at once.
pub(crate) fn peak_matrices(method: SolverMethod) -> usize {
    match method {
        SolverMethod::GaussJordan => 1,
        SolverMethod::TruncatedSvd { .. } => SVD_PEAK_MATRICES,
    }
}

/// Bytes needed by `matrices` square `n x n` matrices of `T`.
///
/// Fails on overflow or when `limit` would be exceeded.
pub(crate) fn memory_budget<T>(n: usize, matrices: usize, limit: Option<usize>) -> Result<usize> {
    let bytes = n
        .checked_mul(n)
        .and_then(|entries| entries.checked_mul(matrices))
        .and_then(|entries| entries.checked_mul(size_of::<T>()))
        .ok_or_else(|| allocation(n, "matrix size overflows the address space".into()))?;

    if let Some(limit) = limit {
        if bytes > limit {
            return Err(allocation(
                n,
                format!("{} bytes exceeds the configured limit of {} bytes", bytes, limit),
            ));
        }
    }
    Ok(bytes)
}

/// Allocates a zeroed `n x n` matrix, failing instead of aborting when the
/// allocator refuses the space.
pub(crate) fn allocate_matrix<T: Real>(n: usize) -> Result<Mat<T>> {
    let mut matrix = Mat::new();
    matrix
        .try_reserve(n, n)
        .map_err(|e| allocation(n, format!("{:?}", e)))?;
    matrix.resize_with(n, n, |_, _| T::zero());
    Ok(matrix)
}

fn allocation(size: usize, reason: String) -> GreenSplineError {
    GreenSplineError::Allocation { size, reason }
}

/// Fills the system for the given sites.
///
/// `directions` has one unit vector per slope constraint, in site order.
/// Value rows are symmetric in their value columns. Slope rows hold
/// `dG/dr` times the rate at which the separation grows along the
/// observed direction. The slope-slope diagonal is zero.
pub(crate) fn assemble<T: Real>(
    kernel: &GreenKernel,
    metric: &Metric,
    sites: MatRef<f64>,
    directions: MatRef<f64>,
    n_values: usize,
    rhs: &[f64],
) -> Result<LinearSystem<T>> {
    let nm = sites.nrows();
    let dim = sites.ncols();
    let mut matrix = allocate_matrix::<T>(nm)?;
    let mut radius_range = RadiusRange::default();

    let dirs: Vec<Vec<f64>> = (0..directions.nrows())
        .map(|k| (0..dim).map(|c| directions[(k, c)]).collect())
        .collect();

    for j in 0..nm {
        for i in j..nm {
            let (xi, xj) = (sites.row(i), sites.row(j));
            let r = metric.get_radius(xi, xj);
            radius_range.include(r);

            if j < n_values {
                // Value constraint at site j.
                matrix[(j, i)] = T::of(kernel.g(r));
                if i == j {
                    continue;
                }
                if i < n_values {
                    matrix[(i, j)] = matrix[(j, i)];
                } else {
                    let c = metric.get_dircosine(&dirs[i - n_values], xi, xj, false);
                    matrix[(i, j)] = T::of(kernel.dgdr(r) * c);
                }
            } else if i > j {
                // Both sites carry slope constraints.
                let grad = kernel.dgdr(r);
                let cj = metric.get_dircosine(&dirs[j - n_values], xi, xj, true);
                matrix[(j, i)] = T::of(grad * cj);
                let ci = metric.get_dircosine(&dirs[i - n_values], xi, xj, false);
                matrix[(i, j)] = T::of(grad * ci);
            }
        }
    }

    Ok(LinearSystem {
        matrix,
        rhs: rhs.iter().map(|&b| T::of(b)).collect(),
        radius_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_random_points;
    use approx::assert_abs_diff_eq;
    use faer::mat;
    use greenspline_utils::{DistanceMode, KernelParams, KernelType};

    fn kernel(kt: KernelType, tension: f64) -> GreenKernel {
        GreenKernel::new(&KernelParams::builder(kt).tension(tension).build().unwrap()).unwrap()
    }

    fn mixed_system() -> (LinearSystem<f64>, GreenKernel, Metric, Mat<f64>, Mat<f64>) {
        let k = kernel(KernelType::WesselBercovici2D, 0.3);
        let metric = Metric::new(DistanceMode::Cartesian2D);
        let sites = generate_random_points(9, 2, Some(3));
        let directions = mat![[1.0, 0.0], [0.0, 1.0], [0.6, -0.8f64]];
        let rhs = vec![0.0; 9];
        let sys = assemble::<f64>(&k, &metric, sites.as_ref(), directions.as_ref(), 6, &rhs).unwrap();
        (sys, k, metric, sites, directions)
    }

    #[test]
    fn value_block_is_symmetric() {
        let (sys, ..) = mixed_system();
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(sys.matrix[(i, j)], sys.matrix[(j, i)]);
            }
            assert_eq!(sys.matrix[(i, i)], 0.0);
        }
    }

    #[test]
    fn slope_diagonal_is_zero() {
        let (sys, ..) = mixed_system();
        for i in 6..9 {
            assert_eq!(sys.matrix[(i, i)], 0.0);
        }
    }

    #[test]
    fn entries_follow_the_model_layout() {
        let (sys, k, metric, sites, directions) = mixed_system();
        // Row j, column p is the contribution of the function centred on
        // site p to constraint j.
        for j in 0..9 {
            for p in 0..9 {
                let r = metric.get_radius(sites.row(j), sites.row(p));
                let expected = match j < 6 {
                    true => k.g(r),
                    false if j == p => 0.0,
                    false => {
                        let d: Vec<f64> = directions.row(j - 6).iter().copied().collect();
                        k.dgdr(r) * metric.get_dircosine(&d, sites.row(j), sites.row(p), false)
                    }
                };
                assert_abs_diff_eq!(sys.matrix[(j, p)], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn cross_blocks_are_not_symmetric() {
        let (sys, ..) = mixed_system();
        let asymmetric = (0..6).any(|i| (6..9).any(|j| sys.matrix[(i, j)] != sys.matrix[(j, i)]));
        assert!(asymmetric);
    }

    #[test]
    fn radius_range_covers_all_pairs() {
        let k = kernel(KernelType::Sandwell1D, 0.0);
        let metric = Metric::new(DistanceMode::Cartesian1D);
        let sites = mat![[0.0], [1.0], [3.5f64]];
        let sys = assemble::<f32>(&k, &metric, sites.as_ref(), Mat::<f64>::zeros(0, 1).as_ref(), 3, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sys.radius_range.min, 0.0);
        assert_eq!(sys.radius_range.max, 3.5);
        assert_eq!(sys.matrix[(0, 2)], 3.5f32.powi(3));
        assert_eq!(sys.rhs, vec![1.0f32, 2.0, 3.0]);
    }

    #[test]
    fn memory_guard() {
        assert_eq!(memory_budget::<f64>(100, 1, None), Ok(80_000));
        assert_eq!(memory_budget::<f32>(100, 1, Some(40_000)), Ok(40_000));
        assert!(matches!(
            memory_budget::<f64>(100, 1, Some(79_999)),
            Err(GreenSplineError::Allocation { size: 100, .. })
        ));
        assert!(matches!(
            memory_budget::<f64>(usize::MAX / 2, 1, None),
            Err(GreenSplineError::Allocation { .. })
        ));
    }

    #[test]
    fn svd_budget_counts_its_workspace() {
        let gj = peak_matrices(SolverMethod::GaussJordan);
        let svd = peak_matrices(SolverMethod::TruncatedSvd { cutoff: 0.0 });
        assert_eq!(gj, 1);
        assert!(svd > 2);
        assert_eq!(memory_budget::<f64>(10, svd, None), Ok(800 * svd));

        // A limit that fits the system alone is too small for the SVD.
        assert!(memory_budget::<f64>(10, gj, Some(800)).is_ok());
        assert!(memory_budget::<f64>(10, svd, Some(800)).is_err());
    }

    #[test]
    fn matrices_are_allocated_zeroed() {
        let m = allocate_matrix::<f32>(4).unwrap();
        assert_eq!((m.nrows(), m.ncols()), (4, 4));
        assert!((0..4).all(|i| (0..4).all(|j| m[(i, j)] == 0.0)));
        assert!(matches!(
            allocate_matrix::<f64>(usize::MAX / 16),
            Err(GreenSplineError::Allocation { .. })
        ));
    }
}
