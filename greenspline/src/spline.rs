/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds, solves and evaluates Green's function splines from value and slope constraints.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common::{RadiusRange, format_memory},
    config::{NormalizationMode, SolverConfig, SolverMethod, SplineSettings},
    constraints::{GradientConstraints, unit},
    errors::{GreenSplineError, Result},
    linalg::{Real, SolverScalar, Svd, gauss_jordan},
    normalize::NormalizationCoefficients,
    progress::{ProgressMsg, ProgressSink},
    system::{assemble, memory_budget, peak_matrices},
};
use faer::{Mat, MatRef, RowRef};
use greenspline_utils::{GreenKernel, GreensFunction, KernelParams, Metric};
use num_traits::Float;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, warn};

/// Summary of how a spline was solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Smallest and largest separation between any two constraint sites.
    pub radius_range: RadiusRange,

    /// Solver that produced the weights.
    pub method: SolverMethod,

    /// Singular values used, or the system size for Gauss-Jordan.
    pub rank: usize,

    /// Singular value ratios `w[i] / w_max` in descending order, SVD only.
    pub singular_values: Option<Vec<f64>>,

    /// Normalization actually applied to the observations.
    pub normalization_applied: NormalizationMode,

    /// Peak footprint of the solver's square matrices in bytes.
    pub memory_bytes: usize,
}

/// Result of evaluating the spline, or its slope, at one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: f64,

    /// Range of separations between the location and the constraint sites.
    pub radius_range: RadiusRange,
}

/// Results of evaluating many locations, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEvaluation {
    pub values: Vec<f64>,

    /// Combined separation range over every location.
    pub radius_range: RadiusRange,
}

/// Outcome of [`GreenSplineBuilder::build`].
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// The system was solved.
    Solved(GreenSpline),

    /// A negative SVD cutoff asked for the singular value ratios only.
    SpectrumOnly(Vec<f64>),
}

impl SolveOutcome {
    /// Returns the solved spline, or a configuration error for a
    /// spectrum-only solve.
    pub fn into_model(self) -> Result<GreenSpline> {
        match self {
            SolveOutcome::Solved(spline) => Ok(spline),
            SolveOutcome::SpectrumOnly(_) => Err(GreenSplineError::config(
                "a negative SVD cutoff only computes the singular value spectrum",
            )),
        }
    }

    /// Singular value ratios, when the SVD was used.
    pub fn spectrum(&self) -> Option<&[f64]> {
        match self {
            SolveOutcome::Solved(spline) => spline.diagnostics.singular_values.as_deref(),
            SolveOutcome::SpectrumOnly(ratios) => Some(ratios),
        }
    }
}

/// A solved Green's function spline.
///
/// The spline is `s(x) = sum_p alpha_p G(r(x, x_p))` over every constraint
/// site `x_p`, value sites first, followed by restoring the normalization.
/// It is immutable once built and may be evaluated from many threads.
#[derive(Debug, Clone)]
pub struct GreenSpline {
    kernel: GreenKernel,
    params: KernelParams,
    metric: Metric,
    sites: Mat<f64>,
    alpha: Vec<f64>,
    normalization: NormalizationCoefficients,
    diagnostics: SolveDiagnostics,
}

impl GreenSpline {
    /// Returns a builder for a spline through `values` observed at the rows of `points`.
    ///
    /// # Example
    /// ```
    /// use faer::mat;
    /// use greenspline::{DistanceMode, GreenSpline, SplineFamily, SplineSettings};
    ///
    /// let points = mat![[0.0], [1.0], [2.0]];
    /// let settings = SplineSettings::builder(SplineFamily::MinimumCurvature, DistanceMode::Cartesian1D)
    ///     .build()
    ///     .unwrap();
    ///
    /// let spline = GreenSpline::builder(points, vec![0.0, 1.0, 0.0], settings)
    ///     .build()
    ///     .unwrap()
    ///     .into_model()
    ///     .unwrap();
    ///
    /// let mid = spline.evaluate(mat![[1.0]].row(0)).unwrap();
    /// assert!((mid.value - 1.0).abs() < 1e-10);
    /// ```
    pub fn builder(points: Mat<f64>, values: Vec<f64>, settings: SplineSettings) -> GreenSplineBuilder {
        GreenSplineBuilder::new(points, values, settings)
    }

    /// Weights of the Green's functions, one per constraint site.
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Constraint sites, value sites first.
    pub fn sites(&self) -> MatRef<'_, f64> {
        self.sites.as_ref()
    }

    pub fn kernel(&self) -> &GreenKernel {
        &self.kernel
    }

    pub fn kernel_params(&self) -> &KernelParams {
        &self.params
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn normalization(&self) -> &NormalizationCoefficients {
        &self.normalization
    }

    pub fn diagnostics(&self) -> &SolveDiagnostics {
        &self.diagnostics
    }

    /// Evaluates the spline at `x`.
    pub fn evaluate(&self, x: RowRef<f64>) -> Result<Evaluation> {
        self.check_dimension(x.ncols())?;
        let (w, radius_range) = self.sum(x, |r, _| self.kernel.g(r));
        Ok(Evaluation {
            value: self.normalization.denormalize(x, w),
            radius_range,
        })
    }

    /// Evaluates the directional derivative of the spline at `x` along
    /// `direction`, which is normalized first.
    ///
    /// Geographic directions are `(east, north)` components.
    pub fn evaluate_slope(&self, x: RowRef<f64>, direction: &[f64]) -> Result<Evaluation> {
        self.check_dimension(x.ncols())?;
        self.check_dimension(direction.len())?;
        let (dir, _) = unit(direction)?;
        Ok(self.slope_unchecked(x, &dir))
    }

    /// Evaluates the spline at every row of `targets`, in parallel.
    pub fn evaluate_points(&self, targets: &Mat<f64>) -> Result<BatchEvaluation> {
        self.check_dimension(targets.ncols())?;
        let results: Vec<(f64, RadiusRange)> = (0..targets.nrows())
            .into_par_iter()
            .map(|i| {
                let x = targets.row(i);
                let (w, range) = self.sum(x, |r, _| self.kernel.g(r));
                (self.normalization.denormalize(x, w), range)
            })
            .collect();
        Ok(collect_batch(results))
    }

    /// Evaluates the directional derivative along `direction` at every row
    /// of `targets`, in parallel.
    pub fn evaluate_slopes(&self, targets: &Mat<f64>, direction: &[f64]) -> Result<BatchEvaluation> {
        self.check_dimension(targets.ncols())?;
        self.check_dimension(direction.len())?;
        let (dir, _) = unit(direction)?;
        let results: Vec<(f64, RadiusRange)> = (0..targets.nrows())
            .into_par_iter()
            .map(|i| {
                let e = self.slope_unchecked(targets.row(i), &dir);
                (e.value, e.radius_range)
            })
            .collect();
        Ok(collect_batch(results))
    }

    fn slope_unchecked(&self, x: RowRef<f64>, dir: &[f64]) -> Evaluation {
        let (w, radius_range) = self.sum(x, |r, xp| {
            self.kernel.dgdr(r) * self.metric.get_dircosine(dir, x, xp, false)
        });
        Evaluation {
            value: self.normalization.denormalize_slope(self.metric.mode, x, dir, w),
            radius_range,
        }
    }

    #[inline(always)]
    fn sum<F>(&self, x: RowRef<f64>, term: F) -> (f64, RadiusRange)
    where
        F: Fn(f64, RowRef<f64>) -> f64,
    {
        let mut range = RadiusRange::default();
        let mut w = 0.0;
        for (p, &alpha) in self.alpha.iter().enumerate() {
            let xp = self.sites.row(p);
            let r = self.metric.get_radius(x, xp);
            range.include(r);
            w += alpha * term(r, xp);
        }
        (w, range)
    }

    fn check_dimension(&self, got: usize) -> Result<()> {
        let expected = self.metric.dimension();
        match got == expected {
            true => Ok(()),
            false => Err(GreenSplineError::config(format!(
                "expected {}-D input, got {} components",
                expected, got
            ))),
        }
    }
}

fn collect_batch(results: Vec<(f64, RadiusRange)>) -> BatchEvaluation {
    let radius_range = results
        .iter()
        .fold(RadiusRange::default(), |acc, (_, r)| acc.merge(*r));
    BatchEvaluation {
        values: results.into_iter().map(|(v, _)| v).collect(),
        radius_range,
    }
}

/// Builder that validates the constraints and solves for a [`GreenSpline`].
///
/// ### Cost
/// Every value and slope constraint adds a row and a column to a dense
/// system, so memory grows as `n²` and the solve as `n³` in the total
/// constraint count `n`. This is the ceiling on practical problem size; see
/// [`SolverConfig`] for the allocation guard.
#[derive(Debug, Clone)]
pub struct GreenSplineBuilder {
    points: Mat<f64>,
    values: Vec<f64>,
    settings: SplineSettings,
    gradients: Option<GradientConstraints>,
    solver: SolverConfig,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl GreenSplineBuilder {
    fn new(points: Mat<f64>, values: Vec<f64>, settings: SplineSettings) -> Self {
        Self {
            points,
            values,
            settings,
            gradients: None,
            solver: SolverConfig::default(),
            progress_callback: None,
        }
    }

    /// Adds slope constraints.
    pub fn gradients(mut self, gradients: GradientConstraints) -> Self {
        self.gradients = Some(gradients);
        self
    }

    /// Sets the linear solver.
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets a sink for progress messages.
    pub fn progress_callback(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(sink);
        self
    }

    /// Normalizes the data, assembles and solves the system.
    pub fn build(self) -> Result<SolveOutcome> {
        let solve_start = Instant::now();
        self.validate()?;

        let dim = self.settings.dimension();
        let params = self.settings.kernel_params()?;
        let kernel = GreenKernel::new(&params)?;
        let metric = self.settings.metric;

        let n = self.values.len();
        let empty = Mat::<f64>::zeros(0, dim);
        let (grad_points, directions, magnitudes) = match &self.gradients {
            Some(g) => (g.points(), g.directions(), g.magnitudes()),
            None => (empty.as_ref(), empty.as_ref(), &[][..]),
        };
        let m = magnitudes.len();
        let nm = n + m;

        let requested = self.settings.normalization;
        let applied = match m > 0 && requested.bits() > 1 {
            true => {
                let applied = requested.mean_only();
                warn!(
                    "normalization {} downgraded to {} because slope constraints are present",
                    requested, applied
                );
                self.emit(ProgressMsg::NormalizationDowngraded { requested, applied });
                applied
            }
            false => requested,
        };
        let (normalization, normalized) =
            NormalizationCoefficients::fit(self.points.as_ref(), &self.values, applied);

        let method = self.solver.method;
        let memory_bytes =
            memory_budget::<SolverScalar>(nm, peak_matrices(method), self.solver.memory_limit)?;
        let memory = format_memory(memory_bytes);
        info!("solver requires {}", memory);
        debug!(
            "building a {}x{} system with the {} ({} value, {} slope constraints)",
            nm,
            nm,
            kernel.kernel_type().description(),
            n,
            m
        );

        let sites = Mat::from_fn(nm, dim, |i, k| match i < n {
            true => self.points[(i, k)],
            false => grad_points[(i - n, k)],
        });
        let rhs: Vec<f64> = normalized.iter().chain(magnitudes).copied().collect();

        let system = assemble::<SolverScalar>(&kernel, &metric, sites.as_ref(), directions, n, &rhs)?;
        self.emit(ProgressMsg::SystemAssembled { size: nm, memory });
        self.emit(ProgressMsg::RadiusRange {
            min: system.radius_range.min,
            max: system.radius_range.max,
        });

        // A zero right hand side is met exactly by zero weights, even when
        // the system is singular (a single value constraint, or constant data).
        let zero_rhs = system.rhs.iter().all(|&b| b.as_f64() == 0.0);
        let (solution, rank, singular_values) = match method {
            SolverMethod::GaussJordan if zero_rhs => {
                info!("all normalized observations are zero, so are the weights");
                (system.rhs, 0, None)
            }
            SolverMethod::GaussJordan => {
                info!("solving linear equations by Gauss-Jordan elimination");
                let mut a = system.matrix;
                let mut b = system.rhs;
                gauss_jordan(&mut a, &mut b)?;
                (b, nm, None)
            }
            SolverMethod::TruncatedSvd { cutoff } => {
                info!("solving linear equations by SVD");
                let svd = Svd::new(system.matrix)?;
                let ratios = svd.spectrum();
                self.emit(ProgressMsg::SingularValues {
                    ratios: ratios.clone(),
                });
                if cutoff < 0.0 {
                    info!("negative cutoff, returning the singular value spectrum only");
                    return Ok(SolveOutcome::SpectrumOnly(ratios));
                }
                if cutoff < SolverScalar::epsilon().as_f64() {
                    warn!(
                        "SVD cutoff {} is below the solver precision {}",
                        cutoff,
                        SolverScalar::epsilon()
                    );
                }
                let (x, rank) = match zero_rhs {
                    true => {
                        info!("all normalized observations are zero, so are the weights");
                        (system.rhs, 0)
                    }
                    false => svd.solve(&system.rhs, cutoff)?,
                };
                info!("[{} of {} eigen-values used]", rank, nm);
                self.emit(ProgressMsg::RankRetained { used: rank, total: nm });
                (x, rank, Some(ratios))
            }
        };

        let alpha: Vec<f64> = solution.into_iter().map(Real::as_f64).collect();
        let diagnostics = SolveDiagnostics {
            radius_range: system.radius_range,
            method,
            rank,
            singular_values,
            normalization_applied: applied,
            memory_bytes,
        };

        let solve_duration = solve_start.elapsed();
        info!("solved {} constraints in {:?}", nm, solve_duration);
        self.emit(ProgressMsg::Message {
            message: format!(
                "Took {:?} to solve for {} constraints using the following settings:\n\
                 Kernel: {}, Tension: {}, Solver: {:?}, Normalization: {}",
                solve_duration,
                nm,
                kernel.kernel_type().description(),
                self.settings.tension,
                method,
                applied,
            ),
        });

        Ok(SolveOutcome::Solved(GreenSpline {
            kernel,
            params,
            metric,
            sites,
            alpha,
            normalization,
            diagnostics,
        }))
    }

    fn validate(&self) -> Result<()> {
        let dim = self.settings.dimension();
        if self.points.ncols() != dim {
            return Err(GreenSplineError::config(format!(
                "{:?} needs {}-D points, got {} columns",
                self.settings.metric.mode,
                dim,
                self.points.ncols()
            )));
        }
        if self.points.nrows() != self.values.len() {
            return Err(GreenSplineError::config(format!(
                "{} points but {} values",
                self.points.nrows(),
                self.values.len()
            )));
        }
        if let Some(g) = &self.gradients {
            if g.dimension() != dim {
                return Err(GreenSplineError::config(format!(
                    "{}-D slope constraints for {}-D points",
                    g.dimension(),
                    dim
                )));
            }
            if g.magnitudes().iter().any(|v| !v.is_finite()) {
                return Err(GreenSplineError::config("slope magnitudes must be finite"));
            }
        }
        let m = self.gradients.as_ref().map_or(0, |g| g.len());
        if self.values.len() + m == 0 {
            return Err(GreenSplineError::config("at least one constraint is required"));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err(GreenSplineError::config("observed values must be finite"));
        }
        Ok(())
    }

    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = &self.progress_callback {
            sink.emit(msg);
        }
    }
}
