/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares spline, normalization and solver settings together with their builders.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares spline, normalization and solver settings together with their builders.
use crate::errors::{GreenSplineError, Result};
use greenspline_utils::{DistanceMode, EarthModel, KernelParams, KernelType, LookupTable, Metric};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

#[doc = include_str!("../docs/spline_family.md")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SplineFamily {
    /// Minimum curvature spline (Sandwell, 1987).
    #[default]
    MinimumCurvature,

    /// Continuous curvature spline in tension (Wessel & Bercovici, 1998).
    ContinuousCurvatureTension,

    /// Regularized spline in tension (Mitasova & Mitas, 1993).
    RegularizedTension,

    /// Minimum curvature spline on the sphere (Parker, 1994).
    SphericalMinimumCurvature,

    /// Continuous curvature spline in tension on the sphere (Wessel & Becker, 2008).
    SphericalTension,
}

impl SplineFamily {
    /// Returns `true` for the families defined on the sphere.
    pub fn is_spherical(&self) -> bool {
        matches!(
            self,
            SplineFamily::SphericalMinimumCurvature | SplineFamily::SphericalTension
        )
    }
}

/// Which parts of the data are removed before solving and restored after
/// evaluation, as a set of bit flags.
///
/// - [`NormalizationMode::MEAN`] (`1`): subtract the mean observation.
/// - [`NormalizationMode::TREND`] (`2`): also subtract a least-squares
///   line, plane or hyperplane through the centroid.
/// - [`NormalizationMode::RANGE`] (`4`): also rescale the residuals to `[0, 1]`.
///
/// ```
/// use greenspline::NormalizationMode;
///
/// let mode = NormalizationMode::MEAN | NormalizationMode::RANGE;
/// assert_eq!(mode.bits(), 5);
/// assert!(mode.contains(NormalizationMode::RANGE));
/// assert!(!mode.contains(NormalizationMode::TREND));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NormalizationMode(u8);

impl NormalizationMode {
    /// Leave the observations untouched.
    pub const NONE: NormalizationMode = NormalizationMode(0);
    pub const MEAN: NormalizationMode = NormalizationMode(1);
    pub const TREND: NormalizationMode = NormalizationMode(2);
    pub const RANGE: NormalizationMode = NormalizationMode(4);

    /// Builds a mode from raw bits, keeping only the three known flags.
    pub fn from_bits(bits: u8) -> Self {
        NormalizationMode(bits & 7)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Returns `true` if every flag in `other` is set.
    pub fn contains(&self, other: NormalizationMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// The mode applied when gradient constraints are present: only the
    /// mean may be removed, because a trend or rescaling would also change
    /// the observed slopes.
    pub fn mean_only(&self) -> NormalizationMode {
        match self.0 == 0 {
            true => NormalizationMode::NONE,
            false => NormalizationMode::MEAN,
        }
    }

    /// Default for a distance mode: mean and trend for the planar modes,
    /// mean only on the sphere and in 3-D.
    pub fn default_for(mode: DistanceMode) -> NormalizationMode {
        match mode {
            DistanceMode::Cartesian1D | DistanceMode::Cartesian2D | DistanceMode::FlatEarth => {
                NormalizationMode::MEAN | NormalizationMode::TREND
            }
            _ => NormalizationMode::MEAN,
        }
    }
}

impl BitOr for NormalizationMode {
    type Output = NormalizationMode;

    fn bitor(self, rhs: NormalizationMode) -> NormalizationMode {
        NormalizationMode(self.0 | rhs.0)
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (NormalizationMode::MEAN, "mean"),
            (NormalizationMode::TREND, "trend"),
            (NormalizationMode::RANGE, "range"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();

        match names.is_empty() {
            true => write!(f, "none"),
            false => write!(f, "{}", names.join("+")),
        }
    }
}

/// Settings that define the spline: its family, how distances are measured,
/// the tension and how the data are normalized.
///
/// Build through [`SplineSettings::builder`], which validates the
/// combination and resolves the concrete [`KernelType`].
///
/// ### Default Values
/// - `earth`: [`EarthModel::Sphere`]
/// - `tension`: `0.0`
/// - `length_scale`: `1.0`
/// - `lookup`: `None`
/// - `normalization`: [`NormalizationMode::default_for`] the distance mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineSettings {
    /// Spline family requested by the caller.
    pub family: SplineFamily,

    /// Distance metric. Spherical families always use the cosine mode.
    pub metric: Metric,

    /// Kernel resolved from the family, dimension and tension.
    pub kernel_type: KernelType,

    /// Tension in `[0, 1)`.
    pub tension: f64,

    /// Length scale that makes the Cartesian tension dimensionless.
    pub length_scale: f64,

    /// Table layout when the spherical tension kernel is tabulated.
    pub lookup: Option<LookupTable>,

    /// Requested normalization. Downgraded to mean removal when gradient
    /// constraints are supplied.
    pub normalization: NormalizationMode,
}

impl SplineSettings {
    /// Returns a new [`SplineSettingsBuilder`] for `family` in the given distance mode.
    pub fn builder(family: SplineFamily, mode: DistanceMode) -> SplineSettingsBuilder {
        SplineSettingsBuilder::new(family, mode)
    }

    /// Number of coordinate columns expected for every point.
    pub fn dimension(&self) -> usize {
        self.metric.dimension()
    }

    /// Kernel parameters for the resolved kernel.
    pub fn kernel_params(&self) -> Result<KernelParams> {
        let mut builder = KernelParams::builder(self.kernel_type)
            .tension(self.tension)
            .length_scale(self.length_scale);
        if let Some(lookup) = self.lookup {
            builder = builder.lookup(lookup);
        }
        Ok(builder.build()?)
    }
}

/// A convenience builder for constructing a [`SplineSettings`] instance.
///
/// The builder should be called via the [`SplineSettings::builder`] method.
#[derive(Debug, Clone, Copy)]
pub struct SplineSettingsBuilder {
    family: SplineFamily,
    mode: DistanceMode,
    earth: EarthModel,
    tension: f64,
    length_scale: f64,
    lookup: Option<LookupTable>,
    normalization: Option<NormalizationMode>,
    detrend: bool,
}

impl SplineSettingsBuilder {
    fn new(family: SplineFamily, mode: DistanceMode) -> Self {
        Self {
            family,
            mode,
            earth: EarthModel::default(),
            tension: 0.0,
            length_scale: 1.0,
            lookup: None,
            normalization: None,
            detrend: true,
        }
    }

    /// Sets the earth model used by the geographic distance modes.
    pub fn earth(mut self, earth: EarthModel) -> Self {
        self.earth = earth;
        self
    }

    /// Sets the tension, which must lie in `[0, 1)`.
    pub fn tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    /// Sets the length scale of the Cartesian tension kernels.
    pub fn length_scale(mut self, length_scale: f64) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Tabulates the spherical tension kernel with the given layout.
    pub fn lookup(mut self, lookup: LookupTable) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Overrides the default normalization for the distance mode.
    pub fn normalization(mut self, normalization: NormalizationMode) -> Self {
        self.normalization = Some(normalization);
        self
    }

    /// With `false`, only the mean is removed from the data.
    pub fn detrend(mut self, detrend: bool) -> Self {
        self.detrend = detrend;
        self
    }

    /// Validates the settings and resolves the kernel.
    pub fn build(self) -> Result<SplineSettings> {
        if !(0.0..1.0).contains(&self.tension) {
            return Err(GreenSplineError::config(format!(
                "tension must lie in [0, 1), got {}",
                self.tension
            )));
        }
        if !(self.length_scale.is_finite() && self.length_scale > 0.0) {
            return Err(GreenSplineError::config(format!(
                "length scale must be positive, got {}",
                self.length_scale
            )));
        }

        let mode = resolve_mode(self.family, self.mode)?;
        let kernel_type = resolve_kernel(self.family, mode, self.tension, self.lookup.is_some())?;
        if kernel_type.uses_tension() && self.tension == 0.0 {
            return Err(GreenSplineError::config(format!(
                "the {} needs a positive tension",
                kernel_type.description()
            )));
        }

        let normalization = match (self.normalization, self.detrend) {
            (Some(n), _) => n,
            (None, true) => NormalizationMode::default_for(mode),
            (None, false) => NormalizationMode::MEAN,
        };
        // Arc distances in km also rule out a plane in longitude and latitude.
        let spherical = kernel_type.is_spherical() || mode == DistanceMode::Spherical;
        if normalization.contains(NormalizationMode::TREND) && spherical {
            return Err(GreenSplineError::config(
                "trend removal is not available for spherical distances",
            ));
        }

        if let Some(lookup) = self.lookup {
            lookup.validate()?;
        }

        Ok(SplineSettings {
            family: self.family,
            metric: Metric::new(mode).with_earth(self.earth),
            kernel_type,
            tension: self.tension,
            length_scale: self.length_scale,
            lookup: self.lookup,
            normalization,
        })
    }
}

/// Spherical families measure separation through the cosine of the angle.
fn resolve_mode(family: SplineFamily, mode: DistanceMode) -> Result<DistanceMode> {
    match (family.is_spherical(), mode) {
        (true, m) if m.is_geographic() => Ok(DistanceMode::SphericalCosine),
        (true, m) => Err(GreenSplineError::config(format!(
            "{:?} needs longitude/latitude input, got {:?}",
            family, m
        ))),
        (false, DistanceMode::SphericalCosine) => Err(GreenSplineError::config(format!(
            "{:?} cannot use the cosine distance mode",
            family
        ))),
        (false, m) => Ok(m),
    }
}

fn resolve_kernel(
    family: SplineFamily,
    mode: DistanceMode,
    tension: f64,
    lookup: bool,
) -> Result<KernelType> {
    let dim = mode.dimension();
    let kernel = match family {
        SplineFamily::MinimumCurvature => by_dimension(
            dim,
            [KernelType::Sandwell1D, KernelType::Sandwell2D, KernelType::Sandwell3D],
        ),
        SplineFamily::ContinuousCurvatureTension if tension == 0.0 => by_dimension(
            dim,
            [KernelType::Sandwell1D, KernelType::Sandwell2D, KernelType::Sandwell3D],
        ),
        SplineFamily::ContinuousCurvatureTension => by_dimension(
            dim,
            [
                KernelType::WesselBercovici1D,
                KernelType::WesselBercovici2D,
                KernelType::WesselBercovici3D,
            ],
        ),
        SplineFamily::RegularizedTension => match dim {
            1 => {
                return Err(GreenSplineError::config(
                    "the regularized spline in tension is not defined in 1-D",
                ));
            }
            2 => KernelType::MitasovaMitas2D,
            _ => KernelType::MitasovaMitas3D,
        },
        SplineFamily::SphericalMinimumCurvature => KernelType::Parker,
        SplineFamily::SphericalTension if tension == 0.0 => KernelType::Parker,
        SplineFamily::SphericalTension if lookup => KernelType::WesselBeckerLookup,
        SplineFamily::SphericalTension => KernelType::WesselBecker,
    };
    Ok(kernel)
}

#[inline]
fn by_dimension(dim: usize, kernels: [KernelType; 3]) -> KernelType {
    kernels[dim.clamp(1, 3) - 1]
}

/// Linear solver used for the dense system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SolverMethod {
    /// Gauss-Jordan elimination with full pivoting.
    #[default]
    GaussJordan,

    /// Truncated singular value decomposition. Singular values with
    /// `w / w_max <= cutoff` are discarded; a negative cutoff only reports
    /// the spectrum.
    TruncatedSvd { cutoff: f64 },
}

#[doc = include_str!("../docs/solver_config.md")]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver to use.
    pub method: SolverMethod,

    /// Upper bound, in bytes, on the peak footprint of the solver's square
    /// matrices: the system alone for Gauss-Jordan, the system and faer's
    /// workspace for the SVD.
    pub memory_limit: Option<usize>,
}

impl SolverConfig {
    /// Returns a new [`SolverConfigBuilder`] with default values.
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfigBuilder {
    method: SolverMethod,
    memory_limit: Option<usize>,
}

impl SolverConfigBuilder {
    /// Sets the solver method.
    pub fn method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    /// Uses a truncated SVD with the given cutoff ratio.
    pub fn svd(self, cutoff: f64) -> Self {
        self.method(SolverMethod::TruncatedSvd { cutoff })
    }

    /// Sets the largest peak footprint, in bytes, of the solver's square matrices.
    pub fn memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Builds and returns a [`SolverConfig`] instance.
    pub fn build(self) -> Result<SolverConfig> {
        if let SolverMethod::TruncatedSvd { cutoff } = self.method {
            if !cutoff.is_finite() {
                return Err(GreenSplineError::config(format!(
                    "SVD cutoff must be finite, got {}",
                    cutoff
                )));
            }
        }
        Ok(SolverConfig {
            method: self.method,
            memory_limit: self.memory_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    fn kernel(family: SplineFamily, mode: DistanceMode, tension: f64) -> Result<KernelType> {
        SplineSettings::builder(family, mode)
            .tension(tension)
            .build()
            .map(|s| s.kernel_type)
    }

    #[test]
    fn families_resolve_by_dimension() {
        use DistanceMode::*;
        use SplineFamily::*;

        assert!(kernel(MinimumCurvature, Cartesian1D, 0.0) == Ok(KernelType::Sandwell1D));
        assert!(kernel(MinimumCurvature, FlatEarth, 0.0) == Ok(KernelType::Sandwell2D));
        assert!(kernel(MinimumCurvature, Cartesian3D, 0.0) == Ok(KernelType::Sandwell3D));
        assert!(
            kernel(ContinuousCurvatureTension, Cartesian2D, 0.3)
                == Ok(KernelType::WesselBercovici2D)
        );
        assert!(kernel(ContinuousCurvatureTension, Cartesian3D, 0.0) == Ok(KernelType::Sandwell3D));
        assert!(kernel(RegularizedTension, Cartesian3D, 0.3) == Ok(KernelType::MitasovaMitas3D));
        assert!(kernel(RegularizedTension, Cartesian1D, 0.3).is_err());
    }

    #[test]
    fn spherical_families_force_the_cosine_mode() {
        let s = SplineSettings::builder(SplineFamily::SphericalTension, DistanceMode::Spherical)
            .tension(0.4)
            .build()
            .unwrap();
        assert!(s.metric.mode == DistanceMode::SphericalCosine);
        assert!(s.kernel_type == KernelType::WesselBecker);
        assert!(s.normalization == NormalizationMode::MEAN);

        let parker = kernel(SplineFamily::SphericalTension, DistanceMode::FlatEarth, 0.0);
        assert!(parker == Ok(KernelType::Parker));

        let tabulated =
            SplineSettings::builder(SplineFamily::SphericalTension, DistanceMode::SphericalCosine)
                .tension(0.4)
                .lookup(LookupTable::default())
                .build()
                .unwrap();
        assert!(tabulated.kernel_type == KernelType::WesselBeckerLookup);
    }

    #[test]
    fn incompatible_modes_are_rejected() {
        assert!(
            kernel(SplineFamily::SphericalMinimumCurvature, DistanceMode::Cartesian2D, 0.0)
                .is_err()
        );
        assert!(kernel(SplineFamily::MinimumCurvature, DistanceMode::SphericalCosine, 0.0).is_err());
    }

    #[test]
    fn tension_and_length_scale_are_validated() {
        assert!(kernel(SplineFamily::ContinuousCurvatureTension, DistanceMode::Cartesian2D, 1.0).is_err());
        assert!(kernel(SplineFamily::ContinuousCurvatureTension, DistanceMode::Cartesian2D, -0.1).is_err());
        let bad_scale =
            SplineSettings::builder(SplineFamily::ContinuousCurvatureTension, DistanceMode::Cartesian2D)
                .length_scale(0.0)
                .build();
        assert!(bad_scale.is_err());
    }

    #[test]
    fn regularized_tension_needs_a_positive_tension() {
        use DistanceMode::*;
        use SplineFamily::*;

        for mode in [Cartesian2D, Cartesian3D] {
            let err = kernel(RegularizedTension, mode, 0.0);
            assert!(matches!(err, Err(GreenSplineError::Configuration(_))));
        }
        assert!(kernel(RegularizedTension, Cartesian2D, 1e-3) == Ok(KernelType::MitasovaMitas2D));
    }

    #[test]
    fn normalization_defaults_follow_the_distance_mode() {
        let planar = SplineSettings::builder(SplineFamily::MinimumCurvature, DistanceMode::Cartesian2D)
            .build()
            .unwrap();
        assert!(planar.normalization.bits() == 3);

        let flat = SplineSettings::builder(SplineFamily::MinimumCurvature, DistanceMode::Cartesian2D)
            .detrend(false)
            .build()
            .unwrap();
        assert!(flat.normalization == NormalizationMode::MEAN);

        let solid = SplineSettings::builder(SplineFamily::MinimumCurvature, DistanceMode::Cartesian3D)
            .build()
            .unwrap();
        assert!(solid.normalization == NormalizationMode::MEAN);

        let spherical_trend =
            SplineSettings::builder(SplineFamily::MinimumCurvature, DistanceMode::Spherical)
                .normalization(NormalizationMode::TREND)
                .build();
        assert!(spherical_trend.is_err());
    }

    #[test]
    fn normalization_flags_combine_and_display() {
        let mode = NormalizationMode::from_bits(0xff);
        assert!(mode.bits() == 7);
        assert!(mode.to_string() == "mean+trend+range");
        assert!(mode.mean_only() == NormalizationMode::MEAN);
        assert!(NormalizationMode::NONE.mean_only() == NormalizationMode::NONE);
        assert!(NormalizationMode::NONE.to_string() == "none");
    }

    #[test]
    fn solver_config_rejects_non_finite_cutoff() {
        assert!(SolverConfig::builder().svd(f64::NAN).build().is_err());
        let cfg = SolverConfig::builder().svd(1e-6).memory_limit(1 << 20).build().unwrap();
        assert!(cfg.method == SolverMethod::TruncatedSvd { cutoff: 1e-6 });
        assert!(cfg.memory_limit == Some(1 << 20));
        assert!(SolverConfig::default().method == SolverMethod::GaussJordan);
    }
}
