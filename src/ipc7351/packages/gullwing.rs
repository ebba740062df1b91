//! IPC-7351B land pattern calculations for gull-wing lead packages.
//!
//! Gull-wing packages include SOIC, SSOP, TSSOP, MSOP and the QFP family.
//! Each axis is calculated independently from its own overall lead span:
//!
//! - `Zmax = Lmin + 2·Jt + √(CL² + F² + P²)` (toe-to-toe land span)
//! - `Gmin = Smax − 2·Jh − √(CS² + F² + P²)` (heel-to-heel land gap)
//! - `Xmax = Wmin + 2·Js + √(CW² + F² + P²)` (land width)
//!
//! `CL`, `CS` and `CW` are the datasheet tolerance bands of the span, the heel
//! spacing and the lead width; `F` and `P` are the board fabrication and part
//! placement tolerances. When the datasheet only gives the foot length `T`,
//! the heel spacing is derived as `Smin = Lmin − 2·Tmax` with the statistical
//! band `CS = √(CL² + 2·CT²)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeneratorError, GeneratorResult};
use crate::ipc7351::packages::{
    DeviceDimensions, HeelSpacing, PackageCalculator, PadGeometry, PadSet, Point, Size,
};
use crate::ipc7351::standards::IpcCoefficients;
use crate::ipc7351::tolerance::ToleranceSpec;

/// Board fabrication (F) and placement (P) tolerances in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingTolerance {
    /// Fabrication tolerance of the copper land (F).
    pub fabrication: f64,
    /// Placement tolerance of the assembly machine (P).
    pub placement: f64,
}

impl ManufacturingTolerance {
    /// Creates a new tolerance pair.
    #[must_use]
    pub const fn new(fabrication: f64, placement: f64) -> Self {
        Self {
            fabrication,
            placement,
        }
    }
}

impl Default for ManufacturingTolerance {
    fn default() -> Self {
        Self::new(0.1, 0.05)
    }
}

/// Land limits for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GullWingLands {
    /// Minimum heel-to-heel gap between opposite lands.
    pub g_min: f64,
    /// Maximum toe-to-toe span of opposite lands.
    pub z_max: f64,
    /// Maximum land width (across the lead).
    pub x_max: f64,
}

impl GullWingLands {
    /// Land length along the lead direction.
    #[must_use]
    pub fn pad_length(&self) -> f64 {
        (self.z_max - self.g_min) / 2.0
    }

    /// Distance from the package centre to the land centre.
    #[must_use]
    pub fn pad_offset(&self) -> f64 {
        (self.z_max + self.g_min) / 4.0
    }

    /// Rejects lands with no positive area.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::NonPositivePad`] when `Zmax <= Gmin` or the
    /// land width is not positive.
    pub fn validate(self, axis: &'static str) -> GeneratorResult<Self> {
        if self.z_max <= self.g_min || self.x_max <= 0.0 {
            return Err(GeneratorError::NonPositivePad {
                axis,
                z_max: self.z_max,
                g_min: self.g_min,
            });
        }
        Ok(self)
    }
}

/// Rounds `value` to the nearest multiple of `base`, ties to even.
///
/// A non-positive base leaves the value untouched.
#[must_use]
pub fn round_to_base(value: f64, base: f64) -> f64 {
    if base <= 0.0 {
        return value;
    }
    (value / base).round_ties_even() * base
}

/// Root-sum-square of independent tolerances.
fn rss(terms: &[f64]) -> f64 {
    terms.iter().map(|t| t * t).sum::<f64>().sqrt()
}

/// Upper limit and tolerance band of the heel-to-heel spacing.
#[must_use]
pub fn heel_spacing_limits(overall: &ToleranceSpec, heel: &HeelSpacing) -> (f64, f64) {
    match heel {
        HeelSpacing::Inside(spacing) => (spacing.maximum, spacing.tolerance()),
        HeelSpacing::LeadLength(lead_len) => {
            let s_min = 2.0f64.mul_add(-lead_len.maximum, overall.minimum);
            let s_tol = rss(&[
                overall.tolerance(),
                lead_len.tolerance(),
                lead_len.tolerance(),
            ]);
            (s_min + s_tol, s_tol)
        }
    }
}

/// Computes `Gmin`, `Zmax` and `Xmax` for one axis.
///
/// `heel_reduction` is subtracted from the heel fillet goal before the
/// tolerance stack is applied. The result is rounded to the table's
/// granularity but not validated; see [`GullWingLands::validate`].
#[must_use]
pub fn compute_pad_geometry(
    lead_width: &ToleranceSpec,
    overall: &ToleranceSpec,
    heel: &HeelSpacing,
    heel_reduction: f64,
    coeffs: &IpcCoefficients,
    tolerance: ManufacturingTolerance,
) -> GullWingLands {
    let f = tolerance.fabrication;
    let p = tolerance.placement;
    let goals = coeffs.goals;

    let (s_max, s_tol) = heel_spacing_limits(overall, heel);

    let z_max = 2.0f64.mul_add(goals.toe, overall.minimum) + rss(&[overall.tolerance(), f, p]);
    let g_min = 2.0f64.mul_add(-(goals.heel - heel_reduction), s_max) - rss(&[s_tol, f, p]);
    let x_max = 2.0f64.mul_add(goals.side, lead_width.minimum) + rss(&[lead_width.tolerance(), f, p]);

    GullWingLands {
        g_min: round_to_base(g_min, coeffs.round_base.heel),
        z_max: round_to_base(z_max, coeffs.round_base.toe),
        x_max: round_to_base(x_max, coeffs.round_base.side),
    }
}

/// Builds the four template lands from the X and Y axis results.
///
/// Land width always comes from the X axis: the lead width is one physical
/// dimension and is read once.
#[must_use]
pub fn pad_set_from_lands(x: &GullWingLands, y: &GullWingLands) -> PadSet {
    let x_offset = x.pad_offset();
    let y_offset = y.pad_offset();
    let horizontal = Size::new(x.pad_length(), x.x_max);
    let vertical = Size::new(x.x_max, y.pad_length());

    PadSet {
        left: PadGeometry::new(Point::new(-x_offset, 0.0), horizontal),
        right: PadGeometry::new(Point::new(x_offset, 0.0), horizontal),
        top: PadGeometry::new(Point::new(0.0, -y_offset), vertical),
        bottom: PadGeometry::new(Point::new(0.0, y_offset), vertical),
    }
}

/// Calculator for gull-wing packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct GullWingCalculator {
    tolerance: ManufacturingTolerance,
}

impl GullWingCalculator {
    /// Creates a calculator with the given board tolerances.
    #[must_use]
    pub const fn new(tolerance: ManufacturingTolerance) -> Self {
        Self { tolerance }
    }

    /// Calculates and validates the lands of both axes.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::NonPositivePad`] if either axis has no room
    /// for a land.
    pub fn lands(
        &self,
        dims: &DeviceDimensions,
        coeffs: &IpcCoefficients,
    ) -> GeneratorResult<(GullWingLands, GullWingLands)> {
        let axis = |overall: &ToleranceSpec| {
            compute_pad_geometry(
                &dims.lead_width,
                overall,
                &dims.heel_spacing,
                dims.heel_reduction,
                coeffs,
                self.tolerance,
            )
        };

        let x = axis(&dims.overall_size_x).validate("x")?;
        let y = axis(&dims.overall_size_y).validate("y")?;

        debug!(
            g_min_x = x.g_min,
            z_max_x = x.z_max,
            x_max = x.x_max,
            g_min_y = y.g_min,
            z_max_y = y.z_max,
            "Calculated gull-wing lands"
        );

        Ok((x, y))
    }
}

impl PackageCalculator for GullWingCalculator {
    fn pad_set(&self, dims: &DeviceDimensions, coeffs: &IpcCoefficients) -> GeneratorResult<PadSet> {
        let (x, y) = self.lands(dims, coeffs)?;
        Ok(pad_set_from_lands(&x, &y))
    }
}
