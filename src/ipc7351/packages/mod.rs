//! IPC-7351B package geometry.
//!
//! Shared geometry types (points, rectangles, pad rectangles) plus the
//! resolved package dimensions that feed the land pattern calculators.
//! Coordinates follow the KiCad convention: origin at the package centre,
//! X to the right, Y downwards.

pub mod gullwing;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorResult;
use crate::ipc7351::standards::IpcCoefficients;
use crate::ipc7351::tolerance::ToleranceSpec;

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (mm).
    pub x: f64,
    /// Y coordinate (mm).
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirror image about the Y axis (x → -x).
    #[must_use]
    pub fn mirror_x(self) -> Self {
        Self::new(-self.x, self.y)
    }

    /// Mirror image about the X axis (y → -y).
    #[must_use]
    pub fn mirror_y(self) -> Self {
        Self::new(self.x, -self.y)
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Extent along X (mm).
    pub x: f64,
    /// Extent along Y (mm).
    pub y: f64,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle. `min_y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (mm).
    pub min_x: f64,
    /// Top edge (mm).
    pub min_y: f64,
    /// Right edge (mm).
    pub max_x: f64,
    /// Bottom edge (mm).
    pub max_y: f64,
}

impl Rect {
    /// Creates a rectangle centred at origin.
    #[must_use]
    pub fn centred(width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            min_x: -half_w,
            min_y: -half_h,
            max_x: half_w,
            max_y: half_h,
        }
    }

    /// Returns the rectangle width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the rectangle height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// One land: its centre and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadGeometry {
    /// Pad centre (mm).
    pub center: Point,
    /// Pad size (mm).
    pub size: Size,
}

impl PadGeometry {
    /// Creates a pad from centre and size.
    #[must_use]
    pub const fn new(center: Point, size: Size) -> Self {
        Self { center, size }
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.center.x - self.size.x / 2.0
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.center.x + self.size.x / 2.0
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.center.y - self.size.y / 2.0
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.center.y + self.size.y / 2.0
    }
}

/// The template land for each side of a gull-wing package.
///
/// Left/right pads are the first pin of the left/right columns laid out on
/// the X axis; top/bottom pads sit on the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadSet {
    /// Left column land.
    pub left: PadGeometry,
    /// Right column land.
    pub right: PadGeometry,
    /// Top row land.
    pub top: PadGeometry,
    /// Bottom row land.
    pub bottom: PadGeometry,
}

/// Where the heel-to-heel spacing comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeelSpacing {
    /// Datasheet gives the inside lead-to-lead spacing directly.
    Inside(ToleranceSpec),
    /// Datasheet gives the foot length; spacing is derived from the span.
    LeadLength(ToleranceSpec),
}

/// Resolved dimensions of one gull-wing device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDimensions {
    /// Body size along X.
    pub body_size_x: ToleranceSpec,
    /// Body size along Y.
    pub body_size_y: ToleranceSpec,
    /// Lead (foot) width.
    pub lead_width: ToleranceSpec,
    /// Heel spacing source.
    pub heel_spacing: HeelSpacing,
    /// Outside-lead to outside-lead span along X.
    pub overall_size_x: ToleranceSpec,
    /// Outside-lead to outside-lead span along Y.
    pub overall_size_y: ToleranceSpec,
    /// Exposed pad size, if the package has one.
    pub exposed_pad: Option<ExposedPadSize>,
    /// Reduction of the heel fillet goal requested by the manufacturer (mm).
    pub heel_reduction: f64,
}

impl DeviceDimensions {
    /// Whether the package has an exposed pad.
    #[must_use]
    pub const fn has_exposed_pad(&self) -> bool {
        self.exposed_pad.is_some()
    }
}

/// Exposed pad copper size and optional solder mask opening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposedPadSize {
    /// Copper size along X.
    pub size_x: ToleranceSpec,
    /// Copper size along Y.
    pub size_y: ToleranceSpec,
    /// Custom solder mask opening (X, Y).
    pub mask: Option<(ToleranceSpec, ToleranceSpec)>,
}

impl ExposedPadSize {
    /// Nominal copper size.
    #[must_use]
    pub const fn nominal(&self) -> Size {
        Size::new(self.size_x.nominal, self.size_y.nominal)
    }

    /// Nominal mask opening, if customised.
    #[must_use]
    pub fn mask_nominal(&self) -> Option<Size> {
        self.mask.map(|(x, y)| Size::new(x.nominal, y.nominal))
    }
}

/// Trait for package calculators.
pub trait PackageCalculator {
    /// Calculates the template lands for the given dimensions and coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions cannot produce a valid land pattern.
    fn pad_set(&self, dims: &DeviceDimensions, coeffs: &IpcCoefficients) -> GeneratorResult<PadSet>;
}
