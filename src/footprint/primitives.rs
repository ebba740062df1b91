//! Footprint primitive types.
//!
//! These types represent the geometric elements that make up a KiCad
//! footprint: pads, lines, text and the 3D model reference. Polylines and
//! rectangles are expanded into lines when added.

use serde::{Deserialize, Serialize};

use crate::ipc7351::packages::{Point, Rect, Size};

/// KiCad board layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Front copper.
    #[serde(rename = "F.Cu")]
    FCu,
    /// Back copper.
    #[serde(rename = "B.Cu")]
    BCu,
    /// All copper layers (through-hole pads).
    #[serde(rename = "*.Cu")]
    AllCu,
    /// Front solder mask.
    #[serde(rename = "F.Mask")]
    FMask,
    /// Back solder mask.
    #[serde(rename = "B.Mask")]
    BMask,
    /// Front solder paste.
    #[serde(rename = "F.Paste")]
    FPaste,
    /// Front silkscreen.
    #[serde(rename = "F.SilkS")]
    FSilkS,
    /// Front fabrication layer.
    #[serde(rename = "F.Fab")]
    FFab,
    /// Front courtyard.
    #[serde(rename = "F.CrtYd")]
    FCrtYd,
}

impl Layer {
    /// Returns the KiCad layer name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FCu => "F.Cu",
            Self::BCu => "B.Cu",
            Self::AllCu => "*.Cu",
            Self::FMask => "F.Mask",
            Self::BMask => "B.Mask",
            Self::FPaste => "F.Paste",
            Self::FSilkS => "F.SilkS",
            Self::FFab => "F.Fab",
            Self::FCrtYd => "F.CrtYd",
        }
    }

    /// Parses a layer from its KiCad name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "F.Cu" => Some(Self::FCu),
            "B.Cu" => Some(Self::BCu),
            "*.Cu" => Some(Self::AllCu),
            "F.Mask" => Some(Self::FMask),
            "B.Mask" => Some(Self::BMask),
            "F.Paste" => Some(Self::FPaste),
            "F.SilkS" => Some(Self::FSilkS),
            "F.Fab" => Some(Self::FFab),
            "F.CrtYd" => Some(Self::FCrtYd),
            _ => None,
        }
    }
}

/// A straight graphic line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Line width in mm.
    pub width: f64,
    /// Layer the line is on.
    pub layer: Layer,
}

impl Line {
    /// Creates a new line.
    #[must_use]
    pub const fn new(start: Point, end: Point, width: f64, layer: Layer) -> Self {
        Self {
            start,
            end,
            width,
            layer,
        }
    }
}

/// Which axes a polyline is mirrored about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// As given.
    None,
    /// About the Y axis (x → -x).
    X,
    /// About the X axis (y → -y).
    Y,
    /// About both axes.
    Both,
}

impl Mirror {
    /// All four quadrant images, starting with the original.
    pub const QUADRANTS: [Self; 4] = [Self::None, Self::X, Self::Y, Self::Both];

    /// Applies the mirror to a point.
    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        match self {
            Self::None => p,
            Self::X => p.mirror_x(),
            Self::Y => p.mirror_y(),
            Self::Both => p.mirror_x().mirror_y(),
        }
    }
}

/// Expands a polyline into its segments.
#[must_use]
pub fn polyline(points: &[Point], mirror: Mirror, width: f64, layer: Layer) -> Vec<Line> {
    points
        .windows(2)
        .map(|pair| Line::new(mirror.apply(pair[0]), mirror.apply(pair[1]), width, layer))
        .collect()
}

/// Expands a rectangle into four lines, clockwise from the top-left corner.
#[must_use]
pub fn rectangle(rect: &Rect, width: f64, layer: Layer) -> Vec<Line> {
    let corners = [
        Point::new(rect.min_x, rect.min_y),
        Point::new(rect.max_x, rect.min_y),
        Point::new(rect.max_x, rect.max_y),
        Point::new(rect.min_x, rect.max_y),
        Point::new(rect.min_x, rect.min_y),
    ];
    polyline(&corners, Mirror::None, width, layer)
}

/// Pad mounting type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadKind {
    /// Surface mount.
    Smd,
    /// Plated through hole.
    ThruHole,
}

impl PadKind {
    /// KiCad keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smd => "smd",
            Self::ThruHole => "thru_hole",
        }
    }
}

/// Pad shape types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    /// Rectangular pad.
    Rect,
    /// Rectangle with rounded corners; radius as a fraction of the shorter side.
    RoundRect {
        /// Corner radius ratio.
        ratio: f64,
    },
    /// Circular pad.
    Circle,
}

impl PadShape {
    /// Rounded rectangle for the given pad size.
    ///
    /// The ratio is capped so the corner radius stays within `max_radius`;
    /// a zero ratio gives a plain rectangle.
    #[must_use]
    pub fn rounded(size: Size, ratio: f64, max_radius: Option<f64>) -> Self {
        let shorter = size.x.min(size.y);
        let ratio = match max_radius {
            Some(max) if shorter > 0.0 => ratio.min(max / shorter),
            _ => ratio,
        };
        if ratio > 0.0 {
            Self::RoundRect { ratio }
        } else {
            Self::Rect
        }
    }

    /// KiCad keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::RoundRect { .. } => "roundrect",
            Self::Circle => "circle",
        }
    }
}

/// A footprint pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad number; empty for unnumbered mask or paste apertures.
    pub number: String,
    /// Mounting type.
    pub kind: PadKind,
    /// Pad shape.
    pub shape: PadShape,
    /// Pad centre.
    pub at: Point,
    /// Pad size.
    pub size: Size,
    /// Drill diameter for through-hole pads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drill: Option<f64>,
    /// Layers the pad is on.
    pub layers: Vec<Layer>,
}

impl Pad {
    /// Creates a new SMD pad.
    #[must_use]
    pub fn smd(number: impl Into<String>, shape: PadShape, at: Point, size: Size, layers: &[Layer]) -> Self {
        Self {
            number: number.into(),
            kind: PadKind::Smd,
            shape,
            at,
            size,
            drill: None,
            layers: layers.to_vec(),
        }
    }

    /// Creates a new circular through-hole pad.
    #[must_use]
    pub fn through_hole(number: impl Into<String>, at: Point, diameter: f64, drill: f64) -> Self {
        Self {
            number: number.into(),
            kind: PadKind::ThruHole,
            shape: PadShape::Circle,
            at,
            size: Size::new(diameter, diameter),
            drill: Some(drill),
            layers: vec![Layer::AllCu],
        }
    }
}

/// Text field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// Reference designator.
    Reference,
    /// Value.
    Value,
    /// Free text.
    User,
}

impl TextKind {
    /// KiCad keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Value => "value",
            Self::User => "user",
        }
    }
}

/// A text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Field kind.
    pub kind: TextKind,
    /// Text content.
    pub text: String,
    /// Anchor position.
    pub at: Point,
    /// Layer the text is on.
    pub layer: Layer,
    /// Character size.
    pub size: Size,
    /// Stroke width.
    pub thickness: f64,
}

/// A 3D model reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model3D {
    /// Path to the model file, usually with an environment variable prefix.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_roundtrip() {
        for layer in [Layer::FCu, Layer::AllCu, Layer::FSilkS, Layer::FCrtYd] {
            assert_eq!(Layer::parse(layer.as_str()), Some(layer));
        }
        assert_eq!(Layer::parse("Top Overlay"), None);
    }

    #[test]
    fn polyline_segments() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 2.0)];
        let lines = polyline(&points, Mirror::None, 0.1, Layer::FFab);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].end, Point::new(1.0, 2.0));
    }

    #[test]
    fn polyline_mirrored_both() {
        let points = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let lines = polyline(&points, Mirror::Both, 0.1, Layer::FSilkS);
        assert_eq!(lines[0].start, Point::new(-1.0, -2.0));
        assert_eq!(lines[0].end, Point::new(-3.0, -4.0));
    }

    #[test]
    fn rectangle_is_closed() {
        let lines = rectangle(&Rect::centred(2.0, 1.0), 0.05, Layer::FCrtYd);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].start, lines[3].end);
    }

    #[test]
    fn rounded_shape_respects_max_radius() {
        let shape = PadShape::rounded(Size::new(1.575, 2.0), 0.25, Some(0.25));
        match shape {
            PadShape::RoundRect { ratio } => assert!((ratio - 0.25 / 1.575).abs() < 1e-12),
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(PadShape::rounded(Size::new(0.3, 1.5), 0.25, Some(0.25)), PadShape::RoundRect { ratio: 0.25 });
        assert_eq!(PadShape::rounded(Size::new(0.3, 1.5), 0.0, None), PadShape::Rect);
    }

    #[test]
    fn through_hole_pad() {
        let pad = Pad::through_hole("9", Point::default(), 0.6, 0.3);
        assert_eq!(pad.drill, Some(0.3));
        assert_eq!(pad.layers, vec![Layer::AllCu]);
    }
}
