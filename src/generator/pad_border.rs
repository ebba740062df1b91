//! Per-pin pad placement along the package sides.

use crate::config::Config;
use crate::footprint::primitives::{Layer, Pad, PadShape};
use crate::ipc7351::packages::{PadGeometry, PadSet, Point, Size};

/// Layers of a regular SMD pad.
pub const SMD_LAYERS: [Layer; 3] = [Layer::FCu, Layer::FMask, Layer::FPaste];

/// Which package sides carry pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLayout {
    /// Pins on the left and right sides only (SOIC style, `num_pins_x == 0`).
    LeftRight,
    /// Pins on the top and bottom sides only (`num_pins_y == 0`).
    TopBottom,
    /// Pins on all four sides (QFP style).
    Quad,
}

impl PinLayout {
    /// Classifies a device by its pin counts. Every combination maps to
    /// exactly one layout; `num_pins_x == 0` takes precedence.
    #[must_use]
    pub const fn from_counts(num_pins_x: u32, num_pins_y: u32) -> Self {
        if num_pins_x == 0 {
            Self::LeftRight
        } else if num_pins_y == 0 {
            Self::TopBottom
        } else {
            Self::Quad
        }
    }

    /// Whether pins sit on all four sides.
    #[must_use]
    pub const fn is_quad(self) -> bool {
        matches!(self, Self::Quad)
    }
}

/// Corner rounding applied to SMD pads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadStyle {
    /// Corner radius ratio.
    pub radius_ratio: f64,
    /// Corner radius limit in mm.
    pub max_radius: Option<f64>,
}

impl PadStyle {
    /// Pad style from the configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            radius_ratio: config.round_rect_radius_ratio,
            max_radius: config.round_rect_max_radius,
        }
    }

    /// Shape for a pad of the given size.
    #[must_use]
    pub fn shape(&self, size: Size) -> PadShape {
        PadShape::rounded(size, self.radius_ratio, self.max_radius)
    }
}

/// Offsets of `count` pins centred on zero, in placement order.
fn offsets(count: u32, pitch: f64, reversed: bool) -> impl Iterator<Item = f64> {
    let centre = f64::from(count.saturating_sub(1)) / 2.0;
    (0..count).map(move |i| {
        let i = if reversed { count - 1 - i } else { i };
        (f64::from(i) - centre) * pitch
    })
}

/// Pin positions in numbering order.
fn pin_centres(layout: PinLayout, pads: &PadSet, num_pins_x: u32, num_pins_y: u32, pitch: f64) -> Vec<(PadGeometry, Point)> {
    let column = |template: PadGeometry, reversed: bool| {
        offsets(num_pins_y, pitch, reversed)
            .map(move |y| (template, Point::new(template.center.x, y)))
    };
    let row = |template: PadGeometry, reversed: bool| {
        offsets(num_pins_x, pitch, reversed)
            .map(move |x| (template, Point::new(x, template.center.y)))
    };

    match layout {
        PinLayout::LeftRight => column(pads.left, false)
            .chain(column(pads.right, true))
            .collect(),
        PinLayout::TopBottom => row(pads.bottom, false)
            .chain(row(pads.top, true))
            .collect(),
        PinLayout::Quad => column(pads.left, false)
            .chain(row(pads.bottom, false))
            .chain(column(pads.right, true))
            .chain(row(pads.top, true))
            .collect(),
    }
}

/// Places the numbered pads counter-clockwise from pin 1.
///
/// Quad packages start at the top of the left column; pins then run along the
/// bottom row, up the right column and back along the top row.
#[must_use]
pub fn pad_border(
    layout: PinLayout,
    pads: &PadSet,
    num_pins_x: u32,
    num_pins_y: u32,
    pitch: f64,
    style: PadStyle,
) -> Vec<Pad> {
    pin_centres(layout, pads, num_pins_x, num_pins_y, pitch)
        .into_iter()
        .zip(1u32..)
        .map(|((template, at), number)| {
            Pad::smd(
                number.to_string(),
                style.shape(template.size),
                at,
                template.size,
                &SMD_LAYERS,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pads() -> PadSet {
        let horizontal = Size::new(1.5, 0.3);
        let vertical = Size::new(0.3, 1.5);
        PadSet {
            left: PadGeometry::new(Point::new(-4.0, 0.0), horizontal),
            right: PadGeometry::new(Point::new(4.0, 0.0), horizontal),
            top: PadGeometry::new(Point::new(0.0, -5.0), vertical),
            bottom: PadGeometry::new(Point::new(0.0, 5.0), vertical),
        }
    }

    const RECT: PadStyle = PadStyle {
        radius_ratio: 0.0,
        max_radius: None,
    };

    #[test]
    fn layout_selection_is_exclusive() {
        assert_eq!(PinLayout::from_counts(0, 4), PinLayout::LeftRight);
        assert_eq!(PinLayout::from_counts(4, 0), PinLayout::TopBottom);
        assert_eq!(PinLayout::from_counts(4, 4), PinLayout::Quad);
        assert_eq!(PinLayout::from_counts(0, 0), PinLayout::LeftRight);
    }

    #[test]
    fn dual_column_numbering() {
        let placed = pad_border(PinLayout::LeftRight, &pads(), 0, 4, 1.27, RECT);
        assert_eq!(placed.len(), 8);
        assert_eq!(placed[0].number, "1");
        assert!((placed[0].at.y + 1.905).abs() < 1e-9);
        assert!((placed[0].at.x + 4.0).abs() < 1e-9);
        // pin 5 is the bottom of the right column
        assert!((placed[4].at.x - 4.0).abs() < 1e-9);
        assert!((placed[4].at.y - 1.905).abs() < 1e-9);
        assert_eq!(placed[7].number, "8");
        assert!((placed[7].at.y + 1.905).abs() < 1e-9);
    }

    #[test]
    fn quad_numbering_is_counter_clockwise() {
        let placed = pad_border(PinLayout::Quad, &pads(), 3, 2, 0.5, RECT);
        assert_eq!(placed.len(), 10);
        // left column top to bottom
        assert!(placed[0].at.y < placed[1].at.y);
        // bottom row left to right
        assert!((placed[2].at.y - 5.0).abs() < 1e-9);
        assert!((placed[2].at.x + 0.5).abs() < 1e-9);
        assert!(placed[3].at.x > placed[2].at.x);
        // right column bottom to top
        assert!((placed[5].at.x - 4.0).abs() < 1e-9);
        assert!(placed[6].at.y < placed[5].at.y);
        // top row right to left
        assert!((placed[7].at.x - 0.5).abs() < 1e-9);
        assert!((placed[9].at.y + 5.0).abs() < 1e-9);
        assert_eq!(placed[9].size, Size::new(0.3, 1.5));
    }

    #[test]
    fn dual_row_starts_bottom_left() {
        let placed = pad_border(PinLayout::TopBottom, &pads(), 2, 0, 0.65, RECT);
        assert_eq!(placed.len(), 4);
        assert!((placed[0].at.x + 0.325).abs() < 1e-9);
        assert!((placed[0].at.y - 5.0).abs() < 1e-9);
        assert!((placed[2].at.x - 0.325).abs() < 1e-9);
        assert!((placed[2].at.y + 5.0).abs() < 1e-9);
    }

    #[test]
    fn pads_use_configured_rounding() {
        let style = PadStyle {
            radius_ratio: 0.25,
            max_radius: Some(0.25),
        };
        let placed = pad_border(PinLayout::LeftRight, &pads(), 0, 1, 1.27, style);
        assert_eq!(placed[0].shape, PadShape::RoundRect { ratio: 0.25 });
        assert_eq!(placed[0].layers, SMD_LAYERS.to_vec());
    }
}
