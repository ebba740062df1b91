//! Graphic layers around the land pattern: silkscreen, fabrication outline
//! and courtyard.
//!
//! All three are derived from the same [`PackageOutline`]: the template
//! lands, the pin counts, the nominal body and the bounding box of the
//! copper.

use tracing::warn;

use crate::config::Config;
use crate::footprint::primitives::{polyline, rectangle, Layer, Line, Mirror};
use crate::generator::pad_border::PinLayout;
use crate::ipc7351::packages::{PadSet, Point, Rect, Size};

/// Silkscreen side segments shorter than this are not drawn (mm).
pub const SILK_SIDE_MINLEN: f64 = 0.25;

/// Values closer than this to a grid line (in grid units) count as on it.
const GRID_SNAP: f64 = 1e-6;

/// Rounds `value` away from zero onto `grid`.
///
/// Positive values round up and negative values round down, so a rounded
/// courtyard never shrinks.
#[must_use]
pub fn round_outward(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    let scaled = value / grid;
    let nearest = scaled.round();
    let snapped = if (scaled - nearest).abs() < GRID_SNAP {
        nearest
    } else if value >= 0.0 {
        scaled.ceil()
    } else {
        scaled.floor()
    };
    snapped * grid
}

/// Vertical extent of the courtyard, used to place text fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourtyardExtent {
    /// Upper edge (most negative Y).
    pub top: f64,
    /// Lower edge.
    pub bottom: f64,
}

/// Courtyard outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Courtyard {
    /// Outline segments on `F.CrtYd`.
    pub lines: Vec<Line>,
    /// Vertical extent.
    pub extent: CourtyardExtent,
}

/// Everything the outline layers depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOutline {
    /// Template lands.
    pub pads: PadSet,
    /// Populated sides.
    pub layout: PinLayout,
    /// Pins per top and bottom row.
    pub num_pins_x: u32,
    /// Pins per left and right column.
    pub num_pins_y: u32,
    /// Lead pitch.
    pub pitch: f64,
    /// Nominal package body.
    pub body: Rect,
    /// Copper and body extent.
    pub bounding_box: Rect,
    /// Exposed pad copper size.
    pub exposed_pad: Option<Size>,
    /// Geometry notes raised while building the outline.
    pub warnings: Vec<String>,
}

impl PackageOutline {
    /// Builds the outline and its bounding box.
    ///
    /// On a side without pins the bounding box follows the body, or the
    /// exposed pad where that is larger. An exposed pad that reaches past
    /// the lands of a populated side is reported in `warnings` and does not
    /// widen the box.
    #[must_use]
    pub fn new(
        pads: PadSet,
        num_pins_x: u32,
        num_pins_y: u32,
        pitch: f64,
        body: Rect,
        exposed_pad: Option<Size>,
    ) -> Self {
        let layout = PinLayout::from_counts(num_pins_x, num_pins_y);
        let ep = exposed_pad.unwrap_or_default();
        let mut warnings = Vec::new();

        let mut bbox = Rect {
            min_x: pads.left.left(),
            min_y: pads.top.top(),
            max_x: pads.right.right(),
            max_y: pads.bottom.bottom(),
        };

        if num_pins_x == 0 {
            let half = if ep.y > body.height() { ep.y / 2.0 } else { body.max_y };
            bbox.min_y = -half;
            bbox.max_y = half;
        } else if ep.y / 2.0 > bbox.max_y {
            warnings.push(format!(
                "exposed pad ({:.3} mm) extends past the lands along Y",
                ep.y
            ));
        }

        if num_pins_y == 0 {
            let half = if ep.x > body.width() { ep.x / 2.0 } else { body.max_x };
            bbox.min_x = -half;
            bbox.max_x = half;
        } else if ep.x / 2.0 > bbox.max_x {
            warnings.push(format!(
                "exposed pad ({:.3} mm) extends past the lands along X",
                ep.x
            ));
        }

        for message in &warnings {
            warn!("{message}");
        }

        Self {
            pads,
            layout,
            num_pins_x,
            num_pins_y,
            pitch,
            body,
            bounding_box: bbox,
            exposed_pad,
            warnings,
        }
    }

    fn ep(&self) -> Size {
        self.exposed_pad.unwrap_or_default()
    }

    /// Half the distance between the outer pins of a row of `count`.
    fn row_half(&self, count: u32) -> f64 {
        f64::from(count.saturating_sub(1)) * self.pitch / 2.0
    }

    /// Silkscreen outline, or `None` when an exposed pad larger than the
    /// body leaves no room for it.
    #[must_use]
    pub fn silkscreen(&self, config: &Config) -> Option<Vec<Line>> {
        let spo = config.silk_pad_clearance + config.silk_line_width / 2.0;
        let so = config.silk_fab_offset;
        let width = config.silk_line_width;

        let lines = match self.layout {
            PinLayout::LeftRight => self.silk_left_right(spo, so, width)?,
            PinLayout::TopBottom => self.silk_top_bottom(spo, so, width)?,
            PinLayout::Quad => self.silk_quad(spo, so, width),
        };
        Some(lines)
    }

    fn silk_left_right(&self, spo: f64, so: f64, width: f64) -> Option<Vec<Line>> {
        let body = &self.body;
        let ep = self.ep();
        let right = &self.pads.right;
        let sbp = self.row_half(self.num_pins_y) + right.size.y / 2.0 + spo;

        if ep.y > body.height() && ep.y / 2.0 > sbp {
            warn!("EP size larger than body. No silk outline created.");
            return None;
        }

        let sb = (body.max_y + so).max(ep.y / 2.0 + spo);
        let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
            Line::new(Point::new(x1, y1), Point::new(x2, y2), width, Layer::FSilkS)
        };

        let lines = if sbp > sb {
            let sr = (right.left() - spo).min(body.max_x);
            vec![line(0.0, -sb, sr, -sb), line(-sr, sb, sr, sb)]
        } else if sb - sbp < SILK_SIDE_MINLEN {
            vec![
                line(self.bounding_box.min_x, -sb, body.max_x, -sb),
                line(body.min_x, sb, body.max_x, sb),
            ]
        } else {
            let sr = body.max_x + so;
            let poly = [
                Point::new(-sr, sbp),
                Point::new(-sr, sb),
                Point::new(sr, sb),
                Point::new(sr, sbp),
            ];
            let mut lines = vec![line(self.bounding_box.min_x, -sbp, -sr, -sbp)];
            lines.extend(polyline(&poly, Mirror::None, width, Layer::FSilkS));
            lines.extend(polyline(&poly, Mirror::Y, width, Layer::FSilkS));
            lines
        };
        Some(lines)
    }

    fn silk_top_bottom(&self, spo: f64, so: f64, width: f64) -> Option<Vec<Line>> {
        let body = &self.body;
        let ep = self.ep();
        let bottom = &self.pads.bottom;
        let srp = self.row_half(self.num_pins_x) + bottom.size.x / 2.0 + spo;

        if ep.x > body.width() && ep.x / 2.0 > srp {
            warn!("EP size larger than body. No silk outline created.");
            return None;
        }

        let sr = (body.max_x + so).max(ep.x / 2.0 + spo);
        let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
            Line::new(Point::new(x1, y1), Point::new(x2, y2), width, Layer::FSilkS)
        };

        let lines = if srp > sr {
            let sb = (bottom.top() - spo).min(body.max_y);
            vec![line(-sr, 0.0, -sr, sb), line(sr, -sb, sr, sb)]
        } else if sr - srp < SILK_SIDE_MINLEN {
            vec![
                line(-sr, self.bounding_box.min_y, -sr, body.max_y),
                line(sr, body.min_y, sr, body.max_y),
            ]
        } else {
            let sb = body.max_y + so;
            let poly = [
                Point::new(srp, sb),
                Point::new(sr, sb),
                Point::new(sr, -sb),
                Point::new(srp, -sb),
            ];
            let mut lines = vec![line(-srp, -sb, -srp, self.bounding_box.min_y)];
            lines.extend(polyline(&poly, Mirror::None, width, Layer::FSilkS));
            lines.extend(polyline(&poly, Mirror::X, width, Layer::FSilkS));
            lines
        };
        Some(lines)
    }

    fn silk_quad(&self, spo: f64, so: f64, width: f64) -> Vec<Line> {
        let body = &self.body;
        let pw = self.pads.top.size.x;
        let sx1 = -(self.row_half(self.num_pins_x) + pw / 2.0 + spo);
        let sy1 = -(self.row_half(self.num_pins_y) + pw / 2.0 + spo);
        let corner = [
            Point::new(sx1, body.min_y - so),
            Point::new(body.min_x - so, body.min_y - so),
            Point::new(body.min_x - so, sy1),
        ];

        let mut lines: Vec<Line> = Mirror::QUADRANTS
            .iter()
            .flat_map(|&mirror| polyline(&corner, mirror, width, Layer::FSilkS))
            .collect();
        // pin 1 marker
        lines.push(Line::new(
            Point::new(body.min_x - so, sy1),
            Point::new(self.bounding_box.min_x, sy1),
            width,
            Layer::FSilkS,
        ));
        lines
    }

    /// Body outline on `F.Fab` with the pin 1 corner bevelled.
    #[must_use]
    pub fn fabrication(&self, config: &Config) -> Vec<Line> {
        let body = &self.body;
        let bevel = config
            .fab_bevel_size_absolute
            .min(config.fab_bevel_size_relative * body.width().min(body.height()));
        let (l, t, r, b) = (body.min_x, body.min_y, body.max_x, body.max_y);
        let outline = [
            Point::new(l + bevel, t),
            Point::new(r, t),
            Point::new(r, b),
            Point::new(l, b),
            Point::new(l, t + bevel),
            Point::new(l + bevel, t),
        ];
        polyline(&outline, Mirror::None, config.fab_line_width, Layer::FFab)
    }

    /// Courtyard at `offset` around the land pattern, rounded outward onto
    /// the courtyard grid.
    ///
    /// Dual-sided packages get a rectangle; quad packages get a stepped
    /// outline that follows the lands and the body corners.
    #[must_use]
    pub fn courtyard(&self, config: &Config, offset: f64) -> Courtyard {
        let grid = config.courtyard_grid;
        let width = config.courtyard_line_width;
        let r = |v: f64| round_outward(v, grid);
        let bbox = &self.bounding_box;

        if !self.layout.is_quad() {
            let rect = Rect {
                min_x: r(bbox.min_x - offset),
                min_y: r(bbox.min_y - offset),
                max_x: r(bbox.max_x + offset),
                max_y: r(bbox.max_y + offset),
            };
            return Courtyard {
                lines: rectangle(&rect, width, Layer::FCrtYd),
                extent: CourtyardExtent {
                    top: rect.min_y,
                    bottom: rect.max_y,
                },
            };
        }

        let body = &self.body;
        let pw = self.pads.top.size.x;
        let cy1 = r(bbox.min_y - offset);
        let cy2 = r(body.min_y - offset);
        let cy3 = -r(self.row_half(self.num_pins_y) + pw / 2.0 + offset);
        let cx1 = -r(self.row_half(self.num_pins_x) + pw / 2.0 + offset);
        let cx2 = r(body.min_x - offset);
        let cx3 = r(bbox.min_x - offset);

        let quarter = [
            Point::new(0.0, cy1),
            Point::new(cx1, cy1),
            Point::new(cx1, cy2),
            Point::new(cx2, cy2),
            Point::new(cx2, cy3),
            Point::new(cx3, cy3),
            Point::new(cx3, 0.0),
        ];
        let lines = Mirror::QUADRANTS
            .iter()
            .flat_map(|&mirror| polyline(&quarter, mirror, width, Layer::FCrtYd))
            .collect();

        Courtyard {
            lines,
            extent: CourtyardExtent {
                top: cy1,
                bottom: -cy1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc7351::packages::PadGeometry;

    const EPS: f64 = 1e-9;

    fn dual_column_pads(pad_y: f64) -> PadSet {
        let horizontal = Size::new(1.6, pad_y);
        let vertical = Size::new(pad_y, 1.6);
        PadSet {
            left: PadGeometry::new(Point::new(-2.5, 0.0), horizontal),
            right: PadGeometry::new(Point::new(2.5, 0.0), horizontal),
            top: PadGeometry::new(Point::new(0.0, -2.5), vertical),
            bottom: PadGeometry::new(Point::new(0.0, 2.5), vertical),
        }
    }

    fn soic(body_y: f64) -> PackageOutline {
        PackageOutline::new(
            dual_column_pads(0.6),
            0,
            4,
            1.27,
            Rect::centred(3.9, body_y),
            None,
        )
    }

    #[test]
    fn outward_rounding() {
        assert!((round_outward(1.231, 0.01) - 1.24).abs() < EPS);
        assert!((round_outward(-1.231, 0.01) + 1.24).abs() < EPS);
        assert!((round_outward(1.24, 0.01) - 1.24).abs() < EPS);
        assert!((round_outward(-3.3, 0.01) + 3.3).abs() < EPS);
        assert!((round_outward(0.7, 0.0) - 0.7).abs() < EPS);
    }

    #[test]
    fn dual_column_bbox_follows_body() {
        let outline = soic(4.9);
        let bbox = outline.bounding_box;
        assert!((bbox.min_x + 3.3).abs() < EPS);
        assert!((bbox.max_x - 3.3).abs() < EPS);
        assert!((bbox.min_y + 2.45).abs() < EPS);
        assert!((bbox.max_y - 2.45).abs() < EPS);
        assert!(outline.warnings.is_empty());
    }

    #[test]
    fn silk_short_side_regime() {
        // sbp = 2.465, sb = 2.56: the remaining side is too short to draw
        let lines = soic(4.9).silkscreen(&Config::default()).unwrap();
        assert_eq!(lines.len(), 2);
        assert!((lines[0].start.x + 3.3).abs() < EPS);
        assert!((lines[0].start.y + 2.56).abs() < EPS);
        assert!((lines[1].start.x + 1.95).abs() < EPS);
        assert!(lines.iter().all(|l| l.layer == Layer::FSilkS));
    }

    #[test]
    fn silk_inside_pads_regime() {
        // sb = 2.11 lies inside the pin rows
        let lines = soic(4.0).silkscreen(&Config::default()).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].start.x.abs() < EPS);
        assert!((lines[0].start.y + 2.11).abs() < EPS);
        assert!((lines[1].end.x - 1.44).abs() < EPS);
    }

    #[test]
    fn silk_corner_regime() {
        let lines = soic(5.4).silkscreen(&Config::default()).unwrap();
        assert_eq!(lines.len(), 7);
        // pin 1 marker first, then the bottom polyline and its mirror image
        assert!((lines[0].start.x + 3.3).abs() < EPS);
        assert!((lines[0].start.y + 2.465).abs() < EPS);
        assert!((lines[1].start.y - 2.465).abs() < EPS);
        assert!((lines[4].start.y + 2.465).abs() < EPS);
    }

    #[test]
    fn oversized_exposed_pad_suppresses_silk() {
        let pads = dual_column_pads(0.4);
        let outline = PackageOutline::new(
            pads,
            2,
            0,
            0.65,
            Rect::centred(1.0, 3.0),
            Some(Size::new(2.0, 1.0)),
        );
        assert_eq!(outline.layout, PinLayout::TopBottom);
        assert!(outline.silkscreen(&Config::default()).is_none());
        // the pad-free axis grows to the exposed pad
        assert!((outline.bounding_box.max_x - 1.0).abs() < EPS);
    }

    #[test]
    fn exposed_pad_past_lands_is_reported() {
        let outline = PackageOutline::new(
            dual_column_pads(0.6),
            0,
            4,
            1.27,
            Rect::centred(3.9, 4.9),
            Some(Size::new(7.0, 2.0)),
        );
        assert_eq!(outline.warnings.len(), 1);
        assert!((outline.bounding_box.max_x - 3.3).abs() < EPS);
    }

    #[test]
    fn fab_outline_bevel() {
        let lines = soic(4.9).fabrication(&Config::default());
        assert_eq!(lines.len(), 5);
        // bevel = min(1.0, 0.25 * 3.9)
        assert!((lines[0].start.x - (-1.95 + 0.975)).abs() < EPS);
        assert!((lines[3].end.y - (-2.45 + 0.975)).abs() < EPS);
        assert_eq!(lines[4].end, lines[0].start);
    }

    #[test]
    fn dual_column_courtyard_is_rounded_rectangle() {
        let courtyard = soic(4.9).courtyard(&Config::default(), 0.25);
        assert_eq!(courtyard.lines.len(), 4);
        assert!((courtyard.extent.top + 2.7).abs() < EPS);
        assert!((courtyard.extent.bottom - 2.7).abs() < EPS);
        assert!((courtyard.lines[0].start.x + 3.55).abs() < EPS);
    }

    #[test]
    fn quad_courtyard_and_silk() {
        let horizontal = Size::new(1.5, 0.3);
        let vertical = Size::new(0.3, 1.5);
        let pads = PadSet {
            left: PadGeometry::new(Point::new(-5.35, 0.0), horizontal),
            right: PadGeometry::new(Point::new(5.35, 0.0), horizontal),
            top: PadGeometry::new(Point::new(0.0, -5.35), vertical),
            bottom: PadGeometry::new(Point::new(0.0, 5.35), vertical),
        };
        let outline = PackageOutline::new(pads, 16, 16, 0.5, Rect::centred(10.0, 10.0), None);
        assert!(outline.layout.is_quad());

        let silk = outline.silkscreen(&Config::default()).unwrap();
        assert_eq!(silk.len(), 9);

        let courtyard = outline.courtyard(&Config::default(), 0.25);
        assert_eq!(courtyard.lines.len(), 24);
        // bbox.min_y = -6.1
        assert!((courtyard.extent.top + 6.35).abs() < EPS);
        assert!((courtyard.extent.bottom - 6.35).abs() < EPS);
        // cx1 = -(3.75 + 0.15 + 0.25)
        assert!((courtyard.lines[0].end.x + 4.15).abs() < EPS);
    }
}
