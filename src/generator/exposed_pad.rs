//! Exposed (thermal) pad with its paste apertures and optional via array.

use crate::footprint::primitives::{Layer, Pad};
use crate::generator::device::ThermalVias;
use crate::generator::pad_border::PadStyle;
use crate::ipc7351::packages::{Point, Size};

/// An exposed pad ready to be placed.
#[derive(Debug, Clone, Copy)]
pub struct ExposedPad<'a> {
    /// Pad number, one past the last pin.
    pub number: u32,
    /// Copper size.
    pub size: Size,
    /// Custom solder mask opening.
    pub mask: Option<Size>,
    /// Share of the copper covered by paste.
    pub paste_coverage: f64,
    /// Paste pads per axis when no vias have to be avoided.
    pub paste_grid: (u32, u32),
    /// Via array for the thermal via variant.
    pub thermal_vias: Option<&'a ThermalVias>,
}

impl ExposedPad<'_> {
    /// All pads making up the exposed pad: copper, mask aperture, vias,
    /// bottom copper and paste, in that order.
    #[must_use]
    pub fn pads(&self, style: PadStyle) -> Vec<Pad> {
        let number = self.number.to_string();
        let mut pads = Vec::new();

        match self.mask {
            Some(mask) => {
                pads.push(Pad::smd(number.as_str(), style.shape(self.size), Point::default(), self.size, &[Layer::FCu]));
                pads.push(Pad::smd("", style.shape(mask), Point::default(), mask, &[Layer::FMask]));
            }
            None => pads.push(Pad::smd(
                number.as_str(),
                style.shape(self.size),
                Point::default(),
                self.size,
                &[Layer::FCu, Layer::FMask],
            )),
        }

        let Some(vias) = self.thermal_vias else {
            pads.extend(self.paste_grid_pads(style));
            return pads;
        };

        let (xs, ys) = via_positions(self.size, vias);
        let diameter = vias.drill + 2.0 * vias.min_annular_ring;
        for &y in &ys {
            for &x in &xs {
                pads.push(Pad::through_hole(number.as_str(), Point::new(x, y), diameter, vias.drill));
            }
        }

        let (min_x, min_y) = vias.bottom_min_size.map_or((0.0, 0.0), |s| s.xy());
        let bottom = Size::new(self.size.x.max(min_x), self.size.y.max(min_y));
        pads.push(Pad::smd(number.as_str(), style.shape(bottom), Point::default(), bottom, &[Layer::BCu]));

        if vias.paste_avoid_via {
            pads.extend(self.paste_between_vias(&xs, &ys, vias, style));
        } else {
            pads.extend(self.paste_grid_pads(style));
        }
        pads
    }

    /// Regular grid of paste pads whose total area is the coverage target.
    fn paste_grid_pads(&self, style: PadStyle) -> Vec<Pad> {
        let (nx, ny) = self.paste_grid;
        let cell = Size::new(self.size.x / f64::from(nx), self.size.y / f64::from(ny));
        let scale = self.paste_coverage.sqrt();
        let size = Size::new(cell.x * scale, cell.y * scale);

        let mut pads = Vec::new();
        for y in centred_offsets(ny, cell.y) {
            for x in centred_offsets(nx, cell.x) {
                pads.push(paste_pad(Point::new(x, y), size, style));
            }
        }
        pads
    }

    /// Paste pads filling the gaps between the vias, shrunk about their
    /// centres if they would exceed the coverage target.
    fn paste_between_vias(&self, xs: &[f64], ys: &[f64], vias: &ThermalVias, style: PadStyle) -> Vec<Pad> {
        let keepout = vias.drill / 2.0 + vias.paste_via_clearance;
        let (rings_x, rings_y) = vias.paste_rings_outside;
        let cols = free_intervals(xs, self.size.x, keepout, rings_x);
        let rows = free_intervals(ys, self.size.y, keepout, rings_y);

        let area: f64 = cols.iter().map(|c| c.1 - c.0).sum::<f64>()
            * rows.iter().map(|r| r.1 - r.0).sum::<f64>();
        let target = self.paste_coverage * self.size.x * self.size.y;
        let scale = if area > target { (target / area).sqrt() } else { 1.0 };

        let mut pads = Vec::new();
        for &(top, bottom) in &rows {
            for &(left, right) in &cols {
                let at = Point::new((left + right) / 2.0, (top + bottom) / 2.0);
                let size = Size::new((right - left) * scale, (bottom - top) * scale);
                pads.push(paste_pad(at, size, style));
            }
        }
        pads
    }
}

fn paste_pad(at: Point, size: Size, style: PadStyle) -> Pad {
    Pad::smd("", style.shape(size), at, size, &[Layer::FPaste])
}

/// Centres of `count` cells of `step`, symmetric about zero.
fn centred_offsets(count: u32, step: f64) -> Vec<f64> {
    let centre = f64::from(count.saturating_sub(1)) / 2.0;
    (0..count).map(|i| (f64::from(i) - centre) * step).collect()
}

/// Via centres along X and Y.
fn via_positions(size: Size, vias: &ThermalVias) -> (Vec<f64>, Vec<f64>) {
    let (nx, ny) = vias.count.xy();
    let (gx, gy) = vias
        .grid
        .map_or((size.x / f64::from(nx), size.y / f64::from(ny)), |g| g.xy());
    (centred_offsets(nx, gx), centred_offsets(ny, gy))
}

/// Paste-free intervals along one axis of a pad of `extent`, keeping
/// `keepout` clear around each via.
///
/// The strips between the outer vias and the pad edge are used when
/// `outer_rings` is set or there is no room between vias.
fn free_intervals(positions: &[f64], extent: f64, keepout: f64, outer_rings: bool) -> Vec<(f64, f64)> {
    let inner: Vec<(f64, f64)> = positions
        .windows(2)
        .map(|pair| (pair[0] + keepout, pair[1] - keepout))
        .collect();

    let use_outer = outer_rings || inner.is_empty();
    let mut intervals = match (positions.first(), positions.last()) {
        (Some(&first), Some(&last)) if use_outer => {
            let mut all = Vec::with_capacity(inner.len() + 2);
            all.push((-extent / 2.0, first - keepout));
            all.extend(inner);
            all.push((last + keepout, extent / 2.0));
            all
        }
        _ => inner,
    };

    intervals.retain(|(start, end)| end > start);
    intervals
}
