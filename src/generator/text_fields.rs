//! Reference and value text fields.

use crate::config::{Config, TextFieldConfig, TextPosition};
use crate::footprint::primitives::{Text, TextKind};
use crate::generator::outline::CourtyardExtent;
use crate::ipc7351::packages::{Point, Rect, Size};

/// Text placed outside the courtyard keeps this many text heights of
/// distance to it.
const OUTSIDE_OFFSET: f64 = 0.7;

/// Body-scaled text is this share of the shorter body side.
const BODY_SCALE: f64 = 0.25;

const DEFAULT_THICKNESS: f64 = 0.15;

fn text_size(field: &TextFieldConfig, body: &Rect) -> Size {
    if let Some([x, y]) = field.size {
        return Size::new(x, y);
    }
    let s = BODY_SCALE * body.width().min(body.height());
    let bound = |axis: usize| {
        let lo = field.size_min.map_or(s, |m| m[axis]);
        let hi = field.size_max.map_or(s, |m| m[axis]);
        s.max(lo).min(hi)
    };
    Size::new(bound(0), bound(1))
}

fn text_field(field: &TextFieldConfig, kind: TextKind, text: String, body: &Rect, extent: CourtyardExtent) -> Text {
    let size = text_size(field, body);
    let thickness = field
        .fontwidth
        .or_else(|| field.fontwidth_ratio.map(|r| r * size.y))
        .unwrap_or(DEFAULT_THICKNESS);
    let y = match field.position_y {
        TextPosition::OutsideTop => extent.top - OUTSIDE_OFFSET * size.y,
        TextPosition::OutsideBottom => extent.bottom + OUTSIDE_OFFSET * size.y,
        TextPosition::Center => 0.0,
    };
    Text {
        kind,
        text,
        at: Point::new(0.0, y),
        layer: field.layer,
        size,
        thickness,
    }
}

/// Builds one text per configured reference and value field.
///
/// The first reference and value entries become the KiCad reference and
/// value fields; further entries are user texts that substitute them.
#[must_use]
pub fn text_fields(config: &Config, body: &Rect, extent: CourtyardExtent, fp_name: &str) -> Vec<Text> {
    let (reference_var, value_var) = if config.kicad4_compatible {
        ("%R", "%V")
    } else {
        ("${REFERENCE}", "${VALUE}")
    };

    let references = config.references.iter().enumerate().map(|(i, field)| {
        if i == 0 {
            text_field(field, TextKind::Reference, "REF**".to_string(), body, extent)
        } else {
            text_field(field, TextKind::User, reference_var.to_string(), body, extent)
        }
    });
    let values = config.values.iter().enumerate().map(|(i, field)| {
        if i == 0 {
            text_field(field, TextKind::Value, fp_name.to_string(), body, extent)
        } else {
            text_field(field, TextKind::User, value_var.to_string(), body, extent)
        }
    });

    references.chain(values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::primitives::Layer;

    const EXTENT: CourtyardExtent = CourtyardExtent {
        top: -3.2,
        bottom: 3.2,
    };

    #[test]
    fn default_fields() {
        let config = Config::default();
        let body = Rect::centred(3.9, 4.9);
        let texts = text_fields(&config, &body, EXTENT, "SOIC-8_3.9x4.9mm_P1.27mm");
        assert_eq!(texts.len(), 3);

        assert_eq!(texts[0].kind, TextKind::Reference);
        assert_eq!(texts[0].text, "REF**");
        assert_eq!(texts[0].layer, Layer::FSilkS);
        assert!((texts[0].at.y + 3.9).abs() < 1e-9);

        // body-scaled fab reference: 0.25 * 3.9 clamped to [0.5, 1.0]
        assert_eq!(texts[1].kind, TextKind::User);
        assert_eq!(texts[1].text, "${REFERENCE}");
        assert!((texts[1].size.x - 0.975).abs() < 1e-9);
        assert!((texts[1].thickness - 0.15 * 0.975).abs() < 1e-9);
        assert!(texts[1].at.y.abs() < f64::EPSILON);

        assert_eq!(texts[2].kind, TextKind::Value);
        assert_eq!(texts[2].text, "SOIC-8_3.9x4.9mm_P1.27mm");
        assert!((texts[2].at.y - 3.9).abs() < 1e-9);
    }

    #[test]
    fn small_body_text_clamped() {
        let config = Config::default();
        let texts = text_fields(&config, &Rect::centred(1.0, 1.0), EXTENT, "x");
        assert!((texts[1].size.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn kicad4_user_text() {
        let config = Config {
            kicad4_compatible: true,
            ..Config::default()
        };
        let texts = text_fields(&config, &Rect::centred(3.9, 4.9), EXTENT, "x");
        assert_eq!(texts[1].text, "%R");
    }
}
