//! `.kicad_mod` writer.
//!
//! Emits the KiCad footprint s-expression format. Output is a pure function
//! of the [`Footprint`]: no timestamps, fixed element order and fixed number
//! formatting.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{GeneratorError, GeneratorResult};
use crate::footprint::primitives::{Line, Pad, PadShape, Text};
use crate::footprint::Footprint;
use crate::ipc7351::packages::{Point, Size};

/// Formats a length in mm with at most six decimals and no trailing zeros.
#[must_use]
pub fn fmt_mm(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn fmt_point(p: Point) -> String {
    format!("{} {}", fmt_mm(p.x), fmt_mm(p.y))
}

fn fmt_size(s: Size) -> String {
    format!("{} {}", fmt_mm(s.x), fmt_mm(s.y))
}

/// Quotes a string if it is empty or contains characters KiCad treats as
/// delimiters.
#[must_use]
pub fn quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'));
    if needs_quotes {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

fn text_sexpr(text: &Text) -> String {
    format!(
        "  (fp_text {} {} (at {}) (layer {})\n    (effects (font (size {}) (thickness {})))\n  )\n",
        text.kind.as_str(),
        quote(&text.text),
        fmt_point(text.at),
        text.layer.as_str(),
        fmt_size(text.size),
        fmt_mm(text.thickness),
    )
}

fn line_sexpr(line: &Line) -> String {
    format!(
        "  (fp_line (start {}) (end {}) (layer {}) (width {}))\n",
        fmt_point(line.start),
        fmt_point(line.end),
        line.layer.as_str(),
        fmt_mm(line.width),
    )
}

fn pad_sexpr(pad: &Pad) -> String {
    let mut out = format!(
        "  (pad {} {} {} (at {}) (size {})",
        quote(&pad.number),
        pad.kind.as_str(),
        pad.shape.as_str(),
        fmt_point(pad.at),
        fmt_size(pad.size),
    );
    if let Some(drill) = pad.drill {
        out.push_str(&format!(" (drill {})", fmt_mm(drill)));
    }
    let layers: Vec<&str> = pad.layers.iter().map(|l| l.as_str()).collect();
    out.push_str(&format!(" (layers {})", layers.join(" ")));
    if let PadShape::RoundRect { ratio } = pad.shape {
        out.push_str(&format!(" (roundrect_rratio {})", fmt_mm(ratio)));
    }
    out.push_str(")\n");
    out
}

/// Serialises a footprint to the `.kicad_mod` format.
#[must_use]
pub fn to_kicad_mod(footprint: &Footprint) -> String {
    let mut out = format!("(module {} (layer F.Cu) (tedit 0)\n", quote(&footprint.name));
    out.push_str(&format!("  (descr \"{}\")\n", footprint.description.replace('"', "'")));
    out.push_str(&format!("  (tags \"{}\")\n", footprint.tags.replace('"', "'")));
    out.push_str(&format!("  (attr {})\n", footprint.attribute.as_str()));

    for text in &footprint.texts {
        out.push_str(&text_sexpr(text));
    }
    for line in &footprint.lines {
        out.push_str(&line_sexpr(line));
    }
    for pad in &footprint.pads {
        out.push_str(&pad_sexpr(pad));
    }

    if let Some(model) = &footprint.model_3d {
        out.push_str(&format!("  (model {}\n", quote(&model.path)));
        out.push_str("    (at (xyz 0 0 0))\n");
        out.push_str("    (scale (xyz 1 1 1))\n");
        out.push_str("    (rotate (xyz 0 0 0))\n");
        out.push_str("  )\n");
    }

    out.push_str(")\n");
    out
}

/// Writes a footprint to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`GeneratorError::FileWrite`] if a directory or the file cannot
/// be written.
pub fn write_kicad_mod(footprint: &Footprint, path: &Path) -> GeneratorResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::file_write(parent, e))?;
    }
    fs::write(path, to_kicad_mod(footprint)).map_err(|e| GeneratorError::file_write(path, e))?;
    debug!(path = %path.display(), "Wrote footprint");
    Ok(())
}

/// Writes the footprint as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialisation or the write fails.
pub fn write_json(footprint: &Footprint, path: &Path) -> GeneratorResult<()> {
    let json = serde_json::to_string_pretty(footprint)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::file_write(parent, e))?;
    }
    fs::write(path, json).map_err(|e| GeneratorError::file_write(path, e))
}
