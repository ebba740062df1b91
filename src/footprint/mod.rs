//! In-memory KiCad footprint and its serialisation.
//!
//! A [`Footprint`] collects the primitives produced by the generator; the
//! [`writer`] module turns it into a `.kicad_mod` s-expression file.

pub mod primitives;
pub mod writer;

use serde::{Deserialize, Serialize};

use primitives::{Line, Model3D, Pad, Text};

/// Footprint placement attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Surface mount device.
    #[default]
    Smd,
    /// Through-hole device.
    ThroughHole,
}

impl Attribute {
    /// KiCad keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smd => "smd",
            Self::ThroughHole => "through_hole",
        }
    }
}

/// A complete footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Footprint name (e.g., "SOIC-8_3.9x4.9mm_P1.27mm").
    pub name: String,

    /// Description of the footprint.
    #[serde(default)]
    pub description: String,

    /// Search keywords.
    #[serde(default)]
    pub tags: String,

    /// Placement attribute.
    #[serde(default)]
    pub attribute: Attribute,

    /// Text items in the footprint.
    #[serde(default)]
    pub texts: Vec<Text>,

    /// Graphic lines in the footprint.
    #[serde(default)]
    pub lines: Vec<Line>,

    /// Pads in the footprint.
    #[serde(default)]
    pub pads: Vec<Pad>,

    /// 3D model reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_3d: Option<Model3D>,
}

impl Footprint {
    /// Creates a new empty footprint with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: String::new(),
            attribute: Attribute::Smd,
            texts: Vec::new(),
            lines: Vec::new(),
            pads: Vec::new(),
            model_3d: None,
        }
    }

    /// Adds a pad to the footprint.
    pub fn add_pad(&mut self, pad: Pad) {
        self.pads.push(pad);
    }

    /// Adds several pads.
    pub fn add_pads(&mut self, pads: impl IntoIterator<Item = Pad>) {
        self.pads.extend(pads);
    }

    /// Adds a line to the footprint.
    pub fn add_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Adds several lines, e.g. an expanded polyline.
    pub fn add_lines(&mut self, lines: impl IntoIterator<Item = Line>) {
        self.lines.extend(lines);
    }

    /// Adds text to the footprint.
    pub fn add_text(&mut self, text: Text) {
        self.texts.push(text);
    }

    /// Sets the 3D model.
    pub fn set_model(&mut self, path: impl Into<String>) {
        self.model_3d = Some(Model3D { path: path.into() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::primitives::Layer;
    use crate::ipc7351::packages::Point;

    #[test]
    fn new_footprint_is_empty_smd() {
        let fp = Footprint::new("SOIC-8_3.9x4.9mm_P1.27mm");
        assert_eq!(fp.attribute, Attribute::Smd);
        assert!(fp.pads.is_empty());
        assert!(fp.model_3d.is_none());
    }

    #[test]
    fn add_lines_extends() {
        let mut fp = Footprint::new("test");
        let line = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.1, Layer::FFab);
        fp.add_line(line);
        fp.add_lines([line, line]);
        assert_eq!(fp.lines.len(), 3);
    }
}
