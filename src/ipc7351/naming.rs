//! Footprint naming.
//!
//! Two naming schemes are supported:
//!
//! - The IPC-7351B land pattern name, e.g. `SOP127P600X490-8N` or
//!   `QFP50P900X900-64N`, available to templates as `{ipc_name}`.
//! - Library name templates with Python-style placeholders, e.g.
//!   `{man:s}_{mpn:s}_{pkg:s}-{pincount:d}_{size_x:g}x{size_y:g}mm_P{pitch:g}mm`.
//!
//! A placeholder is `{key}` or `{key:spec}` where spec is one of `s`, `d`,
//! `g` or `.Nf`. After substitution doubled underscores collapse and leading
//! underscores are stripped, so empty fields don't leave separators behind.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{GeneratorError, GeneratorResult};
use crate::ipc7351::density::DensityLevel;
use crate::ipc7351::packages::{ExposedPadSize, Size};

const PLACEHOLDER: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)(?::([^{}]*))?\}";

/// A value substituted into a name template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// Free text.
    Text(String),
    /// Integer (pin counts).
    Int(u32),
    /// Dimension in mm.
    Float(f64),
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for TemplateValue {
    fn from(value: u32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Placeholder values keyed by name.
pub type TemplateValues = IndexMap<&'static str, TemplateValue>;

/// Formats a float like Python's `{:g}`: six significant digits, no
/// trailing zeros.
#[must_use]
pub fn format_g(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() { "0".to_string() } else { value.to_string() };
    }

    #[allow(clippy::cast_possible_truncation)]
    let exponent = value.abs().log10().floor() as i32;
    if !(-4..6).contains(&exponent) {
        let formatted = format!("{value:.5e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let mantissa = strip_trailing_zeros(mantissa);
                let exp: i32 = exp.parse().unwrap_or_default();
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            None => formatted,
        };
    }

    #[allow(clippy::cast_sign_loss)]
    let decimals = (5 - exponent).max(0) as usize;
    let formatted = strip_trailing_zeros(&format!("{value:.decimals$}")).to_string();
    if formatted == "-0" {
        "0".to_string()
    } else {
        formatted
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn format_value(template: &str, key: &str, value: &TemplateValue, spec: &str) -> GeneratorResult<String> {
    let mismatch = || {
        GeneratorError::template(
            template,
            format!("format spec '{spec}' does not apply to field '{key}'"),
        )
    };

    match (value, spec) {
        (TemplateValue::Text(text), "" | "s") => Ok(text.clone()),
        (TemplateValue::Int(n), "" | "d") => Ok(n.to_string()),
        (TemplateValue::Int(n), "g") => Ok(n.to_string()),
        (TemplateValue::Float(v), "" | "g") => Ok(format_g(*v)),
        (TemplateValue::Float(v), "d") if v.fract() == 0.0 => Ok(format!("{v:.0}")),
        (TemplateValue::Float(v), spec) if spec.starts_with('.') && spec.ends_with('f') => {
            let decimals: usize = spec[1..spec.len() - 1].parse().map_err(|_| mismatch())?;
            Ok(format!("{v:.decimals$}"))
        }
        _ => Err(mismatch()),
    }
}

/// The placeholder regex, compiled on first use.
fn placeholder_pattern() -> &'static Result<Regex, regex::Error> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PLACEHOLDER))
}

/// Substitutes placeholders in `template`.
///
/// # Errors
///
/// Returns [`GeneratorError::Template`] for unknown keys or format specs that
/// don't fit the value.
pub fn render_template(template: &str, values: &TemplateValues) -> GeneratorResult<String> {
    let pattern = placeholder_pattern()
        .as_ref()
        .map_err(|e| GeneratorError::template(template, e.to_string()))?;

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in pattern.captures_iter(template) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let spec = caps.get(2).map_or("", |m| m.as_str());
        let value = values
            .get(key.as_str())
            .ok_or_else(|| GeneratorError::template(template, format!("unknown field '{}'", key.as_str())))?;

        out.push_str(&template[last..whole.start()]);
        out.push_str(&format_value(template, key.as_str(), value, spec)?);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Collapses doubled underscores and strips leading ones.
#[must_use]
pub fn tidy_name(name: &str) -> String {
    let mut tidy = name.to_string();
    while tidy.contains("__") {
        tidy = tidy.replace("__", "_");
    }
    tidy.trim_start_matches('_').to_string()
}

/// Name templates for the three built-in naming schemes.
#[derive(Debug, Clone, Copy)]
pub struct NameTemplates<'a> {
    /// Packages without exposed pad.
    pub plain: &'a str,
    /// Packages with exposed pad.
    pub exposed_pad: &'a str,
    /// Packages with exposed pad and a custom solder mask opening.
    pub exposed_pad_custom_mask: &'a str,
}

/// How a device's footprint name is built. Selected once per device.
#[derive(Debug, Clone, PartialEq)]
pub enum NamePolicy {
    /// No exposed pad.
    Plain,
    /// Exposed pad with mask matching the copper.
    ExposedPad {
        /// Nominal exposed pad size.
        ep: Size,
    },
    /// Exposed pad with its own mask opening.
    ExposedPadCustomMask {
        /// Nominal exposed pad size.
        ep: Size,
        /// Nominal mask opening.
        mask: Size,
    },
    /// Device supplies its own template.
    Custom {
        /// Template string.
        format: String,
        /// Exposed pad size, if any, for `ep_size_*` placeholders.
        ep: Option<Size>,
        /// Mask opening, if any, for `mask_size_*` placeholders.
        mask: Option<Size>,
    },
}

impl NamePolicy {
    /// Chooses the policy for a device.
    #[must_use]
    pub fn select(custom_format: Option<&str>, exposed_pad: Option<&ExposedPadSize>) -> Self {
        let ep = exposed_pad.map(ExposedPadSize::nominal);
        let mask = exposed_pad.and_then(ExposedPadSize::mask_nominal);

        match (custom_format, ep, mask) {
            (Some(format), ep, mask) => Self::Custom {
                format: format.to_string(),
                ep,
                mask,
            },
            (None, Some(ep), Some(mask)) => Self::ExposedPadCustomMask { ep, mask },
            (None, Some(ep), None) => Self::ExposedPad { ep },
            (None, None, _) => Self::Plain,
        }
    }

    /// The template this policy renders.
    #[must_use]
    pub fn template<'a>(&'a self, templates: &NameTemplates<'a>) -> &'a str {
        match self {
            Self::Plain => templates.plain,
            Self::ExposedPad { .. } => templates.exposed_pad,
            Self::ExposedPadCustomMask { .. } => templates.exposed_pad_custom_mask,
            Self::Custom { format, .. } => format,
        }
    }

    fn sizes(&self) -> (Size, Size) {
        match self {
            Self::Plain => (Size::default(), Size::default()),
            Self::ExposedPad { ep } => (*ep, Size::default()),
            Self::ExposedPadCustomMask { ep, mask } => (*ep, *mask),
            Self::Custom { ep, mask, .. } => (ep.unwrap_or_default(), mask.unwrap_or_default()),
        }
    }

    /// Renders the footprint name.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Template`] if the template is malformed.
    pub fn render(&self, templates: &NameTemplates<'_>, fields: &NameFields<'_>) -> GeneratorResult<String> {
        let (ep, mask) = self.sizes();
        let mut values = fields.values();
        values.insert("ep_size_x", ep.x.into());
        values.insert("ep_size_y", ep.y.into());
        values.insert("mask_size_x", mask.x.into());
        values.insert("mask_size_y", mask.y.into());

        render_template(self.template(templates), &values).map(|name| tidy_name(&name))
    }
}

/// Device fields available to name templates.
#[derive(Debug, Clone, Copy)]
pub struct NameFields<'a> {
    /// Manufacturer (`man`).
    pub manufacturer: &'a str,
    /// Manufacturer part number (`mpn`).
    pub part_number: &'a str,
    /// Package family from the file header (`pkg`).
    pub package: &'a str,
    /// Total pin count excluding the exposed pad.
    pub pincount: u32,
    /// Nominal body size along X.
    pub size_x: f64,
    /// Nominal body size along Y.
    pub size_y: f64,
    /// Lead pitch.
    pub pitch: f64,
    /// Rendered device suffix.
    pub suffix: &'a str,
    /// Thermal via marker, empty for the plain variant.
    pub vias: &'a str,
    /// IPC-7351B land pattern name.
    pub ipc_name: &'a str,
}

impl NameFields<'_> {
    fn values(&self) -> TemplateValues {
        let mut values = TemplateValues::new();
        values.insert("man", self.manufacturer.into());
        values.insert("mpn", self.part_number.into());
        values.insert("pkg", self.package.into());
        values.insert("pincount", self.pincount.into());
        values.insert("size_x", self.size_x.into());
        values.insert("size_y", self.size_y.into());
        values.insert("pitch", self.pitch.into());
        values.insert("suffix", self.suffix.into());
        values.insert("suffix2", "".into());
        values.insert("vias", self.vias.into());
        values.insert("ipc_name", self.ipc_name.into());
        values
    }
}

/// Generates the IPC-7351B name for a gull-wing package.
///
/// Format: `{SOP|QFP}{PITCH}P{SPAN_X}X{SPAN_Y}-{PINS}{DENSITY}` with
/// dimensions in 0.01 mm units. Two-sided packages use `SOP`, four-sided
/// packages `QFP`.
///
/// # Examples
///
/// ```
/// use gullwing_fpgen::ipc7351::naming::ipc_name;
/// use gullwing_fpgen::ipc7351::density::DensityLevel;
///
/// let name = ipc_name(false, 1.27, 6.0, 4.9, 8, DensityLevel::Nominal);
/// assert_eq!(name, "SOP127P600X490-8N");
/// ```
#[must_use]
pub fn ipc_name(
    quad: bool,
    pitch: f64,
    span_x: f64,
    span_y: f64,
    pin_count: u32,
    density: DensityLevel,
) -> String {
    let prefix = if quad { "QFP" } else { "SOP" };
    let pitch_units = mm_to_hundredths(pitch);
    let x_units = mm_to_hundredths(span_x);
    let y_units = mm_to_hundredths(span_y);

    format!(
        "{prefix}{pitch_units}P{x_units}X{y_units}-{pin_count}{density}",
        density = density.letter()
    )
}

/// Converts millimetres to IPC naming units (0.01mm = 1 unit).
fn mm_to_hundredths(mm: f64) -> u32 {
    // Package dimensions are positive and small, so the cast is safe
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = (mm * 100.0).round() as u32;
    units
}
