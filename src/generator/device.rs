//! Size definition records.
//!
//! A size definition file is a YAML mapping: the `FileHeader` entry names the
//! library and package family, every other entry is one device.
//!
//! ```yaml
//! FileHeader:
//!   library_Suffix: 'SO'
//!   device_type: 'SOIC'
//!
//! SOIC_8_3.9x4.9mm_P1.27mm:
//!   size_source: 'JEDEC MS-012AA'
//!   body_size_x: {minimum: 3.8, maximum: 4.0}
//!   body_size_y: {minimum: 4.8, maximum: 5.0}
//!   overall_size_x: {minimum: 5.8, maximum: 6.2}
//!   lead_width: {minimum: 0.31, maximum: 0.51}
//!   lead_len: {minimum: 0.4, maximum: 1.27}
//!   pitch: 1.27
//!   num_pins_x: 0
//!   num_pins_y: 4
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{GeneratorError, GeneratorResult};
use crate::ipc7351::packages::{DeviceDimensions, ExposedPadSize, HeelSpacing};
use crate::ipc7351::tolerance::ToleranceSpec;

/// Default share of the exposed pad covered by paste.
pub const DEFAULT_PASTE_COVERAGE: f64 = 0.65;

/// The `FileHeader` entry of a size definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Library category, substituted into the library name template.
    #[serde(rename = "library_Suffix")]
    pub library_suffix: String,
    /// Package family, e.g. `SOIC` or `LQFP`.
    pub device_type: String,
}

/// A value given once for both axes or as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerAxis<T> {
    /// Same value on both axes.
    Both(T),
    /// Separate X and Y values.
    Each([T; 2]),
}

impl<T: Copy> PerAxis<T> {
    /// The X and Y values.
    pub const fn xy(self) -> (T, T) {
        match self {
            Self::Both(v) => (v, v),
            Self::Each([x, y]) => (x, y),
        }
    }
}

/// Thermal via layout under the exposed pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalVias {
    /// Number of vias per axis.
    pub count: PerAxis<u32>,
    /// Drill diameter.
    #[serde(default = "default_via_drill")]
    pub drill: f64,
    /// Via pitch; defaults to the exposed pad size divided by the count.
    #[serde(default)]
    pub grid: Option<PerAxis<f64>>,
    /// Paste coverage, overriding the device value.
    #[serde(rename = "EP_paste_coverage", default)]
    pub paste_coverage: Option<f64>,
    /// Paste grid used when vias are not avoided, overriding the device value.
    #[serde(rename = "EP_num_paste_pads", default)]
    pub num_paste_pads: Option<PerAxis<u32>>,
    /// Per axis, whether paste also goes between the outer vias and the
    /// pad edge. Given as a flag or a count; any non-zero count enables it.
    #[serde(default, deserialize_with = "axis_flags")]
    pub paste_rings_outside: (bool, bool),
    /// Keep paste clear of the vias.
    #[serde(default = "default_true", deserialize_with = "loose_bool")]
    pub paste_avoid_via: bool,
    /// Clearance between paste and via drill.
    #[serde(default = "default_via_paste_clearance")]
    pub paste_via_clearance: f64,
    /// Minimum annular ring of the vias.
    #[serde(default = "default_min_annular_ring")]
    pub min_annular_ring: f64,
    /// Minimum size of the bottom side copper pad.
    #[serde(default)]
    pub bottom_min_size: Option<PerAxis<f64>>,
}

impl ThermalVias {
    fn validate(&self, device: &str) -> GeneratorResult<()> {
        let (nx, ny) = self.count.xy();
        if nx == 0 || ny == 0 {
            return Err(GeneratorError::invalid_device(device, "thermal_vias.count must be positive"));
        }
        if self.drill <= 0.0 || self.min_annular_ring < 0.0 {
            return Err(GeneratorError::invalid_device(
                device,
                "thermal_vias.drill must be positive and min_annular_ring not negative",
            ));
        }
        if self.paste_via_clearance < 0.0 {
            return Err(GeneratorError::invalid_device(
                device,
                "thermal_vias.paste_via_clearance must not be negative",
            ));
        }
        if let Some(grid) = self.grid {
            let (gx, gy) = grid.xy();
            if gx <= 0.0 || gy <= 0.0 {
                return Err(GeneratorError::invalid_device(device, "thermal_vias.grid must be positive"));
            }
        }
        if let Some(size) = self.bottom_min_size {
            let (sx, sy) = size.xy();
            if sx < 0.0 || sy < 0.0 {
                return Err(GeneratorError::invalid_device(
                    device,
                    "thermal_vias.bottom_min_size must not be negative",
                ));
            }
        }
        if let Some(coverage) = self.paste_coverage {
            check_paste_coverage(device, "thermal_vias.EP_paste_coverage", coverage)?;
        }
        if let Some(grid) = self.num_paste_pads {
            check_paste_grid(device, "thermal_vias.EP_num_paste_pads", grid.xy())?;
        }
        Ok(())
    }
}

fn check_paste_coverage(device: &str, key: &str, coverage: f64) -> GeneratorResult<()> {
    if coverage > 0.0 && coverage <= 1.0 {
        Ok(())
    } else {
        Err(GeneratorError::invalid_device(
            device,
            format!("{key} {coverage} outside (0, 1]"),
        ))
    }
}

fn check_paste_grid(device: &str, key: &str, (nx, ny): (u32, u32)) -> GeneratorResult<()> {
    if nx == 0 || ny == 0 {
        return Err(GeneratorError::invalid_device(device, format!("{key} must be positive")));
    }
    Ok(())
}

/// One device entry of a size definition file.
///
/// Toleranced dimensions are collected in `dimensions` and resolved by
/// [`DeviceParams::dimensions`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceParams {
    /// Manufacturer name, empty for generic packages.
    #[serde(default)]
    pub manufacturer: String,
    /// Manufacturer part number.
    #[serde(default)]
    pub part_number: String,
    /// Datasheet or standard the dimensions are taken from.
    pub size_source: String,
    /// Lead pitch.
    pub pitch: f64,
    /// Pins per top and bottom row.
    pub num_pins_x: u32,
    /// Pins per left and right column.
    pub num_pins_y: u32,
    /// Name suffix template; may use `{pad_x}` and `{pad_y}`.
    #[serde(default)]
    pub suffix: String,
    /// Whether the suffix is part of the 3D model name.
    #[serde(default = "default_true", deserialize_with = "loose_bool")]
    pub include_suffix_in_3dpath: bool,
    /// Name template replacing the configured ones.
    #[serde(default)]
    pub custom_name_format: Option<String>,
    /// Reduction of the heel fillet goal.
    #[serde(default)]
    pub heel_reduction: f64,
    /// Thermal vias; requests an extra footprint variant.
    #[serde(default)]
    pub thermal_vias: Option<ThermalVias>,
    /// Share of the exposed pad covered by paste.
    #[serde(rename = "EP_paste_coverage", default)]
    pub ep_paste_coverage: Option<f64>,
    /// Paste pad grid on the exposed pad.
    #[serde(rename = "EP_num_paste_pads", default)]
    pub ep_num_paste_pads: Option<PerAxis<u32>>,
    /// Everything else: the toleranced dimensions.
    #[serde(flatten)]
    pub dimensions: IndexMap<String, Value>,
}

impl DeviceParams {
    /// Total pin count, not counting the exposed pad.
    #[must_use]
    pub const fn pin_count(&self) -> u32 {
        2 * (self.num_pins_x + self.num_pins_y)
    }

    /// Paste coverage for the given variant.
    #[must_use]
    pub fn paste_coverage(&self, with_thermal_vias: bool) -> f64 {
        let via_override = self
            .thermal_vias
            .as_ref()
            .filter(|_| with_thermal_vias)
            .and_then(|v| v.paste_coverage);
        via_override
            .or(self.ep_paste_coverage)
            .unwrap_or(DEFAULT_PASTE_COVERAGE)
    }

    /// Paste pad grid for the given variant.
    #[must_use]
    pub fn paste_grid(&self, with_thermal_vias: bool) -> (u32, u32) {
        let via_override = self
            .thermal_vias
            .as_ref()
            .filter(|_| with_thermal_vias)
            .and_then(|v| v.num_paste_pads);
        via_override
            .or(self.ep_num_paste_pads)
            .map_or((1, 1), PerAxis::xy)
    }

    /// Checks the non-dimensional fields.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDevice`] on a non-positive pitch, a
    /// device without pins, paste settings out of range or a malformed
    /// thermal via record.
    pub fn validate(&self, device: &str) -> GeneratorResult<()> {
        if self.pitch <= 0.0 {
            return Err(GeneratorError::invalid_device(device, "pitch must be positive"));
        }
        if self.num_pins_x == 0 && self.num_pins_y == 0 {
            return Err(GeneratorError::invalid_device(
                device,
                "num_pins_x and num_pins_y are both zero",
            ));
        }
        check_paste_coverage(device, "EP_paste_coverage", self.paste_coverage(false))?;
        check_paste_grid(device, "EP_num_paste_pads", self.paste_grid(false))?;
        if let Some(vias) = &self.thermal_vias {
            vias.validate(device)?;
        }
        Ok(())
    }

    fn required(&self, name: &str) -> GeneratorResult<ToleranceSpec> {
        ToleranceSpec::from_record(&self.dimensions, name)?
            .ok_or_else(|| GeneratorError::missing_dimension(name))
    }

    fn optional(&self, name: &str) -> GeneratorResult<Option<ToleranceSpec>> {
        ToleranceSpec::from_record(&self.dimensions, name)
    }

    fn pair(&self, device: &str, x: &str, y: &str) -> GeneratorResult<Option<(ToleranceSpec, ToleranceSpec)>> {
        match (self.optional(x)?, self.optional(y)?) {
            (Some(x), Some(y)) => Ok(Some((x, y))),
            (None, None) => Ok(None),
            _ => Err(GeneratorError::invalid_device(
                device,
                format!("{x} and {y} must be given together"),
            )),
        }
    }

    /// Resolves the toleranced package dimensions.
    ///
    /// Only one of `overall_size_x`/`overall_size_y` is needed; the missing
    /// one takes the other's value. `lead_inside` takes precedence over
    /// `lead_len`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::MissingDimension`] if a mandatory dimension
    /// is absent, or [`GeneratorError::InvalidDimension`] if one is malformed.
    pub fn dimensions(&self, device: &str) -> GeneratorResult<DeviceDimensions> {
        let (overall_size_x, overall_size_y) =
            match (self.optional("overall_size_x")?, self.optional("overall_size_y")?) {
                (Some(x), Some(y)) => (x, y),
                (Some(x), None) => (x, x),
                (None, Some(y)) => (y, y),
                (None, None) => {
                    return Err(GeneratorError::missing_dimension("overall_size_x or overall_size_y"))
                }
            };

        let heel_spacing = match (self.optional("lead_inside")?, self.optional("lead_len")?) {
            (Some(inside), _) => HeelSpacing::Inside(inside),
            (None, Some(lead_len)) => HeelSpacing::LeadLength(lead_len),
            (None, None) => return Err(GeneratorError::missing_dimension("lead_len or lead_inside")),
        };

        let exposed_pad = self
            .pair(device, "EP_size_x", "EP_size_y")?
            .map(|(size_x, size_y)| -> GeneratorResult<ExposedPadSize> {
                Ok(ExposedPadSize {
                    size_x,
                    size_y,
                    mask: self.pair(device, "EP_mask_x", "EP_mask_y")?,
                })
            })
            .transpose()?;

        Ok(DeviceDimensions {
            body_size_x: self.required("body_size_x")?,
            body_size_y: self.required("body_size_y")?,
            lead_width: self.required("lead_width")?,
            heel_spacing,
            overall_size_x,
            overall_size_y,
            exposed_pad,
            heel_reduction: self.heel_reduction,
        })
    }
}

/// A parsed size definition file.
#[derive(Debug)]
pub struct DeviceFile {
    /// The file header.
    pub header: FileHeader,
    /// Device entries in file order. Entries that fail to deserialise carry
    /// their error so the remaining devices can still be generated.
    pub devices: Vec<(String, GeneratorResult<DeviceParams>)>,
}

impl DeviceFile {
    /// Parses a size definition document.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::DeviceFile`] if the document is not valid
    /// YAML, or [`GeneratorError::InvalidDevice`] if the header is missing
    /// or malformed.
    pub fn parse(contents: &str, path: &Path) -> GeneratorResult<Self> {
        let mut entries: IndexMap<String, Value> =
            serde_yaml::from_str(contents).map_err(|e| GeneratorError::DeviceFile {
                path: path.to_path_buf(),
                source: e,
            })?;

        let header_value = entries
            .shift_remove("FileHeader")
            .ok_or_else(|| GeneratorError::invalid_device(path.display().to_string(), "missing FileHeader"))?;
        let header: FileHeader = serde_yaml::from_value(header_value).map_err(|e| {
            GeneratorError::invalid_device(path.display().to_string(), format!("FileHeader: {e}"))
        })?;

        let devices = entries
            .into_iter()
            .map(|(name, value)| {
                let params = serde_yaml::from_value::<DeviceParams>(value)
                    .map_err(|e| GeneratorError::invalid_device(name.as_str(), e.to_string()));
                (name, params)
            })
            .collect();

        Ok(Self { header, devices })
    }

    /// Reads and parses a size definition file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> GeneratorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GeneratorError::DeviceRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents, path)
    }
}

const fn default_true() -> bool {
    true
}

const fn default_via_drill() -> f64 {
    0.3
}

const fn default_via_paste_clearance() -> f64 {
    0.15
}

const fn default_min_annular_ring() -> f64 {
    0.15
}

/// Reads a per-axis switch given as a flag or a count, once or as `[x, y]`.
fn axis_flags<'de, D>(deserializer: D) -> Result<(bool, bool), D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Clone, Copy, Deserialize)]
    #[serde(untagged)]
    enum Switch {
        Flag(bool),
        Count(u32),
    }

    let on = |switch: Switch| match switch {
        Switch::Flag(flag) => flag,
        Switch::Count(count) => count > 0,
    };

    Ok(Option::<PerAxis<Switch>>::deserialize(deserializer)?
        .map_or((false, false), |axes| {
            let (x, y) = axes.xy();
            (on(x), on(y))
        }))
}

/// Accepts YAML booleans as well as the strings `True`/`False`.
fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Text(String),
    }

    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Text(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("expected a boolean, found '{s}'"))),
        },
    }
}
