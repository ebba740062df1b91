//! Configuration structures for deserialisation.
//!
//! These structures map directly to the merged global and series YAML
//! documents. Keys used by other generators sharing the same documents are
//! ignored.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::footprint::primitives::Layer;
use crate::ipc7351::naming::NameTemplates;
use crate::ipc7351::packages::gullwing::ManufacturingTolerance;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Library directory name template; `{category}` is the file header's
    /// `library_Suffix`.
    #[serde(default = "default_lib_name_format")]
    pub lib_name_format_string: String,

    /// Footprint name template for packages without exposed pad.
    #[serde(default = "default_fp_name_format")]
    pub fp_name_format_string_no_trailing_zero: String,

    /// Footprint name template for packages with exposed pad.
    #[serde(
        rename = "fp_name_EP_format_string_no_trailing_zero",
        default = "default_fp_name_ep_format"
    )]
    pub fp_name_ep_format_string: String,

    /// Footprint name template for packages with exposed pad and custom mask.
    #[serde(
        rename = "fp_name_EP_custom_mask_format_string_no_trailing_zero",
        default = "default_fp_name_ep_mask_format"
    )]
    pub fp_name_ep_custom_mask_format_string: String,

    /// Keyword (tags) template.
    #[serde(default = "default_keyword_format")]
    pub keyword_fp_string: String,

    /// Prefix of the 3D model path.
    #[serde(rename = "3d_model_prefix", default = "default_model_prefix")]
    pub model3d_path_prefix: String,

    /// Appended to the name of the thermal via variant.
    #[serde(default = "default_thermal_via_suffix")]
    pub thermal_via_suffix: String,

    /// Fabrication layer line width in mm.
    #[serde(default = "default_fab_line_width")]
    pub fab_line_width: f64,

    /// Silkscreen line width in mm.
    #[serde(default = "default_silk_line_width")]
    pub silk_line_width: f64,

    /// Courtyard line width in mm.
    #[serde(default = "default_courtyard_line_width")]
    pub courtyard_line_width: f64,

    /// Clearance between silkscreen and copper in mm.
    #[serde(default = "default_silk_pad_clearance")]
    pub silk_pad_clearance: f64,

    /// Offset of the silkscreen from the fabrication outline in mm.
    #[serde(default = "default_silk_fab_offset")]
    pub silk_fab_offset: f64,

    /// Maximum pin 1 bevel on the fabrication outline in mm.
    #[serde(default = "default_fab_bevel_absolute")]
    pub fab_bevel_size_absolute: f64,

    /// Pin 1 bevel relative to the smaller body dimension.
    #[serde(default = "default_fab_bevel_relative")]
    pub fab_bevel_size_relative: f64,

    /// Courtyard coordinates are rounded outwards to this grid.
    #[serde(default = "default_courtyard_grid")]
    pub courtyard_grid: f64,

    /// Rounded rectangle corner radius as a fraction of the shorter pad side.
    #[serde(default = "default_round_rect_radius_ratio")]
    pub round_rect_radius_ratio: f64,

    /// Upper bound of the rounded rectangle corner radius in mm.
    #[serde(default = "default_round_rect_max_radius")]
    pub round_rect_max_radius: Option<f64>,

    /// Board fabrication tolerance (F) in mm.
    #[serde(default = "default_manufacturing_tolerance")]
    pub manufacturing_tolerance: f64,

    /// Part placement tolerance (P) in mm.
    #[serde(default = "default_placement_tolerance")]
    pub placement_tolerance: f64,

    /// Reference designator text fields.
    #[serde(default = "default_references")]
    pub references: Vec<TextFieldConfig>,

    /// Value text fields.
    #[serde(default = "default_values")]
    pub values: Vec<TextFieldConfig>,

    /// Emit footprints that KiCad 4 can read.
    #[serde(default)]
    pub kicad4_compatible: bool,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lib_name_format_string: default_lib_name_format(),
            fp_name_format_string_no_trailing_zero: default_fp_name_format(),
            fp_name_ep_format_string: default_fp_name_ep_format(),
            fp_name_ep_custom_mask_format_string: default_fp_name_ep_mask_format(),
            keyword_fp_string: default_keyword_format(),
            model3d_path_prefix: default_model_prefix(),
            thermal_via_suffix: default_thermal_via_suffix(),
            fab_line_width: default_fab_line_width(),
            silk_line_width: default_silk_line_width(),
            courtyard_line_width: default_courtyard_line_width(),
            silk_pad_clearance: default_silk_pad_clearance(),
            silk_fab_offset: default_silk_fab_offset(),
            fab_bevel_size_absolute: default_fab_bevel_absolute(),
            fab_bevel_size_relative: default_fab_bevel_relative(),
            courtyard_grid: default_courtyard_grid(),
            round_rect_radius_ratio: default_round_rect_radius_ratio(),
            round_rect_max_radius: default_round_rect_max_radius(),
            manufacturing_tolerance: default_manufacturing_tolerance(),
            placement_tolerance: default_placement_tolerance(),
            references: default_references(),
            values: default_values(),
            kicad4_compatible: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Applies the pad shape command line flags.
    ///
    /// Both flags force plain rectangular pads; `kicad4_compatible` also
    /// switches user text fields to the KiCad 4 substitution syntax.
    pub fn apply_overrides(&mut self, force_rectangle_pads: bool, kicad4_compatible: bool) {
        if force_rectangle_pads || kicad4_compatible {
            self.round_rect_radius_ratio = 0.0;
            self.round_rect_max_radius = None;
        }
        self.kicad4_compatible = kicad4_compatible;
    }

    /// Board tolerances used by the land pattern calculation.
    #[must_use]
    pub const fn tolerance(&self) -> ManufacturingTolerance {
        ManufacturingTolerance::new(self.manufacturing_tolerance, self.placement_tolerance)
    }

    /// The three built-in footprint name templates.
    #[must_use]
    pub fn name_templates(&self) -> NameTemplates<'_> {
        NameTemplates {
            plain: &self.fp_name_format_string_no_trailing_zero,
            exposed_pad: &self.fp_name_ep_format_string,
            exposed_pad_custom_mask: &self.fp_name_ep_custom_mask_format_string,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("fab_line_width", self.fab_line_width),
            ("silk_line_width", self.silk_line_width),
            ("courtyard_line_width", self.courtyard_line_width),
            ("courtyard_grid", self.courtyard_grid),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must be positive, got {value}"),
                });
            }
        }

        let non_negative = [
            ("silk_pad_clearance", self.silk_pad_clearance),
            ("fab_bevel_size_absolute", self.fab_bevel_size_absolute),
            ("round_rect_radius_ratio", self.round_rect_radius_ratio),
            ("manufacturing_tolerance", self.manufacturing_tolerance),
            ("placement_tolerance", self.placement_tolerance),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must not be negative, got {value}"),
                });
            }
        }

        if self.fab_bevel_size_relative <= 0.0 || self.fab_bevel_size_relative > 0.5 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "fab_bevel_size_relative must be in (0, 0.5], got {}",
                    self.fab_bevel_size_relative
                ),
            });
        }

        if self.round_rect_radius_ratio > 0.5 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "round_rect_radius_ratio must not exceed 0.5, got {}",
                    self.round_rect_radius_ratio
                ),
            });
        }

        for field in self.references.iter().chain(&self.values) {
            field.validate()?;
        }

        Ok(())
    }
}

fn default_lib_name_format() -> String {
    "Package_{category:s}".to_string()
}

fn default_fp_name_format() -> String {
    "{man:s}_{mpn:s}_{pkg:s}-{pincount:d}_{size_x:g}x{size_y:g}mm_P{pitch:g}mm{suffix:s}{suffix2:s}{vias:s}"
        .to_string()
}

fn default_fp_name_ep_format() -> String {
    "{man:s}_{mpn:s}_{pkg:s}-{pincount:d}-1EP_{size_x:g}x{size_y:g}mm_P{pitch:g}mm{suffix:s}{suffix2:s}_EP{ep_size_x:g}x{ep_size_y:g}mm{vias:s}"
        .to_string()
}

fn default_fp_name_ep_mask_format() -> String {
    "{man:s}_{mpn:s}_{pkg:s}-{pincount:d}-1EP_{size_x:g}x{size_y:g}mm_P{pitch:g}mm{suffix:s}{suffix2:s}_EP{ep_size_x:g}x{ep_size_y:g}mm_Mask{mask_size_x:g}x{mask_size_y:g}mm{vias:s}"
        .to_string()
}

fn default_keyword_format() -> String {
    "{man:s} {package:s} {category:s}".to_string()
}

fn default_model_prefix() -> String {
    "${KISYS3DMOD}/".to_string()
}

fn default_thermal_via_suffix() -> String {
    "_ThermalVias".to_string()
}

const fn default_fab_line_width() -> f64 {
    0.1
}

const fn default_silk_line_width() -> f64 {
    0.12
}

const fn default_courtyard_line_width() -> f64 {
    0.05
}

const fn default_silk_pad_clearance() -> f64 {
    0.2
}

const fn default_silk_fab_offset() -> f64 {
    0.11
}

const fn default_fab_bevel_absolute() -> f64 {
    1.0
}

const fn default_fab_bevel_relative() -> f64 {
    0.25
}

const fn default_courtyard_grid() -> f64 {
    0.01
}

const fn default_round_rect_radius_ratio() -> f64 {
    0.25
}

const fn default_round_rect_max_radius() -> Option<f64> {
    Some(0.25)
}

const fn default_manufacturing_tolerance() -> f64 {
    0.1
}

const fn default_placement_tolerance() -> f64 {
    0.05
}

fn default_references() -> Vec<TextFieldConfig> {
    vec![
        TextFieldConfig::fixed(Layer::FSilkS, TextPosition::OutsideTop),
        TextFieldConfig {
            layer: Layer::FFab,
            position_y: TextPosition::Center,
            size: None,
            size_min: Some([0.5, 0.5]),
            size_max: Some([1.0, 1.0]),
            fontwidth: None,
            fontwidth_ratio: Some(0.15),
        },
    ]
}

fn default_values() -> Vec<TextFieldConfig> {
    vec![TextFieldConfig::fixed(Layer::FFab, TextPosition::OutsideBottom)]
}

/// Vertical anchor of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    /// Above the courtyard.
    OutsideTop,
    /// Below the courtyard.
    OutsideBottom,
    /// On the body centre.
    Center,
}

/// One reference or value text field.
///
/// Either `size` or the `size_min`/`size_max` pair must be given; likewise
/// `fontwidth` or `fontwidth_ratio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFieldConfig {
    /// Layer the text is placed on.
    pub layer: Layer,
    /// Vertical anchor.
    pub position_y: TextPosition,
    /// Fixed text size `[x, y]`.
    #[serde(default)]
    pub size: Option<[f64; 2]>,
    /// Lower bound of a body-scaled text size.
    #[serde(default)]
    pub size_min: Option<[f64; 2]>,
    /// Upper bound of a body-scaled text size.
    #[serde(default)]
    pub size_max: Option<[f64; 2]>,
    /// Fixed stroke width.
    #[serde(default)]
    pub fontwidth: Option<f64>,
    /// Stroke width relative to text height.
    #[serde(default)]
    pub fontwidth_ratio: Option<f64>,
}

impl TextFieldConfig {
    fn fixed(layer: Layer, position_y: TextPosition) -> Self {
        Self {
            layer,
            position_y,
            size: Some([1.0, 1.0]),
            size_min: None,
            size_max: None,
            fontwidth: Some(0.15),
            fontwidth_ratio: None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sized = self.size.is_some() || (self.size_min.is_some() && self.size_max.is_some());
        if !sized {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "text field on {} needs size or size_min and size_max",
                    self.layer.as_str()
                ),
            });
        }
        if self.fontwidth.is_none() && self.fontwidth_ratio.is_none() {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "text field on {} needs fontwidth or fontwidth_ratio",
                    self.layer.as_str()
                ),
            });
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
