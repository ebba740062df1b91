//! Footprint assembly.
//!
//! [`Gullwing`] turns one device record into its footprint variants: the
//! land pattern from the IPC calculator, the numbered pads, the exposed pad,
//! the silkscreen, fabrication and courtyard outlines, the text fields and the
//! 3D model reference. [`Gullwing::process_file`] runs that for every device
//! of a size definition file and writes the results.

pub mod device;
pub mod exposed_pad;
pub mod outline;
pub mod pad_border;
pub mod text_fields;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::GeneratorResult;
use crate::footprint::writer::{write_json, write_kicad_mod};
use crate::footprint::Footprint;
use crate::ipc7351::density::{DensityLevel, PitchClass};
use crate::ipc7351::naming::{ipc_name, render_template, NameFields, NamePolicy, TemplateValues};
use crate::ipc7351::packages::gullwing::GullWingCalculator;
use crate::ipc7351::packages::{DeviceDimensions, PackageCalculator, PadSet, Rect};
use crate::ipc7351::standards::{IpcCoefficients, IpcStandards};

use device::{DeviceFile, DeviceParams, FileHeader};
use exposed_pad::ExposedPad;
use outline::PackageOutline;
use pad_border::{pad_border, PadStyle, PinLayout};
use text_fields::text_fields;

/// One generated footprint.
#[derive(Debug, Clone)]
pub struct FootprintVariant {
    /// The assembled footprint.
    pub footprint: Footprint,
    /// Library the footprint belongs to (without `.pretty`).
    pub lib_name: String,
    /// Whether this is the thermal via variant.
    pub with_thermal_vias: bool,
    /// Non-fatal geometry problems found while building it.
    pub warnings: Vec<String>,
}

impl FootprintVariant {
    /// Path of the `.kicad_mod` file below `out_dir`.
    #[must_use]
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir
            .join(format!("{}.pretty", self.lib_name))
            .join(format!("{}.kicad_mod", self.footprint.name))
    }
}

/// Outcome of processing one size definition file.
#[derive(Debug, Default)]
pub struct FileReport {
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Devices that could not be generated.
    pub failed: Vec<String>,
}

/// Land pattern and layout shared by both variants of a device.
struct Resolved {
    dims: DeviceDimensions,
    coeffs: IpcCoefficients,
    pads: PadSet,
}

/// Gull-wing footprint generator.
///
/// Holds the read-only inputs of a run: style configuration, IPC tables and
/// the requested density level.
#[derive(Debug, Clone)]
pub struct Gullwing {
    config: Config,
    standards: IpcStandards,
    density: DensityLevel,
}

impl Gullwing {
    /// Creates a generator.
    #[must_use]
    pub const fn new(config: Config, standards: IpcStandards, density: DensityLevel) -> Self {
        Self {
            config,
            standards,
            density,
        }
    }

    /// The style configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Builds every footprint variant of a device.
    ///
    /// A device with an exposed pad and a `thermal_vias` record yields the
    /// thermal via variant first, then the plain one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid, a dimension is missing or
    /// malformed, the tolerance stack leaves no room for a pad, or a name
    /// template fails to render.
    pub fn build_variants(
        &self,
        device_name: &str,
        params: &DeviceParams,
        header: &FileHeader,
    ) -> GeneratorResult<Vec<FootprintVariant>> {
        params.validate(device_name)?;
        let dims = params.dimensions(device_name)?;

        let coeffs = self
            .standards
            .coefficients(PitchClass::from_pitch(params.pitch), self.density);
        debug!(
            device = device_name,
            toe = coeffs.goals.toe,
            heel = coeffs.goals.heel,
            side = coeffs.goals.side,
            courtyard = coeffs.courtyard,
            "Selected IPC coefficients"
        );

        let calculator = GullWingCalculator::new(self.config.tolerance());
        let pads = calculator.pad_set(&dims, &coeffs)?;
        let resolved = Resolved { dims, coeffs, pads };

        let mut variants = Vec::with_capacity(2);
        if resolved.dims.has_exposed_pad() && params.thermal_vias.is_some() {
            variants.push(self.build_variant(params, header, &resolved, true)?);
        }
        variants.push(self.build_variant(params, header, &resolved, false)?);
        Ok(variants)
    }

    fn build_variant(
        &self,
        params: &DeviceParams,
        header: &FileHeader,
        resolved: &Resolved,
        with_thermal_vias: bool,
    ) -> GeneratorResult<FootprintVariant> {
        let config = &self.config;
        let Resolved { dims, coeffs, pads } = resolved;

        let lib_name = render_template(
            &config.lib_name_format_string,
            &TemplateValues::from([("category", header.library_suffix.as_str().into())]),
        )?;

        let suffix = render_template(
            &params.suffix,
            &TemplateValues::from([
                ("pad_x", pads.left.size.x.into()),
                ("pad_y", pads.left.size.y.into()),
            ]),
        )?;
        let suffix_3d = if params.include_suffix_in_3dpath { suffix.as_str() } else { "" };

        let layout = PinLayout::from_counts(params.num_pins_x, params.num_pins_y);
        let pincount = params.pin_count();
        // lead span across the pin rows, then the extent along them
        let (span, length) = match layout {
            PinLayout::Quad => (dims.overall_size_x.nominal, dims.overall_size_y.nominal),
            PinLayout::LeftRight => (dims.overall_size_x.nominal, dims.body_size_y.nominal),
            PinLayout::TopBottom => (dims.overall_size_y.nominal, dims.body_size_x.nominal),
        };
        let ipc = ipc_name(layout.is_quad(), params.pitch, span, length, pincount, self.density);

        let policy = NamePolicy::select(params.custom_name_format.as_deref(), dims.exposed_pad.as_ref());
        let templates = config.name_templates();
        let fields = NameFields {
            manufacturer: &params.manufacturer,
            part_number: &params.part_number,
            package: &header.device_type,
            pincount,
            size_x: dims.body_size_x.nominal,
            size_y: dims.body_size_y.nominal,
            pitch: params.pitch,
            suffix: &suffix,
            vias: if with_thermal_vias { config.thermal_via_suffix.as_str() } else { "" },
            ipc_name: &ipc,
        };
        let fp_name = policy.render(&templates, &fields)?;
        let fp_name_3d = policy.render(
            &templates,
            &NameFields {
                suffix: suffix_3d,
                vias: "",
                ..fields
            },
        )?;

        let mut footprint = Footprint::new(fp_name.as_str());
        footprint.description = format!(
            "{} {} {}, {} Pin ({}), generated with gullwing-fpgen",
            params.manufacturer, params.part_number, header.device_type, pincount, params.size_source
        )
        .trim_start()
        .to_string();
        footprint.tags = render_template(
            &config.keyword_fp_string,
            &TemplateValues::from([
                ("man", params.manufacturer.as_str().into()),
                ("package", header.device_type.as_str().into()),
                ("category", header.library_suffix.as_str().into()),
            ]),
        )?
        .trim_start()
        .to_string();

        let style = PadStyle::from_config(config);
        footprint.add_pads(pad_border(
            layout,
            pads,
            params.num_pins_x,
            params.num_pins_y,
            params.pitch,
            style,
        ));
        if let Some(ep) = &dims.exposed_pad {
            let exposed = ExposedPad {
                number: pincount + 1,
                size: ep.nominal(),
                mask: ep.mask_nominal(),
                paste_coverage: params.paste_coverage(with_thermal_vias),
                paste_grid: params.paste_grid(with_thermal_vias),
                thermal_vias: params.thermal_vias.as_ref().filter(|_| with_thermal_vias),
            };
            footprint.add_pads(exposed.pads(style));
        }

        let body = Rect::centred(dims.body_size_x.nominal, dims.body_size_y.nominal);
        let outline = PackageOutline::new(
            *pads,
            params.num_pins_x,
            params.num_pins_y,
            params.pitch,
            body,
            dims.exposed_pad.as_ref().map(|ep| ep.nominal()),
        );
        let mut warnings = outline.warnings.clone();

        match outline.silkscreen(config) {
            Some(lines) => footprint.add_lines(lines),
            None => warnings.push("exposed pad larger than body, no silkscreen outline created".to_string()),
        }
        footprint.add_lines(outline.fabrication(config));
        let courtyard = outline.courtyard(config, coeffs.courtyard);
        footprint.add_lines(courtyard.lines);

        for text in text_fields(config, &body, courtyard.extent, &fp_name) {
            footprint.add_text(text);
        }

        footprint.set_model(format!(
            "{}{}.3dshapes/{}.wrl",
            config.model3d_path_prefix, lib_name, fp_name_3d
        ));

        Ok(FootprintVariant {
            footprint,
            lib_name,
            with_thermal_vias,
            warnings,
        })
    }

    /// Writes a variant below `out_dir`, plus a JSON dump next to it if
    /// requested. Returns the `.kicad_mod` path.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_variant(&self, variant: &FootprintVariant, out_dir: &Path, json: bool) -> GeneratorResult<PathBuf> {
        let path = variant.output_path(out_dir);
        write_kicad_mod(&variant.footprint, &path)?;
        if json {
            write_json(&variant.footprint, &path.with_extension("json"))?;
        }
        info!(path = %path.display(), "Generated footprint");
        Ok(path)
    }

    fn generate_device(
        &self,
        name: &str,
        params: &DeviceParams,
        header: &FileHeader,
        out_dir: &Path,
        json: bool,
    ) -> GeneratorResult<Vec<PathBuf>> {
        self.build_variants(name, params, header)?
            .iter()
            .map(|variant| {
                for message in &variant.warnings {
                    warn!(footprint = %variant.footprint.name, "{message}");
                }
                self.write_variant(variant, out_dir, json)
            })
            .collect()
    }

    /// Generates every device in a size definition file.
    ///
    /// A failing device is logged and listed in the report; the remaining
    /// devices are still generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file itself cannot be read or parsed.
    pub fn process_file(&self, path: &Path, out_dir: &Path, json: bool) -> GeneratorResult<FileReport> {
        let file = DeviceFile::load(path)?;
        debug!(
            path = %path.display(),
            devices = file.devices.len(),
            device_type = %file.header.device_type,
            "Loaded size definitions"
        );

        let mut report = FileReport::default();
        for (name, params) in &file.devices {
            let result = match params {
                Ok(params) => self.generate_device(name, params, &file.header, out_dir, json),
                Err(e) => {
                    error!(device = %name, error = %e, "Skipping malformed device");
                    report.failed.push(name.clone());
                    continue;
                }
            };

            match result {
                Ok(paths) => report.written.extend(paths),
                Err(e) => {
                    error!(device = %name, error = %e, "Failed to generate footprint");
                    report.failed.push(name.clone());
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::primitives::{Layer, PadKind};

    const SOIC: &str = r"
size_source: 'JEDEC MS-012AA'
body_size_x: {minimum: 3.8, maximum: 4.0}
body_size_y: {minimum: 4.8, maximum: 5.0}
overall_size_x: {minimum: 5.8, maximum: 6.2}
lead_width: {minimum: 0.31, maximum: 0.51}
lead_len: {minimum: 0.4, maximum: 1.27}
pitch: 1.27
num_pins_x: 0
num_pins_y: 4
";

    fn header() -> FileHeader {
        FileHeader {
            library_suffix: "SO".to_string(),
            device_type: "SOIC".to_string(),
        }
    }

    fn generator() -> Gullwing {
        Gullwing::new(Config::default(), IpcStandards::builtin(), DensityLevel::Nominal)
    }

    fn params(yaml: &str) -> DeviceParams {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn soic_variant() {
        let variants = generator().build_variants("soic8", &params(SOIC), &header()).unwrap();
        assert_eq!(variants.len(), 1);
        let variant = &variants[0];
        let fp = &variant.footprint;

        assert_eq!(fp.name, "SOIC-8_3.9x4.9mm_P1.27mm");
        assert_eq!(variant.lib_name, "Package_SO");
        assert_eq!(fp.description, "SOIC, 8 Pin (JEDEC MS-012AA), generated with gullwing-fpgen");
        assert_eq!(fp.tags, "SOIC SO");
        assert_eq!(fp.pads.len(), 8);
        assert!(fp.lines.iter().any(|l| l.layer == Layer::FSilkS));
        assert!(fp.lines.iter().any(|l| l.layer == Layer::FCrtYd));
        assert_eq!(fp.texts[2].text, fp.name);
        assert_eq!(
            fp.model_3d.as_ref().unwrap().path,
            "${KISYS3DMOD}/Package_SO.3dshapes/SOIC-8_3.9x4.9mm_P1.27mm.wrl"
        );
        assert!(variant.warnings.is_empty());
        assert_eq!(
            variant.output_path(Path::new("out")),
            Path::new("out/Package_SO.pretty/SOIC-8_3.9x4.9mm_P1.27mm.kicad_mod")
        );
    }

    #[test]
    fn thermal_via_variant_comes_first() {
        let yaml = format!(
            "{SOIC}EP_size_x: 2.41\nEP_size_y: 3.1\nthermal_vias:\n  count: [2, 3]\n  drill: 0.2\n"
        );
        let variants = generator().build_variants("soic8ep", &params(&yaml), &header()).unwrap();
        assert_eq!(variants.len(), 2);
        assert!(variants[0].with_thermal_vias);
        assert_eq!(variants[0].footprint.name, "SOIC-8-1EP_3.9x4.9mm_P1.27mm_EP2.41x3.1mm_ThermalVias");
        assert_eq!(variants[1].footprint.name, "SOIC-8-1EP_3.9x4.9mm_P1.27mm_EP2.41x3.1mm");
        assert!(variants[0].footprint.pads.iter().any(|p| p.kind == PadKind::ThruHole));
        assert!(!variants[1].footprint.pads.iter().any(|p| p.kind == PadKind::ThruHole));
        // both variants share one 3D model
        assert_eq!(variants[0].footprint.model_3d, variants[1].footprint.model_3d);
    }

    #[test]
    fn suffix_left_out_of_model_path() {
        let yaml = format!("{SOIC}suffix: '_Pad{{pad_x:.2f}}mm'\ninclude_suffix_in_3dpath: 'False'\n");
        let variants = generator().build_variants("soic8", &params(&yaml), &header()).unwrap();
        let fp = &variants[0].footprint;
        assert!(fp.name.starts_with("SOIC-8_3.9x4.9mm_P1.27mm_Pad"));
        assert!(fp.model_3d.as_ref().unwrap().path.ends_with("/SOIC-8_3.9x4.9mm_P1.27mm.wrl"));
    }

    #[test]
    fn custom_name_format() {
        let yaml = format!("{SOIC}custom_name_format: '{{pkg}}-{{pincount}}_{{ipc_name}}'\n");
        let variants = generator().build_variants("soic8", &params(&yaml), &header()).unwrap();
        assert_eq!(variants[0].footprint.name, "SOIC-8_SOP127P600X490-8N");
    }

    #[test]
    fn invalid_via_paste_override_is_rejected() {
        let yaml = format!(
            "{SOIC}EP_size_x: 2.41\nEP_size_y: 3.1\nthermal_vias:\n  count: [2, 3]\n  EP_paste_coverage: -0.5\n  EP_num_paste_pads: [0, 2]\n"
        );
        let err = generator().build_variants("soic8ep", &params(&yaml), &header()).unwrap_err();
        assert!(matches!(err, crate::error::GeneratorError::InvalidDevice { .. }));
    }

    #[test]
    fn inverted_tolerance_stack_is_rejected() {
        // heel spacing wider than the lead span
        let yaml = SOIC.replace("lead_len: {minimum: 0.4, maximum: 1.27}", "lead_inside: 9.0");
        let err = generator().build_variants("bad", &params(&yaml), &header()).unwrap_err();
        assert!(matches!(err, crate::error::GeneratorError::NonPositivePad { axis: "x", .. }));
    }
}
