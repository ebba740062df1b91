//! End-to-end footprint generation tests.
//!
//! These tests run the generator on the bundled size definition files and
//! on small inline device records, and check the written `.kicad_mod` files
//! as well as the assembled footprints.

use std::path::{Path, PathBuf};

use gullwing_fpgen::config::{self, Config};
use gullwing_fpgen::error::GeneratorError;
use gullwing_fpgen::footprint::primitives::{Layer, PadKind};
use gullwing_fpgen::footprint::Footprint;
use gullwing_fpgen::generator::device::{DeviceFile, DeviceParams};
use gullwing_fpgen::generator::Gullwing;
use gullwing_fpgen::ipc7351::density::DensityLevel;
use gullwing_fpgen::ipc7351::standards::IpcStandards;
use tempfile::TempDir;

/// Creates a temporary directory inside `.tmp/` for test isolation.
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
fn test_temp_dir() -> TempDir {
    let tmp_root = Path::new(".tmp");
    std::fs::create_dir_all(tmp_root).expect("Failed to create .tmp directory");
    let tmp_root = tmp_root
        .canonicalize()
        .expect("Failed to canonicalize .tmp path");
    tempfile::tempdir_in(&tmp_root).expect("Failed to create temp dir")
}

/// Helper to compare floats with tolerance.
fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

const COORD_TOLERANCE: f64 = 1e-6;

fn data_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

fn klc_config() -> Config {
    config::load_config(
        Some(&data_path("config_KLCv3.0.yaml")),
        Some(&data_path("package_config_KLCv3.yaml")),
    )
    .expect("bundled configuration loads")
}

fn generator() -> Gullwing {
    Gullwing::new(klc_config(), IpcStandards::builtin(), DensityLevel::Nominal)
}

fn build(file: &str, device: &str) -> Vec<gullwing_fpgen::generator::FootprintVariant> {
    let parsed = DeviceFile::load(&data_path(file)).expect("size definitions parse");
    let params = parsed
        .devices
        .iter()
        .find(|(name, _)| name == device)
        .map(|(_, params)| params.as_ref().expect("device record is valid"))
        .expect("device present");
    generator()
        .build_variants(device, params, &parsed.header)
        .expect("footprint builds")
}

fn pad<'a>(footprint: &'a Footprint, number: &str) -> &'a gullwing_fpgen::footprint::primitives::Pad {
    footprint
        .pads
        .iter()
        .find(|p| p.number == number)
        .unwrap_or_else(|| panic!("pad {number} missing"))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write size definition");
    path
}

// =============================================================================
// Size definition files
// =============================================================================

#[test]
fn soic_file_writes_library() {
    let out = test_temp_dir();
    let report = generator()
        .process_file(&data_path("size_definitions/soic.yaml"), out.path(), false)
        .expect("file processed");

    assert!(report.failed.is_empty(), "failed: {:?}", report.failed);
    // two plain devices plus both variants of the PowerPAD device
    assert_eq!(report.written.len(), 4);

    let lib = out.path().join("Package_SO.pretty");
    let soic8 = lib.join("SOIC-8_3.9x4.9mm_P1.27mm.kicad_mod");
    assert!(soic8.exists());
    assert!(lib.join("SOIC-14_3.9x8.7mm_P1.27mm.kicad_mod").exists());

    let via_variants = report
        .written
        .iter()
        .filter(|p| p.to_string_lossy().ends_with("_ThermalVias.kicad_mod"))
        .count();
    assert_eq!(via_variants, 1);

    let contents = std::fs::read_to_string(&soic8).unwrap();
    assert!(contents.starts_with("(module SOIC-8_3.9x4.9mm_P1.27mm (layer F.Cu)"));
    assert!(contents.contains("(attr smd)"));
    assert!(contents.contains("(fp_text reference REF** "));
    assert!(contents.contains("(fp_text value SOIC-8_3.9x4.9mm_P1.27mm "));
    assert!(contents.contains("(layer F.SilkS)"));
    assert!(contents.contains("(layer F.CrtYd)"));
    assert!(contents.contains("(pad 8 smd roundrect"));
    assert!(contents.contains("(model ${KISYS3DMOD}/Package_SO.3dshapes/SOIC-8_3.9x4.9mm_P1.27mm.wrl"));
    assert!(contents.trim_end().ends_with(')'));
}

#[test]
fn qfp_file_writes_library() {
    let out = test_temp_dir();
    let report = generator()
        .process_file(&data_path("size_definitions/qfp.yaml"), out.path(), false)
        .expect("file processed");

    assert!(report.failed.is_empty(), "failed: {:?}", report.failed);
    let lib = out.path().join("Package_QFP.pretty");
    assert!(lib.join("LQFP-64_10x10mm_P0.5mm.kicad_mod").exists());
    assert!(lib.join("LQFP-48-1EP_7x7mm_P0.5mm_EP3.6x3.6mm.kicad_mod").exists());
}

#[test]
fn output_is_deterministic() {
    let first = test_temp_dir();
    let second = test_temp_dir();
    let generator = generator();
    let input = data_path("size_definitions/soic.yaml");

    let a = generator.process_file(&input, first.path(), false).unwrap();
    let b = generator.process_file(&input, second.path(), false).unwrap();
    assert_eq!(a.written.len(), b.written.len());

    for (left, right) in a.written.iter().zip(&b.written) {
        assert_eq!(left.file_name(), right.file_name());
        let left = std::fs::read(left).unwrap();
        let right = std::fs::read(right).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn json_dump_next_to_footprint() {
    let out = test_temp_dir();
    let report = generator()
        .process_file(&data_path("size_definitions/qfp.yaml"), out.path(), true)
        .unwrap();

    let json_path = report.written[0].with_extension("json");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["name"], "LQFP-64_10x10mm_P0.5mm");
    assert_eq!(value["pads"].as_array().map(Vec::len), Some(64));
}

// =============================================================================
// Footprint geometry
// =============================================================================

#[test]
fn quad_pins_run_counter_clockwise() {
    let variants = build("size_definitions/qfp.yaml", "LQFP-64_10x10mm_P0.5mm");
    assert_eq!(variants.len(), 1);
    let fp = &variants[0].footprint;
    assert_eq!(fp.pads.len(), 64);

    // left column, top to bottom
    let first = pad(fp, "1");
    assert!(first.at.x < 0.0);
    assert!(approx_eq(first.at.y, -3.75, COORD_TOLERANCE));
    assert!(approx_eq(pad(fp, "16").at.y, 3.75, COORD_TOLERANCE));

    // bottom row, left to right
    let bottom = pad(fp, "17");
    assert!(bottom.at.y > 0.0);
    assert!(approx_eq(bottom.at.x, -3.75, COORD_TOLERANCE));

    // right column, bottom to top
    let right = pad(fp, "33");
    assert!(right.at.x > 0.0);
    assert!(approx_eq(right.at.y, 3.75, COORD_TOLERANCE));

    // top row, right to left
    let last = pad(fp, "64");
    assert!(last.at.y < 0.0);
    assert!(approx_eq(last.at.x, -3.75, COORD_TOLERANCE));

    // opposite rows mirror each other
    assert!(approx_eq(first.at.x, -right.at.x, COORD_TOLERANCE));
    assert!(approx_eq(bottom.at.y, -last.at.y, COORD_TOLERANCE));
}

#[test]
fn courtyard_lies_on_grid_and_encloses_pads() {
    let variants = build("size_definitions/soic.yaml", "SOIC_8_3.9x4.9mm_P1.27mm");
    let fp = &variants[0].footprint;
    let grid = 0.01;

    let courtyard: Vec<_> = fp.lines.iter().filter(|l| l.layer == Layer::FCrtYd).collect();
    assert!(!courtyard.is_empty());
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for line in &courtyard {
        for point in [line.start, line.end] {
            assert!(approx_eq((point.x / grid).round() * grid, point.x, COORD_TOLERANCE));
            assert!(approx_eq((point.y / grid).round() * grid, point.y, COORD_TOLERANCE));
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
    }

    for pad in &fp.pads {
        assert!(pad.at.x + pad.size.x / 2.0 < max_x);
        assert!(pad.at.y + pad.size.y / 2.0 < max_y);
    }
}

#[test]
fn exposed_pad_gets_paste_grid() {
    let variants = build("size_definitions/qfp.yaml", "LQFP-48-1EP_7x7mm_P0.5mm");
    let fp = &variants[0].footprint;

    let ep = pad(fp, "49");
    assert!(approx_eq(ep.size.x, 3.6, COORD_TOLERANCE));
    assert_eq!(ep.layers, vec![Layer::FCu, Layer::FMask]);

    let paste: Vec<_> = fp.pads.iter().filter(|p| p.layers == [Layer::FPaste]).collect();
    assert_eq!(paste.len(), 9);
}

#[test]
fn thermal_via_variant() {
    let variants = build("size_definitions/soic.yaml", "TI_SO-PowerPAD-8_ThermalVias");
    assert_eq!(variants.len(), 2);

    let vias = &variants[0];
    let plain = &variants[1];
    assert!(vias.with_thermal_vias);
    assert!(!plain.with_thermal_vias);
    assert_eq!(vias.footprint.name, format!("{}_ThermalVias", plain.footprint.name));
    assert!(plain.footprint.name.starts_with("TI_SO-PowerPAD_SOIC-8-1EP_3.9x4.9mm_P1.27mm_EP"));

    let through = vias
        .footprint
        .pads
        .iter()
        .filter(|p| p.kind == PadKind::ThruHole)
        .count();
    assert_eq!(through, 6);
    assert!(vias.footprint.pads.iter().any(|p| p.layers == [Layer::BCu]));
    assert!(!plain.footprint.pads.iter().any(|p| p.kind == PadKind::ThruHole));

    // the via variant reuses the plain variant's model
    assert_eq!(vias.footprint.model_3d, plain.footprint.model_3d);
}

#[test]
fn oversized_exposed_pad_drops_silkscreen() {
    let params: DeviceParams = serde_yaml::from_str(
        r"
body_size_x: {minimum: 4.8, maximum: 5.0}
body_size_y: {minimum: 3.8, maximum: 4.0}
overall_size_y: {minimum: 5.8, maximum: 6.2}
lead_width: {minimum: 0.31, maximum: 0.51}
lead_len: {minimum: 0.4, maximum: 1.27}
EP_size_x: 6.0
EP_size_y: 2.0
pitch: 1.27
num_pins_x: 4
num_pins_y: 0
",
    )
    .unwrap();
    let header = serde_yaml::from_str("library_Suffix: SO\ndevice_type: SOIC\n").unwrap();

    let variants = generator().build_variants("wide_ep", &params, &header).unwrap();
    let variant = &variants[0];
    assert!(!variant.footprint.lines.iter().any(|l| l.layer == Layer::FSilkS));
    assert!(variant.footprint.lines.iter().any(|l| l.layer == Layer::FFab));
    assert!(variant.warnings.iter().any(|w| w.contains("silkscreen")));

    // pins on the top and bottom edges
    let first = pad(&variant.footprint, "1");
    assert!(first.at.y > 0.0);
    assert!(approx_eq(first.at.x, -1.905, COORD_TOLERANCE));
}

// =============================================================================
// Failure handling
// =============================================================================

const GOOD_DEVICE: &str = r"
good:
  body_size_x: {minimum: 3.8, maximum: 4.0}
  body_size_y: {minimum: 4.8, maximum: 5.0}
  overall_size_x: {minimum: 5.8, maximum: 6.2}
  lead_width: {minimum: 0.31, maximum: 0.51}
  lead_len: {minimum: 0.4, maximum: 1.27}
  pitch: 1.27
  num_pins_x: 0
  num_pins_y: 4
";

#[test]
fn failing_device_does_not_stop_file() {
    let dir = test_temp_dir();
    let contents = format!(
        "FileHeader:\n  library_Suffix: SO\n  device_type: SOIC\n\
no_overall:\n  body_size_x: 3.9\n  body_size_y: 4.9\n  lead_width: 0.4\n  lead_len: 0.8\n  pitch: 1.27\n  num_pins_x: 0\n  num_pins_y: 4\n\
no_pins:\n  body_size_x: 3.9\n  body_size_y: 4.9\n  overall_size_x: 6.0\n  lead_width: 0.4\n  lead_len: 0.8\n  pitch: 1.27\n  num_pins_x: 0\n  num_pins_y: 0\n\
{GOOD_DEVICE}"
    );
    let input = write_file(dir.path(), "mixed.yaml", &contents);
    let out = dir.path().join("out");

    let report = generator().process_file(&input, &out, false).unwrap();
    assert_eq!(report.failed, vec!["no_overall".to_string(), "no_pins".to_string()]);
    assert_eq!(report.written.len(), 1);
    assert!(report.written[0].exists());
}

#[test]
fn missing_overall_size_is_reported() {
    let params: DeviceParams = serde_yaml::from_str(
        "body_size_x: 3.9\nbody_size_y: 4.9\nlead_width: 0.4\nlead_len: 0.8\npitch: 1.27\nnum_pins_x: 0\nnum_pins_y: 4\n",
    )
    .unwrap();
    let header = serde_yaml::from_str("library_Suffix: SO\ndevice_type: SOIC\n").unwrap();
    let err = generator().build_variants("no_overall", &params, &header).unwrap_err();
    assert!(matches!(err, GeneratorError::MissingDimension { .. }));
}

#[test]
fn missing_header_fails_file() {
    let dir = test_temp_dir();
    let input = write_file(dir.path(), "headless.yaml", GOOD_DEVICE);
    assert!(generator().process_file(&input, dir.path(), false).is_err());
}

#[test]
fn missing_file_fails() {
    let dir = test_temp_dir();
    let err = generator()
        .process_file(&dir.path().join("absent.yaml"), dir.path(), false)
        .unwrap_err();
    assert!(matches!(err, GeneratorError::DeviceRead { .. }));
}
