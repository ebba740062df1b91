//! gullwing-fpgen: KiCad footprint generator for gull-wing packages
//!
//! Reads size definition files and writes one footprint per device (two for
//! devices with thermal vias) into `<library>.pretty` directories.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use gullwing_fpgen::config;
use gullwing_fpgen::generator::Gullwing;
use gullwing_fpgen::ipc7351::density::DensityLevel;
use gullwing_fpgen::ipc7351::standards::IpcStandards;

/// IPC-7351B footprint generator for QFP, SOIC and SO packages.
///
/// Each FILE is a YAML size definition with a `FileHeader` entry and one
/// entry per device.
#[derive(Parser, Debug)]
#[command(name = "gullwing-fpgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Size definition files (glob patterns are expanded)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<String>,

    /// Global style configuration (KLC)
    #[arg(long, value_name = "PATH")]
    global_config: Option<PathBuf>,

    /// Series configuration, overriding keys of the global configuration
    #[arg(long, value_name = "PATH")]
    series_config: Option<PathBuf>,

    /// Density level (L, N or M)
    #[arg(long, default_value = "N")]
    density: DensityLevel,

    /// IPC definition document; the built-in IPC-7351B tables are used if omitted
    #[arg(long, value_name = "PATH")]
    ipc_doc: Option<PathBuf>,

    /// Generate rectangular instead of rounded rectangle pads
    #[arg(long)]
    force_rectangle_pads: bool,

    /// Create footprints compatible with KiCad 4
    #[arg(long)]
    kicad4_compatible: bool,

    /// Directory the libraries are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Also write each footprint as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands glob patterns; arguments without matches are kept as given so
/// the missing file is reported.
fn expand_files(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map(|paths| paths.filter_map(Result::ok).collect())
            .unwrap_or_default();
        if matches.is_empty() {
            files.push(PathBuf::from(pattern));
        } else {
            files.extend(matches);
        }
    }
    files
}

/// Entry point for gullwing-fpgen.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let mut cfg = match config::load_config(args.global_config.as_deref(), args.series_config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    cfg.apply_overrides(args.force_rectangle_pads, args.kicad4_compatible);

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let standards = match args.ipc_doc.as_deref().map(IpcStandards::load) {
        Some(Ok(standards)) => standards,
        Some(Err(e)) => {
            error!(error = %e, "Failed to load IPC definitions");
            return ExitCode::FAILURE;
        }
        None => IpcStandards::builtin(),
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        density = %args.density,
        "Starting gullwing-fpgen"
    );

    let generator = Gullwing::new(cfg, standards, args.density);
    let out_dir: &Path = &args.output_dir;
    let mut failures = 0usize;
    let mut written = 0usize;

    for path in expand_files(&args.files) {
        match generator.process_file(&path, out_dir, args.json) {
            Ok(report) => {
                written += report.written.len();
                if !report.failed.is_empty() {
                    warn!(
                        path = %path.display(),
                        failed = ?report.failed,
                        "Some devices were not generated"
                    );
                    failures += report.failed.len();
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to process file");
                failures += 1;
            }
        }
    }

    info!(written, failures, "Done");

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
