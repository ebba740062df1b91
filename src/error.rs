//! Error types for gullwing-fpgen.
//!
//! Configuration problems are reported through [`ConfigError`]; everything that
//! can go wrong while turning a device record into a footprint is a
//! [`GeneratorError`].

use std::path::PathBuf;

use thiserror::Error;

/// Result type for footprint generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while generating a footprint.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A mandatory dimension is absent from the device record.
    #[error("missing dimension: {name}")]
    MissingDimension {
        /// Dimension name (or description of the alternatives).
        name: String,
    },

    /// A dimension is present but its values are inconsistent.
    #[error("invalid dimension '{name}': {message}")]
    InvalidDimension {
        /// Dimension name.
        name: String,
        /// Description of what's wrong.
        message: String,
    },

    /// The tolerance stack leaves no room for a pad.
    #[error(
        "non-positive pad geometry on {axis} axis: Zmax {z_max:.4} must exceed Gmin {g_min:.4}"
    )]
    NonPositivePad {
        /// Axis name ("x" or "y").
        axis: &'static str,
        /// Maximum toe-to-toe land span.
        z_max: f64,
        /// Minimum heel-to-heel land gap.
        g_min: f64,
    },

    /// The device record is structurally invalid.
    #[error("invalid device '{device}': {message}")]
    InvalidDevice {
        /// Device key from the size definition file.
        device: String,
        /// Description of what's wrong.
        message: String,
    },

    /// A name template could not be rendered.
    #[error("invalid name template '{template}': {message}")]
    Template {
        /// The offending template.
        template: String,
        /// Description of what's wrong.
        message: String,
    },

    /// Failed to write an output file.
    #[error("failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a device definition file.
    #[error("failed to read device file: {path}")]
    DeviceRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A device definition file is not valid YAML.
    #[error("failed to parse device file: {path}")]
    DeviceFile {
        /// Path to the file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON serialisation of a footprint failed.
    #[error("failed to serialise footprint: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeneratorError {
    /// Creates a missing dimension error.
    pub fn missing_dimension(name: impl Into<String>) -> Self {
        Self::MissingDimension { name: name.into() }
    }

    /// Creates an invalid dimension error.
    pub fn invalid_dimension(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDimension {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid device error.
    pub fn invalid_device(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDevice {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Creates a template error.
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}
