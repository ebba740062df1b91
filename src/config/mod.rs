//! Configuration file loading and parsing.
//!
//! Footprint style comes from two YAML documents: a global configuration
//! shared by all footprint generators (KLC line widths, naming templates,
//! text fields) and a series configuration for this package family. The
//! series document's top-level keys replace the global ones; the merged
//! mapping is then deserialised into a [`Config`] where every key has a
//! default.

mod settings;

pub use settings::{Config, LoggingConfig, TextFieldConfig, TextPosition};

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::ConfigError;

/// Reads a YAML document that must be a mapping (or empty).
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or not a YAML mapping.
pub fn read_mapping(path: &Path) -> Result<Mapping, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value: Value = serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        _ => Err(ConfigError::ValidationError {
            message: format!("{}: top level must be a mapping", path.display()),
        }),
    }
}

/// Shallow merge: every top-level key of `overrides` replaces the one in `base`.
#[must_use]
pub fn merge_mappings(mut base: Mapping, overrides: Mapping) -> Mapping {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

/// Loads, merges and validates the global and series configuration.
///
/// Missing paths fall back to the built-in defaults for every key.
///
/// # Errors
///
/// Returns an error if:
/// - A given configuration file cannot be found or read
/// - The YAML is malformed
/// - A value is invalid
pub fn load_config(global: Option<&Path>, series: Option<&Path>) -> Result<Config, ConfigError> {
    let mut merged = Mapping::new();
    let mut source = PathBuf::from("<defaults>");

    for path in [global, series].into_iter().flatten() {
        debug!(path = %path.display(), "Loading configuration");
        merged = merge_mappings(merged, read_mapping(path)?);
        source = path.to_path_buf();
    }

    let config: Config =
        serde_yaml::from_value(Value::Mapping(merged)).map_err(|e| ConfigError::ParseError {
            path: source,
            source: e,
        })?;

    config.validate()?;

    Ok(config)
}
