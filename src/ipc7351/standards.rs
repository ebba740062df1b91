//! IPC land pattern coefficient tables.
//!
//! The tables are normally read from an IPC definitions YAML document:
//!
//! ```yaml
//! ipc_spec_gw_large_pitch:
//!   round_base:
//!     toe: 0.05
//!     heel: 0.05
//!     side: 0.01
//!   most:    {toe: 0.55, heel: 0.45, side: 0.05, courtyard: 0.5}
//!   nominal: {toe: 0.35, heel: 0.35, side: 0.03, courtyard: 0.25}
//!   least:   {toe: 0.15, heel: 0.25, side: 0.01, courtyard: 0.1}
//! ipc_spec_gw_small_pitch:
//!   ...
//! ```
//!
//! Other tables in the same document are ignored. Without a document the
//! built-in IPC-7351B values from [`density`](crate::ipc7351::density) are used.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ipc7351::density::{DensityLevel, PitchClass, SolderFilletGoals};

/// Rounding granularity for each term of the land pattern formula (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRoundBase")]
pub struct RoundBase {
    /// Granularity of `Zmax`.
    pub toe: f64,
    /// Granularity of `Gmin`.
    pub heel: f64,
    /// Granularity of `Xmax`.
    pub side: f64,
}

impl RoundBase {
    /// Same granularity for every term.
    #[must_use]
    pub const fn uniform(base: f64) -> Self {
        Self {
            toe: base,
            heel: base,
            side: base,
        }
    }
}

impl Default for RoundBase {
    fn default() -> Self {
        Self {
            toe: 0.05,
            heel: 0.05,
            side: 0.01,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoundBase {
    Uniform(f64),
    PerTerm { toe: f64, heel: f64, side: f64 },
}

impl From<RawRoundBase> for RoundBase {
    fn from(raw: RawRoundBase) -> Self {
        match raw {
            RawRoundBase::Uniform(base) => Self::uniform(base),
            RawRoundBase::PerTerm { toe, heel, side } => Self { toe, heel, side },
        }
    }
}

/// One density row of a gull-wing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRow {
    /// Toe fillet goal.
    pub toe: f64,
    /// Heel fillet goal.
    pub heel: f64,
    /// Side fillet goal.
    pub side: f64,
    /// Courtyard excess.
    pub courtyard: f64,
}

impl DensityRow {
    const fn builtin(density: DensityLevel, pitch: PitchClass) -> Self {
        let goals = SolderFilletGoals::for_gull_wing(density, pitch);
        Self {
            toe: goals.toe,
            heel: goals.heel,
            side: goals.side,
            courtyard: density.courtyard_excess(),
        }
    }
}

/// Gull-wing table for one pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GullWingTable {
    /// Rounding granularity.
    #[serde(default)]
    pub round_base: RoundBase,
    /// Most (M) density row.
    pub most: DensityRow,
    /// Nominal (N) density row.
    pub nominal: DensityRow,
    /// Least (L) density row.
    pub least: DensityRow,
}

impl GullWingTable {
    fn builtin(pitch: PitchClass) -> Self {
        Self {
            round_base: RoundBase::default(),
            most: DensityRow::builtin(DensityLevel::Most, pitch),
            nominal: DensityRow::builtin(DensityLevel::Nominal, pitch),
            least: DensityRow::builtin(DensityLevel::Least, pitch),
        }
    }

    const fn row(&self, density: DensityLevel) -> &DensityRow {
        match density {
            DensityLevel::Most => &self.most,
            DensityLevel::Nominal => &self.nominal,
            DensityLevel::Least => &self.least,
        }
    }
}

/// The gull-wing part of an IPC definitions document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcStandards {
    /// Table for pitch >= 0.625 mm.
    #[serde(rename = "ipc_spec_gw_large_pitch")]
    pub large_pitch: GullWingTable,
    /// Table for pitch < 0.625 mm.
    #[serde(rename = "ipc_spec_gw_small_pitch")]
    pub small_pitch: GullWingTable,
}

/// Coefficients selected for one device and density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IpcCoefficients {
    /// Solder fillet goals.
    pub goals: SolderFilletGoals,
    /// Courtyard excess around the land pattern.
    pub courtyard: f64,
    /// Rounding granularity.
    pub round_base: RoundBase,
}

impl IpcStandards {
    /// Returns the built-in IPC-7351B gull-wing tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            large_pitch: GullWingTable::builtin(PitchClass::Large),
            small_pitch: GullWingTable::builtin(PitchClass::Small),
        }
    }

    /// Loads the gull-wing tables from an IPC definitions document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or lacks the
    /// gull-wing tables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let standards: Self =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        standards.validate()?;
        Ok(standards)
    }

    /// Selects the coefficients for the given pitch and density.
    #[must_use]
    pub const fn coefficients(&self, pitch_class: PitchClass, density: DensityLevel) -> IpcCoefficients {
        let table = match pitch_class {
            PitchClass::Large => &self.large_pitch,
            PitchClass::Small => &self.small_pitch,
        };
        let row = table.row(density);
        IpcCoefficients {
            goals: SolderFilletGoals::new(row.toe, row.heel, row.side),
            courtyard: row.courtyard,
            round_base: table.round_base,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, table) in [
            ("ipc_spec_gw_large_pitch", &self.large_pitch),
            ("ipc_spec_gw_small_pitch", &self.small_pitch),
        ] {
            let base = table.round_base;
            if base.toe < 0.0 || base.heel < 0.0 || base.side < 0.0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{name}: round_base must not be negative"),
                });
            }
            for row in [&table.most, &table.nominal, &table.least] {
                if row.courtyard < 0.0 {
                    return Err(ConfigError::ValidationError {
                        message: format!("{name}: courtyard excess must not be negative"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"
ipc_spec_flat_no_lead:
  nominal: {toe: 0.3}
ipc_spec_gw_large_pitch:
  round_base:
    toe: 0.05
    heel: 0.05
    side: 0.01
  most: {toe: 0.55, heel: 0.45, side: 0.05, courtyard: 0.5}
  nominal: {toe: 0.35, heel: 0.35, side: 0.03, courtyard: 0.25}
  least: {toe: 0.15, heel: 0.25, side: 0.01, courtyard: 0.1}
ipc_spec_gw_small_pitch:
  round_base: 0.02
  most: {toe: 0.55, heel: 0.45, side: 0.01, courtyard: 0.5}
  nominal: {toe: 0.35, heel: 0.35, side: -0.02, courtyard: 0.25}
  least: {toe: 0.15, heel: 0.25, side: -0.04, courtyard: 0.1}
";

    #[test]
    fn parse_document_ignoring_other_tables() {
        let standards: IpcStandards = serde_yaml::from_str(DOC).unwrap();
        assert!((standards.large_pitch.nominal.toe - 0.35).abs() < f64::EPSILON);
        assert!((standards.small_pitch.round_base.side - 0.02).abs() < f64::EPSILON);
        assert!((standards.small_pitch.round_base.toe - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn builtin_matches_document_values() {
        let parsed: IpcStandards = serde_yaml::from_str(DOC).unwrap();
        let builtin = IpcStandards::builtin();
        assert_eq!(parsed.large_pitch, builtin.large_pitch);
        assert_eq!(parsed.small_pitch.nominal, builtin.small_pitch.nominal);
    }

    #[test]
    fn coefficient_selection() {
        let standards = IpcStandards::builtin();
        let coeffs = standards.coefficients(PitchClass::from_pitch(0.5), DensityLevel::Least);
        assert!((coeffs.goals.side - -0.04).abs() < f64::EPSILON);
        assert!((coeffs.courtyard - 0.1).abs() < f64::EPSILON);

        let coeffs = standards.coefficients(PitchClass::from_pitch(1.27), DensityLevel::Most);
        assert!((coeffs.goals.toe - 0.55).abs() < f64::EPSILON);
        assert!((coeffs.courtyard - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_table_is_an_error() {
        let result: Result<IpcStandards, _> = serde_yaml::from_str("ipc_spec_gw_large_pitch: {}");
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = IpcStandards::load(Path::new("/nonexistent/ipc_definitions.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
