//! Toleranced dimensions.
//!
//! Datasheets quote package dimensions either as a min/max pair or as a
//! nominal value with a (possibly asymmetric) tolerance. [`ToleranceSpec`]
//! normalises both into `minimum <= nominal <= maximum`.
//!
//! # Accepted YAML shapes
//!
//! ```yaml
//! body_size_x: 7.0                 # exact
//! body_size_y:
//!   minimum: 6.8
//!   maximum: 7.2                   # nominal = 7.0
//! lead_width:
//!   nominal: 0.37
//!   tolerance: 0.08                # symmetric
//! lead_len:
//!   nominal: 0.6
//!   tolerance: [-0.15, 0.15]       # [minus, plus]
//! overall_size_x_min: 8.8          # flat keys: _min, _max, _nom, _tol
//! overall_size_x_max: 9.2
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{GeneratorError, GeneratorResult};

/// Slack allowed when checking `minimum <= nominal <= maximum`.
const ORDER_EPSILON: f64 = 1e-9;

/// A nominal value with its lower and upper limits (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    /// Nominal (datasheet typical) value.
    pub nominal: f64,
    /// Lower limit.
    pub minimum: f64,
    /// Upper limit.
    pub maximum: f64,
}

impl ToleranceSpec {
    /// Creates a dimension without tolerance.
    #[must_use]
    pub const fn exact(value: f64) -> Self {
        Self {
            nominal: value,
            minimum: value,
            maximum: value,
        }
    }

    /// Creates a dimension from a nominal value and a symmetric tolerance.
    #[must_use]
    pub fn symmetric(nominal: f64, tolerance: f64) -> Self {
        Self::asymmetric(nominal, tolerance, tolerance)
    }

    /// Creates a dimension from a nominal value and separate minus/plus tolerances.
    ///
    /// The sign of `minus` and `plus` is ignored.
    #[must_use]
    pub fn asymmetric(nominal: f64, minus: f64, plus: f64) -> Self {
        Self {
            nominal,
            minimum: nominal - minus.abs(),
            maximum: nominal + plus.abs(),
        }
    }

    /// Creates a dimension from explicit limits, optionally with a nominal value.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDimension`] if the limits are out of order
    /// or the nominal value lies outside them.
    pub fn from_limits(
        name: &str,
        minimum: f64,
        nominal: Option<f64>,
        maximum: f64,
    ) -> GeneratorResult<Self> {
        if minimum > maximum + ORDER_EPSILON {
            return Err(GeneratorError::invalid_dimension(
                name,
                format!("minimum {minimum} exceeds maximum {maximum}"),
            ));
        }
        let nominal = nominal.unwrap_or_else(|| (minimum + maximum) / 2.0);
        if nominal < minimum - ORDER_EPSILON || nominal > maximum + ORDER_EPSILON {
            return Err(GeneratorError::invalid_dimension(
                name,
                format!("nominal {nominal} outside [{minimum}, {maximum}]"),
            ));
        }
        Ok(Self {
            nominal,
            minimum,
            maximum,
        })
    }

    /// Total tolerance band (`maximum - minimum`).
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.maximum - self.minimum
    }

    /// Distance from nominal down to the lower limit.
    #[must_use]
    pub fn minus(&self) -> f64 {
        self.nominal - self.minimum
    }

    /// Distance from nominal up to the upper limit.
    #[must_use]
    pub fn plus(&self) -> f64 {
        self.maximum - self.nominal
    }

    /// Reads the dimension `name` from a device record.
    ///
    /// Returns `Ok(None)` when neither the nested key nor any of the flat
    /// `_min`/`_max`/`_nom`/`_tol` keys are present.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDimension`] if the entry is present but
    /// malformed or inconsistent.
    pub fn from_record(record: &IndexMap<String, Value>, name: &str) -> GeneratorResult<Option<Self>> {
        let flat = |suffix: &str| record.get(&format!("{name}_{suffix}"));
        let has_flat = ["min", "max", "nom", "tol"]
            .iter()
            .any(|suffix| flat(suffix).is_some());

        if has_flat {
            let parts = RawParts {
                minimum: number(name, flat("min"))?,
                maximum: number(name, flat("max"))?,
                nominal: number(name, flat("nom"))?,
                tolerance: tolerance(name, flat("tol"))?,
            };
            return parts.resolve(name).map(Some);
        }

        match record.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::from_value(name, value).map(Some),
        }
    }

    /// Parses a single YAML value (scalar or mapping) as a toleranced dimension.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDimension`] if the value cannot be interpreted.
    pub fn from_value(name: &str, value: &Value) -> GeneratorResult<Self> {
        match value {
            Value::Number(_) => number(name, Some(value)).map(|v| Self::exact(v.unwrap_or_default())),
            Value::Mapping(map) => {
                let get = |key: &str| map.get(key);
                let parts = RawParts {
                    minimum: number(name, get("minimum"))?,
                    maximum: number(name, get("maximum"))?,
                    nominal: number(name, get("nominal"))?,
                    tolerance: tolerance(name, get("tolerance"))?,
                };
                parts.resolve(name)
            }
            other => Err(GeneratorError::invalid_dimension(
                name,
                format!("expected a number or a mapping, found {other:?}"),
            )),
        }
    }
}

/// Fields as they appear in the record, before consistency checks.
struct RawParts {
    minimum: Option<f64>,
    maximum: Option<f64>,
    nominal: Option<f64>,
    tolerance: Option<(f64, f64)>,
}

impl RawParts {
    fn resolve(self, name: &str) -> GeneratorResult<ToleranceSpec> {
        match (self.minimum, self.nominal, self.maximum, self.tolerance) {
            (Some(min), nom, Some(max), _) => ToleranceSpec::from_limits(name, min, nom, max),
            (None, Some(nom), None, Some((minus, plus))) => {
                Ok(ToleranceSpec::asymmetric(nom, minus, plus))
            }
            (Some(min), Some(nom), None, None) => {
                ToleranceSpec::from_limits(name, min, Some(nom), 2.0f64.mul_add(nom, -min))
            }
            (None, Some(nom), Some(max), None) => {
                ToleranceSpec::from_limits(name, 2.0f64.mul_add(nom, -max), Some(nom), max)
            }
            (None, Some(nom), None, None) => Ok(ToleranceSpec::exact(nom)),
            _ => Err(GeneratorError::invalid_dimension(
                name,
                "need minimum and maximum, or nominal with optional tolerance",
            )),
        }
    }
}

fn number(name: &str, value: Option<&Value>) -> GeneratorResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
            GeneratorError::invalid_dimension(name, format!("expected a number, found {v:?}"))
        }),
    }
}

fn tolerance(name: &str, value: Option<&Value>) -> GeneratorResult<Option<(f64, f64)>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => match items.as_slice() {
            [minus, plus] => {
                let minus = number(name, Some(minus))?.unwrap_or_default();
                let plus = number(name, Some(plus))?.unwrap_or_default();
                Ok(Some((minus.abs(), plus.abs())))
            }
            _ => Err(GeneratorError::invalid_dimension(
                name,
                "tolerance list must be [minus, plus]",
            )),
        },
        Some(v) => number(name, Some(v)).map(|t| t.map(|t| (t.abs(), t.abs()))),
    }
}
