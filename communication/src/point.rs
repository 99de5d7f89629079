use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Tags = BTreeMap<String, String>;
pub type Fields = BTreeMap<String, FieldValue>;

/// One timestamped measurement. Immutable once built; the only way in is
/// [`Point::new`], which enforces the shape the store accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    measurement: String,
    tags: Tags,
    fields: Fields,
    unix_nanos: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PointError {
    #[error("measurement name must not be empty")]
    EmptyMeasurement,

    #[error("point for {measurement} has no fields")]
    NoFields { measurement: String },

    #[error("point for {measurement} has an empty tag or field key")]
    EmptyKey { measurement: String },

    #[error("field {field} of {measurement} is not a finite number")]
    NonFiniteField { measurement: String, field: String },

    #[error("point for {measurement:?} contains a line break")]
    LineBreak { measurement: String },
}

impl Point {
    /// Builds a point. When `unix_nanos` is `None` the point is stamped with
    /// the current wall clock.
    pub fn new(
        measurement: impl Into<String>,
        tags: Tags,
        fields: Fields,
        unix_nanos: Option<u64>,
    ) -> Result<Point, PointError> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(PointError::EmptyMeasurement);
        }
        if fields.is_empty() {
            return Err(PointError::NoFields { measurement });
        }
        if tags.keys().chain(fields.keys()).any(|key| key.is_empty()) {
            return Err(PointError::EmptyKey { measurement });
        }
        if has_line_break(&measurement)
            || tags
                .iter()
                .any(|(key, value)| has_line_break(key) || has_line_break(value))
            || fields.keys().any(|key| has_line_break(key))
        {
            return Err(PointError::LineBreak { measurement });
        }
        if let Some((field, _)) = fields
            .iter()
            .find(|(_, value)| matches!(value, FieldValue::Float(f) if !f.is_finite()))
        {
            return Err(PointError::NonFiniteField {
                field: field.clone(),
                measurement,
            });
        }

        Ok(Point {
            measurement,
            tags,
            fields,
            unix_nanos: unix_nanos.unwrap_or_else(now_unix_nanos),
        })
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn unix_nanos(&self) -> u64 {
        self.unix_nanos
    }
}

/// Line protocol separates points with newlines and has no escape for them
/// outside string field values.
pub(crate) fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

pub fn now_unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos() as u64
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// Timestamp resolution used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
        }
    }

    pub fn convert(&self, unix_nanos: u64) -> u64 {
        match self {
            Precision::Nanoseconds => unix_nanos,
            Precision::Microseconds => unix_nanos / 1_000,
            Precision::Milliseconds => unix_nanos / 1_000_000,
            Precision::Seconds => unix_nanos / 1_000_000_000,
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown precision {0:?}, expected one of ns, u, ms, s")]
pub struct UnknownPrecision(pub String);

impl FromStr for Precision {
    type Err = UnknownPrecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" | "n" => Ok(Precision::Nanoseconds),
            "u" | "us" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            other => Err(UnknownPrecision(other.to_string())),
        }
    }
}
