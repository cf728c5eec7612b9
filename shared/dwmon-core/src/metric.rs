//! Normalized metric records
//!
//! Every input plugin converts whatever it scrapes into `Record`s. A record
//! is one named measurement with one or more fields, sharing a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Fields = BTreeMap<String, FieldValue>;
pub type Tags = BTreeMap<String, String>;

/// Single field value of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::String(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Channel a record is delivered through.
///
/// Outputs only distinguish these four shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Gauge,
    Counter,
    Histogram,
    Untyped,
}

/// Kind of metric the record was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
    Meter,
    Timer,
}

impl MetricKind {
    /// Meters share the histogram channel; timers carry both a distribution
    /// and rates, so they go out untyped.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Gauge => ValueType::Gauge,
            Self::Counter => ValueType::Counter,
            Self::Histogram | Self::Meter => ValueType::Histogram,
            Self::Timer => ValueType::Untyped,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
            Self::Histogram => "histogram",
            Self::Meter => "meter",
            Self::Timer => "timer",
        }
    }
}

/// Normalized metric record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: MetricKind,
    pub name: String,
    pub fields: Fields,
    pub tags: Option<Tags>,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    pub fn new(kind: MetricKind, name: impl Into<String>, fields: Fields, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            name: name.into(),
            fields,
            tags: None,
            timestamp,
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_routed_as_histogram() {
        assert_eq!(MetricKind::Meter.value_type(), ValueType::Histogram);
        assert_eq!(MetricKind::Timer.value_type(), ValueType::Untyped);
        assert_eq!(MetricKind::Gauge.value_type(), ValueType::Gauge);
    }

    #[test]
    fn test_field_value_numeric() {
        assert!(FieldValue::Integer(3).is_numeric());
        assert_eq!(FieldValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(FieldValue::String("ok".into()).as_f64(), None);
    }

    #[test]
    fn test_record_field_names_sorted() {
        let mut fields = Fields::new();
        fields.insert("min".into(), 1i64.into());
        fields.insert("count".into(), 2i64.into());
        let record = Record::new(MetricKind::Histogram, "h", fields, Utc::now());
        assert_eq!(record.field_names(), vec!["count", "min"]);
        assert!(record.tags.is_none());
    }
}
