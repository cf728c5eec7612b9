//! Gauge values
//!
//! Dropwizard gauges wrap arbitrary JVM objects, so the JSON type of a
//! gauge's `value` is not declared anywhere. The variant is picked from the
//! shape of the token: integer first, then float, then string.

use serde::de::{Deserialize, Deserializer};
use serde_json::value::RawValue;

/// Decoded gauge value, exactly one variant is active
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Default for GaugeValue {
    /// A gauge without a `value` field reads as integer zero.
    fn default() -> Self {
        Self::Integer(0)
    }
}

impl GaugeValue {
    /// Classify the raw JSON text of a `value` token.
    ///
    /// Never fails: anything that is not a number ends up as `String`
    /// with one pair of surrounding quotes removed.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if let Some(value) = Self::parse_number(token) {
            return value;
        }

        let unquoted = strip_quotes(token);
        if unquoted.len() != token.len() {
            if let Some(value) = Self::parse_number(unquoted) {
                return value;
            }
        }

        Self::String(unquoted.to_string())
    }

    fn parse_number(text: &str) -> Option<Self> {
        if let Ok(v) = text.parse::<i64>() {
            return Some(Self::Integer(v));
        }
        // out-of-range literals like 1e400 overflow to infinity; not a number
        text.parse::<f64>().ok().filter(|v| v.is_finite()).map(Self::Float)
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::String(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

fn strip_quotes(token: &str) -> &str {
    let token = token.strip_prefix('"').unwrap_or(token);
    token.strip_suffix('"').unwrap_or(token)
}

impl<'de> Deserialize<'de> for GaugeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self::from_token(raw.get()))
    }
}
