//! Dropwizard metrics document model
//!
//! Mirrors the JSON written by Dropwizard's `MetricsServlet`. Unknown
//! fields are ignored and missing or `null` fields read as zero, so newer
//! servers with extra attributes still decode. The document and every
//! metric payload must be a JSON object (or `null`); arrays and scalars
//! are rejected.

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::gauge::GaugeValue;

/// Root of a metrics response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct MetricsDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gauges: HashMap<String, Gauge>,
    #[serde(deserialize_with = "null_as_default")]
    pub counters: HashMap<String, Counter>,
    #[serde(deserialize_with = "null_as_default")]
    pub histograms: HashMap<String, Histogram>,
    #[serde(deserialize_with = "null_as_default")]
    pub meters: HashMap<String, Meter>,
    #[serde(deserialize_with = "null_as_default")]
    pub timers: HashMap<String, Timer>,
}

impl MetricsDocument {
    /// Total number of metrics across all five kinds
    pub fn len(&self) -> usize {
        self.gauges.len()
            + self.counters.len()
            + self.histograms.len()
            + self.meters.len()
            + self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct Gauge {
    pub value: GaugeValue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct Counter {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
}

/// Histogram snapshot. `max` and `min` are sampled values and stay integral.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct Histogram {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub max: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub mean: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub min: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub p50: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p75: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p95: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p98: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p99: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p999: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub stddev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct Meter {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub m15_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub m1_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub m5_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub mean_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub units: String,
}

/// Timer snapshot: a duration histogram plus an invocation meter.
///
/// Durations are already scaled to `duration_units`, so every statistic is
/// floating point here, `max` and `min` included.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct Timer {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub max: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub mean: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p50: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p75: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p95: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p98: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p99: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub p999: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub stddev: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub m15_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub m1_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub m5_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub mean_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub duration_units: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rate_units: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Derived field-by-field decoding, reached only once the input is known
/// to be a JSON object.
trait ObjectPayload: Default + Sized {
    fn from_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

struct ObjectVisitor<T>(PhantomData<T>);

impl<'de, T: ObjectPayload> Visitor<'de> for ObjectVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object or null")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<T, E> {
        Ok(T::default())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<T, E> {
        Ok(T::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
        T::from_fields(MapAccessDeserializer::new(map))
    }
}

macro_rules! object_payload {
    ($($ty:ident),* $(,)?) => {$(
        impl ObjectPayload for $ty {
            fn from_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                // inherent fn generated by `remote = "Self"`
                $ty::deserialize(deserializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(ObjectVisitor(PhantomData))
            }
        }
    )*};
}

object_payload!(MetricsDocument, Gauge, Counter, Histogram, Meter, Timer);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_must_be_objects() {
        assert!(serde_json::from_str::<Histogram>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<Counter>("[7]").is_err());
        assert!(serde_json::from_str::<Gauge>("[5]").is_err());
        assert!(serde_json::from_str::<Timer>("0.5").is_err());
        assert!(serde_json::from_str::<MetricsDocument>(r#"["gauges"]"#).is_err());
    }

    #[test]
    fn test_null_payload_is_zero_valued() {
        assert_eq!(serde_json::from_str::<Counter>("null").unwrap(), Counter::default());
        assert_eq!(serde_json::from_str::<MetricsDocument>("null").unwrap(), MetricsDocument::default());
    }

    #[test]
    fn test_null_fields_read_as_zero() {
        let counter: Counter = serde_json::from_str(r#"{"count": null}"#).unwrap();
        assert_eq!(counter.count, 0);

        let meter: Meter = serde_json::from_str(r#"{"count": 3, "m1_rate": null, "units": null}"#).unwrap();
        assert_eq!(meter.count, 3);
        assert_eq!(meter.m1_rate, 0.0);
        assert!(meter.units.is_empty());
    }
}
