//! Document → record normalization
//!
//! Each metric kind has a fixed field table. Integral schema fields become
//! integer fields, everything else float. Nothing is filtered or tagged
//! here; the pipeline does that downstream.

use chrono::{DateTime, Utc};
use dwmon_core::{FieldValue, Fields, MetricKind, Record};

use crate::gauge::GaugeValue;
use crate::schema::{Counter, Gauge, Histogram, Meter, MetricsDocument, Timer};

/// Fields emitted per histogram
pub const HISTOGRAM_FIELDS: [&str; 11] = [
    "count", "max", "mean", "min", "p50", "p75", "p95", "p98", "p99", "p999", "stddev",
];

/// Fields emitted per meter
pub const METER_FIELDS: [&str; 5] = ["count", "m15_rate", "m1_rate", "m5_rate", "mean_rate"];

/// Fields emitted per timer
pub const TIMER_FIELDS: [&str; 15] = [
    "count", "max", "mean", "min", "p50", "p75", "p95", "p98", "p99", "p999", "stddev",
    "m15_rate", "m1_rate", "m5_rate", "mean_rate",
];

/// Turn one decoded document into records stamped with `timestamp`.
///
/// String gauges produce nothing. Record order is unspecified.
pub fn normalize(doc: &MetricsDocument, timestamp: DateTime<Utc>) -> Vec<Record> {
    let mut records = Vec::with_capacity(doc.len());

    records.extend(doc.gauges.iter().filter_map(|(name, g)| {
        gauge_fields(g).map(|fields| Record::new(MetricKind::Gauge, name.as_str(), fields, timestamp))
    }));
    records.extend(
        doc.counters
            .iter()
            .map(|(name, c)| Record::new(MetricKind::Counter, name.as_str(), counter_fields(c), timestamp)),
    );
    records.extend(
        doc.histograms
            .iter()
            .map(|(name, h)| Record::new(MetricKind::Histogram, name.as_str(), histogram_fields(h), timestamp)),
    );
    records.extend(
        doc.meters
            .iter()
            .map(|(name, m)| Record::new(MetricKind::Meter, name.as_str(), meter_fields(m), timestamp)),
    );
    records.extend(
        doc.timers
            .iter()
            .map(|(name, t)| Record::new(MetricKind::Timer, name.as_str(), timer_fields(t), timestamp)),
    );

    records
}

fn fields<const N: usize>(pairs: [(&str, FieldValue); N]) -> Fields {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn gauge_fields(gauge: &Gauge) -> Option<Fields> {
    let value = match &gauge.value {
        GaugeValue::Integer(v) => FieldValue::Integer(*v),
        GaugeValue::Float(v) => FieldValue::Float(*v),
        GaugeValue::String(_) => return None,
    };
    Some(fields([("value", value)]))
}

fn counter_fields(counter: &Counter) -> Fields {
    fields([("count", counter.count.into())])
}

fn histogram_fields(h: &Histogram) -> Fields {
    fields([
        ("count", h.count.into()),
        ("max", h.max.into()),
        ("mean", h.mean.into()),
        ("min", h.min.into()),
        ("p50", h.p50.into()),
        ("p75", h.p75.into()),
        ("p95", h.p95.into()),
        ("p98", h.p98.into()),
        ("p99", h.p99.into()),
        ("p999", h.p999.into()),
        ("stddev", h.stddev.into()),
    ])
}

fn meter_fields(m: &Meter) -> Fields {
    fields([
        ("count", m.count.into()),
        ("m15_rate", m.m15_rate.into()),
        ("m1_rate", m.m1_rate.into()),
        ("m5_rate", m.m5_rate.into()),
        ("mean_rate", m.mean_rate.into()),
    ])
}

fn timer_fields(t: &Timer) -> Fields {
    fields([
        ("count", t.count.into()),
        ("max", t.max.into()),
        ("mean", t.mean.into()),
        ("min", t.min.into()),
        ("p50", t.p50.into()),
        ("p75", t.p75.into()),
        ("p95", t.p95.into()),
        ("p98", t.p98.into()),
        ("p99", t.p99.into()),
        ("p999", t.p999.into()),
        ("stddev", t.stddev.into()),
        ("m15_rate", t.m15_rate.into()),
        ("m1_rate", t.m1_rate.into()),
        ("m5_rate", t.m5_rate.into()),
        ("mean_rate", t.mean_rate.into()),
    ])
}
