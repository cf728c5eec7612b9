//! Per-input metric filtering
//!
//! `namepass`/`namedrop` select records by name, `fieldpass`/`fielddrop`
//! select fields inside a record. Patterns are shell globs. A record whose
//! fields are all filtered away is dropped.

use dwmon_core::{CoreError, Record, Result};
use glob::Pattern;
use serde::Deserialize;

/// Filter keys accepted in every input section
pub const FILTER_KEYS: [&str; 4] = ["namepass", "namedrop", "fieldpass", "fielddrop"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub namepass: Vec<String>,
    pub namedrop: Vec<String>,
    pub fieldpass: Vec<String>,
    pub fielddrop: Vec<String>,
}

/// Compiled filter
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    namepass: Vec<Pattern>,
    namedrop: Vec<Pattern>,
    fieldpass: Vec<Pattern>,
    fielddrop: Vec<Pattern>,
}

fn compile(key: &str, patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| CoreError::Config(format!("invalid {} pattern '{}': {}", key, p, e)))
        })
        .collect()
}

fn any_match(patterns: &[Pattern], s: &str) -> bool {
    patterns.iter().any(|p| p.matches(s))
}

impl MetricFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        Ok(Self {
            namepass: compile("namepass", &config.namepass)?,
            namedrop: compile("namedrop", &config.namedrop)?,
            fieldpass: compile("fieldpass", &config.fieldpass)?,
            fielddrop: compile("fielddrop", &config.fielddrop)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.namepass.is_empty()
            && self.namedrop.is_empty()
            && self.fieldpass.is_empty()
            && self.fielddrop.is_empty()
    }

    pub fn name_allowed(&self, name: &str) -> bool {
        (self.namepass.is_empty() || any_match(&self.namepass, name)) && !any_match(&self.namedrop, name)
    }

    pub fn field_allowed(&self, field: &str) -> bool {
        (self.fieldpass.is_empty() || any_match(&self.fieldpass, field)) && !any_match(&self.fielddrop, field)
    }

    /// Filter one record, `None` when nothing of it survives
    pub fn apply(&self, mut record: Record) -> Option<Record> {
        if !self.name_allowed(&record.name) {
            return None;
        }
        if !self.fieldpass.is_empty() || !self.fielddrop.is_empty() {
            record.fields.retain(|k, _| self.field_allowed(k));
        }
        if record.fields.is_empty() {
            return None;
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dwmon_core::{FieldValue, Fields, MetricKind};

    fn timer(name: &str) -> Record {
        let fields: Fields = ["count", "max", "p999", "m5_rate", "stddev"]
            .iter()
            .map(|k| (k.to_string(), FieldValue::Float(1.0)))
            .collect();
        Record::new(MetricKind::Timer, name, fields, Utc::now())
    }

    fn filter(config: FilterConfig) -> MetricFilter {
        MetricFilter::new(&config).unwrap()
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let f = MetricFilter::default();
        assert!(f.is_empty());
        assert_eq!(f.apply(timer("db.query")).unwrap().fields.len(), 5);
    }

    #[test]
    fn test_namedrop() {
        let f = filter(FilterConfig {
            namedrop: vec!["jvm.gc*".into(), "jvm.threads*".into()],
            ..Default::default()
        });
        assert!(f.apply(timer("jvm.gc.PS-Scavenge.count")).is_none());
        assert!(f.apply(timer("jvm.threads.count")).is_none());
        assert!(f.apply(timer("jvm.memory.heap.used")).is_some());
    }

    #[test]
    fn test_namepass_and_namedrop_combine() {
        let f = filter(FilterConfig {
            namepass: vec!["jvm.*".into()],
            namedrop: vec!["jvm.attribute.*".into()],
            ..Default::default()
        });
        assert!(f.name_allowed("jvm.memory.total.used"));
        assert!(!f.name_allowed("jvm.attribute.uptime"));
        assert!(!f.name_allowed("requests.total"));
    }

    #[test]
    fn test_fieldpass_keeps_only_matching_fields() {
        let f = filter(FilterConfig {
            fieldpass: vec!["count".into(), "p999".into(), "m5_rate".into()],
            ..Default::default()
        });
        let record = f.apply(timer("db.query")).unwrap();
        assert_eq!(record.field_names(), vec!["count", "m5_rate", "p999"]);
    }

    #[test]
    fn test_fielddrop_glob() {
        let f = filter(FilterConfig {
            fielddrop: vec!["m*_rate".into(), "std*".into()],
            ..Default::default()
        });
        let record = f.apply(timer("db.query")).unwrap();
        assert_eq!(record.field_names(), vec!["count", "max", "p999"]);
    }

    #[test]
    fn test_record_without_fields_dropped() {
        let f = filter(FilterConfig {
            fieldpass: vec!["value".into()],
            ..Default::default()
        });
        assert!(f.apply(timer("db.query")).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = MetricFilter::new(&FilterConfig {
            namepass: vec!["jvm.[".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("namepass")));
    }
}
