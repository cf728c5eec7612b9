//! Agent configuration
//!
//! Read from the YAML file named by `DWMON_CONFIG` when set, otherwise built
//! from the environment with a single Dropwizard input:
//!
//! ```yaml
//! interval: 10s
//! tags:
//!   dc: eu-1
//! inputs:
//!   - type: dropwizard
//!     urls: ["http://app:8081/metrics"]
//!     timeout: 5s
//!     namedrop: ["jvm.gc*"]
//! ```

use dwmon_core::{CoreError, Result, Tags};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::filter::{FilterConfig, FILTER_KEYS};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// One configured input: plugin type, plugin settings and filter
#[derive(Debug, Clone, PartialEq)]
pub struct InputSection {
    pub kind: String,
    pub settings: serde_json::Value,
    pub filter: FilterConfig,
}

impl InputSection {
    /// Split a raw section into plugin settings and agent-level keys
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(CoreError::Config("input section must be a mapping".into()));
        };

        let kind = match map.remove("type") {
            Some(serde_json::Value::String(kind)) => kind,
            Some(other) => return Err(CoreError::Config(format!("input type must be a string, got {}", other))),
            None => return Err(CoreError::Config("input section is missing 'type'".into())),
        };

        let filter_map: serde_json::Map<_, _> = FILTER_KEYS
            .iter()
            .filter_map(|k| map.remove(*k).map(|v| (k.to_string(), v)))
            .collect();
        let filter: FilterConfig = serde_json::from_value(serde_json::Value::Object(filter_map))
            .map_err(|e| CoreError::Config(format!("input '{}' filter: {}", kind, e)))?;

        Ok(Self {
            kind,
            settings: serde_json::Value::Object(map),
            filter,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default, with = "dwmon_core::duration::option")]
    interval: Option<Duration>,
    #[serde(default)]
    tags: Tags,
    #[serde(default)]
    inputs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub interval: Duration,
    pub tags: Tags,
    pub inputs: Vec<InputSection>,
}

impl AgentConfig {
    /// Load from `DWMON_CONFIG` if set, otherwise from the environment
    pub fn load() -> Result<Self> {
        match std::env::var("DWMON_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Self::from_env(),
        }
    }

    /// Single Dropwizard input from `DROPWIZARD_URLS` (comma separated)
    pub fn from_env() -> Result<Self> {
        let interval = match std::env::var("DWMON_INTERVAL") {
            Ok(s) => dwmon_core::duration::parse_duration(&s).map_err(CoreError::Config)?,
            Err(_) => DEFAULT_INTERVAL,
        };
        let urls: Vec<String> = std::env::var("DROPWIZARD_URLS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            interval,
            tags: Tags::new(),
            inputs: vec![InputSection {
                kind: dwmon_dropwizard::INPUT_NAME.to_string(),
                settings: serde_json::json!({ "urls": urls }),
                filter: FilterConfig::default(),
            }],
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_yaml::from_str(text).map_err(|e| CoreError::Config(format!("parsing config: {}", e)))?;

        let interval = raw.interval.unwrap_or(DEFAULT_INTERVAL);
        if interval.is_zero() {
            return Err(CoreError::Config("interval must be greater than zero".into()));
        }
        if raw.inputs.is_empty() {
            return Err(CoreError::Config("no inputs configured".into()));
        }

        Ok(Self {
            interval,
            tags: raw.tags,
            inputs: raw
                .inputs
                .into_iter()
                .map(InputSection::from_value)
                .collect::<Result<_>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
interval: 30s
tags:
  dc: eu-1
inputs:
  - type: dropwizard
    urls:
      - "http://app-1:8081/metrics"
      - "http://app-2:8081/metrics"
    timeout: 2s
    namedrop: ["jvm.gc*", "jvm.threads*"]
    fieldpass: ["count", "p999"]
"#;

    #[test]
    fn test_from_yaml() {
        let config = AgentConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.tags.get("dc").map(String::as_str), Some("eu-1"));
        assert_eq!(config.inputs.len(), 1);

        let input = &config.inputs[0];
        assert_eq!(input.kind, "dropwizard");
        assert_eq!(input.filter.namedrop, vec!["jvm.gc*", "jvm.threads*"]);
        assert_eq!(input.filter.fieldpass, vec!["count", "p999"]);
        assert!(input.settings.get("namedrop").is_none());
        assert!(input.settings.get("type").is_none());
        assert_eq!(input.settings["timeout"], "2s");
        assert_eq!(input.settings["urls"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_defaults_applied() {
        let config = AgentConfig::from_yaml("inputs:\n  - type: dropwizard\n").unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert!(config.tags.is_empty());
        assert_eq!(config.inputs[0].settings, serde_json::json!({}));
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = AgentConfig::from_yaml("inputs:\n  - urls: []\n").unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("type")));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        assert!(AgentConfig::from_yaml("intervall: 10s\ninputs:\n  - type: dropwizard\n").is_err());
    }

    #[test]
    fn test_zero_interval_and_no_inputs_rejected() {
        assert!(AgentConfig::from_yaml("interval: 0s\ninputs:\n  - type: dropwizard\n").is_err());
        assert!(AgentConfig::from_yaml("interval: 10s\n").is_err());
    }

    #[test]
    fn test_bad_filter_value_rejected() {
        let err = AgentConfig::from_yaml("inputs:\n  - type: dropwizard\n    namepass: 3\n").unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("filter")));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AgentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.inputs[0].kind, "dropwizard");

        assert!(AgentConfig::from_file(Path::new("/nonexistent/dwmon.yaml")).is_err());
    }
}
