//! Duration parsing for configuration values.
//!
//! Durations are written the humantime way: `500ms`, `10s`, `1m 30s`.
//! Use as `#[serde(with = "dwmon_core::duration")]` or with the `option`
//! submodule for optional fields.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Parse a duration string.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| format!("invalid duration '{}': {} (expected e.g. 10s, 1m 30s)", s, e))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => parse_duration(&s).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize, Serialize)]
    struct Cfg {
        #[serde(with = "crate::duration")]
        timeout: Duration,
        #[serde(default, with = "crate::duration::option")]
        header_timeout: Option<Duration>,
    }

    #[test]
    fn test_parse_common_forms() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1m 30s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_duration("ten seconds").unwrap_err();
        assert!(err.contains("invalid duration"));
    }

    #[test]
    fn test_serde_fields() {
        let cfg: Cfg = serde_json::from_str(r#"{"timeout":"5s"}"#).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert!(cfg.header_timeout.is_none());

        let cfg: Cfg = serde_json::from_str(r#"{"timeout":"5s","header_timeout":"2s"}"#).unwrap();
        assert_eq!(cfg.header_timeout, Some(Duration::from_secs(2)));

        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"5s\""));
    }
}
