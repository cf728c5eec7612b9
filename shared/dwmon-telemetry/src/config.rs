//! Logging configuration

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl LogFormat {
    /// `JSON_LOGS=true|1` or `LOG_FORMAT=json` select JSON
    fn from_vars(json_logs: Option<&str>, log_format: Option<&str>) -> Self {
        let json = matches!(json_logs, Some("true") | Some("1"))
            || log_format.is_some_and(|f| f.eq_ignore_ascii_case("json"));
        if json {
            Self::Json
        } else {
            Self::Plain
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Plain,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok();
        Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: LogFormat::from_vars(var("JSON_LOGS").as_deref(), var("LOG_FORMAT").as_deref()),
        }
    }
}
