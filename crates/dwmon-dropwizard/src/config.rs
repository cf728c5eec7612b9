//! Dropwizard input configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:8081/metrics";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS material for HTTPS endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM bundle of extra trusted roots
    pub ssl_ca: Option<PathBuf>,
    /// PEM client certificate (requires `ssl_key`)
    pub ssl_cert: Option<PathBuf>,
    /// PEM private key for `ssl_cert`
    pub ssl_key: Option<PathBuf>,
    /// Skip certificate chain and hostname verification
    pub insecure_skip_verify: bool,
}

/// Input settings as read from the agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropwizardConfig {
    pub urls: Vec<String>,
    #[serde(flatten)]
    pub tls: TlsConfig,
    /// Overall request timeout, also the header timeout unless overridden
    #[serde(with = "dwmon_core::duration")]
    pub timeout: Duration,
    #[serde(with = "dwmon_core::duration::option")]
    pub response_header_timeout: Option<Duration>,
}

impl Default for DropwizardConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            tls: TlsConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            response_header_timeout: None,
        }
    }
}

impl DropwizardConfig {
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Configured URLs, or the local default when none are given
    pub fn effective_urls(&self) -> Vec<String> {
        if self.urls.is_empty() {
            vec![DEFAULT_URL.to_string()]
        } else {
            self.urls.clone()
        }
    }

    pub fn header_timeout(&self) -> Duration {
        self.response_header_timeout.unwrap_or(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DropwizardConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.header_timeout(), Duration::from_secs(5));
        assert_eq!(config.effective_urls(), vec![DEFAULT_URL.to_string()]);
        assert!(!config.tls.insecure_skip_verify);
    }

    #[test]
    fn test_deserialize_flat_keys() {
        let config: DropwizardConfig = serde_json::from_value(serde_json::json!({
            "urls": ["https://app:8443/metrics"],
            "ssl_ca": "/etc/dwmon/ca.pem",
            "insecure_skip_verify": true,
            "timeout": "10s"
        }))
        .unwrap();

        assert_eq!(config.urls, vec!["https://app:8443/metrics"]);
        assert_eq!(config.tls.ssl_ca, Some(PathBuf::from("/etc/dwmon/ca.pem")));
        assert!(config.tls.insecure_skip_verify);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.header_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_header_timeout_override() {
        let config: DropwizardConfig = serde_json::from_value(serde_json::json!({
            "timeout": "10s",
            "response_header_timeout": "2s"
        }))
        .unwrap();
        assert_eq!(config.header_timeout(), Duration::from_secs(2));
        assert!(config.urls.is_empty());
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let result: Result<DropwizardConfig, _> =
            serde_json::from_value(serde_json::json!({"timeout": "soon"}));
        assert!(result.is_err());
    }
}
