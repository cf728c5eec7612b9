//! Error types for the Dropwizard input

use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, CollectError>;

/// Errors raised while collecting from Dropwizard endpoints
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectError {
    /// TLS material could not be loaded; no endpoint can be polled
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Pipeline task failed: {0}")]
    Task(String),

    #[error("[url={url}]: {error}")]
    Endpoint { url: String, error: Box<CollectError> },
}

impl CollectError {
    /// Tag an error with the endpoint it came from
    pub fn for_url(self, url: &str) -> Self {
        match self {
            Self::Endpoint { .. } => self,
            other => Self::Endpoint {
                url: url.to_string(),
                error: Box::new(other),
            },
        }
    }

    /// The endpoint an error was tagged with, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Endpoint { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The untagged error
    pub fn root(&self) -> &CollectError {
        match self {
            Self::Endpoint { error, .. } => error.root(),
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self.root(), Self::Decode(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.root(), Self::Connection(_))
    }

    /// Short label for logs and reports
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::Configuration(_) => "configuration",
            Self::Connection(_) => "connection",
            Self::Timeout(_) => "timeout",
            Self::Request(_) => "request",
            Self::Decode(_) => "decode",
            Self::Task(_) => "task",
            Self::Endpoint { .. } => "endpoint",
        }
    }

    pub(crate) fn header_timeout(after: Duration) -> Self {
        Self::Timeout(format!("no response headers after {:?}", after))
    }
}

impl From<reqwest::Error> for CollectError {
    fn from(err: reqwest::Error) -> Self {
        let timeout = err.is_timeout();
        let transport = err.is_connect() || err.is_body() || err.is_request();
        // The endpoint tag already names the URL
        let message = format!("{:#}", anyhow::Error::new(err.without_url()));
        if timeout {
            Self::Timeout(message)
        } else if transport {
            Self::Connection(message)
        } else {
            Self::Request(message)
        }
    }
}

impl From<serde_json::Error> for CollectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let err = CollectError::Decode("expected value at line 1 column 1".into())
            .for_url("http://a:8081/metrics");
        assert_eq!(
            err.to_string(),
            "[url=http://a:8081/metrics]: Decode error: expected value at line 1 column 1"
        );
        assert_eq!(err.url(), Some("http://a:8081/metrics"));
        assert!(err.is_decode());
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_for_url_does_not_double_wrap() {
        let err = CollectError::Timeout("slow".into())
            .for_url("http://a")
            .for_url("http://b");
        assert_eq!(err.url(), Some("http://a"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: CollectError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.is_decode());
    }
}
