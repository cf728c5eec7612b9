//! Error types for dwmon services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown input plugin: {0}")]
    UnknownInput(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::UnknownInput(_) => "UNKNOWN_INPUT",
            Self::Input(_) => "INPUT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the agent should give up instead of retrying on the next tick
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnknownInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CoreError::Config("x".into()).error_code(), "CONFIG_ERROR");
        assert_eq!(CoreError::UnknownInput("x".into()).error_code(), "UNKNOWN_INPUT");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(CoreError::Config("bad".into()).is_fatal());
        assert!(!CoreError::Input("endpoint down".into()).is_fatal());
    }
}
