//! Unified error type for the console.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::transport::TransportError;

/// Unified error type for everything outside the channel core.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Socket-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The background driver task is gone.
    #[error("Console driver stopped")]
    DriverStopped,
}

impl ConsoleError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::Transport(_) => ErrorCategory::Network,
            ConsoleError::Config(_) => ErrorCategory::Configuration,
            ConsoleError::Serialization(_) | ConsoleError::DriverStopped => ErrorCategory::Client,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Transport(err) => err.error_code(),
            ConsoleError::Config(_) => "E_CONFIG",
            ConsoleError::Serialization(_) => "E_JSON",
            ConsoleError::DriverStopped => "E_DRIVER_STOPPED",
        }
    }
}

/// Type alias for Results using [`ConsoleError`].
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_network() {
        let err: ConsoleError = TransportError::Closed.into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_WS_CLOSED");
        assert_eq!(err.to_string(), "Socket closed");
    }

    #[test]
    fn test_config_error_is_not_retryable() {
        let err: ConsoleError = ConfigError::InvalidOrigin("x".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_retryable());
        assert_eq!(err.error_code(), "E_CONFIG");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConsoleError = json_err.into();
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
