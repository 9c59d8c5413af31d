//! Error category classification.
//!
//! Categories drive retry decisions and the short labels attached to log
//! lines.

use std::fmt;

/// Coarse error class used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Socket-level failures (connect refused, reset, TLS).
    /// Recovered automatically through the reconnect path.
    Network,

    /// Invalid origin, base path or numeric setting.
    /// Not retryable until the configuration is corrected.
    Configuration,

    /// Payloads or commands the client could not encode or decode.
    Client,
}

impl ErrorCategory {
    /// Returns true if errors in this category are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Client => "client",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the application backend is running",
            ErrorCategory::Configuration => "Check the DEVCONSOLE_* environment variables",
            ErrorCategory::Client => "This may be a bug. Please report it if it persists",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
