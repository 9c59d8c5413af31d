//! Configuration errors.

use thiserror::Error;

/// Errors produced while building a [`ConsoleConfig`](crate::config::ConsoleConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The page origin has no `http://` or `https://` scheme, or no host.
    #[error("Invalid origin '{0}': expected http://host or https://host")]
    InvalidOrigin(String),

    /// An environment variable or flag held something that is not a number.
    #[error("Invalid value for {name}: '{value}' is not a non-negative integer")]
    InvalidNumber { name: String, value: String },

    /// A command-line flag was given without its value.
    #[error("Missing value for {0}")]
    MissingValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidOrigin("ftp://x".to_string()).to_string(),
            "Invalid origin 'ftp://x': expected http://host or https://host"
        );
        assert_eq!(
            ConfigError::InvalidNumber {
                name: "DEVCONSOLE_MAX_RECONNECT_ATTEMPTS".to_string(),
                value: "many".to_string(),
            }
            .to_string(),
            "Invalid value for DEVCONSOLE_MAX_RECONNECT_ATTEMPTS: 'many' is not a non-negative integer"
        );
        assert_eq!(
            ConfigError::MissingValue("--origin".to_string()).to_string(),
            "Missing value for --origin"
        );
    }
}
