//! Console configuration.
//!
//! Use the builder methods to customize, or [`ConsoleConfig::from_env`] to
//! read `DEVCONSOLE_*` variables.
//!
//! ```
//! use devconsole::config::ConsoleConfig;
//!
//! let config = ConsoleConfig::default()
//!     .with_origin("https://app.example.com")
//!     .with_base_path(" admin/debug// ");
//! assert_eq!(config.ws_url(), "wss://app.example.com/admin/debug/ws");
//! ```

use crate::error::ConfigError;
use crate::websocket::reconnect::{
    ReconnectPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};

pub const ENV_ORIGIN: &str = "DEVCONSOLE_ORIGIN";
pub const ENV_BASE_PATH: &str = "DEVCONSOLE_BASE_PATH";
pub const ENV_RECONNECT_DELAY_MS: &str = "DEVCONSOLE_RECONNECT_DELAY_MS";
pub const ENV_MAX_RECONNECT_DELAY_MS: &str = "DEVCONSOLE_MAX_RECONNECT_DELAY_MS";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "DEVCONSOLE_MAX_RECONNECT_ATTEMPTS";

const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for a console connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Origin of the page hosting the console, e.g. `https://app.example.com`
    pub origin: String,
    /// Mount path of the console on the backend (normalized when the URL is built)
    pub base_path: String,
    /// Base reconnect delay (default: 1000)
    pub reconnect_delay_ms: u64,
    /// Reconnect delay cap (default: 12000)
    pub max_reconnect_delay_ms: u64,
    /// Reconnect attempts before giving up (default: 8)
    pub max_reconnect_attempts: u32,
    /// Capacity of the driver's inbound event queue
    pub channel_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            base_path: String::new(),
            reconnect_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_reconnect_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_reconnect_attempts: DEFAULT_MAX_ATTEMPTS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_reconnect_delay_ms(mut self, ms: u64) -> Self {
        self.reconnect_delay_ms = ms;
        self
    }

    pub fn with_max_reconnect_delay_ms(mut self, ms: u64) -> Self {
        self.max_reconnect_delay_ms = ms;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Build a config from `DEVCONSOLE_*` environment variables.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(origin) = lookup(ENV_ORIGIN) {
            config.origin = origin;
        }
        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            config.base_path = base_path;
        }
        if let Some(raw) = lookup(ENV_RECONNECT_DELAY_MS) {
            config.reconnect_delay_ms = parse_number(ENV_RECONNECT_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RECONNECT_DELAY_MS) {
            config.max_reconnect_delay_ms = parse_number(ENV_MAX_RECONNECT_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RECONNECT_ATTEMPTS) {
            config.max_reconnect_attempts = parse_number(ENV_MAX_RECONNECT_ATTEMPTS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the origin carries an http(s) scheme and a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match split_origin(&self.origin) {
            Some((_, host)) if !host.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidOrigin(self.origin.clone())),
        }
    }

    /// Whether the hosting page is served over a secure scheme.
    pub fn is_secure(&self) -> bool {
        matches!(split_origin(&self.origin), Some((true, _)))
    }

    /// `{scheme}://{host}{basePath}/ws`, with `wss` iff the origin is https.
    pub fn ws_url(&self) -> String {
        let (secure, host) =
            split_origin(&self.origin).unwrap_or((false, self.origin.trim().trim_end_matches('/')));
        let scheme = if secure { "wss" } else { "ws" };
        format!("{}://{}{}/ws", scheme, host, normalize_base_path(&self.base_path))
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_reconnect_attempts,
            base_delay_ms: self.reconnect_delay_ms,
            max_delay_ms: self.max_reconnect_delay_ms,
        }
    }
}

/// Trim, force a leading slash and strip trailing slashes.
/// An empty or all-slash path normalizes to the empty string.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Split `https://host[/...]` into `(secure, host)`.
fn split_origin(origin: &str) -> Option<(bool, &str)> {
    let origin = origin.trim();
    let (secure, rest) = if let Some(rest) = origin.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        (false, rest)
    } else {
        return None;
    };
    let host = rest.split('/').next().unwrap_or_default();
    Some((secure, host))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name: name.to_string(),
        value: raw.to_string(),
    })
}
