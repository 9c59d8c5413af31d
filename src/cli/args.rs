//! Command-line argument parsing for the devconsole binary.

use crate::config::ConsoleConfig;
use crate::error::ConfigError;

/// Values given on the command line, applied over the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub origin: Option<String>,
    pub base_path: Option<String>,
}

impl CliOverrides {
    pub fn apply(&self, mut config: ConsoleConfig) -> ConsoleConfig {
        if let Some(origin) = &self.origin {
            config = config.with_origin(origin.clone());
        }
        if let Some(base_path) = &self.base_path {
            config = config.with_base_path(base_path.clone());
        }
        config
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Connect and stream (default)
    Run(CliOverrides),
}

/// Parse command-line arguments, skipping the program name.
///
/// Both `--flag value` and `--flag=value` are accepted. Unknown arguments
/// are ignored.
///
/// # Examples
///
/// ```
/// use devconsole::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["devconsole".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ConfigError>
where
    I: Iterator<Item = String>,
{
    let mut overrides = CliOverrides::default();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--origin" => {
                let value = inline.or_else(|| args.next());
                overrides.origin = Some(value.ok_or_else(|| ConfigError::MissingValue(flag))?);
            }
            "--base-path" => {
                let value = inline.or_else(|| args.next());
                overrides.base_path = Some(value.ok_or_else(|| ConfigError::MissingValue(flag))?);
            }
            _ => {}
        }
    }

    Ok(CliCommand::Run(overrides))
}

pub const USAGE: &str = "\
Usage: devconsole [OPTIONS]

Options:
      --origin <URL>        Page origin, e.g. https://app.example.com
      --base-path <PATH>    Console mount path, e.g. /admin
  -V, --version             Print version
  -h, --help                Print help

Environment:
  DEVCONSOLE_ORIGIN, DEVCONSOLE_BASE_PATH, DEVCONSOLE_RECONNECT_DELAY_MS,
  DEVCONSOLE_MAX_RECONNECT_DELAY_MS, DEVCONSOLE_MAX_RECONNECT_ATTEMPTS, RUST_LOG
";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, ConfigError> {
        let mut all = vec!["devconsole".to_string()];
        all.extend(args.iter().map(|a| a.to_string()));
        parse_args(all.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]).unwrap(), CliCommand::Version);
        assert_eq!(parse(&["-V"]).unwrap(), CliCommand::Version);
    }

    #[test]
    fn test_parse_help_flag() {
        assert_eq!(parse(&["-h"]).unwrap(), CliCommand::Help);
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&[]).unwrap(), CliCommand::Run(CliOverrides::default()));
    }

    #[test]
    fn test_parse_separate_values() {
        let command = parse(&["--origin", "https://x.test", "--base-path", "/admin"]).unwrap();
        assert_eq!(
            command,
            CliCommand::Run(CliOverrides {
                origin: Some("https://x.test".to_string()),
                base_path: Some("/admin".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_inline_values() {
        let command = parse(&["--base-path=/debug/"]).unwrap();
        match command {
            CliCommand::Run(overrides) => {
                assert_eq!(overrides.base_path.as_deref(), Some("/debug/"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_value() {
        assert_eq!(
            parse(&["--origin"]).unwrap_err(),
            ConfigError::MissingValue("--origin".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(
            parse(&["--unknown"]).unwrap(),
            CliCommand::Run(CliOverrides::default())
        );
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = CliOverrides {
            origin: Some("https://x.test".to_string()),
            base_path: Some("admin/".to_string()),
        };
        let config = overrides.apply(ConsoleConfig::default());
        assert_eq!(config.ws_url(), "wss://x.test/admin/ws");
    }
}
