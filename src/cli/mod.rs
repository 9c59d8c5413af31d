//! Command-line interface for the devconsole binary.
//!
//! ```ignore
//! use devconsole::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! if let Some(overrides) = run_cli_command(command) {
//!     // connect using `overrides`
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, CliOverrides, USAGE};
pub use version::{handle_help_command, handle_version_command, VERSION};

/// Handle informational commands.
///
/// Returns the overrides for [`CliCommand::Run`]. `Version` and `Help`
/// print and exit the process.
pub fn run_cli_command(command: CliCommand) -> Option<CliOverrides> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => handle_help_command(),
        CliCommand::Run(overrides) => Some(overrides),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_overrides() {
        let overrides = CliOverrides {
            origin: Some("http://localhost:3000".to_string()),
            base_path: None,
        };
        assert_eq!(
            run_cli_command(CliCommand::Run(overrides.clone())),
            Some(overrides)
        );
    }
}
