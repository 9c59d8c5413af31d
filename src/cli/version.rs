//! Version and help output.

use super::args::USAGE;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line() -> String {
    format!("devconsole {}", VERSION)
}

/// Print the version string and exit successfully.
pub fn handle_version_command() -> ! {
    println!("{}", version_line());
    std::process::exit(0)
}

/// Print usage and exit successfully.
pub fn handle_help_command() -> ! {
    println!("{}\n\n{}", version_line(), USAGE);
    std::process::exit(0)
}
