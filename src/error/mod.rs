//! Error handling for the console.
//!
//! - **Error Categories**: coarse classification for retry decisions
//! - **Domain-specific Errors**: transport and configuration errors
//! - **Unified Error Type**: `ConsoleError` wraps both plus JSON failures
//! - **Result Type Alias**: `ConsoleResult<T>`
//!
//! The channel core itself never returns these. Transport failures inside the
//! core are reported through hooks; these types surface at the edges
//! (configuration loading, the async driver, adapters).
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Socket connect/send failures | Yes |
//! | Configuration | Bad origin or numeric setting | No |
//! | Client | Encoding bugs, stopped driver | No |

mod category;
mod config;
mod console_error;
mod transport;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use console_error::{ConsoleError, ConsoleResult};
pub use transport::TransportError;
