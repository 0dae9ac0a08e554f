//! # AlgoAppDev Telemetry
//!
//! Logging setup shared by tools and tests built on AlgoAppDev. The library
//! crates only emit `tracing` events; binaries and test suites install a
//! subscriber through this crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aad_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AAD_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `AAD_JSON_LOGS` | `false` | JSON formatted output |
//! | `AAD_CONSOLE_OUTPUT` | `true` | Console output |
//! | `AAD_SERVICE_NAME` | `algoappdev` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_LOG_LEVEL, DEFAULT_SERVICE_NAME};
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The configuration cannot be applied.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A global subscriber is already installed.
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}
