//! # ic-telemetry
//!
//! Structured logging for the interoperability core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ic_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_tracing(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IC_SERVICE_NAME` | `ic-interop` | Service name in the startup line |
//! | `IC_LOG_LEVEL` | `info` | Filter directive, falls back to `RUST_LOG` |
//! | `IC_JSON_LOGS` | `false` | JSON lines, `true` by default in containers |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Invalid filter directive or other configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A global subscriber is already installed.
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}
