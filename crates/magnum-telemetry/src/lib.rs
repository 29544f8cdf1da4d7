//! Structured logging for Magnum services.
//!
//! The binding pipeline only emits `tracing` events; this crate installs the
//! subscriber that turns them into output:
//!
//! - binding outcomes and registration warnings at `debug`/`warn`
//! - 500-class failures at `error`, with their full detail
//!
//! # Example
//!
//! ```rust,ignore
//! use magnum_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().service_name("cellar"))?;
//! tracing::info!(route = "/wines/{name}", "route registered");
//! ```

#![doc(html_root_url = "https://docs.rs/magnum-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
