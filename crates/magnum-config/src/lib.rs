//! Typed configuration for Magnum.
//!
//! - TOML and JSON configuration files
//! - environment variable overrides
//! - strict parsing (unknown fields are errors)
//! - layering: defaults → file → environment → validation
//!
//! # Example
//!
//! ```no_run
//! use magnum_binding::Endpoint;
//! use magnum_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("magnum.toml")?
//!     .with_env_prefix("MAGNUM")
//!     .load()?;
//!
//! let endpoint = Endpoint::builder("list_wines", "/wines")
//!     .limits(config.binding.extract_limits())
//!     .binder(config.binding.binder_config())
//!     .response(config.response.response_spec())
//!     .handler(|_| Ok(magnum_binding::Reply::empty()))
//!     .build()?;
//! # let _ = endpoint;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [binding]
//! max_body_size = 1048576
//! key_transformer = "camel_to_snake"
//!
//! [binding.multipart]
//! max_field_size = 10485760
//! max_fields = 100
//!
//! [response]
//! default_content_type = "application/json"
//! camel_case_output = false
//!
//! [logging]
//! level = "info,magnum_binding=debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Keys use the form `PREFIX__SECTION__KEY`:
//!
//! - `MAGNUM__BINDING__MAX_BODY_SIZE=2097152`
//! - `MAGNUM__BINDING__MULTIPART__MAX_FIELDS=10`
//! - `MAGNUM__RESPONSE__CAMEL_CASE_OUTPUT=true`
//! - `MAGNUM__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/magnum-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::MagnumConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    BindingConfig, KeyTransformerPreset, LoggingConfig, MultipartSection, ResponseConfig,
};
