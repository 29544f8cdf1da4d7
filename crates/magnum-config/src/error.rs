//! Errors raised while assembling a [`MagnumConfig`](crate::MagnumConfig).

use std::path::PathBuf;
use thiserror::Error;

/// A configuration source could not be read, parsed or accepted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no configuration file at {}", path.display())]
    MissingFile {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The file exists but reading it failed.
    #[error("cannot read {}", path.display())]
    Unreadable {
        /// The file.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a key no section declares.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key no section declares.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported configuration format `{0}`")]
    UnsupportedFormat(String),

    /// A value parsed but is not acceptable.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting, e.g. `binding.max_body_size`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable holds a value of the wrong type.
    #[error("environment variable {var}: {reason}")]
    EnvVar {
        /// Full variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// A `.env` file is present but malformed.
    #[error("cannot load .env: {0}")]
    Dotenv(String),
}

impl ConfigError {
    pub(crate) fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
