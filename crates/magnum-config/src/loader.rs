//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, KeyTransformerPreset, MagnumConfig};
use magnum_telemetry::LogFormat;

/// Default prefix of environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "MAGNUM";

/// Configuration loader.
///
/// Layers, later ones winning:
/// 1. defaults (or a preset)
/// 2. a TOML or JSON file
/// 3. environment variables `PREFIX__SECTION__KEY`
///
/// The result is validated by [`ConfigLoader::load`].
///
/// # Example
///
/// ```no_run
/// use magnum_config::ConfigLoader;
///
/// # fn main() -> Result<(), magnum_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv()?
///     .with_optional_file("magnum.toml")?
///     .with_env_prefix("MAGNUM")
///     .load()?;
///
/// println!("bodies are capped at {} bytes", config.binding.max_body_size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: MagnumConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use magnum_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = MagnumConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = MagnumConfig::production();
        self
    }

    /// Loads a file; the format follows the extension (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, or contains
    /// unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::missing_file(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, &format)?;
        tracing::debug!(path = %path.display(), "configuration file loaded");
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// # Example
    ///
    /// ```
    /// use magnum_config::{ConfigLoader, KeyTransformerPreset};
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[binding]\nkey_transformer = \"camel_to_snake\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.binding.key_transformer, KeyTransformerPreset::CamelToSnake);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Enables environment overrides under `prefix`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` into the process environment; a missing file is fine.
    ///
    /// # Errors
    ///
    /// Fails if `.env` exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), ".env loaded");
                Ok(self)
            }
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(ConfigError::Dotenv(err.to_string())),
        }
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final configuration.
    pub fn load(mut self) -> Result<MagnumConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MagnumConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["BINDING", "MAX_BODY_SIZE"] => {
                config.binding.max_body_size = parse_usize(key, value)?;
            }
            ["BINDING", "MULTIPART", "MAX_FIELD_SIZE"] => {
                config.binding.multipart.max_field_size = parse_usize(key, value)?;
            }
            ["BINDING", "MULTIPART", "MAX_FIELDS"] => {
                config.binding.multipart.max_fields = parse_usize(key, value)?;
            }
            ["BINDING", "KEY_TRANSFORMER"] => {
                config.binding.key_transformer = match value.to_lowercase().as_str() {
                    "none" | "" => KeyTransformerPreset::None,
                    "camel_to_snake" => KeyTransformerPreset::CamelToSnake,
                    "snake_to_camel" => KeyTransformerPreset::SnakeToCamel,
                    _ => {
                        return Err(ConfigError::env_var(
                            key,
                            "expected 'none', 'camel_to_snake' or 'snake_to_camel'",
                        ))
                    }
                };
            }

            ["RESPONSE", "DEFAULT_CONTENT_TYPE"] => {
                config.response.default_content_type = value.to_string();
            }
            ["RESPONSE", "CAMEL_CASE_OUTPUT"] => {
                config.response.camel_case_output = parse_bool(key, value)?;
            }

            ["LOGGING", "ENABLED"] => {
                config.logging.enabled = parse_bool(key, value)?;
            }
            ["LOGGING", "LEVEL"] => {
                config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_var(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                config.logging.ansi_enabled = parse_bool(key, value)?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_bool(key, value)?;
            }

            _ => tracing::debug!(var = key, "ignoring unknown configuration override"),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<MagnumConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_var(key, "expected a non-negative integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_var(key, "expected boolean")),
    }
}
