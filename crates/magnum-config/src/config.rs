//! The root configuration type.

use crate::{BindingConfig, ConfigError, LoggingConfig, ResponseConfig};
use http::HeaderValue;
use magnum_telemetry::{create_env_filter, LogFormat};
use serde::{Deserialize, Serialize};

/// Complete Magnum configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use magnum_config::MagnumConfig;
///
/// let config = MagnumConfig::default();
/// assert_eq!(config.binding.max_body_size, 1024 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MagnumConfig {
    /// Inbound binding.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Outbound responses.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MagnumConfig {
    /// Checks values that deserialization cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_body_size",
                "must be greater than zero",
            ));
        }
        if self.binding.multipart.max_fields == 0 {
            return Err(ConfigError::invalid_value(
                "binding.multipart.max_fields",
                "must be greater than zero",
            ));
        }
        if self.binding.multipart.max_field_size == 0 {
            return Err(ConfigError::invalid_value(
                "binding.multipart.max_field_size",
                "must be greater than zero",
            ));
        }

        let content_type = &self.response.default_content_type;
        if content_type.trim().is_empty() || HeaderValue::from_str(content_type).is_err() {
            return Err(ConfigError::invalid_value(
                "response.default_content_type",
                format!("not a valid header value: {content_type:?}"),
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level).map_err(|err| {
                ConfigError::invalid_value("logging.level", err.to_string())
            })?;
        }

        Ok(())
    }

    /// Local development preset: pretty `debug` logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON `info` logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(MagnumConfig::default().validate().is_ok());
        assert!(MagnumConfig::development().validate().is_ok());
        assert!(MagnumConfig::production().validate().is_ok());
        assert_eq!(MagnumConfig::development().logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_zero_body_size_rejected() {
        let mut config = MagnumConfig::default();
        config.binding.max_body_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("binding.max_body_size"));
    }

    #[test]
    fn test_bad_content_type_rejected() {
        let mut config = MagnumConfig::default();
        config.response.default_content_type = "application/json\n".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "response.default_content_type"
        ));
    }

    #[test]
    fn test_bad_log_level_rejected_only_when_enabled() {
        let mut config = MagnumConfig::default();
        config.logging.level = "magnum=loud".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<MagnumConfig, _> = toml::from_str(
            r#"
            [binding]
            max_body_sise = 10
            "#,
        );
        assert!(result.is_err());
    }
}
