//! Configuration sections.

use magnum_binding::{BinderConfig, OutboundCasing, ResponseSpec};
use magnum_extract::{transformers, ExtractLimits, MultipartConfig, DEFAULT_MAX_BODY_SIZE};
use magnum_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Key rewriting applied when a multi-value lookup misses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyTransformerPreset {
    /// No rewriting.
    #[default]
    None,
    /// `itemIds` is also looked up as `item_ids`.
    CamelToSnake,
    /// `item_ids` is also looked up as `itemIds`.
    SnakeToCamel,
}

/// Multipart limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MultipartSection {
    /// Maximum size of one part in bytes.
    #[serde(default = "default_max_field_size")]
    pub max_field_size: usize,

    /// Maximum number of parts.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
}

impl Default for MultipartSection {
    fn default() -> Self {
        Self {
            max_field_size: default_max_field_size(),
            max_fields: default_max_fields(),
        }
    }
}

fn default_max_field_size() -> usize {
    MultipartConfig::default().max_field_size
}

fn default_max_fields() -> usize {
    MultipartConfig::default().max_fields
}

/// Inbound binding section.
///
/// # Example
///
/// ```
/// use magnum_config::{BindingConfig, KeyTransformerPreset};
///
/// let config = BindingConfig {
///     key_transformer: KeyTransformerPreset::CamelToSnake,
///     ..Default::default()
/// };
/// assert!(config.binder_config().transformer().is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Multipart limits.
    #[serde(default)]
    pub multipart: MultipartSection,

    /// Key rewriting preset.
    #[serde(default)]
    pub key_transformer: KeyTransformerPreset,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            multipart: MultipartSection::default(),
            key_transformer: KeyTransformerPreset::default(),
        }
    }
}

impl BindingConfig {
    /// Payload limits for endpoints.
    #[must_use]
    pub fn extract_limits(&self) -> ExtractLimits {
        ExtractLimits {
            max_body_size: self.max_body_size,
            multipart: MultipartConfig::new()
                .max_field_size(self.multipart.max_field_size)
                .max_fields(self.multipart.max_fields),
        }
    }

    /// Binder settings for endpoints.
    #[must_use]
    pub fn binder_config(&self) -> BinderConfig {
        let config = BinderConfig::new();
        match self.key_transformer {
            KeyTransformerPreset::None => config,
            KeyTransformerPreset::CamelToSnake => {
                config.key_transformer(transformers::camel_to_snake())
            }
            KeyTransformerPreset::SnakeToCamel => {
                config.key_transformer(transformers::snake_to_camel())
            }
        }
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

/// Outbound response section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Content type of validated bodies.
    #[serde(default = "default_content_type")]
    pub default_content_type: String,

    /// Rewrite response object keys to camelCase.
    #[serde(default)]
    pub camel_case_output: bool,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_content_type: default_content_type(),
            camel_case_output: false,
        }
    }
}

impl ResponseConfig {
    /// Key casing of response bodies.
    #[must_use]
    pub fn casing(&self) -> OutboundCasing {
        if self.camel_case_output {
            OutboundCasing::Camel
        } else {
            OutboundCasing::Preserve
        }
    }

    /// A response declaration carrying these defaults.
    #[must_use]
    pub fn response_spec(&self) -> ResponseSpec {
        ResponseSpec::new()
            .with_content_type(self.default_content_type.clone())
            .with_casing(self.casing())
    }
}

fn default_content_type() -> String {
    magnum_binding::JSON_CONTENT_TYPE.to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            file_line_info: self.include_location,
            ansi: self.ansi_enabled,
            ..base
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_defaults_match_extract_defaults() {
        let config = BindingConfig::default();
        assert_eq!(config.extract_limits(), ExtractLimits::default());
        assert!(config.binder_config().transformer().is_none());
    }

    #[test]
    fn test_transformer_presets() {
        let camel = BindingConfig {
            key_transformer: KeyTransformerPreset::CamelToSnake,
            ..Default::default()
        };
        let transform = camel.binder_config().transformer().cloned().unwrap();
        assert_eq!(transform("itemIds"), "item_ids");

        let snake = BindingConfig {
            key_transformer: KeyTransformerPreset::SnakeToCamel,
            ..Default::default()
        };
        let transform = snake.binder_config().transformer().cloned().unwrap();
        assert_eq!(transform("item_ids"), "itemIds");
    }

    #[test]
    fn test_response_section() {
        let config = ResponseConfig {
            camel_case_output: true,
            ..Default::default()
        };
        let spec = config.response_spec();
        assert_eq!(spec.casing(), OutboundCasing::Camel);
        assert_eq!(spec.content_type(), "application/json");
    }

    #[test]
    fn test_logging_section_conversion() {
        let section = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            ..Default::default()
        };
        let log = section.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(!log.file_line_info);
        assert!(log.span_events);
    }

    #[test]
    fn test_preset_serde_names() {
        let preset: KeyTransformerPreset = serde_json::from_str("\"camel_to_snake\"").unwrap();
        assert_eq!(preset, KeyTransformerPreset::CamelToSnake);
    }
}
