//! Errors raised while decoding a request payload.
//!
//! These happen before any parameter is bound, so each one is reported as
//! a single validation error located at the whole body.

use magnum_core::{Location, ValidationError};
use thiserror::Error;

/// A request payload that could not be decoded.
///
/// # Example
///
/// ```rust
/// use magnum_extract::ExtractionError;
///
/// let err = ExtractionError::payload_too_large(1024, 2048);
/// let reported = err.to_validation_error();
/// assert_eq!(reported.kind, "value_error.payload_too_large");
/// assert_eq!(reported.dotted_loc(), "body");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Body larger than the configured limit.
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit.
        max: usize,
        /// Actual size.
        actual: usize,
    },

    /// Body declared as JSON but not parseable.
    #[error("invalid JSON body: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },

    /// URL-encoded form that could not be decoded.
    #[error("invalid form body: {message}")]
    InvalidForm {
        /// Decoder message.
        message: String,
    },

    /// Malformed multipart body or Content-Type.
    #[error("invalid multipart body: {message}")]
    InvalidMultipart {
        /// Parser message.
        message: String,
    },

    /// Multipart body with more parts than allowed.
    #[error("too many multipart fields (max {max})")]
    TooManyFields {
        /// Configured limit.
        max: usize,
    },
}

impl ExtractionError {
    /// Creates a payload-too-large error.
    #[must_use]
    pub fn payload_too_large(max: usize, actual: usize) -> Self {
        Self::PayloadTooLarge { max, actual }
    }

    /// Creates an invalid-JSON error.
    #[must_use]
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
        }
    }

    /// Creates an invalid-form error.
    #[must_use]
    pub fn invalid_form(message: impl Into<String>) -> Self {
        Self::InvalidForm {
            message: message.into(),
        }
    }

    /// Creates an invalid-multipart error.
    #[must_use]
    pub fn invalid_multipart(message: impl Into<String>) -> Self {
        Self::InvalidMultipart {
            message: message.into(),
        }
    }

    /// Returns the machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "value_error.payload_too_large",
            Self::InvalidJson { .. } => "value_error.jsondecode",
            Self::InvalidForm { .. } => "value_error.formdecode",
            Self::InvalidMultipart { .. } | Self::TooManyFields { .. } => {
                "value_error.multipart"
            }
        }
    }

    /// Converts this error into a validation error at `["body"]`.
    #[must_use]
    pub fn to_validation_error(&self) -> ValidationError {
        ValidationError::new(self.kind(), self.to_string()).at(Location::Body)
    }
}

impl From<ExtractionError> for ValidationError {
    fn from(error: ExtractionError) -> Self {
        error.to_validation_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ExtractionError::payload_too_large(10, 20);
        assert!(err.to_string().contains("max 10 bytes"));

        let err = ExtractionError::invalid_json("expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "invalid JSON body: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_reported_at_body() {
        let reported: ValidationError = ExtractionError::TooManyFields { max: 3 }.into();
        assert_eq!(reported.loc, vec!["body".into()]);
        assert_eq!(reported.kind, "value_error.multipart");
        assert_eq!(reported.msg, "too many multipart fields (max 3)");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ExtractionError::invalid_form("x").kind(), "value_error.formdecode");
        assert_eq!(
            ExtractionError::invalid_multipart("x").kind(),
            "value_error.multipart"
        );
    }
}
