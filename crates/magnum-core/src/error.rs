//! Error types for Magnum.
//!
//! Request-time failures are represented by [`MagnumError`]. Route
//! declaration failures are represented by [`RegistrationError`] and are
//! raised before a route ever serves traffic.
//!
//! | Error | Category | Status | Cause |
//! |-------|----------|--------|-------|
//! | `InvalidRequest` | `Validation` | 400 | client sent bad data |
//! | `NotFound` | `NotFound` | 404 | raised by handler logic |
//! | `Shape` | `Internal` | 500 | handler returned a malformed tuple |
//! | `ResponseValidation` | `Internal` | 500 | handler output violates its schema |
//! | `UnsupportedContent` | `Internal` | 500 | body cannot be validated at all |
//! | `Internal` | `Internal` | 500 | any other handler failure |

use crate::{Location, ValidationError};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`MagnumError`].
pub type MagnumResult<T> = Result<T, MagnumError>;

/// Categories of request-time errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Client-caused binding errors.
    Validation,
    /// Resource not found.
    NotFound,
    /// Server-side defects.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard request-time error type for Magnum.
#[derive(Error, Debug)]
pub enum MagnumError {
    /// One or more parameters failed to bind.
    #[error("Invalid request: {} validation error(s)", errors.len())]
    InvalidRequest {
        /// Every binding failure, in declaration order.
        errors: Vec<ValidationError>,
    },

    /// A resource requested by the client does not exist.
    #[error(transparent)]
    NotFound(#[from] ResourceNotFound),

    /// The handler returned a value that is not one of the supported shapes.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The handler returned data inconsistent with its declared output schema.
    #[error(transparent)]
    ResponseValidation(#[from] ResponseValidationError),

    /// The handler returned content that cannot be checked against a schema.
    #[error("Unsupported response content: {message}")]
    UnsupportedContent {
        /// Description of the offending content.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MagnumError {
    /// Creates a binding failure from accumulated errors.
    #[must_use]
    pub fn invalid_request(errors: Vec<ValidationError>) -> Self {
        Self::InvalidRequest { errors }
    }

    /// Creates an unsupported-content error.
    #[must_use]
    pub fn unsupported_content(message: impl Into<String>) -> Self {
        Self::UnsupportedContent {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Shape(_)
            | Self::ResponseValidation(_)
            | Self::UnsupportedContent { .. }
            | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the binding errors if this is a binding failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::InvalidRequest { errors } => Some(errors),
            _ => None,
        }
    }
}

/// An explicit "not found" raised by handler logic.
///
/// # Example
///
/// ```
/// use magnum_core::ResourceNotFound;
///
/// let err = ResourceNotFound::resource("Wine", "id=42");
/// assert_eq!(err.message(), "Wine not found : id=42.");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("RessourceNotFound: {}", self.message())]
pub struct ResourceNotFound {
    msg: Option<String>,
    resource_name: Option<String>,
    context: Option<String>,
}

impl ResourceNotFound {
    /// Creates an error with an explicit message.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: Some(msg.into()),
            resource_name: None,
            context: None,
        }
    }

    /// Creates an error describing which resource was not found and why.
    #[must_use]
    pub fn resource(resource_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            msg: None,
            resource_name: Some(resource_name.into()),
            context: Some(context.into()),
        }
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.msg {
            Some(msg) => msg.clone(),
            None => format!(
                "{} not found : {}.",
                self.resource_name.as_deref().unwrap_or("Resource"),
                self.context.as_deref().unwrap_or("")
            ),
        }
    }
}

/// The handler returned a value that is not one of the five supported shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Tuple with an unsupported number of elements.
    #[error(
        "The view function did not return a valid response tuple. The tuple must have \
         the form (body, status, headers), (body, status), or (body, headers); got {0} element(s)."
    )]
    Arity(usize),

    /// Status element is not a valid HTTP status code.
    #[error("invalid status code in response tuple: {0}")]
    InvalidStatus(String),

    /// Headers element is not a string-to-string map.
    #[error("invalid headers in response tuple: {0}")]
    InvalidHeaders(String),
}

/// The handler output violates the route's own declared output schema.
///
/// This is a server-side defect and always maps to a 500.
#[derive(Error, Debug)]
#[error("InternalServerError: response validation failed with {} error(s)", errors.len())]
pub struct ResponseValidationError {
    /// The validation failures, in schema field order.
    pub errors: Vec<ValidationError>,
    /// The offending value as returned by the handler.
    pub value: serde_json::Value,
    /// Backtrace captured at the point of failure.
    pub trace: String,
}

impl ResponseValidationError {
    /// Creates an error and captures the current backtrace.
    #[must_use]
    pub fn capture(errors: Vec<ValidationError>, value: serde_json::Value) -> Self {
        Self {
            errors,
            value,
            trace: std::backtrace::Backtrace::force_capture().to_string(),
        }
    }
}

/// A malformed route declaration.
///
/// Raised while building a route binding; a route that fails registration
/// never serves traffic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Two parameters share a name.
    #[error("duplicate parameter '{name}' on route {route}")]
    DuplicateParameter {
        /// The repeated parameter name.
        name: String,
        /// The route template.
        route: String,
    },

    /// A path placeholder was explicitly declared in another location.
    #[error("parameter '{name}' matches a path placeholder on route {route} but is declared in {declared}")]
    PathLocationConflict {
        /// The parameter name.
        name: String,
        /// The explicitly declared location.
        declared: Location,
        /// The route template.
        route: String,
    },

    /// A parameter declared in `path` has no placeholder in the template.
    #[error("path parameter '{name}' has no matching placeholder in route {route}")]
    UnknownPathParameter {
        /// The parameter name.
        name: String,
        /// The route template.
        route: String,
    },

    /// A placeholder in the template has no declared parameter.
    #[error("placeholder '{{{name}}}' in route {route} has no declared parameter")]
    UndeclaredPlaceholder {
        /// The placeholder name.
        name: String,
        /// The route template.
        route: String,
    },

    /// A file type was declared outside the `file` location.
    #[error("parameter '{name}' has a file type but is declared in {declared}")]
    FileOutsideFileLocation {
        /// The parameter name.
        name: String,
        /// The declared location.
        declared: Location,
    },

    /// A default value does not satisfy the declared type.
    #[error("default value for parameter '{name}' is invalid: {reason}")]
    InvalidDefault {
        /// The parameter name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The route template could not be parsed.
    #[error("invalid route template '{route}': {reason}")]
    InvalidTemplate {
        /// The route template.
        route: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A pattern constraint is not a valid regular expression.
    #[error("invalid pattern '{pattern}' on '{name}': {reason}")]
    InvalidPattern {
        /// The field or parameter name.
        name: String,
        /// The offending pattern.
        pattern: String,
        /// The regex compiler's complaint.
        reason: String,
    },

    /// The endpoint was built without a handler.
    #[error("no handler registered for route {route}")]
    MissingHandler {
        /// The route template.
        route: String,
    },

    /// The endpoint was built with an unusable HTTP method list.
    #[error("invalid HTTP methods for route {route}: {reason}")]
    InvalidMethods {
        /// The route template.
        route: String,
        /// What was wrong with them.
        reason: String,
    },
}
