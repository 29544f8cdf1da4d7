//! Conversion of request-time errors into wire responses.
//!
//! Binding failures list every failing field; server-side defects are
//! reduced to a fixed message while full detail goes to the log.

use crate::{MagnumError, ValidationError};
use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

/// Message returned to clients for every 500-class failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Error";

/// Content type of every error body.
pub const ERROR_CONTENT_TYPE: &str = "application/json";

/// Body of a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrorBody<'a> {
    /// Every binding failure, in declaration order.
    pub detail: &'a [ValidationError],
}

/// A rendered error response: status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    status: StatusCode,
    body: Value,
}

impl ErrorReport {
    /// Renders an error, logging server-side defects in full.
    #[must_use]
    pub fn from_error(error: &MagnumError) -> Self {
        let status = error.status_code();
        let body = match error {
            MagnumError::InvalidRequest { errors } => {
                tracing::debug!(error_count = errors.len(), "request failed binding");
                serde_json::to_value(ValidationErrorBody { detail: errors })
                    .unwrap_or_else(|_| json!({ "detail": [] }))
            }
            MagnumError::NotFound(not_found) => json!({ "message": not_found.message() }),
            MagnumError::ResponseValidation(failure) => {
                tracing::error!(
                    errors = ?failure.errors,
                    value = %failure.value,
                    trace = %failure.trace,
                    "handler output violates its declared schema"
                );
                internal_body()
            }
            MagnumError::Internal {
                message,
                source: Some(source),
            } => {
                tracing::error!(error = %message, source = ?source, "handler failed");
                internal_body()
            }
            other => {
                tracing::error!(error = %other, "request terminated with an internal error");
                internal_body()
            }
        };
        Self { status, body }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the JSON body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Builds the HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let bytes = serde_json::to_vec(&self.body).unwrap_or_default();
        let mut response = Response::new(Bytes::from(bytes));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(ERROR_CONTENT_TYPE),
        );
        response
    }
}

impl From<&MagnumError> for ErrorReport {
    fn from(error: &MagnumError) -> Self {
        Self::from_error(error)
    }
}

fn internal_body() -> Value {
    json!({ "message": INTERNAL_ERROR_MESSAGE })
}
