//! Response validation and serialization.
//!
//! [`OutboundHandler::finish`] turns a [`Reply`] into an [`OutboundResult`]:
//!
//! 1. A finished response passes through untouched.
//! 2. The status is resolved; body-forbidden statuses get no body.
//! 3. Without an output schema the body is serialized as is.
//! 4. With one, the body is validated first. Undeclared record fields are
//!    dropped and defaults filled; a violation is a server-side defect
//!    (500), never a client error.

use crate::outbound::{Payload, Reply};
use crate::status::StatusResolver;
use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{HeaderMap, Method, Response, StatusCode};
use magnum_core::{MagnumError, ResponseValidationError};
use magnum_extract::transformers::to_camel_case;
use magnum_schema::FieldType;
use serde_json::Value;

/// Content type of JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of text responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
/// Content type of raw byte responses.
pub const BYTES_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns `true` if a response with `status` must not carry a body.
#[must_use]
pub fn status_forbids_body(status: StatusCode) -> bool {
    status.as_u16() < 200
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::RESET_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Key casing of serialized JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutboundCasing {
    /// Keys are written as declared.
    #[default]
    Preserve,
    /// snake_case keys are written as camelCase.
    Camel,
}

/// The response declaration of a route.
///
/// # Example
///
/// ```
/// use magnum_binding::{OutboundCasing, ResponseSpec};
/// use magnum_schema::FieldType;
/// use http::StatusCode;
///
/// let spec = ResponseSpec::new()
///     .with_schema(FieldType::list(FieldType::Int))
///     .with_status(StatusCode::ACCEPTED)
///     .with_casing(OutboundCasing::Camel);
/// assert_eq!(spec.status(), Some(StatusCode::ACCEPTED));
/// assert_eq!(spec.content_type(), "application/json");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    schema: Option<FieldType>,
    status: Option<StatusCode>,
    content_type: String,
    casing: OutboundCasing,
    description: String,
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            schema: None,
            status: None,
            content_type: JSON_CONTENT_TYPE.to_string(),
            casing: OutboundCasing::Preserve,
            description: "Successful Response".to_string(),
        }
    }
}

impl ResponseSpec {
    /// Creates a declaration without an output schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output schema.
    #[must_use]
    pub fn with_schema(mut self, schema: FieldType) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the configured status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the content type of JSON bodies.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the key casing of JSON bodies.
    #[must_use]
    pub fn with_casing(mut self, casing: OutboundCasing) -> Self {
        self.casing = casing;
        self
    }

    /// Sets the documentation description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the output schema.
    #[must_use]
    pub fn schema(&self) -> Option<&FieldType> {
        self.schema.as_ref()
    }

    /// Returns the configured status.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the content type of JSON bodies.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the key casing.
    #[must_use]
    pub fn casing(&self) -> OutboundCasing {
        self.casing
    }

    /// Returns the documentation description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON-Schema of the output, for documentation generators.
    #[must_use]
    pub fn to_json_schema(&self) -> Option<Value> {
        self.schema.as_ref().map(FieldType::to_json_schema)
    }
}

/// What the host framework writes to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    /// Serialized body, if any.
    pub body: Option<Bytes>,
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

impl OutboundResult {
    /// Builds the HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body.unwrap_or_default());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Response<Bytes>> for OutboundResult {
    fn from(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            body: (!body.is_empty()).then_some(body),
            status: parts.status,
            headers: parts.headers,
        }
    }
}

/// Validates and serializes the replies of one route.
#[derive(Debug, Clone)]
pub struct OutboundHandler {
    spec: ResponseSpec,
    status: StatusResolver,
}

impl OutboundHandler {
    /// Creates the handler of a route answering with `main_method` conventions.
    #[must_use]
    pub fn new(spec: ResponseSpec, main_method: &Method) -> Self {
        let status = StatusResolver::new(main_method, spec.status);
        Self { spec, status }
    }

    /// Returns the response declaration.
    #[must_use]
    pub fn spec(&self) -> &ResponseSpec {
        &self.spec
    }

    /// Returns the status resolver.
    #[must_use]
    pub fn status_resolver(&self) -> &StatusResolver {
        &self.status
    }

    /// Finishes a reply.
    ///
    /// # Errors
    ///
    /// [`MagnumError::ResponseValidation`] when the body violates the
    /// output schema, [`MagnumError::UnsupportedContent`] when a text or
    /// byte body meets an output schema.
    pub fn finish(&self, reply: Reply) -> Result<OutboundResult, MagnumError> {
        let (payload, returned, mut headers) = match reply {
            Reply::Response(response) => return Ok(response.into()),
            Reply::Body(payload) => (payload, None, HeaderMap::new()),
            Reply::BodyStatus(payload, status) => (payload, Some(status), HeaderMap::new()),
            Reply::BodyHeaders(payload, headers) => (payload, None, headers),
            Reply::BodyStatusHeaders(payload, status, headers) => (payload, Some(status), headers),
        };

        let status = self.status.resolve(returned);
        if status_forbids_body(status) {
            return Ok(OutboundResult {
                body: None,
                status,
                headers,
            });
        }

        let (body, content_type) = match (&self.spec.schema, payload) {
            (None, Payload::Empty) => (None, None),
            (Some(schema), Payload::Empty) if schema.is_optional() => (None, None),
            (None, Payload::Json(value)) => (Some(self.serialize(value)?), Some(self.spec.content_type.as_str())),
            (None, Payload::Text(text)) => (Some(Bytes::from(text)), Some(TEXT_CONTENT_TYPE)),
            (None, Payload::Bytes(bytes)) => (Some(bytes), Some(BYTES_CONTENT_TYPE)),
            (Some(schema), Payload::Json(value)) => {
                let validated = validate_output(schema, value)?;
                (Some(self.serialize(validated)?), Some(self.spec.content_type.as_str()))
            }
            (Some(schema), Payload::Empty) => {
                let validated = validate_output(schema, Value::Null)?;
                (Some(self.serialize(validated)?), Some(self.spec.content_type.as_str()))
            }
            (Some(schema), Payload::Text(_) | Payload::Bytes(_)) => {
                return Err(MagnumError::unsupported_content(format!(
                    "a text or byte body cannot be validated against {schema}"
                )));
            }
        };

        if let Some(content_type) = content_type {
            if !headers.contains_key(header::CONTENT_TYPE) {
                let value = HeaderValue::from_str(content_type).map_err(|err| {
                    MagnumError::internal_with_source("invalid response content type", err)
                })?;
                headers.insert(header::CONTENT_TYPE, value);
            }
        }

        Ok(OutboundResult { body, status, headers })
    }

    fn serialize(&self, value: Value) -> Result<Bytes, MagnumError> {
        let value = match self.spec.casing {
            OutboundCasing::Preserve => value,
            OutboundCasing::Camel => camelize_keys(value),
        };
        serde_json::to_vec(&value)
            .map(Bytes::from)
            .map_err(|err| MagnumError::internal_with_source("response body is not serializable", err))
    }
}

fn validate_output(schema: &FieldType, value: Value) -> Result<Value, MagnumError> {
    schema.coerce(&value).map_err(|errors| {
        MagnumError::ResponseValidation(ResponseValidationError::capture(errors, value))
    })
}

/// Rewrites every object key from snake_case to camelCase.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (to_camel_case(&key), camelize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}
