//! Handler return values.
//!
//! A handler answers with a [`Reply`]: either a finished response that is
//! passed through untouched, or a body with an optional status and
//! optional headers.
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `body` | status resolved from route conventions |
//! | `(body, status)` | returned status wins |
//! | `(body, headers)` | extra response headers |
//! | `(body, status, headers)` | both |

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Response, StatusCode};
use magnum_core::{MagnumError, ShapeError};
use serde::Serialize;
use serde_json::Value;

/// A response body before validation and serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured data, validated against the output schema.
    Json(Value),
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// No body.
    Empty,
}

impl Payload {
    /// Serializes a typed value into a JSON payload.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, MagnumError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|err| MagnumError::internal_with_source("response body is not serializable", err))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<()> for Payload {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

/// What a handler returns.
///
/// # Example
///
/// ```
/// use magnum_binding::{Payload, Reply};
/// use http::StatusCode;
/// use serde_json::json;
///
/// let reply = Reply::from_parts(vec![json!({"id": 1}), json!(218)]).unwrap();
/// assert!(matches!(reply, Reply::BodyStatus(Payload::Json(_), status) if status.as_u16() == 218));
///
/// let reply = Reply::json(&json!({"id": 1})).unwrap().with_status(StatusCode::ACCEPTED);
/// assert_eq!(reply.status(), Some(StatusCode::ACCEPTED));
/// ```
#[derive(Debug)]
pub enum Reply {
    /// A finished response, returned as is.
    Response(Response<Bytes>),
    /// A body.
    Body(Payload),
    /// A body and a status.
    BodyStatus(Payload, StatusCode),
    /// A body and extra headers.
    BodyHeaders(Payload, HeaderMap),
    /// A body, a status and extra headers.
    BodyStatusHeaders(Payload, StatusCode, HeaderMap),
}

impl Reply {
    /// Creates a reply carrying only a body.
    #[must_use]
    pub fn body(payload: impl Into<Payload>) -> Self {
        Self::Body(payload.into())
    }

    /// Creates a reply from a serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, MagnumError> {
        Payload::json(value).map(Self::Body)
    }

    /// Creates a reply without a body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Body(Payload::Empty)
    }

    /// Sets the status, keeping body and headers.
    ///
    /// A finished response is left untouched.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Self {
        match self {
            Self::Body(payload) | Self::BodyStatus(payload, _) => Self::BodyStatus(payload, status),
            Self::BodyHeaders(payload, headers) | Self::BodyStatusHeaders(payload, _, headers) => {
                Self::BodyStatusHeaders(payload, status, headers)
            }
            response @ Self::Response(_) => response,
        }
    }

    /// Adds headers, keeping body and status.
    ///
    /// A finished response is left untouched.
    #[must_use]
    pub fn with_headers(self, extra: HeaderMap) -> Self {
        match self {
            Self::Body(payload) => Self::BodyHeaders(payload, extra),
            Self::BodyStatus(payload, status) => Self::BodyStatusHeaders(payload, status, extra),
            Self::BodyHeaders(payload, mut headers) => {
                headers.extend(extra);
                Self::BodyHeaders(payload, headers)
            }
            Self::BodyStatusHeaders(payload, status, mut headers) => {
                headers.extend(extra);
                Self::BodyStatusHeaders(payload, status, headers)
            }
            response @ Self::Response(_) => response,
        }
    }

    /// Returns the status carried by the reply, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(response) => Some(response.status()),
            Self::BodyStatus(_, status) | Self::BodyStatusHeaders(_, status, _) => Some(*status),
            Self::Body(_) | Self::BodyHeaders(..) => None,
        }
    }

    /// Resolves a dynamically shaped return value.
    ///
    /// One element is the body. With two, an integer second element is the
    /// status and an object is the headers. With three, the order is body,
    /// status, headers. Headers may also be a list of `[name, value]` pairs.
    ///
    /// # Errors
    ///
    /// Any other arity or element type is a [`ShapeError`].
    pub fn from_parts(parts: Vec<Value>) -> Result<Self, ShapeError> {
        let arity = parts.len();
        let mut parts = parts.into_iter();
        match (parts.next(), parts.next(), parts.next(), arity) {
            (Some(body), None, None, 1) => Ok(Self::Body(Payload::Json(body))),
            (Some(body), Some(second), None, 2) => {
                if second.is_number() {
                    Ok(Self::BodyStatus(Payload::Json(body), status_from(&second)?))
                } else if second.is_object() || second.is_array() {
                    Ok(Self::BodyHeaders(Payload::Json(body), headers_from(&second)?))
                } else {
                    Err(ShapeError::InvalidHeaders(format!(
                        "expected a status code or a header map, got {second}"
                    )))
                }
            }
            (Some(body), Some(status), Some(headers), 3) => Ok(Self::BodyStatusHeaders(
                Payload::Json(body),
                status_from(&status)?,
                headers_from(&headers)?,
            )),
            _ => Err(ShapeError::Arity(arity)),
        }
    }
}

impl From<Payload> for Reply {
    fn from(payload: Payload) -> Self {
        Self::Body(payload)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Body(Payload::Json(value))
    }
}

impl From<Response<Bytes>> for Reply {
    fn from(response: Response<Bytes>) -> Self {
        Self::Response(response)
    }
}

fn status_from(value: &Value) -> Result<StatusCode, ShapeError> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| ShapeError::InvalidStatus(value.to_string()))
}

fn headers_from(value: &Value) -> Result<HeaderMap, ShapeError> {
    let pairs: Vec<(&str, &Value)> = match value {
        Value::Object(object) => object.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_array().map(Vec::as_slice) {
                Some([Value::String(name), value]) => Ok((name.as_str(), value)),
                _ => Err(ShapeError::InvalidHeaders(item.to_string())),
            })
            .collect::<Result<_, _>>()?,
        other => return Err(ShapeError::InvalidHeaders(other.to_string())),
    };

    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => return Err(ShapeError::InvalidHeaders(format!("{name}: {other}"))),
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ShapeError::InvalidHeaders(name.to_string()))?;
        let value = HeaderValue::from_str(&text)
            .map_err(|_| ShapeError::InvalidHeaders(format!("{name}: {text}")))?;
        headers.append(name, value);
    }
    Ok(headers)
}
