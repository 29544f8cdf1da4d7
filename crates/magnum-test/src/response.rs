//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A finished response plus assertion helpers.
///
/// Every `assert_*` method returns `&Self` so checks chain.
#[derive(Debug)]
pub struct TestResponse {
    inner: Response<Bytes>,
}

impl TestResponse {
    /// Wraps a finished response.
    pub fn from_response(inner: Response<Bytes>) -> Self {
        Self { inner }
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Numeric status, handy for codes without a name such as 218.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// First value of a header.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers().get(name.as_ref())
    }

    /// Header value, if present and visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|value| value.to_str().ok())
    }

    /// `Content-Type` value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE)
    }

    /// Raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        std::str::from_utf8(self.body())
            .map(str::to_owned)
            .map_err(|err| TestError::BodyRead(format!("body is not UTF-8: {err}")))
    }

    /// Body decoded into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(self.body())?)
    }

    /// Body decoded into an untyped JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Returns the entries of a 400 `{"detail": [...]}` body.
    pub fn validation_errors(&self) -> Result<Vec<Value>, TestError> {
        match self.json_value()? {
            Value::Object(mut object) => match object.remove("detail") {
                Some(Value::Array(entries)) => Ok(entries),
                _ => Err(TestError::BodyRead("body has no detail list".to_string())),
            },
            other => Err(TestError::BodyRead(format!("expected an object, got {other}"))),
        }
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(self.body())
        );
        self
    }

    /// Asserts that a header has the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        match self.header_str(name) {
            Some(actual) => assert_eq!(actual, expected.as_ref(), "header {name}"),
            None => panic!("response has no {name} header"),
        }
        self
    }

    /// Asserts that the body is the given JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    pub fn assert_json(&self, expected: &Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected, "JSON body"),
            Err(err) => panic!("body is not JSON: {err}"),
        }
        self
    }

    /// Asserts that the body is empty.
    ///
    /// # Panics
    ///
    /// Panics if the body has any bytes.
    pub fn assert_empty_body(&self) -> &Self {
        assert!(
            self.body().is_empty(),
            "expected an empty body, got {}",
            String::from_utf8_lossy(self.body())
        );
        self
    }

    /// Asserts a 400 with exactly one entry at `loc` of type `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the response is not such a validation failure.
    pub fn assert_single_validation_error(&self, loc: &[&str], kind: &str) -> &Self {
        self.assert_status(StatusCode::BAD_REQUEST);
        let entries = self
            .validation_errors()
            .unwrap_or_else(|e| panic!("not a validation failure: {e}"));
        assert_eq!(entries.len(), 1, "expected one validation error, got {entries:?}");
        assert_eq!(entries[0]["loc"], Value::from(loc.to_vec()), "error location");
        assert_eq!(entries[0]["type"], kind, "error type");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: StatusCode, body: &'static str) -> TestResponse {
        TestResponse::from_response(
            Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Bytes::from_static(body.as_bytes()))
                .unwrap(),
        )
    }

    #[test]
    fn test_accessors() {
        let res = response(StatusCode::OK, r#"{"a":1}"#);
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.content_type(), Some("application/json"));
        assert_eq!(res.text().unwrap(), r#"{"a":1}"#);
        res.assert_json(&json!({"a": 1}))
            .assert_header("content-type", "application/json");
    }

    #[test]
    fn test_validation_errors() {
        let res = response(
            StatusCode::BAD_REQUEST,
            r#"{"detail":[{"loc":["query","q"],"msg":"field required","type":"value_error.missing"}]}"#,
        );
        res.assert_single_validation_error(&["query", "q"], "value_error.missing");
        assert!(response(StatusCode::OK, "[]").validation_errors().is_err());
    }

    #[test]
    #[should_panic(expected = "expected an empty body")]
    fn test_assert_empty_body_panics() {
        response(StatusCode::OK, "x").assert_empty_body();
    }
}
