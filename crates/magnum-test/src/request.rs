//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;
use serde_json::Value;

/// A request ready to be dispatched by a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }
}

/// Builder for [`TestRequest`].
///
/// Invalid input is remembered and reported by [`TestRequestBuilder::build`].
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Appends a header; repeated names keep every value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = match HeaderName::try_from(name.as_ref()) {
            Ok(name) => name,
            Err(_) => return self.fail(TestError::InvalidHeader(name.as_ref().to_string())),
        };
        match HeaderValue::try_from(value.as_ref()) {
            Ok(value) => {
                self.headers.append(name, value);
                self
            }
            Err(_) => self.fail(TestError::InvalidHeader(format!("{name}: {}", value.as_ref()))),
        }
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Appends a `name=value` cookie to the Cookie header.
    pub fn cookie(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.header(
            header::COOKIE.as_str(),
            format!("{}={}", name.as_ref(), value.as_ref()),
        )
    }

    /// Appends a percent-encoded query pair.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.query
            .push((name.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Appends `name[]=value` for each value.
    pub fn query_array<I, S>(mut self, name: impl AsRef<str>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = format!("{}[]", name.as_ref());
        for value in values {
            self.query.push((key.clone(), value.as_ref().to_string()));
        }
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and its Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.content_type("application/json")
            }
            Err(err) => self.fail(TestError::Json(err)),
        }
    }

    /// Sets a url-encoded form body from a flat serializable map.
    ///
    /// Arrays are written as repeated keys.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        let map = match serde_json::to_value(value) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return self.fail(TestError::RequestBuild(format!(
                    "form body must be an object, got {other}"
                )))
            }
            Err(err) => return self.fail(TestError::Json(err)),
        };

        let mut pairs = Vec::new();
        for (key, value) in &map {
            match value {
                Value::Array(items) => pairs.extend(items.iter().map(|item| (key.as_str(), scalar(item)))),
                other => pairs.push((key.as_str(), scalar(other))),
            }
        }
        self.body = Some(Bytes::from(encode_pairs(
            pairs.iter().map(|(k, v)| (*k, v.as_str())),
        )));
        self.content_type("application/x-www-form-urlencoded")
    }

    /// Sets a multipart body and its Content-Type.
    pub fn multipart(mut self, form: MultipartBody) -> Self {
        let content_type = form.content_type();
        self.body = Some(form.into_bytes());
        self.content_type(content_type)
    }

    /// Builds the request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut uri = self.uri;
        if !self.query.is_empty() {
            let separator = if uri.contains('?') { '&' } else { '?' };
            uri.push(separator);
            uri.push_str(&encode_pairs(
                self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ));
        }
        let uri: Uri = uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }

    fn fail(mut self, err: TestError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| {
            // `[]` stays literal
            let key = urlencoding::encode(k).replace("%5B", "[").replace("%5D", "]");
            format!("{key}={}", urlencoding::encode(v))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// A `multipart/form-data` body.
///
/// # Example
///
/// ```
/// use magnum_test::{MultipartBody, TestRequest};
///
/// let form = MultipartBody::new()
///     .text("title", "Vintage list")
///     .file("upload", "list.csv", "text/csv", "name,year\nMargaux,2015\n");
/// let request = TestRequest::post("/uploads").multipart(form).build().unwrap();
/// assert!(request.headers["content-type"].to_str().unwrap().starts_with("multipart/form-data"));
/// ```
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: "magnum-test-boundary-7d3f1e".to_string(),
            body: Vec::new(),
        }
    }

    /// Adds a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!("form-data; name=\"{name}\""), None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: &str,
        filename: &str,
        content_type: &str,
        content: impl AsRef<[u8]>,
    ) -> Self {
        self.open_part(
            &format!("form-data; name=\"{name}\"; filename=\"{filename}\""),
            Some(content_type),
        );
        self.body.extend_from_slice(content.as_ref());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the Content-Type header value, boundary included.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Finishes the form.
    #[must_use]
    pub fn into_bytes(mut self) -> Bytes {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Bytes::from(self.body)
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body
            .extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        if let Some(content_type) = content_type {
            self.body
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.body.extend_from_slice(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_is_encoded() {
        let request = TestRequest::get("/search")
            .query("q", "red wine")
            .query_array("id", ["1", "2"])
            .build()
            .unwrap();
        assert_eq!(request.uri.path(), "/search");
        assert_eq!(request.uri.query(), Some("q=red%20wine&id[]=1&id[]=2"));
    }

    #[test]
    fn test_query_appends_to_existing() {
        let request = TestRequest::get("/search?a=1").query("b", "2").build().unwrap();
        assert_eq!(request.uri.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/users")
            .json(&json!({"name": "Ann"}))
            .build()
            .unwrap();
        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(request.body.as_ref(), br#"{"name":"Ann"}"#);
    }

    #[test]
    fn test_form_body_repeats_arrays() {
        let request = TestRequest::post("/login")
            .form(&json!({"username": "ann", "roles": ["a", "b"]}))
            .build()
            .unwrap();
        assert_eq!(request.body.as_ref(), b"username=ann&roles=a&roles=b");
        assert_eq!(
            request.headers[header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_invalid_header_reported_at_build() {
        let result = TestRequest::get("/").header("bad header", "x").build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_cookies_and_repeated_headers() {
        let request = TestRequest::get("/")
            .cookie("session", "abc")
            .header("x-tag", "a")
            .header("x-tag", "b")
            .build()
            .unwrap();
        assert_eq!(request.headers[header::COOKIE], "session=abc");
        assert_eq!(request.headers.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_multipart_layout() {
        let bytes = MultipartBody::new().text("a", "1").into_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("--magnum-test-boundary-7d3f1e\r\n"));
        assert!(text.contains("Content-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n"));
        assert!(text.ends_with("--magnum-test-boundary-7d3f1e--\r\n"));
    }
}
