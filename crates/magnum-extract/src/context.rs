//! The per-request view handed over by the host framework.
//!
//! The [`ExtractionContext`] carries everything the location sources read:
//! method, URI, headers, the already-materialized body and the values
//! captured by the host's path match.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use magnum_router::Params;

/// A request as seen by the binder.
///
/// # Example
///
/// ```
/// use magnum_extract::ExtractionContext;
/// use http::{Method, Uri};
///
/// let ctx = ExtractionContext::builder()
///     .method(Method::PUT)
///     .uri(Uri::from_static("/wines/7?dry_run=true"))
///     .header("content-type", "Application/JSON; charset=utf-8")
///     .path_param("wine_id", "7")
///     .body(r#"{"name": "Latour"}"#)
///     .build();
///
/// assert_eq!(ctx.query_string(), Some("dry_run=true"));
/// assert_eq!(ctx.media_type().as_deref(), Some("application/json"));
/// assert_eq!(ctx.path_params().get("wine_id"), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
}

impl ExtractionContext {
    /// Wraps the parts of a request the host already holds.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
        }
    }

    /// Starts building a context, defaulting to `GET /`.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder {
            inner: Self::new(
                Method::GET,
                Uri::from_static("/"),
                HeaderMap::new(),
                Bytes::new(),
                Params::new(),
            ),
        }
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw query string, without the `?`.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Materialized body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// `true` when no body was sent.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Values captured by the host's path match.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Full `Content-Type` value, parameters included.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// `Content-Type` reduced to its lowercased media type.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        let content_type = self.content_type()?;
        let essence = content_type.split(';').next().unwrap_or(content_type);
        Some(essence.trim().to_ascii_lowercase())
    }
}

/// Builder for [`ExtractionContext`], mostly used by tests.
#[derive(Debug)]
pub struct ExtractionContextBuilder {
    inner: ExtractionContext,
}

impl ExtractionContextBuilder {
    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.inner.method = method;
        self
    }

    /// Sets the URI, query included.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.inner.uri = uri;
        self
    }

    /// Appends a header; names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.inner.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.inner.body = body.into();
        self
    }

    /// Records one captured path segment.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.path_params.push(name, value);
        self
    }

    /// Finishes the context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        self.inner
    }
}
