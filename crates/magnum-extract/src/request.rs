//! Per-request sources, one per location.

use crate::body::{decode_form, decode_json, is_json_media_type};
use crate::multipart::{decode_multipart, MultipartConfig};
use crate::{
    cookie_source, query_source, ExtractionContext, ExtractionError, ExtractionSource,
    JsonSource, MultiMapSource, RawValue,
};
use magnum_core::Location;

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Limits applied while decoding the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Multipart limits.
    pub multipart: MultipartConfig,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            multipart: MultipartConfig::default(),
        }
    }
}

/// Read-only view of a request, split by location.
///
/// Built fresh for every request and never mutated afterwards.
///
/// # Example
///
/// ```rust
/// use magnum_core::Location;
/// use magnum_extract::{ExtractLimits, ExtractionContext, RawValue, RequestData};
/// use http::{Method, Uri};
///
/// # tokio_test::block_on(async {
/// let ctx = ExtractionContext::builder()
///     .method(Method::POST)
///     .uri(Uri::from_static("/wines?vintage=2019"))
///     .header("content-type", "application/json")
///     .body(r#"{"name": "Margaux"}"#)
///     .build();
///
/// let data = RequestData::from_context(&ctx, &ExtractLimits::default()).await.unwrap();
/// assert_eq!(data.source(Location::Query).get("vintage"), Some(RawValue::from("2019")));
/// assert!(data.source(Location::Body).get("name").is_some());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RequestData {
    path: MultiMapSource,
    query: MultiMapSource,
    header: MultiMapSource,
    cookie: MultiMapSource,
    body: JsonSource,
    form: MultiMapSource,
    file: MultiMapSource,
}

impl RequestData {
    /// Builds the path, query, header and cookie sources only.
    ///
    /// For routes that declare no payload parameter: the body is neither
    /// size-checked nor decoded, and the payload sources stay empty.
    #[must_use]
    pub fn without_payload(ctx: &ExtractionContext) -> Self {
        Self {
            path: path_source(ctx),
            query: query_source(ctx.query_string()),
            header: header_source(ctx),
            cookie: cookie_source(ctx.headers()),
            body: JsonSource::default(),
            form: MultiMapSource::new(Location::Form),
            file: MultiMapSource::new(Location::File),
        }
    }

    /// Builds every source from the host's request view.
    ///
    /// The payload is decoded according to its media type: JSON (or no
    /// declared type) feeds the body source, URL-encoded forms feed the
    /// form source, and multipart bodies feed both form and file sources.
    ///
    /// # Errors
    ///
    /// Fails if the body exceeds the limits or cannot be decoded.
    pub async fn from_context(
        ctx: &ExtractionContext,
        limits: &ExtractLimits,
    ) -> Result<Self, ExtractionError> {
        let mut data = Self::without_payload(ctx);
        if ctx.is_body_empty() {
            return Ok(data);
        }
        if ctx.body().len() > limits.max_body_size {
            return Err(ExtractionError::payload_too_large(
                limits.max_body_size,
                ctx.body().len(),
            ));
        }

        match ctx.media_type().as_deref() {
            None => data.body = JsonSource::new(decode_json(ctx.body())?),
            Some(media) if is_json_media_type(media) => {
                data.body = JsonSource::new(decode_json(ctx.body())?);
            }
            Some("application/x-www-form-urlencoded") => data.form = decode_form(ctx.body())?,
            Some("multipart/form-data") => {
                let content_type = ctx.content_type().unwrap_or_default();
                let parts =
                    decode_multipart(content_type, ctx.body().clone(), &limits.multipart).await?;
                data.form = parts.form;
                data.file = parts.files;
            }
            Some(other) => {
                tracing::debug!(media_type = other, "payload media type carries no bindable data");
            }
        }
        Ok(data)
    }

    /// Returns the source for a location.
    #[must_use]
    pub fn source(&self, location: Location) -> &dyn ExtractionSource {
        match location {
            Location::Path => &self.path,
            Location::Query => &self.query,
            Location::Header => &self.header,
            Location::Cookie => &self.cookie,
            Location::Body => &self.body,
            Location::Form => &self.form,
            Location::File => &self.file,
        }
    }
}

fn path_source(ctx: &ExtractionContext) -> MultiMapSource {
    let mut source = MultiMapSource::new(Location::Path);
    for (name, value) in ctx.path_params().iter() {
        source.push(name, RawValue::from(value));
    }
    source
}

fn header_source(ctx: &ExtractionContext) -> MultiMapSource {
    let mut source = MultiMapSource::case_insensitive(Location::Header);
    for (name, value) in ctx.headers() {
        let text = String::from_utf8_lossy(value.as_bytes()).into_owned();
        source.push(name.as_str(), RawValue::Text(text));
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri};
    use serde_json::json;

    async fn data(ctx: ExtractionContext) -> Result<RequestData, ExtractionError> {
        RequestData::from_context(&ctx, &ExtractLimits::default()).await
    }

    #[tokio::test]
    async fn test_every_location_is_reachable() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/items/7?q=red"))
            .header("x-token", "secret")
            .header("cookie", "session=abc")
            .header("content-type", "application/json")
            .body(r#"{"age": 30}"#)
            .path_param("item_id", "7")
            .build();
        let data = data(ctx).await.unwrap();

        for location in Location::ALL {
            assert_eq!(data.source(location).location(), location);
        }
        assert_eq!(data.source(Location::Path).get("item_id"), Some(RawValue::from("7")));
        assert_eq!(data.source(Location::Query).get("q"), Some(RawValue::from("red")));
        assert_eq!(data.source(Location::Header).get("X-Token"), Some(RawValue::from("secret")));
        assert_eq!(data.source(Location::Cookie).get("session"), Some(RawValue::from("abc")));
        assert_eq!(data.source(Location::Body).get("age"), Some(RawValue::Json(json!(30))));
    }

    #[tokio::test]
    async fn test_untyped_body_is_read_as_json() {
        let ctx = ExtractionContext::builder().body(r#"[1, 2]"#).build();
        let data = data(ctx).await.unwrap();
        assert_eq!(data.source(Location::Body).whole(), Some(RawValue::Json(json!([1, 2]))));
    }

    #[tokio::test]
    async fn test_form_body() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("name=Ann")
            .build();
        let data = data(ctx).await.unwrap();
        assert_eq!(data.source(Location::Form).get("name"), Some(RawValue::from("Ann")));
        assert!(data.source(Location::Body).whole().is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let ctx = ExtractionContext::builder()
            .header("content-type", "application/json")
            .body("{")
            .build();
        assert!(matches!(data(ctx).await, Err(ExtractionError::InvalidJson { .. })));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let ctx = ExtractionContext::builder().body(vec![b' '; 16]).build();
        let limits = ExtractLimits {
            max_body_size: 8,
            ..ExtractLimits::default()
        };
        let err = RequestData::from_context(&ctx, &limits).await.unwrap_err();
        assert_eq!(err, ExtractionError::payload_too_large(8, 16));
    }

    #[test]
    fn test_without_payload_leaves_body_unread() {
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/search?q=red"))
            .header("content-type", "application/json")
            .body("{ not json")
            .build();
        let data = RequestData::without_payload(&ctx);
        assert_eq!(data.source(Location::Query).get("q"), Some(RawValue::from("red")));
        assert!(data.source(Location::Body).whole().is_none());
        assert!(data.source(Location::Form).get_all("q").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_media_type_is_ignored() {
        let ctx = ExtractionContext::builder()
            .header("content-type", "text/plain")
            .body("hello")
            .build();
        let data = data(ctx).await.unwrap();
        assert!(data.source(Location::Body).whole().is_none());
    }
}
