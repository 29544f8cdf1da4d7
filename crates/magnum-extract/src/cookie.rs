//! Cookie source.

use crate::{MultiMapSource, RawValue};
use http::{header, HeaderMap};
use magnum_core::Location;

/// Builds the cookie source from every `Cookie` header.
///
/// Pairs without `=` are ignored; surrounding quotes are stripped.
///
/// # Example
///
/// ```rust
/// use magnum_extract::{cookie_source, ExtractionSource, RawValue};
/// use http::{header, HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("session=abc123; theme=\"dark\""));
///
/// let cookies = cookie_source(&headers);
/// assert_eq!(cookies.get("session"), Some(RawValue::from("abc123")));
/// assert_eq!(cookies.get("theme"), Some(RawValue::from("dark")));
/// ```
#[must_use]
pub fn cookie_source(headers: &HeaderMap) -> MultiMapSource {
    let mut source = MultiMapSource::new(Location::Cookie);
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                source.push(name, RawValue::Text(value.to_string()));
            }
        }
    }
    source
}
