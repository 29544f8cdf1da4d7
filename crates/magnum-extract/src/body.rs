//! JSON and URL-encoded payload decoding.

use crate::{ExtractionError, MultiMapSource, RawValue};
use bytes::Bytes;
use magnum_core::Location;
use serde_json::Value;

/// Returns `true` for `application/json` and `application/*+json`.
#[must_use]
pub fn is_json_media_type(media_type: &str) -> bool {
    media_type == "application/json"
        || (media_type.starts_with("application/") && media_type.ends_with("+json"))
}

/// Decodes a JSON body. An empty body decodes to `None`.
pub fn decode_json(body: &Bytes) -> Result<Option<Value>, ExtractionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| ExtractionError::invalid_json(err.to_string()))
}

/// Decodes an `application/x-www-form-urlencoded` body into the form source.
pub fn decode_form(body: &Bytes) -> Result<MultiMapSource, ExtractionError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|err| ExtractionError::invalid_form(err.to_string()))?;
    let mut source = MultiMapSource::new(Location::Form);
    for (key, value) in pairs {
        source.push(&key, RawValue::Text(value));
    }
    Ok(source)
}
