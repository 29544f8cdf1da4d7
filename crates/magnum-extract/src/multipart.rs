//! Multipart decoding into the form and file sources.
//!
//! Parts carrying a file name become uploads; every other part is a text
//! form field. This is the only asynchronous step of extraction.

use crate::{ExtractionError, MultiMapSource, RawValue, UploadedFile};
use bytes::Bytes;
use magnum_core::Location;
use std::io;

/// Default maximum size per part (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of parts.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while decoding a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Maximum size per part in bytes.
    pub max_field_size: usize,
    /// Maximum number of parts.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum part size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of parts.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// Decoded multipart body.
#[derive(Debug, Clone)]
pub struct MultipartParts {
    /// Text fields.
    pub form: MultiMapSource,
    /// Uploaded files.
    pub files: MultiMapSource,
}

/// Decodes a multipart body.
///
/// # Errors
///
/// Fails on a missing boundary, malformed parts, or a limit violation.
pub async fn decode_multipart(
    content_type: &str,
    body: Bytes,
    config: &MultipartConfig,
) -> Result<MultipartParts, ExtractionError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ExtractionError::invalid_multipart("missing or invalid boundary in Content-Type")
    })?;

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = MultipartParts {
        form: MultiMapSource::new(Location::Form),
        files: MultiMapSource::new(Location::File),
    };
    let mut count = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ExtractionError::invalid_multipart(err.to_string()))?
    {
        count += 1;
        if count > config.max_fields {
            return Err(ExtractionError::TooManyFields {
                max: config.max_fields,
            });
        }

        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|err| ExtractionError::invalid_multipart(err.to_string()))?;
        if data.len() > config.max_field_size {
            return Err(ExtractionError::payload_too_large(
                config.max_field_size,
                data.len(),
            ));
        }

        if filename.is_some() {
            let upload = UploadedFile::new(Some(name.clone()), filename, content_type, data);
            parts.files.push(&name, RawValue::File(upload));
        } else {
            let text = String::from_utf8_lossy(&data).into_owned();
            parts.form.push(&name, RawValue::Text(text));
        }
    }

    tracing::debug!(
        form_fields = parts.form.len(),
        file_fields = parts.files.len(),
        "decoded multipart body"
    );
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionSource;

    const CONTENT_TYPE: &str = "multipart/form-data; boundary=X-BOUNDARY";

    fn body() -> Bytes {
        Bytes::from(
            "--X-BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Report\r\n\
             --X-BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --X-BOUNDARY--\r\n",
        )
    }

    #[tokio::test]
    async fn test_splits_fields_and_files() {
        let parts = decode_multipart(CONTENT_TYPE, body(), &MultipartConfig::default())
            .await
            .unwrap();

        assert_eq!(parts.form.get("title"), Some(RawValue::from("Report")));
        let upload = parts.files.get("doc").unwrap();
        let file = upload.as_file().unwrap();
        assert_eq!(file.filename(), Some("a.txt"));
        assert_eq!(file.content_type(), Some("text/plain"));
        assert_eq!(file.data().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_field_limit() {
        let config = MultipartConfig::new().max_fields(1);
        let err = decode_multipart(CONTENT_TYPE, body(), &config).await.unwrap_err();
        assert_eq!(err, ExtractionError::TooManyFields { max: 1 });
    }

    #[tokio::test]
    async fn test_size_limit() {
        let config = MultipartConfig::new().max_field_size(3);
        let err = decode_multipart(CONTENT_TYPE, body(), &config).await.unwrap_err();
        assert!(matches!(err, ExtractionError::PayloadTooLarge { max: 3, .. }));
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let err = decode_multipart("multipart/form-data", body(), &MultipartConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidMultipart { .. }));
    }
}
