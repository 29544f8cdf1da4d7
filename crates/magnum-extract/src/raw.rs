//! Raw values as read from a request, before coercion.

use bytes::Bytes;
use serde_json::{json, Value};

/// A value read from one location, not yet coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text from a query string, header, cookie, path segment or form field.
    Text(String),
    /// Structured value: a JSON body member or a collapsed `name[sub]` pair.
    Json(Value),
    /// Uploaded file.
    File(UploadedFile),
}

impl RawValue {
    /// Returns the JSON form used for coercion. Files become their metadata.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Json(value) => value.clone(),
            Self::File(file) => file.metadata(),
        }
    }

    /// Returns the uploaded file, if this is one.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A file uploaded through a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    field_name: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file.
    #[must_use]
    pub fn new(
        field_name: Option<String>,
        filename: Option<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name,
            filename,
            content_type,
            data: data.into(),
        }
    }

    /// Returns the multipart field name.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    /// Returns the client-supplied file name.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the file content.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for an empty upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the JSON metadata that stands in for the file during binding.
    #[must_use]
    pub fn metadata(&self) -> Value {
        json!({
            "filename": self.filename,
            "content_type": self.content_type,
            "size": self.data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_json() {
        assert_eq!(RawValue::from("42").to_json(), json!("42"));
    }

    #[test]
    fn test_file_metadata() {
        let file = UploadedFile::new(
            Some("doc".into()),
            Some("notes.txt".into()),
            Some("text/plain".into()),
            Bytes::from_static(b"hello"),
        );
        let raw = RawValue::File(file.clone());
        assert_eq!(
            raw.to_json(),
            json!({"filename": "notes.txt", "content_type": "text/plain", "size": 5})
        );
        assert_eq!(raw.as_file(), Some(&file));
        assert_eq!(file.len(), 5);
        assert_eq!(file.field_name(), Some("doc"));
    }
}
