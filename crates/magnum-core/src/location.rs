//! Parameter source locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a declared parameter's value originates in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Path segment matched by a `{placeholder}` in the route template.
    Path,
    /// URL query string.
    Query,
    /// HTTP request header.
    Header,
    /// Cookie from the `Cookie` header.
    Cookie,
    /// JSON request body.
    Body,
    /// URL-encoded or multipart form field.
    Form,
    /// Uploaded file from a multipart body.
    File,
}

impl Location {
    /// All locations, in the order the inbound binder visits them.
    pub const ALL: [Self; 7] = [
        Self::Query,
        Self::Path,
        Self::Header,
        Self::Cookie,
        Self::Body,
        Self::Form,
        Self::File,
    ];

    /// Returns the lowercase wire name used in error locations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::Form => "form",
            Self::File => "file",
        }
    }

    /// Returns `true` for the locations read from the request payload.
    #[must_use]
    pub const fn is_body_family(&self) -> bool {
        matches!(self, Self::Body | Self::Form | Self::File)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_name() {
        for location in Location::ALL {
            assert_eq!(location.to_string(), location.as_str());
        }
    }

    #[test]
    fn test_body_family() {
        assert!(Location::Body.is_body_family());
        assert!(Location::Form.is_body_family());
        assert!(Location::File.is_body_family());
        assert!(!Location::Query.is_body_family());
        assert!(!Location::Path.is_body_family());
        assert!(!Location::Header.is_body_family());
        assert!(!Location::Cookie.is_body_family());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Location::Cookie).unwrap();
        assert_eq!(json, "\"cookie\"");
        let back: Location = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(back, Location::File);
    }
}
