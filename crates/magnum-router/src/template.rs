//! Route path templates.
//!
//! A template is a `/`-separated path whose segments are literals,
//! `{name}` placeholders matching one segment, or a trailing `*name`
//! wildcard matching the rest of the path.

use crate::Params;
use magnum_core::RegistrationError;
use std::fmt;

/// Kind of template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal segment (e.g. `items`).
    Static(String),
    /// Named placeholder (e.g. `{item_id}`).
    Param(String),
    /// Catch-all (e.g. `*path`), always last.
    Wildcard(String),
}

/// A parsed route template.
///
/// # Example
///
/// ```rust
/// use magnum_router::PathTemplate;
///
/// let template = PathTemplate::parse("/path/lt/{item_id}").unwrap();
/// assert_eq!(template.placeholders().collect::<Vec<_>>(), ["item_id"]);
///
/// let params = template.match_path("/path/lt/2").unwrap();
/// assert_eq!(params.get("item_id"), Some("2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template, rejecting empty or repeated placeholder names and
    /// wildcards that are not the final segment.
    pub fn parse(raw: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidTemplate {
            route: raw.to_string(),
            reason,
        };

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(invalid(format!("wildcard '*{name}' must be the last segment")));
                }
                Segment::Wildcard(name.to_string())
            } else if part.contains('{') || part.contains('}') {
                return Err(invalid(format!("malformed placeholder in segment '{part}'")));
            } else {
                Segment::Static((*part).to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if name.is_empty() {
                    return Err(invalid("placeholder with an empty name".into()));
                }
                let repeated = segments.iter().any(|s: &Segment| {
                    matches!(s, Segment::Param(n) | Segment::Wildcard(n) if n == name)
                });
                if repeated {
                    return Err(invalid(format!("placeholder '{name}' appears twice")));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns the template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over placeholder and wildcard names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::Wildcard(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Returns `true` if `name` is a placeholder in this template.
    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// Matches a concrete request path, returning the percent-decoded
    /// captured values.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.push(name.clone(), decode(value));
                }
                Segment::Wildcard(name) => {
                    let rest = parts.get(index..).unwrap_or_default().join("/");
                    params.push(name.clone(), decode(&rest));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |v| v.into_owned())
}
