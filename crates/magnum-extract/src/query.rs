//! Query-string source.
//!
//! Bracket keys are rewritten while the source is built, before any
//! parameter is looked up:
//!
//! | Raw pairs | Stored under | Values |
//! |-----------|--------------|--------|
//! | `id[]=1&id[]=2` | `id` | `"1"`, `"2"` |
//! | `order[name]=asc&order[age]=desc` | `order` | `{"name": "asc"}`, `{"age": "desc"}` |

use crate::{MultiMapSource, RawValue};
use magnum_core::Location;
use serde_json::{Map, Value};

/// Builds the query source from a raw query string.
///
/// A query string that fails to decode yields an empty source.
///
/// # Example
///
/// ```rust
/// use magnum_extract::{query_source, ExtractionSource, RawValue};
///
/// let source = query_source(Some("id[]=1&id[]=2&q=red"));
/// assert_eq!(source.get_all("id"), vec![RawValue::from("1"), RawValue::from("2")]);
/// assert_eq!(source.get("q"), Some(RawValue::from("red")));
/// ```
#[must_use]
pub fn query_source(query: Option<&str>) -> MultiMapSource {
    let mut source = MultiMapSource::new(Location::Query);
    let Some(query) = query else {
        return source;
    };
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::debug!(error = %err, "query string could not be decoded");
            return source;
        }
    };
    for (key, value) in pairs {
        match split_bracket_key(&key) {
            Some((name, "")) => source.push(name, RawValue::Text(value)),
            Some((name, sub)) => {
                let mut entry = Map::with_capacity(1);
                entry.insert(sub.to_string(), Value::String(value));
                source.push(name, RawValue::Json(Value::Object(entry)));
            }
            None => source.push(&key, RawValue::Text(value)),
        }
    }
    source
}

/// Splits `name[sub]` into `("name", "sub")` and `name[]` into `("name", "")`.
fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let name = &inner[..open];
    if name.is_empty() {
        return None;
    }
    Some((name, &inner[open + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionSource;
    use serde_json::json;

    #[test]
    fn test_plain_pairs() {
        let source = query_source(Some("page=1&perPage=10&q=red%20wine"));
        assert_eq!(source.get("q"), Some(RawValue::from("red wine")));
        assert_eq!(source.keys(), vec!["page", "perPage", "q"]);
    }

    #[test]
    fn test_bracket_arrays_collapse() {
        let source = query_source(Some("id[]=1&id[]=2"));
        assert_eq!(source.get_all("id"), vec![RawValue::from("1"), RawValue::from("2")]);
        assert_eq!(source.get_all("id[]").len(), 2);
    }

    #[test]
    fn test_bracket_maps_collapse_into_single_key_maps() {
        let source = query_source(Some("order[name]=asc&order[age]=desc"));
        let values: Vec<Value> = source.get_all("order").iter().map(RawValue::to_json).collect();
        assert_eq!(values, vec![json!({"name": "asc"}), json!({"age": "desc"})]);
    }

    #[test]
    fn test_encoded_brackets() {
        let source = query_source(Some("id%5B%5D=3"));
        assert_eq!(source.get_all("id"), vec![RawValue::from("3")]);
    }

    #[test]
    fn test_missing_or_empty_query() {
        assert!(query_source(None).is_empty());
        assert!(query_source(Some("")).is_empty());
    }

    #[test]
    fn test_split_bracket_key() {
        assert_eq!(split_bracket_key("a[b]"), Some(("a", "b")));
        assert_eq!(split_bracket_key("a[]"), Some(("a", "")));
        assert_eq!(split_bracket_key("a[b][c]"), Some(("a[b]", "c")));
        assert_eq!(split_bracket_key("[x]"), None);
        assert_eq!(split_bracket_key("plain"), None);
    }
}
