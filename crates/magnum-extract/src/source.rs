//! Read-only, per-location views over a request.

use crate::RawValue;
use indexmap::IndexMap;
use magnum_core::Location;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Hook rewriting a source key before a retried lookup.
///
/// Configured once at startup and only read afterwards.
pub type KeyTransformer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A per-location, possibly multi-valued key to value(s) store.
pub trait ExtractionSource: fmt::Debug + Send + Sync {
    /// The location this source reads.
    fn location(&self) -> Location;

    /// Returns every value stored under `key`, in request order.
    ///
    /// A trailing `[]` on `key` is ignored when the exact key is absent.
    fn get_all(&self, key: &str) -> Vec<RawValue>;

    /// Returns the first value stored under `key`.
    fn get(&self, key: &str) -> Option<RawValue> {
        self.get_all(key).into_iter().next()
    }

    /// Returns the keys present, in request order.
    fn keys(&self) -> Vec<String>;

    /// Returns the whole payload, for a parameter that is the entire body.
    fn whole(&self) -> Option<RawValue>;

    /// Returns `true` when a sequence is spread over repeated keys rather
    /// than held in a single structured value.
    fn collects_sequences(&self) -> bool {
        true
    }

    /// Looks `key` up after rewriting every source key with `transform`.
    fn get_all_transformed(&self, key: &str, transform: &KeyTransformer) -> Vec<RawValue> {
        let wanted = key.strip_suffix("[]").unwrap_or(key);
        self.keys()
            .iter()
            .filter(|source_key| transform(source_key) == wanted)
            .flat_map(|source_key| self.get_all(source_key))
            .collect()
    }
}

/// Multi-map source used for query, path, header, cookie, form and file.
#[derive(Debug, Clone)]
pub struct MultiMapSource {
    location: Location,
    entries: IndexMap<String, Vec<RawValue>>,
    case_insensitive: bool,
}

impl MultiMapSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            entries: IndexMap::new(),
            case_insensitive: false,
        }
    }

    /// Creates an empty source with case-insensitive keys.
    #[must_use]
    pub fn case_insensitive(location: Location) -> Self {
        Self {
            case_insensitive: true,
            ..Self::new(location)
        }
    }

    /// Appends a value under `key`.
    pub fn push(&mut self, key: &str, value: RawValue) {
        let key = self.normalize(key);
        self.entries.entry(key).or_default().push(value);
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the source holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn normalize(&self, key: &str) -> String {
        if self.case_insensitive {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        }
    }
}

impl ExtractionSource for MultiMapSource {
    fn location(&self) -> Location {
        self.location
    }

    fn get_all(&self, key: &str) -> Vec<RawValue> {
        let key = self.normalize(key);
        self.entries
            .get(&key)
            .or_else(|| key.strip_suffix("[]").and_then(|k| self.entries.get(k)))
            .cloned()
            .unwrap_or_default()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn whole(&self) -> Option<RawValue> {
        if self.entries.is_empty() {
            return None;
        }
        if self.location == Location::File {
            let mut files = self.entries.values().flatten();
            if let (Some(first), None) = (files.next(), files.next()) {
                return Some(first.clone());
            }
        }
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, values)| {
                let value = match values.as_slice() {
                    [single] => single.to_json(),
                    many => Value::Array(many.iter().map(RawValue::to_json).collect()),
                };
                (key.clone(), value)
            })
            .collect();
        Some(RawValue::Json(Value::Object(object)))
    }
}

/// Source over a decoded JSON body.
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    body: Option<Value>,
}

impl JsonSource {
    /// Creates a source over a decoded body, or none.
    #[must_use]
    pub fn new(body: Option<Value>) -> Self {
        Self { body }
    }
}

impl ExtractionSource for JsonSource {
    fn location(&self) -> Location {
        Location::Body
    }

    fn get_all(&self, key: &str) -> Vec<RawValue> {
        match &self.body {
            Some(Value::Object(object)) => object
                .get(key)
                .map(|value| vec![RawValue::Json(value.clone())])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn keys(&self) -> Vec<String> {
        match &self.body {
            Some(Value::Object(object)) => object.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn whole(&self) -> Option<RawValue> {
        self.body.clone().map(RawValue::Json)
    }

    fn collects_sequences(&self) -> bool {
        false
    }
}

/// Ready-made key transformers.
pub mod transformers {
    use super::KeyTransformer;
    use std::sync::Arc;

    /// Rewrites `perPage` as `per_page`.
    #[must_use]
    pub fn camel_to_snake() -> KeyTransformer {
        Arc::new(|key: &str| to_snake_case(key))
    }

    /// Rewrites `per_page` as `perPage`.
    #[must_use]
    pub fn snake_to_camel() -> KeyTransformer {
        Arc::new(|key: &str| to_camel_case(key))
    }

    /// Converts camelCase to snake_case.
    #[must_use]
    pub fn to_snake_case(key: &str) -> String {
        let mut out = String::with_capacity(key.len() + 4);
        for (index, ch) in key.chars().enumerate() {
            if ch.is_ascii_uppercase() {
                if index > 0 {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Converts snake_case to camelCase.
    #[must_use]
    pub fn to_camel_case(key: &str) -> String {
        let mut out = String::with_capacity(key.len());
        let mut upper_next = false;
        for ch in key.chars() {
            if ch == '_' && !out.is_empty() {
                upper_next = true;
            } else if upper_next {
                out.push(ch.to_ascii_uppercase());
                upper_next = false;
            } else {
                out.push(ch);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> MultiMapSource {
        let mut source = MultiMapSource::new(Location::Query);
        source.push("id", "1".into());
        source.push("id", "2".into());
        source.push("perPage", "10".into());
        source
    }

    #[test]
    fn test_multi_values_in_order() {
        let source = query();
        assert_eq!(source.get_all("id"), vec![RawValue::from("1"), RawValue::from("2")]);
        assert_eq!(source.get("id"), Some(RawValue::from("1")));
        assert_eq!(source.get_all("id[]").len(), 2);
        assert!(source.get_all("missing").is_empty());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let mut source = MultiMapSource::case_insensitive(Location::Header);
        source.push("X-Token", "abc".into());
        assert_eq!(source.get("x-token"), Some(RawValue::from("abc")));
        assert_eq!(source.get("X-TOKEN"), Some(RawValue::from("abc")));
    }

    #[test]
    fn test_transformed_lookup() {
        let source = query();
        let transform = transformers::camel_to_snake();
        assert_eq!(
            source.get_all_transformed("per_page", &transform),
            vec![RawValue::from("10")]
        );
    }

    #[test]
    fn test_whole_form() {
        let mut form = MultiMapSource::new(Location::Form);
        form.push("name", "Ann".into());
        form.push("tag", "a".into());
        form.push("tag", "b".into());
        assert_eq!(
            form.whole().map(|raw| raw.to_json()),
            Some(json!({"name": "Ann", "tag": ["a", "b"]}))
        );
        assert!(MultiMapSource::new(Location::Form).whole().is_none());
    }

    #[test]
    fn test_whole_single_file() {
        let mut files = MultiMapSource::new(Location::File);
        let upload = crate::UploadedFile::new(Some("doc".into()), Some("a.txt".into()), None, "x");
        files.push("doc", RawValue::File(upload.clone()));
        assert_eq!(files.whole(), Some(RawValue::File(upload)));
    }

    #[test]
    fn test_json_source() {
        let source = JsonSource::new(Some(json!({"age": 30, "tags": [1, 2]})));
        assert_eq!(source.get("age"), Some(RawValue::Json(json!(30))));
        assert_eq!(source.get_all("tags"), vec![RawValue::Json(json!([1, 2]))]);
        assert!(!source.collects_sequences());
        assert_eq!(source.keys(), vec!["age".to_string(), "tags".to_string()]);

        let empty = JsonSource::new(None);
        assert!(empty.whole().is_none());
        assert!(empty.get("age").is_none());
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(transformers::to_snake_case("perPage"), "per_page");
        assert_eq!(transformers::to_snake_case("page"), "page");
        assert_eq!(transformers::to_camel_case("per_page"), "perPage");
        assert_eq!(transformers::to_camel_case("_private"), "_private");
    }
}
