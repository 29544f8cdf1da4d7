//! Inbound binding.
//!
//! [`InboundBinder::bind`] visits the query, path, header and cookie
//! parameters, then the payload, and either returns every bound value or
//! every failure. Errors are accumulated; binding never stops at the first
//! bad field.

use crate::composer::BodySchema;
use crate::registry::{header_alias, ParameterSpec, RouteBinding};
use indexmap::IndexMap;
use magnum_core::{LocSegment, Location, MagnumError, ValidationError};
use magnum_extract::{ExtractionSource, KeyTransformer, RawValue, RequestData, UploadedFile};
use magnum_schema::{Field, FieldType, RecordSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

const PARAMETER_LOCATIONS: [Location; 4] = [
    Location::Query,
    Location::Path,
    Location::Header,
    Location::Cookie,
];

/// Binder settings, fixed at startup.
#[derive(Clone, Default)]
pub struct BinderConfig {
    key_transformer: Option<KeyTransformer>,
}

impl BinderConfig {
    /// Creates the default configuration: no key rewriting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook applied to source keys when a sequence lookup misses.
    #[must_use]
    pub fn key_transformer(mut self, transformer: KeyTransformer) -> Self {
        self.key_transformer = Some(transformer);
        self
    }

    /// Returns the key-rewriting hook.
    #[must_use]
    pub fn transformer(&self) -> Option<&KeyTransformer> {
        self.key_transformer.as_ref()
    }
}

impl fmt::Debug for BinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderConfig")
            .field("key_transformer", &self.key_transformer.is_some())
            .finish()
    }
}

/// Values bound for one request, keyed by declared name.
///
/// # Example
///
/// ```
/// use magnum_binding::BoundValues;
/// use serde_json::json;
///
/// let mut values = BoundValues::default();
/// values.insert("item_id", json!(3));
/// assert_eq!(values.get("item_id"), Some(&json!(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundValues {
    values: IndexMap<String, Value>,
    files: IndexMap<String, Vec<UploadedFile>>,
}

impl BoundValues {
    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets a value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the first file uploaded for `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).and_then(|files| files.first())
    }

    /// Returns every file uploaded for `name`.
    #[must_use]
    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Deserializes one value.
    pub fn extract<T: DeserializeOwned>(&self, name: &str) -> Result<T, MagnumError> {
        let value = self.values.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| {
            MagnumError::internal_with_source(format!("bound value '{name}' has an unexpected shape"), err)
        })
    }

    /// Deserializes every value into one struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, MagnumError> {
        let object: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        serde_json::from_value(Value::Object(object)).map_err(|err| {
            MagnumError::internal_with_source("bound values do not fit the requested type", err)
        })
    }

    /// Returns the values as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

/// Binds requests against route declarations.
///
/// # Example
///
/// ```
/// use magnum_binding::{BinderConfig, InboundBinder, Param, RouteBinding};
/// use magnum_extract::{ExtractLimits, ExtractionContext, RequestData};
/// use magnum_schema::FieldType;
/// use http::Uri;
/// use serde_json::json;
///
/// let route = RouteBinding::builder("list", "/items")
///     .param(Param::new("ids", FieldType::list(FieldType::Int)))
///     .build()
///     .unwrap();
/// let ctx = ExtractionContext::builder()
///     .uri(Uri::from_static("/items?ids[]=1&ids[]=2"))
///     .build();
/// let data = tokio_test::block_on(RequestData::from_context(&ctx, &ExtractLimits::default())).unwrap();
///
/// let values = InboundBinder::new(BinderConfig::new()).bind(&route, &data).unwrap();
/// assert_eq!(values.get("ids"), Some(&json!([1, 2])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InboundBinder {
    config: BinderConfig,
}

impl InboundBinder {
    /// Creates a binder.
    #[must_use]
    pub fn new(config: BinderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Binds one request.
    ///
    /// Errors are ordered by location (query, path, header, cookie, then
    /// payload) and by declaration order within a location.
    pub fn bind(
        &self,
        route: &RouteBinding,
        data: &RequestData,
    ) -> Result<BoundValues, Vec<ValidationError>> {
        let mut bound = BoundValues::default();
        let mut errors = Vec::new();

        for location in PARAMETER_LOCATIONS {
            let source = data.source(location);
            for spec in route.parameters().iter().filter(|s| s.location() == location) {
                match self.bind_parameter(spec, source) {
                    Ok(value) => bound.insert(spec.name(), value),
                    Err(failures) => errors.extend(failures.into_iter().map(|e| e.within(prefix(spec)))),
                }
            }
        }

        if let Some(body) = route.body() {
            self.bind_body(body, data, &mut bound, &mut errors);
        }

        if errors.is_empty() {
            tracing::debug!(route = %route.template(), values = bound.len(), "request bound");
            Ok(bound)
        } else {
            tracing::debug!(route = %route.template(), errors = errors.len(), "request failed to bind");
            Err(errors)
        }
    }

    fn bind_parameter(
        &self,
        spec: &ParameterSpec,
        source: &dyn ExtractionSource,
    ) -> Result<Value, Vec<ValidationError>> {
        if let FieldType::Record(record) = spec.ty().peel_optional() {
            if source.collects_sequences() {
                return self.bind_spread_record(spec, record, source);
            }
        }
        let raw = self.lookup(spec.field(), spec.alias(), source);
        spec.field().validate(raw.as_ref())
    }

    /// Binds a record spread over a flat source, one key per sub-field.
    fn bind_spread_record(
        &self,
        spec: &ParameterSpec,
        record: &RecordSchema,
        source: &dyn ExtractionSource,
    ) -> Result<Value, Vec<ValidationError>> {
        let wire_name = |field: &Field| match field.explicit_alias() {
            None if spec.location() == Location::Header && spec.converts_underscores() => {
                header_alias(field.name())
            }
            _ => field.wire_name().to_string(),
        };
        let present = record
            .fields()
            .iter()
            .any(|field| self.lookup(field, &wire_name(field), source).is_some());
        if !present && !spec.is_required() {
            return spec.field().validate(None);
        }
        record
            .validate_fields(|field| self.lookup(field, &wire_name(field), source))
            .map_err(|errors| {
                errors
                    .into_iter()
                    .map(|mut error| {
                        if let Some(LocSegment::Key(key)) = error.loc.first_mut() {
                            let looked_up = record
                                .fields()
                                .iter()
                                .find(|field| field.wire_name() == key.as_str())
                                .map(|field| wire_name(field));
                            if let Some(looked_up) = looked_up {
                                *key = looked_up;
                            }
                        }
                        error
                    })
                    .collect::<Vec<_>>()
            })
            .and_then(|value| {
                let errors = spec.constraints().check(&value);
                if errors.is_empty() {
                    Ok(value)
                } else {
                    Err(errors)
                }
            })
    }

    /// Reads the raw value of `field` from `source`: by wire name, then by
    /// declared name, then through the key transformer for sequences.
    fn lookup(&self, field: &Field, wire_name: &str, source: &dyn ExtractionSource) -> Option<Value> {
        if field.ty().peel_optional().is_sequence() && source.collects_sequences() {
            let mut raws = source.get_all(wire_name);
            if raws.is_empty() && wire_name != field.name() {
                raws = source.get_all(field.name());
            }
            if raws.is_empty() {
                if let Some(transform) = self.config.transformer() {
                    raws = source.get_all_transformed(wire_name, transform);
                }
            }
            if raws.is_empty() {
                return None;
            }
            return Some(Value::Array(raws.iter().map(RawValue::to_json).collect()));
        }
        source
            .get(wire_name)
            .or_else(|| source.get(field.name()))
            .map(|raw| raw.to_json())
    }

    fn bind_body(
        &self,
        body: &BodySchema,
        data: &RequestData,
        bound: &mut BoundValues,
        errors: &mut Vec<ValidationError>,
    ) {
        if body.is_embedded() {
            for member in body.members() {
                let source = data.source(member.location());
                match self.bind_parameter(member, source) {
                    Ok(value) => {
                        collect_files(member, source, bound);
                        bound.insert(member.name(), value);
                    }
                    Err(failures) => {
                        errors.extend(failures.into_iter().map(|e| e.within(prefix(member))));
                    }
                }
            }
            return;
        }

        let Some(member) = body.members().first() else {
            return;
        };
        let source = data.source(member.location());
        let reads_whole = member.location() == Location::Body || member.ty().peel_optional().as_record().is_some();
        let (result, loc) = if reads_whole {
            let raw = source.whole().map(|raw| raw.to_json());
            (member.field().validate(raw.as_ref()), vec![LocSegment::from(member.location())])
        } else {
            (self.bind_parameter(member, source), prefix(member))
        };
        match result {
            Ok(value) => {
                collect_files(member, source, bound);
                bound.insert(member.name(), value);
            }
            Err(failures) => errors.extend(failures.into_iter().map(|e| e.within(loc.clone()))),
        }
    }
}

fn prefix(spec: &ParameterSpec) -> Vec<LocSegment> {
    vec![LocSegment::from(spec.location()), LocSegment::from(spec.alias())]
}

fn collect_files(spec: &ParameterSpec, source: &dyn ExtractionSource, bound: &mut BoundValues) {
    if spec.location() != Location::File {
        return;
    }
    let mut raws = source.get_all(spec.alias());
    if raws.is_empty() {
        raws = source.get_all(spec.name());
    }
    if raws.is_empty() && !spec.embed() {
        raws.extend(source.whole());
    }
    let files: Vec<UploadedFile> = raws.iter().filter_map(RawValue::as_file).cloned().collect();
    if !files.is_empty() {
        bound.files.insert(spec.name().to_string(), files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Param;
    use magnum_extract::{transformers, ExtractLimits, ExtractionContext};
    use magnum_schema::Constraints;
    use http::{Method, Uri};
    use serde_json::json;
    use std::sync::Arc;

    fn data(ctx: &ExtractionContext) -> RequestData {
        tokio_test::block_on(RequestData::from_context(ctx, &ExtractLimits::default())).unwrap()
    }

    fn get(uri: &'static str) -> RequestData {
        data(&ExtractionContext::builder().uri(Uri::from_static(uri)).build())
    }

    fn post_json(body: &'static str) -> RequestData {
        data(
            &ExtractionContext::builder()
                .method(Method::POST)
                .header("content-type", "application/json")
                .body(body)
                .build(),
        )
    }

    fn binder() -> InboundBinder {
        InboundBinder::new(BinderConfig::new())
    }

    #[test]
    fn test_missing_required_query() {
        let route = RouteBinding::builder("search", "/search")
            .param(Param::new("q", FieldType::Str))
            .build()
            .unwrap();
        let errors = binder().bind(&route, &get("/search")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].dotted_loc(), "query.q");
        assert!(errors[0].is_missing());
    }

    #[test]
    fn test_default_is_copied() {
        let route = RouteBinding::builder("search", "/search")
            .param(Param::new("tags", FieldType::list(FieldType::Str)).default(json!(["a"])))
            .build()
            .unwrap();
        let mut first = binder().bind(&route, &get("/search")).unwrap();
        first.insert("tags", json!(["mutated"]));
        let second = binder().bind(&route, &get("/search")).unwrap();
        assert_eq!(second.get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn test_bracket_sequence() {
        let route = RouteBinding::builder("list", "/items")
            .param(Param::new("id", FieldType::list(FieldType::Int)))
            .build()
            .unwrap();
        let bound = binder().bind(&route, &get("/items?id[]=1&id[]=2")).unwrap();
        assert_eq!(bound.get("id"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_sequence_item_errors_carry_index() {
        let route = RouteBinding::builder("list", "/items")
            .param(Param::new("id", FieldType::list(FieldType::Int)))
            .build()
            .unwrap();
        let errors = binder().bind(&route, &get("/items?id=1&id=x")).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "query.id.1");
        assert_eq!(errors[0].kind, "type_error.integer");
    }

    #[test]
    fn test_errors_follow_location_then_declaration_order() {
        let route = RouteBinding::builder("read", "/items/{item_id}")
            .param(Param::new("x_token", FieldType::Str).location(Location::Header))
            .param(Param::new("item_id", FieldType::Int))
            .param(Param::new("q", FieldType::Int))
            .param(Param::new("limit", FieldType::Int))
            .build()
            .unwrap();
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/items/abc?q=x"))
            .path_param("item_id", "abc")
            .build();
        let errors = binder().bind(&route, &data(&ctx)).unwrap_err();
        let locs: Vec<String> = errors.iter().map(ValidationError::dotted_loc).collect();
        assert_eq!(locs, vec!["query.q", "query.limit", "path.item_id", "header.X-Token"]);
    }

    #[test]
    fn test_header_alias_lookup() {
        let route = RouteBinding::builder("read", "/")
            .param(Param::new("x_token", FieldType::Str).location(Location::Header))
            .build()
            .unwrap();
        let ctx = ExtractionContext::builder().header("x-token", "secret").build();
        let bound = binder().bind(&route, &data(&ctx)).unwrap();
        assert_eq!(bound.get("x_token"), Some(&json!("secret")));
    }

    #[test]
    fn test_composite_body() {
        let route = RouteBinding::builder("create", "/users")
            .method(Method::POST)
            .param(Param::new("age", FieldType::Int))
            .param(Param::new("name", FieldType::Str))
            .build()
            .unwrap();
        let bound = binder()
            .bind(&route, &post_json(r#"{"age": 30, "name": "Ann"}"#))
            .unwrap();
        assert_eq!(bound.to_json(), json!({"age": 30, "name": "Ann"}));

        let errors = binder()
            .bind(&route, &post_json(r#"{"age": "x", "name": "Ann"}"#))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].dotted_loc(), "body.age");
        assert_eq!(errors[0].kind, "type_error.integer");
    }

    #[test]
    fn test_single_record_body() {
        let item = RecordSchema::builder("Item")
            .field(Field::new("name", FieldType::Str))
            .field(Field::new("price", FieldType::Float))
            .build()
            .unwrap();
        let route = RouteBinding::builder("create", "/items")
            .method(Method::POST)
            .param(Param::new("item", FieldType::record(item)))
            .build()
            .unwrap();

        let bound = binder()
            .bind(&route, &post_json(r#"{"name": "Foo", "price": 1}"#))
            .unwrap();
        assert_eq!(bound.get("item"), Some(&json!({"name": "Foo", "price": 1.0})));

        let errors = binder().bind(&route, &post_json(r#"{"price": 1}"#)).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "body.name");

        let errors = binder().bind(&route, &post_json("")).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "body");
        assert!(errors[0].is_missing());
    }

    #[test]
    fn test_record_spread_over_query() {
        let paging = RecordSchema::builder("Paging")
            .field(Field::new("page", FieldType::Int).default(1))
            .field(
                Field::new("order", FieldType::list(FieldType::Str))
                    .alias("order[]")
                    .default(json!([])),
            )
            .validator("order", |value| match value.as_array() {
                Some(items) if items.is_empty() => Err("Order must have at least 1 value".into()),
                _ => Ok(()),
            })
            .build()
            .unwrap();
        let route = RouteBinding::builder("list", "/wines")
            .param(Param::new("payload", FieldType::record(paging)))
            .build()
            .unwrap();

        let bound = binder()
            .bind(&route, &get("/wines?page=2&order[]=name&order[]=year"))
            .unwrap();
        assert_eq!(
            bound.get("payload"),
            Some(&json!({"page": 2, "order": ["name", "year"]}))
        );

        let errors = binder().bind(&route, &get("/wines?page=2")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            serde_json::to_value(&errors[0]).unwrap(),
            json!({
                "loc": ["query", "payload", "order[]"],
                "msg": "Order must have at least 1 value",
                "type": "value_error"
            })
        );
    }

    fn trace_record() -> FieldType {
        FieldType::record(
            RecordSchema::builder("Trace")
                .field(Field::new("x_token", FieldType::Str))
                .field(Field::new("trace_id", FieldType::Int))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_record_spread_over_headers() {
        let route = RouteBinding::builder("read", "/")
            .param(Param::new("meta", trace_record()).location(Location::Header))
            .build()
            .unwrap();
        assert_eq!(route.parameters()[0].alias(), "meta");

        let ctx = ExtractionContext::builder()
            .header("x-token", "s")
            .header("trace-id", "7")
            .build();
        let bound = binder().bind(&route, &data(&ctx)).unwrap();
        assert_eq!(bound.get("meta"), Some(&json!({"x_token": "s", "trace_id": 7})));

        let ctx = ExtractionContext::builder().header("trace-id", "x").build();
        let errors = binder().bind(&route, &data(&ctx)).unwrap_err();
        let locs: Vec<String> = errors.iter().map(ValidationError::dotted_loc).collect();
        assert_eq!(locs, vec!["header.meta.X-Token", "header.meta.Trace-Id"]);
    }

    #[test]
    fn test_record_spread_over_cookies() {
        let route = RouteBinding::builder("read", "/")
            .param(Param::new("session", trace_record()).location(Location::Cookie))
            .build()
            .unwrap();

        let ctx = ExtractionContext::builder()
            .header("cookie", "x_token=c; trace_id=9")
            .build();
        let bound = binder().bind(&route, &data(&ctx)).unwrap();
        assert_eq!(bound.get("session"), Some(&json!({"x_token": "c", "trace_id": 9})));

        let ctx = ExtractionContext::builder().header("cookie", "x_token=c").build();
        let errors = binder().bind(&route, &data(&ctx)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].dotted_loc(), "cookie.session.trace_id");
        assert!(errors[0].is_missing());
    }

    #[test]
    fn test_key_transformer_retries_sequences() {
        let route = RouteBinding::builder("list", "/items")
            .param(Param::new("item_ids", FieldType::list(FieldType::Int)).default(json!([])))
            .build()
            .unwrap();
        let request = get("/items?itemIds=1&itemIds=2");

        let plain = binder().bind(&route, &request).unwrap();
        assert_eq!(plain.get("item_ids"), Some(&json!([])));

        let camel = InboundBinder::new(BinderConfig::new().key_transformer(transformers::camel_to_snake()));
        let bound = camel.bind(&route, &request).unwrap();
        assert_eq!(bound.get("item_ids"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_custom_transformer_hook() {
        let route = RouteBinding::builder("list", "/items")
            .param(Param::new("tags", FieldType::list(FieldType::Str)))
            .build()
            .unwrap();
        let hook: KeyTransformer = Arc::new(|key: &str| key.trim_start_matches("x-").to_string());
        let bound = InboundBinder::new(BinderConfig::new().key_transformer(hook))
            .bind(&route, &get("/items?x-tags=a"))
            .unwrap();
        assert_eq!(bound.get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn test_constraint_failure() {
        let route = RouteBinding::builder("lt", "/path/lt/{item_id}")
            .param(Param::new("item_id", FieldType::Float).constraints(Constraints::new().lt(3.0)))
            .build()
            .unwrap();
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/path/lt/5"))
            .path_param("item_id", "5")
            .build();
        let errors = binder().bind(&route, &data(&ctx)).unwrap_err();
        assert_eq!(errors[0].kind, "value_error.number.not_lt");
        assert_eq!(errors[0].dotted_loc(), "path.item_id");
    }

    #[test]
    fn test_form_fields() {
        let route = RouteBinding::builder("login", "/login")
            .method(Method::POST)
            .param(Param::new("username", FieldType::Str).location(Location::Form))
            .param(Param::new("remember", FieldType::Bool).location(Location::Form).default(false))
            .build()
            .unwrap();
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("username=ann&remember=on")
            .build();
        let bound = binder().bind(&route, &data(&ctx)).unwrap();
        assert_eq!(bound.to_json(), json!({"username": "ann", "remember": true}));

        let errors = binder().bind(&route, &post_json("{}")).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "form.username");
    }

    #[test]
    fn test_uploaded_file() {
        let route = RouteBinding::builder("upload", "/upload")
            .method(Method::POST)
            .param(Param::new("doc", FieldType::File))
            .build()
            .unwrap();
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "multipart/form-data; boundary=B")
            .body(
                "--B\r\n\
                 Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
                 Content-Type: text/plain\r\n\r\n\
                 hello\r\n\
                 --B--\r\n",
            )
            .build();
        let bound = binder().bind(&route, &data(&ctx)).unwrap();
        assert_eq!(bound.get("doc").unwrap()["filename"], "a.txt");
        assert_eq!(bound.file("doc").unwrap().data().as_ref(), b"hello");

        let errors = binder().bind(&route, &post_json("")).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "file.doc");
    }

    #[test]
    fn test_deserialize_bound_values() {
        #[derive(serde::Deserialize)]
        struct Query {
            q: String,
            page: i64,
        }
        let route = RouteBinding::builder("search", "/search")
            .param(Param::new("q", FieldType::Str))
            .param(Param::new("page", FieldType::Int).default(1))
            .build()
            .unwrap();
        let bound = binder().bind(&route, &get("/search?q=wine")).unwrap();
        let query: Query = bound.deserialize().unwrap();
        assert_eq!(query.q, "wine");
        assert_eq!(query.page, 1);
        assert_eq!(bound.extract::<i64>("page").unwrap(), 1);
        assert!(bound.extract::<i64>("q").is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_binding_is_idempotent(ids in proptest::collection::vec(0i64..1000, 1..6)) {
            let route = RouteBinding::builder("list", "/items")
                .param(Param::new("id", FieldType::list(FieldType::Int)))
                .build()
                .unwrap();
            let query = ids.iter().map(|id| format!("id[]={id}")).collect::<Vec<_>>().join("&");
            let uri: Uri = format!("/items?{query}").parse().unwrap();
            let request = data(&ExtractionContext::builder().uri(uri).build());

            let first = binder().bind(&route, &request).unwrap();
            let second = binder().bind(&route, &request).unwrap();
            proptest::prop_assert_eq!(&first, &second);
            let expected = json!(ids);
            proptest::prop_assert_eq!(first.get("id"), Some(&expected));
        }
    }
}
