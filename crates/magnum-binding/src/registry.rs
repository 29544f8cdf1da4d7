//! Route declarations.
//!
//! A route is declared once, before it serves traffic, as a list of
//! [`Param`]s. [`RouteBindingBuilder::build`] resolves every declaration
//! into an immutable [`ParameterSpec`], composes the body schema and
//! rejects malformed declarations with a [`RegistrationError`].
//!
//! ## Location resolution
//!
//! 1. A name matching a `{placeholder}` of the path template binds from `path`.
//! 2. Otherwise an explicit location wins.
//! 3. Otherwise file-typed parameters bind from `file`, and everything else
//!    from `body` on POST/PUT/PATCH/DELETE routes or `query` on the rest.

use crate::composer::{compose_body, BodySchema};
use http::Method;
use magnum_core::{Location, RegistrationError};
use magnum_router::PathTemplate;
use magnum_schema::{Constraints, Field, FieldType, Schema};
use serde_json::Value;
use std::sync::Arc;

/// Media type of a JSON payload.
pub const JSON_MEDIA_TYPE: &str = "application/json";
/// Media type of a URL-encoded form payload.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
/// Media type of a multipart payload.
pub const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

const PAYLOAD_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];

/// A parameter declaration, as written by the route author.
///
/// # Example
///
/// ```
/// use magnum_binding::Param;
/// use magnum_core::Location;
/// use magnum_schema::{Constraints, FieldType};
///
/// let page = Param::new("page", FieldType::Int)
///     .location(Location::Query)
///     .default(1)
///     .constraints(Constraints::new().ge(1.0));
/// assert_eq!(page.name(), "page");
/// ```
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    ty: FieldType,
    location: Option<Location>,
    default: Option<Value>,
    required: bool,
    constraints: Constraints,
    alias: Option<String>,
    embed: Option<bool>,
    media_type: Option<String>,
    convert_underscores: bool,
    description: Option<String>,
}

impl Param {
    /// Declares a parameter of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            location: None,
            default: None,
            required: false,
            constraints: Constraints::default(),
            alias: None,
            embed: None,
            media_type: None,
            convert_underscores: true,
            description: None,
        }
    }

    /// Declares a parameter whose type is derived from a Rust type.
    #[must_use]
    pub fn of<T: Schema>(name: impl Into<String>) -> Self {
        Self::new(name, T::field_type())
    }

    /// Sets the location the value is read from.
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the default value, making the parameter optional.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Requires a value even though the type is optional.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the constraints checked after coercion.
    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Sets the wire name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Reads a payload parameter under its own key rather than as the
    /// whole payload.
    #[must_use]
    pub fn embed(mut self, embed: bool) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Sets the payload media type.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Controls `x_token` to `X-Token` aliasing of header parameters.
    ///
    /// On by default.
    #[must_use]
    pub fn convert_underscores(mut self, convert: bool) -> Self {
        self.convert_underscores = convert;
        self
    }

    /// Sets a documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A resolved, immutable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    field: Field,
    location: Location,
    embed: bool,
    media_type: Option<String>,
    convert_underscores: bool,
}

impl ParameterSpec {
    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// Returns the wire name.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.field.wire_name()
    }

    /// Returns the declared type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        self.field.ty()
    }

    /// Returns the resolved location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns `true` if a value must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.field.is_required()
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.field.default_value()
    }

    /// Returns the constraints.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        self.field.constraint_set()
    }

    /// Returns `true` if the parameter is read under its own key.
    #[must_use]
    pub fn embed(&self) -> bool {
        self.embed
    }

    /// Returns the payload media type: the declared one, else the
    /// location's default. `None` outside the payload locations.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        if let Some(media_type) = &self.media_type {
            return Some(media_type);
        }
        match self.location {
            Location::Body => Some(JSON_MEDIA_TYPE),
            Location::Form => Some(FORM_MEDIA_TYPE),
            Location::File => Some(MULTIPART_MEDIA_TYPE),
            _ => None,
        }
    }

    /// Returns `true` if header-style aliasing applies to nested fields.
    #[must_use]
    pub fn converts_underscores(&self) -> bool {
        self.location == Location::Header && self.convert_underscores
    }

    /// Returns the underlying schema field.
    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the JSON-Schema fragment for documentation generators.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        self.field.to_json_schema()
    }

    pub(crate) fn embedded(mut self) -> Self {
        self.embed = true;
        self
    }
}

/// Converts a header parameter name into its HTTP spelling.
///
/// `x_token` becomes `X-Token`.
#[must_use]
pub fn header_alias(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '_' && !out.is_empty() {
            out.push('-');
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}

/// Returns `true` for verbs that never decide a route's conventions
/// when a payload verb is also declared.
fn is_secondary(method: &Method) -> bool {
    *method == Method::HEAD || *method == Method::OPTIONS
}

/// Picks the verb whose conventions the route follows.
///
/// HEAD and OPTIONS are secondary; the first primary verb wins.
pub fn resolve_main_method(route: &str, methods: &[Method]) -> Result<Method, RegistrationError> {
    let Some(first) = methods.first() else {
        return Err(RegistrationError::InvalidMethods {
            route: route.to_string(),
            reason: "no HTTP method declared".to_string(),
        });
    };
    let primary: Vec<&Method> = methods.iter().filter(|m| !is_secondary(m)).collect();
    if primary.len() > 1 {
        tracing::warn!(
            route,
            methods = ?methods,
            main = %primary[0],
            "route declares more than one primary method; using the first for defaults"
        );
    }
    Ok(primary.first().copied().unwrap_or(first).clone())
}

/// The immutable binding declaration of one route.
///
/// # Example
///
/// ```
/// use magnum_binding::{Param, RouteBinding};
/// use magnum_core::Location;
/// use magnum_schema::FieldType;
/// use http::Method;
///
/// let route = RouteBinding::builder("read_item", "/items/{item_id}")
///     .method(Method::GET)
///     .param(Param::new("item_id", FieldType::Int))
///     .param(Param::new("q", FieldType::optional(FieldType::Str)))
///     .build()
///     .unwrap();
///
/// assert_eq!(route.parameters()[0].location(), Location::Path);
/// assert_eq!(route.parameters()[1].location(), Location::Query);
/// assert!(route.body().is_none());
/// ```
#[derive(Debug)]
pub struct RouteBinding {
    name: String,
    template: PathTemplate,
    methods: Vec<Method>,
    main_method: Method,
    params: Vec<ParameterSpec>,
    body: Option<BodySchema>,
}

impl RouteBinding {
    /// Starts a route declaration.
    #[must_use]
    pub fn builder(name: impl Into<String>, template: impl Into<String>) -> RouteBindingBuilder {
        RouteBindingBuilder {
            name: name.into(),
            template: template.into(),
            methods: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Returns the endpoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Returns the declared methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the method whose conventions the route follows.
    #[must_use]
    pub fn main_method(&self) -> &Method {
        &self.main_method
    }

    /// Returns `true` if the route answers `method`.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Returns the path, query, header and cookie parameters in
    /// declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Returns the parameters read from `location`, in declaration order.
    pub fn parameters_in(&self, location: Location) -> impl Iterator<Item = &ParameterSpec> {
        self.params
            .iter()
            .chain(self.body.iter().flat_map(BodySchema::members))
            .filter(move |spec| spec.location() == location)
    }

    /// Returns the payload schema, if any parameter reads the payload.
    #[must_use]
    pub fn body(&self) -> Option<&BodySchema> {
        self.body.as_ref()
    }
}

/// Builder for [`RouteBinding`].
#[derive(Debug)]
pub struct RouteBindingBuilder {
    name: String,
    template: String,
    methods: Vec<Method>,
    params: Vec<Param>,
}

impl RouteBindingBuilder {
    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds several methods.
    #[must_use]
    pub fn methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.methods.extend(methods);
        self
    }

    /// Appends a parameter declaration.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Resolves every declaration.
    ///
    /// Routes without an explicit method answer GET.
    pub fn build(mut self) -> Result<Arc<RouteBinding>, RegistrationError> {
        let template = PathTemplate::parse(&self.template)?;
        if self.methods.is_empty() {
            self.methods.push(Method::GET);
        }
        let main_method = resolve_main_method(&self.template, &self.methods)?;

        let mut specs: Vec<ParameterSpec> = Vec::with_capacity(self.params.len());
        for param in self.params {
            if specs.iter().any(|spec| spec.name() == param.name) {
                return Err(RegistrationError::DuplicateParameter {
                    name: param.name,
                    route: self.template,
                });
            }
            let spec = resolve(param, &template, &main_method)?;
            if spec.location().is_body_family()
                && spec.location() != Location::Body
                && !PAYLOAD_METHODS.contains(&main_method)
            {
                tracing::warn!(
                    route = %template,
                    param = spec.name(),
                    location = %spec.location(),
                    method = %main_method,
                    "form and file parameters are only sent with POST, PUT or PATCH"
                );
            }
            specs.push(spec);
        }

        if let Some(name) = template
            .placeholders()
            .find(|name| !specs.iter().any(|spec| spec.name() == *name))
        {
            return Err(RegistrationError::UndeclaredPlaceholder {
                name: name.to_string(),
                route: self.template,
            });
        }

        let (body_params, params): (Vec<_>, Vec<_>) = specs
            .into_iter()
            .partition(|spec| spec.location().is_body_family());
        let body = compose_body(&self.name, body_params)?;

        tracing::debug!(
            route = %template,
            method = %main_method,
            params = params.len(),
            body = body.is_some(),
            "registered route binding"
        );

        Ok(Arc::new(RouteBinding {
            name: self.name,
            template,
            methods: self.methods,
            main_method,
            params,
            body,
        }))
    }
}

fn resolve(
    param: Param,
    template: &PathTemplate,
    main_method: &Method,
) -> Result<ParameterSpec, RegistrationError> {
    let location = if template.has_placeholder(&param.name) {
        match param.location {
            None | Some(Location::Path) => Location::Path,
            Some(declared) => {
                return Err(RegistrationError::PathLocationConflict {
                    name: param.name,
                    declared,
                    route: template.to_string(),
                })
            }
        }
    } else {
        match param.location {
            Some(Location::Path) => {
                return Err(RegistrationError::UnknownPathParameter {
                    name: param.name,
                    route: template.to_string(),
                })
            }
            Some(location) => location,
            None if param.ty.contains_file() => Location::File,
            None if body_by_default(main_method) => Location::Body,
            None => Location::Query,
        }
    };

    if param.ty.contains_file() && location != Location::File {
        return Err(RegistrationError::FileOutsideFileLocation {
            name: param.name,
            declared: location,
        });
    }

    let mut field = Field::new(param.name.as_str(), param.ty.clone()).constraints(param.constraints);
    if let Some(alias) = param.alias {
        field = field.alias(alias);
    } else if location == Location::Header
        && param.convert_underscores
        && param.ty.peel_optional().as_record().is_none()
    {
        field = field.alias(header_alias(&param.name));
    }
    if let Some(description) = param.description {
        field = field.description(description);
    }
    if location == Location::Path {
        if param.default.is_some() {
            tracing::warn!(param = field.name(), "default ignored on a path parameter");
        }
        field = field.required(true);
    } else if let Some(default) = param.default {
        field = field.default(default);
    }
    if param.required {
        field = field.required(true);
    }
    field.verify()?;

    let embed = param.embed.unwrap_or(location == Location::Form);
    Ok(ParameterSpec {
        field,
        location,
        embed,
        media_type: param.media_type,
        convert_underscores: param.convert_underscores,
    })
}

fn body_by_default(method: &Method) -> bool {
    PAYLOAD_METHODS.contains(method) || *method == Method::DELETE
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(method: Method, template: &str, params: Vec<Param>) -> Result<Arc<RouteBinding>, RegistrationError> {
        params
            .into_iter()
            .fold(RouteBinding::builder("endpoint", template).method(method), RouteBindingBuilder::param)
            .build()
    }

    #[test]
    fn test_placeholder_binds_from_path() {
        let binding = route(
            Method::GET,
            "/items/{item_id}",
            vec![Param::new("item_id", FieldType::optional(FieldType::Int))],
        )
        .unwrap();
        let spec = &binding.parameters()[0];
        assert_eq!(spec.location(), Location::Path);
        assert!(spec.is_required());
    }

    #[test]
    fn test_verb_default_location() {
        let post = route(Method::POST, "/items", vec![Param::new("name", FieldType::Str)]).unwrap();
        assert!(post.parameters().is_empty());
        assert_eq!(post.body().unwrap().members()[0].location(), Location::Body);

        let delete = route(Method::DELETE, "/items", vec![Param::new("name", FieldType::Str)]).unwrap();
        assert!(delete.body().is_some());

        let get = route(Method::GET, "/items", vec![Param::new("name", FieldType::Str)]).unwrap();
        assert_eq!(get.parameters()[0].location(), Location::Query);
    }

    #[test]
    fn test_required_rules() {
        let binding = route(
            Method::GET,
            "/",
            vec![
                Param::new("a", FieldType::Int),
                Param::new("b", FieldType::Int).default(3),
                Param::new("c", FieldType::Int).default(json!(null)),
                Param::new("d", FieldType::optional(FieldType::Int)),
                Param::new("e", FieldType::optional(FieldType::Int)).required(),
            ],
        )
        .unwrap();
        let required: Vec<bool> = binding.parameters().iter().map(ParameterSpec::is_required).collect();
        assert_eq!(required, vec![true, false, false, false, true]);
        assert!(binding.parameters()[2].ty().is_optional());
    }

    #[test]
    fn test_header_alias() {
        assert_eq!(header_alias("x_token"), "X-Token");
        assert_eq!(header_alias("user_agent"), "User-Agent");
        assert_eq!(header_alias("ACCEPT"), "Accept");

        let binding = route(
            Method::GET,
            "/",
            vec![
                Param::new("x_token", FieldType::Str).location(Location::Header),
                Param::new("x_raw", FieldType::Str)
                    .location(Location::Header)
                    .convert_underscores(false),
                Param::new("q_name", FieldType::Str),
            ],
        )
        .unwrap();
        let aliases: Vec<&str> = binding.parameters().iter().map(ParameterSpec::alias).collect();
        assert_eq!(aliases, vec!["X-Token", "x_raw", "q_name"]);
    }

    #[test]
    fn test_conflicting_path_location() {
        let err = route(
            Method::GET,
            "/items/{item_id}",
            vec![Param::new("item_id", FieldType::Int).location(Location::Query)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::PathLocationConflict { declared: Location::Query, .. }
        ));
    }

    #[test]
    fn test_registration_errors() {
        let duplicate = route(
            Method::GET,
            "/",
            vec![Param::new("q", FieldType::Str), Param::new("q", FieldType::Int)],
        );
        assert!(matches!(duplicate, Err(RegistrationError::DuplicateParameter { .. })));

        let undeclared = route(Method::GET, "/items/{item_id}", Vec::new());
        assert!(matches!(undeclared, Err(RegistrationError::UndeclaredPlaceholder { .. })));

        let unknown = route(
            Method::GET,
            "/items",
            vec![Param::new("item_id", FieldType::Int).location(Location::Path)],
        );
        assert!(matches!(unknown, Err(RegistrationError::UnknownPathParameter { .. })));

        let file = route(
            Method::POST,
            "/upload",
            vec![Param::new("doc", FieldType::File).location(Location::Form)],
        );
        assert!(matches!(
            file,
            Err(RegistrationError::FileOutsideFileLocation { declared: Location::Form, .. })
        ));

        let default = route(Method::GET, "/", vec![Param::new("n", FieldType::Int).default("ten")]);
        assert!(matches!(default, Err(RegistrationError::InvalidDefault { .. })));
    }

    #[test]
    fn test_file_type_defaults_to_file_location() {
        let binding = route(Method::POST, "/upload", vec![Param::new("doc", FieldType::File)]).unwrap();
        let body = binding.body().unwrap();
        assert_eq!(body.members()[0].location(), Location::File);
        assert_eq!(body.media_type(), MULTIPART_MEDIA_TYPE);
    }

    #[test]
    fn test_main_method_resolution() {
        assert_eq!(
            resolve_main_method("/", &[Method::HEAD, Method::GET]).unwrap(),
            Method::GET
        );
        assert_eq!(
            resolve_main_method("/", &[Method::POST, Method::PUT]).unwrap(),
            Method::POST
        );
        assert_eq!(resolve_main_method("/", &[Method::OPTIONS]).unwrap(), Method::OPTIONS);
        assert!(matches!(
            resolve_main_method("/", &[]),
            Err(RegistrationError::InvalidMethods { .. })
        ));
    }

    #[test]
    fn test_route_without_method_answers_get() {
        let binding = RouteBinding::builder("index", "/").build().unwrap();
        assert!(binding.allows(&Method::GET));
        assert_eq!(binding.main_method(), Method::GET);
    }

    #[test]
    fn test_parameters_in_location() {
        let binding = route(
            Method::POST,
            "/items/{id}",
            vec![
                Param::new("id", FieldType::Int),
                Param::new("name", FieldType::Str),
                Param::new("q", FieldType::Str).location(Location::Query),
                Param::new("age", FieldType::Int),
            ],
        )
        .unwrap();
        let body: Vec<&str> = binding.parameters_in(Location::Body).map(ParameterSpec::name).collect();
        assert_eq!(body, vec!["name", "age"]);
        assert_eq!(binding.parameters_in(Location::Query).count(), 1);
    }
}
