//! Nested record schemas and their fields.

use crate::{Constraints, FieldType};
use magnum_core::{kinds, RegistrationError, ValidationError};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Function checking a field value after coercion. `Err` carries the message.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A named field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    alias: Option<String>,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    constraints: Constraints,
    description: Option<String>,
}

impl Field {
    /// Creates a field. It is required unless its type is optional.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            required: !ty.is_optional(),
            ty,
            default: None,
            constraints: Constraints::default(),
            description: None,
        }
    }

    /// Sets the wire name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets a default, making the field optional.
    ///
    /// A `null` default also makes the type optional.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            self.ty = FieldType::optional(self.ty);
        }
        self.default = Some(value);
        self.required = false;
        self
    }

    /// Overrides whether a value must be supplied.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the constraints.
    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
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

    /// Returns the wire name: the alias if set, else the name.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns the explicit alias, if any.
    #[must_use]
    pub fn explicit_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the declared type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Returns `true` if a value must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the constraints.
    #[must_use]
    pub fn constraint_set(&self) -> &Constraints {
        &self.constraints
    }

    /// Returns the documentation description.
    #[must_use]
    pub fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validates a possibly-absent raw value.
    ///
    /// An absent optional value yields a fresh copy of the default, or
    /// `null` when there is none. Error locations are relative to the field.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Value, Vec<ValidationError>> {
        match raw {
            None if self.required => Err(vec![kinds::missing()]),
            None => Ok(self.default.clone().unwrap_or(Value::Null)),
            Some(value) => {
                let coerced = self.ty.coerce(value)?;
                let errors = self.constraints.check(&coerced);
                if errors.is_empty() {
                    Ok(coerced)
                } else {
                    Err(errors)
                }
            }
        }
    }

    /// Checks the declaration: the pattern compiles and the default fits the type.
    pub fn verify(&self) -> Result<(), RegistrationError> {
        self.constraints.verify(&self.name)?;
        if let FieldType::Record(schema) = self.ty.peel_optional() {
            for field in schema.fields() {
                field.verify()?;
            }
        }
        match &self.default {
            Some(default) if !default.is_null() => {
                self.validate(Some(default))
                    .map(|_| ())
                    .map_err(|errors| RegistrationError::InvalidDefault {
                        name: self.name.clone(),
                        reason: errors
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; "),
                    })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone)]
struct FieldValidator {
    field: String,
    check: ValidatorFn,
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// A record type with ordered, named fields.
///
/// # Example
///
/// ```
/// use magnum_schema::{Field, FieldType, RecordSchema};
/// use serde_json::json;
///
/// let user = RecordSchema::builder("User")
///     .field(Field::new("username", FieldType::Str))
///     .field(Field::new("age", FieldType::optional(FieldType::Int)))
///     .build()
///     .unwrap();
///
/// let bound = user.validate(&json!({"username": "ann", "extra": 1})).unwrap();
/// assert_eq!(bound, json!({"username": "ann", "age": null}));
/// ```
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
    validators: Vec<FieldValidator>,
}

impl PartialEq for RecordSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl RecordSchema {
    /// Starts a record declaration.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            schema: Self {
                name: name.into(),
                fields: Vec::new(),
                validators: Vec::new(),
            },
        }
    }

    /// Returns the record name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field with the given declared name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if any field is required.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        self.fields.iter().any(Field::is_required)
    }

    /// Validates a JSON object against this record.
    ///
    /// Fields are read by wire name, falling back to the declared name,
    /// and written by declared name. Undeclared keys are dropped.
    pub fn validate(&self, value: &Value) -> Result<Value, Vec<ValidationError>> {
        let Value::Object(object) = value else {
            return Err(vec![kinds::not_dict()]);
        };
        self.validate_fields(|field| {
            object
                .get(field.wire_name())
                .or_else(|| object.get(field.name()))
                .cloned()
        })
    }

    /// Validates values supplied per field by `lookup`.
    ///
    /// Used when the record is spread over a flat source such as a query
    /// string. Error locations start with the field's wire name.
    pub fn validate_fields<F>(&self, mut lookup: F) -> Result<Value, Vec<ValidationError>>
    where
        F: FnMut(&Field) -> Option<Value>,
    {
        let mut output = Map::with_capacity(self.fields.len());
        let mut errors = Vec::new();

        for field in &self.fields {
            let raw = lookup(field);
            match field.validate(raw.as_ref()) {
                Ok(value) => {
                    if let Some(message) = self.run_validators(field, &value) {
                        errors.push(kinds::custom(message).at(field.wire_name()));
                    }
                    output.insert(field.name.clone(), value);
                }
                Err(field_errors) => {
                    errors.extend(field_errors.into_iter().map(|e| e.at(field.wire_name())));
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(errors)
        }
    }

    fn run_validators(&self, field: &Field, value: &Value) -> Option<String> {
        self.validators
            .iter()
            .filter(|v| v.field == field.name)
            .find_map(|v| (v.check)(value).err())
    }
}

/// Builder for [`RecordSchema`].
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    schema: RecordSchema,
}

impl RecordSchemaBuilder {
    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Attaches a check on one field, run after the field coerces.
    ///
    /// A failing check produces a `value_error` at the field.
    #[must_use]
    pub fn validator<F>(mut self, field: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.schema.validators.push(FieldValidator {
            field: field.into(),
            check: Arc::new(check),
        });
        self
    }

    /// Finishes the declaration.
    pub fn build(self) -> Result<RecordSchema, RegistrationError> {
        let schema = self.schema;
        for (index, field) in schema.fields.iter().enumerate() {
            if schema.fields[..index].iter().any(|f| f.name == field.name) {
                return Err(RegistrationError::DuplicateParameter {
                    name: field.name.clone(),
                    route: schema.name.clone(),
                });
            }
            field.verify()?;
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> RecordSchema {
        RecordSchema::builder("Item")
            .field(Field::new("name", FieldType::Str))
            .field(Field::new("description", FieldType::optional(FieldType::Str)))
            .field(Field::new("price", FieldType::Float).constraints(Constraints::new().gt(0.0)))
            .field(Field::new("tags", FieldType::list(FieldType::Str)).default(json!([])))
            .build()
            .unwrap()
    }

    #[test]
    fn test_fills_defaults_and_drops_extras() {
        let bound = item()
            .validate(&json!({"name": "Foo", "price": 3, "secret": true}))
            .unwrap();
        assert_eq!(
            bound,
            json!({"name": "Foo", "description": null, "price": 3.0, "tags": []})
        );
    }

    #[test]
    fn test_collects_errors_in_field_order() {
        let errors = item().validate(&json!({"price": -1})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].dotted_loc(), "name");
        assert_eq!(errors[0].kind, "value_error.missing");
        assert_eq!(errors[1].dotted_loc(), "price");
        assert_eq!(errors[1].kind, "value_error.number.not_gt");
    }

    #[test]
    fn test_non_object_is_rejected() {
        let errors = item().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(errors[0].kind, "type_error.dict");
        assert!(errors[0].loc.is_empty());
    }

    #[test]
    fn test_alias_then_name_lookup() {
        let schema = RecordSchema::builder("Page")
            .field(Field::new("per_page", FieldType::Int).alias("perPage"))
            .build()
            .unwrap();
        assert_eq!(schema.validate(&json!({"perPage": "10"})).unwrap(), json!({"per_page": 10}));
        assert_eq!(schema.validate(&json!({"per_page": 5})).unwrap(), json!({"per_page": 5}));

        let errors = schema.validate(&json!({})).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "perPage");
    }

    #[test]
    fn test_custom_validator() {
        let schema = RecordSchema::builder("Listing")
            .field(Field::new("order", FieldType::list(FieldType::Any)).alias("order[]"))
            .validator("order", |value| match value.as_array() {
                Some(items) if items.is_empty() => Err("Order must have at least 1 value".into()),
                _ => Ok(()),
            })
            .build()
            .unwrap();

        let errors = schema.validate(&json!({"order[]": []})).unwrap_err();
        assert_eq!(errors[0].kind, "value_error");
        assert_eq!(errors[0].msg, "Order must have at least 1 value");
        assert_eq!(errors[0].dotted_loc(), "order[]");
        assert!(schema.validate(&json!({"order": [{"name": "asc"}]})).is_ok());
    }

    #[test]
    fn test_null_default_makes_field_optional() {
        let field = Field::new("limit", FieldType::Int).default(Value::Null);
        assert!(field.ty().is_optional());
        assert!(!field.is_required());
        assert_eq!(field.validate(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_invalid_default_rejected() {
        let result = RecordSchema::builder("Bad")
            .field(Field::new("limit", FieldType::Int).default("many"))
            .build();
        assert!(matches!(result, Err(RegistrationError::InvalidDefault { .. })));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::builder("Twice")
            .field(Field::new("a", FieldType::Int))
            .field(Field::new("a", FieldType::Str))
            .build();
        assert!(matches!(result, Err(RegistrationError::DuplicateParameter { .. })));
    }

    #[test]
    fn test_nested_missing_field_location() {
        let user = RecordSchema::builder("User")
            .field(Field::new("username", FieldType::Str))
            .build()
            .unwrap();
        let outer = RecordSchema::builder("Outer")
            .field(Field::new("user", FieldType::record(user)))
            .build()
            .unwrap();
        let errors = outer.validate(&json!({"user": {}})).unwrap_err();
        assert_eq!(errors[0].dotted_loc(), "user.username");
        assert!(errors[0].is_missing());
    }
}
