//! JSON-Schema fragments for documentation generators.
//!
//! Generators consume these read-only; nothing here feeds back into
//! binding.

use crate::{Constraints, Field, FieldType, RecordSchema};
use serde_json::{json, Map, Value};

impl FieldType {
    /// Returns the JSON-Schema fragment describing this type.
    ///
    /// Optional wrappers are transparent: optionality is expressed by the
    /// enclosing `required` list.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Str => json!({"type": "string"}),
            Self::Int => json!({"type": "integer"}),
            Self::Float => json!({"type": "number"}),
            Self::Bool => json!({"type": "boolean"}),
            Self::Any => json!({}),
            Self::File => json!({"type": "string", "format": "binary"}),
            Self::Optional(inner) => inner.to_json_schema(),
            Self::List(inner) => json!({"type": "array", "items": inner.to_json_schema()}),
            Self::Record(schema) => schema.to_json_schema(),
        }
    }
}

impl RecordSchema {
    /// Returns the JSON-Schema object describing this record.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in self.fields() {
            properties.insert(field.wire_name().to_string(), field.to_json_schema());
            if field.is_required() {
                required.push(Value::String(field.wire_name().to_string()));
            }
        }
        let mut schema = Map::new();
        schema.insert("title".into(), Value::String(self.name().to_string()));
        schema.insert("type".into(), Value::String("object".into()));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

impl Field {
    /// Returns the JSON-Schema fragment for this field, with title,
    /// default and constraint keywords.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut schema = match self.ty().to_json_schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        schema
            .entry("title")
            .or_insert_with(|| Value::String(title_case(self.name())));
        if let Some(description) = self.describe() {
            schema.insert("description".into(), Value::String(description.to_string()));
        }
        if let Some(default) = self.default_value() {
            schema.insert("default".into(), default.clone());
        }
        apply_constraints(&mut schema, self.constraint_set());
        Value::Object(schema)
    }
}

/// Adds constraint keywords to a schema object.
pub fn apply_constraints(schema: &mut Map<String, Value>, constraints: &Constraints) {
    let numeric = [
        ("exclusiveMinimum", constraints.gt),
        ("minimum", constraints.ge),
        ("exclusiveMaximum", constraints.lt),
        ("maximum", constraints.le),
    ];
    for (keyword, limit) in numeric {
        if let Some(number) = limit.and_then(serde_json::Number::from_f64) {
            schema.insert(keyword.into(), Value::Number(number));
        }
    }
    let counts = [
        ("minLength", constraints.min_length),
        ("maxLength", constraints.max_length),
        ("minItems", constraints.min_items),
        ("maxItems", constraints.max_items),
    ];
    for (keyword, limit) in counts {
        if let Some(limit) = limit {
            schema.insert(keyword.into(), Value::from(limit));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        schema.insert("pattern".into(), Value::String(pattern.as_str().to_string()));
    }
    if let Some(allowed) = &constraints.allowed {
        schema.insert("enum".into(), Value::Array(allowed.clone()));
    }
}

/// Turns `item_id` into `Item Id`.
#[must_use]
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Schema definitions for the 400 error body.
///
/// Returns a map with the `HTTPValidationError` and `ValidationError`
/// definitions, referencing each other under `#/components/schemas/`.
#[must_use]
pub fn http_validation_error_definitions() -> Value {
    json!({
        "ValidationError": {
            "title": "ValidationError",
            "type": "object",
            "properties": {
                "loc": {
                    "title": "Location",
                    "type": "array",
                    "items": {"anyOf": [{"type": "string"}, {"type": "integer"}]}
                },
                "msg": {"title": "Message", "type": "string"},
                "type": {"title": "Error Type", "type": "string"}
            },
            "required": ["loc", "msg", "type"]
        },
        "HTTPValidationError": {
            "title": "HTTPValidationError",
            "type": "object",
            "properties": {
                "detail": {
                    "title": "Detail",
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/ValidationError"}
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_fragments() {
        assert_eq!(FieldType::Int.to_json_schema(), json!({"type": "integer"}));
        assert_eq!(
            FieldType::optional(FieldType::list(FieldType::Str)).to_json_schema(),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            FieldType::File.to_json_schema(),
            json!({"type": "string", "format": "binary"})
        );
    }

    #[test]
    fn test_record_schema() {
        let schema = RecordSchema::builder("Item")
            .field(Field::new("item_id", FieldType::Float).constraints(Constraints::new().lt(3.0)))
            .field(Field::new("label", FieldType::Str).alias("itemLabel").default("none"))
            .build()
            .unwrap();

        assert_eq!(
            schema.to_json_schema(),
            json!({
                "title": "Item",
                "type": "object",
                "properties": {
                    "item_id": {"type": "number", "title": "Item Id", "exclusiveMaximum": 3.0},
                    "itemLabel": {"type": "string", "title": "Label", "default": "none"}
                },
                "required": ["item_id"]
            })
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("x_token"), "X Token");
        assert_eq!(title_case("page"), "Page");
    }

    #[test]
    fn test_validation_error_definitions() {
        let defs = http_validation_error_definitions();
        assert_eq!(
            defs["HTTPValidationError"]["properties"]["detail"]["items"]["$ref"],
            "#/components/schemas/ValidationError"
        );
        assert_eq!(defs["ValidationError"]["required"], json!(["loc", "msg", "type"]));
    }
}
