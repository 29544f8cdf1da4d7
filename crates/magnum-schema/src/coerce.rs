//! Coercion of raw values into declared types.
//!
//! Text from query strings, headers, cookies, path segments and form
//! fields arrives as JSON strings, so one set of rules covers every
//! location: numeric and boolean strings are parsed, numbers are accepted
//! as strings.

use crate::FieldType;
use magnum_core::{kinds, ValidationError};
use serde_json::{Number, Value};

const TRUE_WORDS: [&str; 6] = ["1", "on", "t", "true", "y", "yes"];
const FALSE_WORDS: [&str; 6] = ["0", "off", "f", "false", "n", "no"];

impl FieldType {
    /// Coerces a raw value into this type.
    ///
    /// Error locations are relative to the value: sequence items are
    /// addressed by index and record fields by wire name.
    ///
    /// # Example
    ///
    /// ```
    /// use magnum_schema::FieldType;
    /// use serde_json::json;
    ///
    /// let ids = FieldType::list(FieldType::Int);
    /// assert_eq!(ids.coerce(&json!(["1", "2"])).unwrap(), json!([1, 2]));
    ///
    /// let errors = ids.coerce(&json!(["1", "x"])).unwrap_err();
    /// assert_eq!(errors[0].dotted_loc(), "1");
    /// ```
    pub fn coerce(&self, value: &Value) -> Result<Value, Vec<ValidationError>> {
        match (self, value) {
            (Self::Any, _) => Ok(value.clone()),
            (Self::Optional(_), Value::Null) => Ok(Value::Null),
            (Self::Optional(inner), _) => inner.coerce(value),
            (_, Value::Null) => Err(vec![kinds::none_not_allowed()]),
            (Self::Str, _) => coerce_str(value).ok_or_else(|| vec![kinds::not_str()]),
            (Self::Int, _) => coerce_int(value).ok_or_else(|| vec![kinds::not_integer()]),
            (Self::Float, _) => coerce_float(value).ok_or_else(|| vec![kinds::not_float()]),
            (Self::Bool, _) => coerce_bool(value).ok_or_else(|| vec![kinds::not_bool()]),
            (Self::File, _) => coerce_file(value).ok_or_else(|| vec![kinds::not_file()]),
            (Self::List(inner), Value::Array(items)) => coerce_items(inner, items),
            (Self::List(_), _) => Err(vec![kinds::not_list()]),
            (Self::Record(schema), _) => schema.validate(value),
        }
    }
}

fn coerce_str(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(number) => Some(Value::String(number.to_string())),
        _ => None,
    }
}

fn coerce_int(value: &Value) -> Option<Value> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(value.clone()),
        Value::Number(number) => number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .and_then(|f| format!("{f:.0}").parse::<i64>().ok())
            .map(Value::from),
        Value::String(text) => text.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Value> {
    let float = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(float).map(Value::Number)
}

fn coerce_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        Value::String(text) => {
            let word = text.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Some(Value::Bool(true))
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        _ => None,
    }
}

// Uploaded files are represented by their metadata object.
fn coerce_file(value: &Value) -> Option<Value> {
    match value {
        Value::Object(object) if object.contains_key("filename") && object.contains_key("size") => {
            Some(value.clone())
        }
        _ => None,
    }
}

fn coerce_items(inner: &FieldType, items: &[Value]) -> Result<Value, Vec<ValidationError>> {
    let mut output = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match inner.coerce(item) {
            Ok(value) => output.push(value),
            Err(item_errors) => errors.extend(item_errors.into_iter().map(|e| e.at(index))),
        }
    }
    if errors.is_empty() {
        Ok(Value::Array(output))
    } else {
        Err(errors)
    }
}
