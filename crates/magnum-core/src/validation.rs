//! Per-field validation errors.
//!
//! A [`ValidationError`] records *where* a value failed (`loc`), a
//! human-readable message (`msg`) and a machine-readable kind (`type`).
//! Errors are accumulated rather than raised so that a single 400 response
//! can list every failing field.

use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of an error location path.
///
/// Record fields are addressed by key, sequence items by index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    /// A location kind, parameter alias or record field name.
    Key(String),
    /// A position within a sequence.
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<String> for LocSegment {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl From<usize> for LocSegment {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<Location> for LocSegment {
    fn from(value: Location) -> Self {
        Self::Key(value.as_str().to_string())
    }
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single validation failure.
///
/// Serializes to the `{"loc": [...], "msg": ..., "type": ...}` shape used in
/// 400 responses.
///
/// # Example
///
/// ```
/// use magnum_core::{kinds, Location, ValidationError};
///
/// let err = kinds::not_lt(3).within([Location::Path.into(), "item_id".into()]);
/// assert_eq!(err.kind, "value_error.number.not_lt");
/// assert_eq!(err.dotted_loc(), "path.item_id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location path: location kind, parameter alias, nested fields.
    pub loc: Vec<LocSegment>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable error kind.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationError {
    /// Creates an error with an empty location.
    #[must_use]
    pub fn new(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            loc: Vec::new(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Prepends a single segment to the location path.
    #[must_use]
    pub fn at(mut self, segment: impl Into<LocSegment>) -> Self {
        self.loc.insert(0, segment.into());
        self
    }

    /// Prepends a whole prefix to the location path.
    #[must_use]
    pub fn within<I>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = LocSegment>,
    {
        let mut loc: Vec<LocSegment> = prefix.into_iter().collect();
        loc.append(&mut self.loc);
        self.loc = loc;
        self
    }

    /// Returns the location joined with dots, e.g. `body.age`.
    #[must_use]
    pub fn dotted_loc(&self) -> String {
        self.loc
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns `true` if this is a missing-value error.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.kind == kinds::MISSING
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.dotted_loc(), self.msg, self.kind)
    }
}

impl std::error::Error for ValidationError {}

/// Error kinds and their canonical messages.
pub mod kinds {
    use super::ValidationError;
    use std::fmt::Display;

    /// Kind for a missing required value.
    pub const MISSING: &str = "value_error.missing";

    /// A required value was not supplied.
    #[must_use]
    pub fn missing() -> ValidationError {
        ValidationError::new(MISSING, "field required")
    }

    /// `null` supplied for a non-optional value.
    #[must_use]
    pub fn none_not_allowed() -> ValidationError {
        ValidationError::new("type_error.none.not_allowed", "none is not an allowed value")
    }

    /// Value is not a string.
    #[must_use]
    pub fn not_str() -> ValidationError {
        ValidationError::new("type_error.str", "str type expected")
    }

    /// Value is not an integer.
    #[must_use]
    pub fn not_integer() -> ValidationError {
        ValidationError::new("type_error.integer", "value is not a valid integer")
    }

    /// Value is not a float.
    #[must_use]
    pub fn not_float() -> ValidationError {
        ValidationError::new("type_error.float", "value is not a valid float")
    }

    /// Value is not a boolean.
    #[must_use]
    pub fn not_bool() -> ValidationError {
        ValidationError::new("type_error.bool", "value could not be parsed to a boolean")
    }

    /// Value is not a sequence.
    #[must_use]
    pub fn not_list() -> ValidationError {
        ValidationError::new("type_error.list", "value is not a valid list")
    }

    /// Value is not a mapping.
    #[must_use]
    pub fn not_dict() -> ValidationError {
        ValidationError::new("type_error.dict", "value is not a valid dict")
    }

    /// Value is not an uploaded file.
    #[must_use]
    pub fn not_file() -> ValidationError {
        ValidationError::new("type_error.file", "value is not a valid file")
    }

    /// Value is not among the allowed values.
    #[must_use]
    pub fn not_enum_member(permitted: &[serde_json::Value]) -> ValidationError {
        let permitted = permitted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        ValidationError::new(
            "type_error.enum",
            format!("value is not a valid enumeration member; permitted: {permitted}"),
        )
    }

    /// Number is not greater than the limit.
    #[must_use]
    pub fn not_gt(limit: impl Display) -> ValidationError {
        ValidationError::new(
            "value_error.number.not_gt",
            format!("ensure this value is greater than {limit}"),
        )
    }

    /// Number is not greater than or equal to the limit.
    #[must_use]
    pub fn not_ge(limit: impl Display) -> ValidationError {
        ValidationError::new(
            "value_error.number.not_ge",
            format!("ensure this value is greater than or equal to {limit}"),
        )
    }

    /// Number is not less than the limit.
    #[must_use]
    pub fn not_lt(limit: impl Display) -> ValidationError {
        ValidationError::new(
            "value_error.number.not_lt",
            format!("ensure this value is less than {limit}"),
        )
    }

    /// Number is not less than or equal to the limit.
    #[must_use]
    pub fn not_le(limit: impl Display) -> ValidationError {
        ValidationError::new(
            "value_error.number.not_le",
            format!("ensure this value is less than or equal to {limit}"),
        )
    }

    /// String shorter than the minimum length.
    #[must_use]
    pub fn str_too_short(limit: usize) -> ValidationError {
        ValidationError::new(
            "value_error.any_str.min_length",
            format!("ensure this value has at least {limit} characters"),
        )
    }

    /// String longer than the maximum length.
    #[must_use]
    pub fn str_too_long(limit: usize) -> ValidationError {
        ValidationError::new(
            "value_error.any_str.max_length",
            format!("ensure this value has at most {limit} characters"),
        )
    }

    /// Sequence with fewer items than the minimum.
    #[must_use]
    pub fn too_few_items(limit: usize) -> ValidationError {
        ValidationError::new(
            "value_error.list.min_items",
            format!("ensure this value has at least {limit} items"),
        )
    }

    /// Sequence with more items than the maximum.
    #[must_use]
    pub fn too_many_items(limit: usize) -> ValidationError {
        ValidationError::new(
            "value_error.list.max_items",
            format!("ensure this value has at most {limit} items"),
        )
    }

    /// String does not match the declared pattern.
    #[must_use]
    pub fn pattern_mismatch(pattern: &str) -> ValidationError {
        ValidationError::new(
            "value_error.str.regex",
            format!("string does not match regex \"{pattern}\""),
        )
    }

    /// Failure reported by a custom record validator.
    #[must_use]
    pub fn custom(msg: impl Into<String>) -> ValidationError {
        ValidationError::new("value_error", msg)
    }
}
