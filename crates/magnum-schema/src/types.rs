//! The declared-type model.

use crate::RecordSchema;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A declared parameter or field type.
///
/// Coercion is bounded to scalars, the optional and sequence wrappers and
/// nested records.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string.
    Str,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Any JSON value, accepted as-is.
    Any,
    /// Uploaded file (only valid in the `file` location).
    File,
    /// Value that may be absent or `null`.
    Optional(Box<FieldType>),
    /// Homogeneous sequence.
    List(Box<FieldType>),
    /// Nested record with named fields.
    Record(Arc<RecordSchema>),
}

impl FieldType {
    /// Wraps a type in [`FieldType::Optional`]. Already-optional types are returned unchanged.
    #[must_use]
    pub fn optional(inner: FieldType) -> Self {
        match inner {
            Self::Optional(_) => inner,
            other => Self::Optional(Box::new(other)),
        }
    }

    /// Wraps a type in [`FieldType::List`].
    #[must_use]
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Creates a record type.
    #[must_use]
    pub fn record(schema: RecordSchema) -> Self {
        Self::Record(Arc::new(schema))
    }

    /// Returns `true` if `null` or absence is acceptable.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Any)
    }

    /// Returns the type with any optional wrapper removed.
    #[must_use]
    pub fn peel_optional(&self) -> &FieldType {
        match self {
            Self::Optional(inner) => inner.peel_optional(),
            other => other,
        }
    }

    /// Returns `true` for sequence types, optional or not.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self.peel_optional(), Self::List(_))
    }

    /// Returns the record schema for record types, optional or not.
    #[must_use]
    pub fn as_record(&self) -> Option<&Arc<RecordSchema>> {
        match self.peel_optional() {
            Self::Record(schema) => Some(schema),
            _ => None,
        }
    }

    /// Returns `true` if this type is, or is a sequence of, uploaded files.
    #[must_use]
    pub fn is_file(&self) -> bool {
        match self.peel_optional() {
            Self::File => true,
            Self::List(inner) => inner.is_file(),
            _ => false,
        }
    }

    /// Returns `true` if a file type appears anywhere in this type.
    #[must_use]
    pub fn contains_file(&self) -> bool {
        match self {
            Self::File => true,
            Self::Optional(inner) | Self::List(inner) => inner.contains_file(),
            Self::Record(schema) => schema.fields().iter().any(|f| f.ty().contains_file()),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("str"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Any => f.write_str("any"),
            Self::File => f.write_str("file"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::List(inner) => write!(f, "sequence<{inner}>"),
            Self::Record(schema) => f.write_str(schema.name()),
        }
    }
}

/// Maps a Rust type onto the declared-type model.
///
/// Records implement this by returning a [`FieldType::Record`] built from
/// a [`RecordSchema`].
///
/// # Example
///
/// ```
/// use magnum_schema::{FieldType, Schema};
///
/// assert_eq!(<Vec<i64>>::field_type(), FieldType::list(FieldType::Int));
/// assert_eq!(<Option<String>>::field_type(), FieldType::optional(FieldType::Str));
/// ```
pub trait Schema {
    /// Returns the declared type.
    fn field_type() -> FieldType;
}

macro_rules! impl_schema {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl Schema for $ty {
                fn field_type() -> FieldType {
                    FieldType::$variant
                }
            }
        )+
    };
}

impl_schema!(Str => String, char);
impl_schema!(Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_schema!(Float => f32, f64);
impl_schema!(Bool => bool);
impl_schema!(Any => Value);

impl<T: Schema> Schema for Option<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list(T::field_type())
    }
}
