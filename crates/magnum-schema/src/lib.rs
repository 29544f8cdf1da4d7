//! # Magnum Schema
//!
//! The declared-type model shared by inbound binding and response
//! validation.
//!
//! - [`FieldType`] - scalars, optional and sequence wrappers, nested records
//! - [`RecordSchema`] / [`Field`] - named, ordered fields with aliases and defaults
//! - [`Constraints`] - numeric bounds, lengths, patterns, item counts, allowed values
//! - [`Schema`] - maps Rust types onto [`FieldType`]
//!
//! Coercion never raises: every failure is returned as a
//! [`magnum_core::ValidationError`] with a location relative to the value
//! being coerced, so callers can prefix it with where the value came from.
//!
//! ## Example
//!
//! ```
//! use magnum_schema::{Constraints, Field, FieldType, RecordSchema};
//! use serde_json::json;
//!
//! let query = RecordSchema::builder("Paging")
//!     .field(Field::new("page", FieldType::Int).constraints(Constraints::new().ge(1.0)))
//!     .field(Field::new("size", FieldType::Int).default(20))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     query.validate(&json!({"page": "2"})).unwrap(),
//!     json!({"page": 2, "size": 20})
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/magnum-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod constraints;
pub mod json_schema;
mod record;
mod types;

pub use constraints::{Constraints, Pattern};
pub use json_schema::http_validation_error_definitions;
pub use record::{Field, RecordSchema, RecordSchemaBuilder, ValidatorFn};
pub use types::{FieldType, Schema};
