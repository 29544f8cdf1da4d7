//! # Magnum Extract
//!
//! Per-location read views over an incoming request.
//!
//! The host framework hands over an [`ExtractionContext`]; from it
//! [`RequestData::from_context`] builds one [`ExtractionSource`] per
//! location:
//!
//! | Location | Source | Notes |
//! |----------|--------|-------|
//! | `path` | [`MultiMapSource`] | values captured by the host's path match |
//! | `query` | [`MultiMapSource`] | `name[]` and `name[sub]` keys collapsed under `name` |
//! | `header` | [`MultiMapSource`] | case-insensitive keys |
//! | `cookie` | [`MultiMapSource`] | parsed from every `Cookie` header |
//! | `body` | [`JsonSource`] | decoded JSON payload |
//! | `form` | [`MultiMapSource`] | URL-encoded or multipart text fields |
//! | `file` | [`MultiMapSource`] | multipart uploads as [`UploadedFile`] |
//!
//! Sources hold [`RawValue`]s; coercion happens later, during binding.

#![doc(html_root_url = "https://docs.rs/magnum-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod body;
mod context;
mod cookie;
mod error;
pub mod multipart;
mod query;
mod raw;
mod request;
mod source;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use cookie::cookie_source;
pub use error::ExtractionError;
pub use multipart::MultipartConfig;
pub use query::query_source;
pub use raw::{RawValue, UploadedFile};
pub use request::{ExtractLimits, RequestData, DEFAULT_MAX_BODY_SIZE};
pub use source::{transformers, ExtractionSource, JsonSource, KeyTransformer, MultiMapSource};

// Re-export useful types from dependencies
pub use magnum_router::Params;
