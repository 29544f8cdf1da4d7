//! # Magnum Core
//!
//! Core types shared by every stage of the Magnum binding pipeline:
//!
//! - [`Location`] - The seven places a parameter value can come from
//! - [`ValidationError`] - One per-field binding or response validation failure
//! - [`MagnumError`] - The request-time error taxonomy (400 / 404 / 500)
//! - [`RegistrationError`] - Malformed route declarations, raised at startup
//! - [`ErrorReport`] - Conversion of errors into wire responses
//!
//! ## Wire contracts
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | Binding failure | 400 | `{"detail": [{"loc": [...], "msg": ..., "type": ...}]}` |
//! | Resource not found | 404 | `{"message": ...}` |
//! | Shape / response validation | 500 | `{"message": "Internal Error"}` |

#![doc(html_root_url = "https://docs.rs/magnum-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod location;
pub mod report;
mod validation;

pub use error::{
    ErrorCategory, MagnumError, MagnumResult, RegistrationError, ResourceNotFound,
    ResponseValidationError, ShapeError,
};
pub use location::Location;
pub use report::ErrorReport;
pub use validation::{kinds, LocSegment, ValidationError};
