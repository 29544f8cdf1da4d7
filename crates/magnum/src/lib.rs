//! # Magnum
//!
//! Declarative parameter binding and response validation for HTTP handlers.
//!
//! A route declares its parameters once, each with a type, a location
//! (path, query, header, cookie, body, form or file), a default and
//! constraints. Magnum then
//!
//! - reads, coerces and validates every parameter of every request, handing
//!   the handler ready values or answering 400 with every failure listed,
//! - resolves the response status from the handler, the route and the
//!   method conventions,
//! - validates the handler's output against the declared response schema,
//!   answering 500 on a mismatch.
//!
//! ## Crates
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`core`] | `magnum-core` | locations, validation errors, error reports |
//! | [`schema`] | `magnum-schema` | declared types, coercion, constraints |
//! | [`router`] | `magnum-router` | path templates |
//! | [`extract`] | `magnum-extract` | per-location request sources |
//! | [`binding`] | `magnum-binding` | route declarations and the request pipeline |
//! | [`config`] | `magnum-config` | typed configuration |
//! | [`telemetry`] | `magnum-telemetry` | logging setup |
//!
//! ## Example
//!
//! ```
//! use magnum::prelude::*;
//! use http::{Method, StatusCode};
//!
//! let endpoint = Endpoint::builder("create_user", "/users")
//!     .method(Method::POST)
//!     .param(Param::new("age", FieldType::Int).constraints(Constraints::new().ge(0.0)))
//!     .param(Param::new("name", FieldType::Str))
//!     .handler(|values| Ok(Reply::from(values.to_json())))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(endpoint.route().body().unwrap().name(), "Body_create_user");
//! assert_eq!(endpoint.outbound().status_resolver().latent(), StatusCode::CREATED);
//! ```

#![doc(html_root_url = "https://docs.rs/magnum/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use magnum_binding as binding;
pub use magnum_config as config;
pub use magnum_core as core;
pub use magnum_extract as extract;
pub use magnum_router as router;
pub use magnum_schema as schema;
pub use magnum_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use magnum::prelude::*;
/// ```
pub mod prelude {
    pub use magnum_core::{
        kinds, ErrorReport, Location, MagnumError, MagnumResult, RegistrationError,
        ResourceNotFound, ShapeError, ValidationError,
    };

    pub use magnum_schema::{Constraints, Field, FieldType, RecordSchema, Schema};

    pub use magnum_extract::{ExtractLimits, ExtractionContext, UploadedFile};

    pub use magnum_binding::{
        BinderConfig, BoundValues, Endpoint, OutboundCasing, Param, Payload, Reply,
        ResponseSpec, RouteBinding,
    };

    pub use magnum_config::{ConfigLoader, MagnumConfig};

    pub use magnum_telemetry::{init_logging, LogConfig};
}
