//! # Magnum Binding
//!
//! Declarative parameter binding and response validation for HTTP handlers.
//!
//! A route is declared once as a list of [`Param`]s plus a [`ResponseSpec`].
//! Every request then flows through the same stages:
//!
//! 1. [`InboundBinder`] reads each parameter from its location, coerces and
//!    constrains it, and either hands [`BoundValues`] to the handler or
//!    reports every failure as a 400.
//! 2. The handler answers with a [`Reply`].
//! 3. [`OutboundHandler`] resolves the status, validates the body against the
//!    output schema and serializes it.
//!
//! [`Endpoint`] composes the stages; hosts only call [`Endpoint::handle`].
//!
//! ## Example
//!
//! ```
//! use magnum_binding::{Endpoint, Param, Reply};
//! use magnum_extract::ExtractionContext;
//! use magnum_schema::FieldType;
//! use http::{Method, StatusCode};
//! use serde_json::json;
//!
//! let endpoint = Endpoint::builder("create_user", "/users")
//!     .method(Method::POST)
//!     .param(Param::new("age", FieldType::Int))
//!     .param(Param::new("name", FieldType::Str))
//!     .handler(|values| Ok(Reply::from(values.to_json())))
//!     .build()
//!     .unwrap();
//!
//! let ctx = ExtractionContext::builder()
//!     .method(Method::POST)
//!     .header("content-type", "application/json")
//!     .body(r#"{"age": "x", "name": "Ann"}"#)
//!     .build();
//! let response = tokio_test::block_on(endpoint.handle(ctx));
//! assert_eq!(response.status(), StatusCode::BAD_REQUEST);
//! ```

#![doc(html_root_url = "https://docs.rs/magnum-binding/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod composer;
mod endpoint;
mod inbound;
mod outbound;
pub mod registry;
mod response;
pub mod status;

pub use composer::{compose_body, BodySchema};
pub use endpoint::{Endpoint, EndpointBuilder, HandlerFn};
pub use inbound::{BinderConfig, BoundValues, InboundBinder};
pub use outbound::{Payload, Reply};
pub use registry::{header_alias, Param, ParameterSpec, RouteBinding, RouteBindingBuilder};
pub use response::{
    camelize_keys, status_forbids_body, OutboundCasing, OutboundHandler, OutboundResult,
    ResponseSpec, BYTES_CONTENT_TYPE, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
pub use status::StatusResolver;
