//! # Magnum Test
//!
//! In-memory testing for Magnum endpoints: requests are dispatched straight
//! to [`Endpoint::handle`](magnum_binding::Endpoint::handle), no sockets
//! involved.
//!
//! ## Example
//!
//! ```
//! use magnum_binding::{Endpoint, Param, Reply};
//! use magnum_schema::FieldType;
//! use magnum_test::TestClient;
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let client = TestClient::new().route(
//!     Endpoint::builder("read_item", "/items/{item_id}")
//!         .param(Param::new("item_id", FieldType::Int))
//!         .param(Param::new("q", FieldType::Str).default(serde_json::Value::Null))
//!         .handler(|values| Ok(Reply::from(values.to_json())))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let response = client.get("/items/5").query("q", "red wine").send().await.unwrap();
//! response.assert_status(StatusCode::OK);
//! assert_eq!(response.json_value().unwrap()["q"], "red wine");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/magnum-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{MultipartBody, TestRequest, TestRequestBuilder};
pub use response::TestResponse;
