//! Path templates and path-match parameters for Magnum.
//!
//! Dispatch belongs to the host framework. This crate only parses route
//! templates, so that route bindings can resolve which parameters live in
//! the path, and carries the captured values into extraction.
//!
//! # Example
//!
//! ```rust
//! use magnum_router::PathTemplate;
//!
//! let template = PathTemplate::parse("/users/{user_id}/posts/{post_id}").unwrap();
//! let params = template.match_path("/users/7/posts/12").unwrap();
//!
//! assert_eq!(params.get("user_id"), Some("7"));
//! assert_eq!(params.get("post_id"), Some("12"));
//! ```

#![doc(html_root_url = "https://docs.rs/magnum-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod params;
mod template;

pub use params::Params;
pub use template::{PathTemplate, Segment};
