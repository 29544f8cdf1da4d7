//! Status code resolution.
//!
//! Candidates, highest priority first:
//!
//! 1. the status returned by the handler
//! 2. the status configured on the route
//! 3. the convention of the route's main method
//! 4. the default of the response class (200)

use http::{Method, StatusCode};

/// Status used when nothing else decides.
pub const RESPONSE_CLASS_DEFAULT: StatusCode = StatusCode::OK;

/// Returns the conventional success status of a method.
///
/// # Example
///
/// ```
/// use magnum_binding::status::method_default_status;
/// use http::{Method, StatusCode};
///
/// assert_eq!(method_default_status(&Method::POST), Some(StatusCode::CREATED));
/// assert_eq!(method_default_status(&Method::DELETE), Some(StatusCode::NO_CONTENT));
/// ```
#[must_use]
pub fn method_default_status(method: &Method) -> Option<StatusCode> {
    match *method {
        Method::GET
        | Method::HEAD
        | Method::CONNECT
        | Method::OPTIONS
        | Method::TRACE
        | Method::PATCH => Some(StatusCode::OK),
        Method::POST | Method::PUT => Some(StatusCode::CREATED),
        Method::DELETE => Some(StatusCode::NO_CONTENT),
        _ => None,
    }
}

/// Resolves the status of every response of one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResolver {
    configured: Option<StatusCode>,
    method_default: Option<StatusCode>,
    class_default: StatusCode,
}

impl StatusResolver {
    /// Creates the resolver of a route.
    ///
    /// Logs a warning when the method has no convention and no status is
    /// configured.
    #[must_use]
    pub fn new(main_method: &Method, configured: Option<StatusCode>) -> Self {
        let method_default = method_default_status(main_method);
        if method_default.is_none() && configured.is_none() {
            tracing::warn!(
                method = %main_method,
                fallback = RESPONSE_CLASS_DEFAULT.as_u16(),
                "no conventional status code for method; configure one on the route"
            );
        }
        Self {
            configured,
            method_default,
            class_default: RESPONSE_CLASS_DEFAULT,
        }
    }

    /// Overrides the response-class default.
    #[must_use]
    pub fn with_class_default(mut self, status: StatusCode) -> Self {
        self.class_default = status;
        self
    }

    /// Returns the configured status.
    #[must_use]
    pub fn configured(&self) -> Option<StatusCode> {
        self.configured
    }

    /// Picks the status of a response.
    #[must_use]
    pub fn resolve(&self, returned: Option<StatusCode>) -> StatusCode {
        returned
            .or(self.configured)
            .or(self.method_default)
            .unwrap_or(self.class_default)
    }

    /// Returns the status used when the handler returns none.
    #[must_use]
    pub fn latent(&self) -> StatusCode {
        self.resolve(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let resolver = StatusResolver::new(&Method::POST, Some(StatusCode::ACCEPTED));
        let teapot = StatusCode::from_u16(218).unwrap();
        assert_eq!(resolver.resolve(Some(teapot)), teapot);
        assert_eq!(resolver.resolve(None), StatusCode::ACCEPTED);

        let conventional = StatusResolver::new(&Method::POST, None);
        assert_eq!(conventional.latent(), StatusCode::CREATED);
    }

    #[test]
    fn test_method_conventions() {
        for method in [Method::GET, Method::HEAD, Method::CONNECT, Method::OPTIONS, Method::TRACE, Method::PATCH] {
            assert_eq!(StatusResolver::new(&method, None).latent(), StatusCode::OK);
        }
        assert_eq!(StatusResolver::new(&Method::PUT, None).latent(), StatusCode::CREATED);
        assert_eq!(StatusResolver::new(&Method::DELETE, None).latent(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_unknown_method_falls_back_to_class_default() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let resolver = StatusResolver::new(&purge, None);
        assert_eq!(resolver.latent(), StatusCode::OK);
        assert_eq!(
            resolver.with_class_default(StatusCode::ACCEPTED).latent(),
            StatusCode::ACCEPTED
        );
    }
}
