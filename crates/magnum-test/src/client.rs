//! In-memory dispatch to endpoints.

use crate::error::TestError;
use crate::request::{MultipartBody, TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::{header, HeaderValue, Method, Response, StatusCode};
use magnum_binding::Endpoint;
use magnum_extract::ExtractionContext;
use serde::Serialize;

/// A test client that dispatches requests to registered endpoints.
///
/// Endpoints are tried in registration order; the first whose template
/// matches the path and whose methods include the request method handles
/// it. A matching path with no matching method answers 405, an unknown path
/// 404.
#[must_use]
#[derive(Debug, Default)]
pub struct TestClient {
    endpoints: Vec<Endpoint>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client with no endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint.
    pub fn route(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }

    /// Dispatches a built request.
    pub async fn dispatch(&self, request: TestRequest) -> TestResponse {
        let mut path_matched = false;
        for endpoint in &self.endpoints {
            let Some(params) = endpoint.route().template().match_path(request.uri.path()) else {
                continue;
            };
            if !endpoint.allows(&request.method) {
                path_matched = true;
                continue;
            }
            let ctx = ExtractionContext::new(
                request.method,
                request.uri,
                request.headers,
                request.body,
                params,
            );
            return TestResponse::from_response(endpoint.handle(ctx).await);
        }

        if path_matched {
            fallback(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
        } else {
            fallback(StatusCode::NOT_FOUND, "Not Found")
        }
    }
}

fn fallback(status: StatusCode, message: &str) -> TestResponse {
    let mut response = Response::new(Bytes::from(
        serde_json::json!({ "message": message }).to_string(),
    ));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    TestResponse::from_response(response)
}

/// A request builder bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Appends a cookie.
    pub fn cookie(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.cookie(name, value);
        self
    }

    /// Appends a query pair.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Appends `name[]=value` for each value.
    pub fn query_array<I, S>(mut self, name: impl AsRef<str>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.builder = self.builder.query_array(name, values);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a url-encoded form body.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, form: MultipartBody) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Builds and dispatches the request.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(self.client.dispatch(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magnum_binding::{Param, Reply};
    use magnum_schema::FieldType;
    use serde_json::json;

    fn client() -> TestClient {
        TestClient::new()
            .route(
                Endpoint::builder("read_wine", "/wines/{name}")
                    .param(Param::new("name", FieldType::Str))
                    .handler(|values| Ok(Reply::from(values.to_json())))
                    .build()
                    .unwrap(),
            )
            .route(
                Endpoint::builder("delete_wine", "/wines/{name}")
                    .method(Method::DELETE)
                    .param(Param::new("name", FieldType::Str))
                    .handler(|_| Ok(Reply::empty()))
                    .build()
                    .unwrap(),
            )
    }

    #[tokio::test]
    async fn test_dispatch_by_path_and_method() {
        let client = client();

        let read = client.get("/wines/Margaux%202015").send().await.unwrap();
        read.assert_status(StatusCode::OK)
            .assert_json(&json!({"name": "Margaux 2015"}));

        let delete = client.delete("/wines/Margaux").send().await.unwrap();
        delete.assert_status(StatusCode::NO_CONTENT).assert_empty_body();
    }

    #[tokio::test]
    async fn test_unmatched_requests() {
        let client = client();

        let missing = client.get("/cellars").send().await.unwrap();
        missing.assert_status(StatusCode::NOT_FOUND);

        let wrong_method = client.put("/wines/Margaux").send().await.unwrap();
        wrong_method.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new()
            .with_default_header("x-token", "secret")
            .route(
                Endpoint::builder("whoami", "/whoami")
                    .param(Param::new("x_token", FieldType::Str).location(magnum_core::Location::Header))
                    .handler(|values| Ok(Reply::from(values.to_json())))
                    .build()
                    .unwrap(),
            );
        let response = client.get("/whoami").send().await.unwrap();
        response.assert_json(&json!({"x_token": "secret"}));
    }

    #[tokio::test]
    async fn test_build_errors_surface_on_send() {
        let result = client().get("/wines/x").header("bad header", "v").send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
