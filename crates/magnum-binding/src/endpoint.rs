//! The per-route pipeline.
//!
//! An [`Endpoint`] is composed once by [`EndpointBuilder::build`] and then
//! shared by every request:
//!
//! ```text
//! ExtractionContext -> RequestData -> InboundBinder -> handler -> OutboundHandler -> Response
//! ```

use crate::inbound::{BinderConfig, BoundValues, InboundBinder};
use crate::outbound::Reply;
use crate::registry::{Param, RouteBinding, RouteBindingBuilder};
use crate::response::{OutboundHandler, OutboundResult, ResponseSpec};
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use magnum_core::{ErrorReport, MagnumError, RegistrationError, ValidationError};
use magnum_extract::{ExtractLimits, ExtractionContext, RequestData};
use std::fmt;
use std::sync::Arc;

/// A type-erased route handler.
pub type HandlerFn = Arc<dyn Fn(BoundValues) -> Result<Reply, MagnumError> + Send + Sync>;

/// A route ready to serve requests.
///
/// # Example
///
/// ```
/// use magnum_binding::{Endpoint, Param, Reply};
/// use magnum_extract::ExtractionContext;
/// use magnum_schema::FieldType;
/// use http::{StatusCode, Uri};
///
/// let endpoint = Endpoint::builder("read_item", "/items/{item_id}")
///     .param(Param::new("item_id", FieldType::Int))
///     .handler(|values| Ok(Reply::from(serde_json::json!({"item_id": values.get("item_id")}))))
///     .build()
///     .unwrap();
///
/// let ctx = ExtractionContext::builder()
///     .uri(Uri::from_static("/items/3"))
///     .path_param("item_id", "3")
///     .build();
/// let response = tokio_test::block_on(endpoint.handle(ctx));
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#"{"item_id":3}"#);
/// ```
#[derive(Clone)]
pub struct Endpoint {
    route: Arc<RouteBinding>,
    binder: InboundBinder,
    outbound: OutboundHandler,
    limits: ExtractLimits,
    handler: HandlerFn,
}

impl Endpoint {
    /// Starts declaring an endpoint.
    #[must_use]
    pub fn builder(name: impl Into<String>, template: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            route: RouteBinding::builder(name, template),
            response: ResponseSpec::new(),
            binder: BinderConfig::new(),
            limits: ExtractLimits::default(),
            handler: None,
        }
    }

    /// Returns the route declaration.
    #[must_use]
    pub fn route(&self) -> &Arc<RouteBinding> {
        &self.route
    }

    /// Returns the response declaration.
    #[must_use]
    pub fn response(&self) -> &ResponseSpec {
        self.outbound.spec()
    }

    /// Returns the outbound handler.
    #[must_use]
    pub fn outbound(&self) -> &OutboundHandler {
        &self.outbound
    }

    /// Returns `true` if the endpoint answers `method`.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.route.allows(method)
    }

    /// Runs the pipeline, leaving errors to the caller.
    pub async fn process(&self, ctx: &ExtractionContext) -> Result<OutboundResult, MagnumError> {
        let data = if self.route.body().is_some() {
            RequestData::from_context(ctx, &self.limits)
                .await
                .map_err(|err| MagnumError::invalid_request(vec![ValidationError::from(err)]))?
        } else {
            RequestData::without_payload(ctx)
        };
        let values = self
            .binder
            .bind(&self.route, &data)
            .map_err(MagnumError::invalid_request)?;
        let reply = (self.handler)(values)?;
        self.outbound.finish(reply)
    }

    /// Runs the pipeline and reports errors on the wire.
    pub async fn handle(&self, ctx: ExtractionContext) -> Response<Bytes> {
        match self.process(&ctx).await {
            Ok(result) => result.into_response(),
            Err(err) => {
                let report = ErrorReport::from_error(&err);
                tracing::debug!(
                    route = %self.route.template(),
                    method = %ctx.method(),
                    status = report.status().as_u16(),
                    "request failed"
                );
                report.into_response()
            }
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("route", &self.route)
            .field("binder", &self.binder)
            .field("outbound", &self.outbound)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Endpoint`].
pub struct EndpointBuilder {
    route: RouteBindingBuilder,
    response: ResponseSpec,
    binder: BinderConfig,
    limits: ExtractLimits,
    handler: Option<HandlerFn>,
}

impl EndpointBuilder {
    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.route = self.route.method(method);
        self
    }

    /// Adds several methods.
    #[must_use]
    pub fn methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.route = self.route.methods(methods);
        self
    }

    /// Appends a parameter declaration.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.route = self.route.param(param);
        self
    }

    /// Sets the response declaration.
    #[must_use]
    pub fn response(mut self, response: ResponseSpec) -> Self {
        self.response = response;
        self
    }

    /// Sets the configured status.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.response = self.response.with_status(status);
        self
    }

    /// Sets the binder configuration.
    #[must_use]
    pub fn binder(mut self, config: BinderConfig) -> Self {
        self.binder = config;
        self
    }

    /// Sets the payload limits.
    #[must_use]
    pub fn limits(mut self, limits: ExtractLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(BoundValues) -> Result<Reply, MagnumError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Composes the pipeline.
    pub fn build(self) -> Result<Endpoint, RegistrationError> {
        let route = self.route.build()?;
        let Some(handler) = self.handler else {
            return Err(RegistrationError::MissingHandler {
                route: route.template().to_string(),
            });
        };
        let outbound = OutboundHandler::new(self.response, route.main_method());
        Ok(Endpoint {
            route,
            binder: InboundBinder::new(self.binder),
            outbound,
            limits: self.limits,
            handler,
        })
    }
}

impl fmt::Debug for EndpointBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder")
            .field("route", &self.route)
            .field("response", &self.response)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
