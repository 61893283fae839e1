//! The client facade: discovery, dispatch and middleware in one handle.
//!
//! A [`Client`] holds the current descriptor as an `Arc` snapshot. Every
//! call captures the snapshot once at its start, so rediscovery (or
//! [`Client::install_descriptor`]) swaps the reference for later calls
//! without disturbing calls already in flight.

mod builder;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{Span, debug, instrument, warn};
use url::Url;

pub use builder::ClientBuilder;

use crate::auth::Credential;
use crate::descriptor::{Descriptor, EndpointSpec};
use crate::discovery::fetch_descriptor;
use crate::dispatch::{CallRequest, Params, ResolvedRequest, UnknownParameterPolicy, resolve};
use crate::error::{DiscoveryError, ResolutionError, Result, SocketAgentError};
use crate::method::RestMethod;
use crate::middleware::{Middleware, Pipeline};
use crate::response::ApiResponse;
use crate::tools::{ToolFormat, ToolSchema, project};
use crate::transport::{HttpTransport, Transport};

/// Client for a self-describing HTTP API.
///
/// ## Examples
///
/// ```rust,ignore
/// use socket_agent::{params, Client, ToolFormat};
///
/// let client = Client::builder("localhost:8000")?.build()?;
/// client.discover().await?;
///
/// let tools = client.get_tools(ToolFormat::Anthropic)?;
/// let response = client.call("get_product", params! { "id" => "123" }).await?;
/// if response.success() {
///     println!("{:?}", response.json());
/// }
/// ```
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    base_url: Url,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
    credentials: Vec<Credential>,
    policy: UnknownParameterPolicy,
    pipeline: Pipeline,
    descriptor: RwLock<Option<Arc<Descriptor>>>,
}

impl Client<HttpTransport> {
    /// Creates a builder from a loosely written base URL.
    ///
    /// ## Errors
    ///
    /// Returns a discovery error if the URL cannot be normalized.
    pub fn builder(base_url: &str) -> Result<ClientBuilder> {
        ClientBuilder::parse(base_url)
    }

    /// Creates a client with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::builder(base_url)?.build()?)
    }
}

impl<T: Transport> Client<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        transport: T,
        base_url: Url,
        timeout: Duration,
        default_headers: Vec<(String, String)>,
        credentials: Vec<Credential>,
        policy: UnknownParameterPolicy,
        pipeline: Pipeline,
        descriptor: Option<Arc<Descriptor>>,
    ) -> Self {
        Self {
            transport,
            base_url,
            timeout,
            default_headers,
            credentials,
            policy,
            pipeline,
            descriptor: RwLock::new(descriptor),
        }
    }

    /// The base URL discovery runs against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The transport this client sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches the descriptor from `<base_url>/.well-known/socket-agent` and
    /// makes it current.
    ///
    /// ## Errors
    ///
    /// Returns [`SocketAgentError::Descriptor`] if the payload fails
    /// validation and [`SocketAgentError::Discovery`] if the fetch fails. The
    /// previous descriptor stays current either way.
    pub async fn discover(&self) -> Result<Arc<Descriptor>> {
        let descriptor = fetch_descriptor(&self.transport, &self.base_url, self.timeout)
            .await
            .map_err(|err| match err {
                DiscoveryError::Invalid(source) => SocketAgentError::Descriptor(source),
                other => other.into(),
            })?;
        Ok(self.install_descriptor(descriptor))
    }

    /// Makes `descriptor` current, replacing any previous one.
    pub fn install_descriptor(&self, descriptor: Descriptor) -> Arc<Descriptor> {
        let descriptor = Arc::new(descriptor);
        let mut slot = self.descriptor.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&descriptor));
        debug!(
            service = descriptor.name(),
            endpoints = descriptor.endpoints().len(),
            "Descriptor installed"
        );
        descriptor
    }

    /// The current descriptor snapshot, if any.
    pub fn descriptor(&self) -> Option<Arc<Descriptor>> {
        self.descriptor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_descriptor(&self) -> Result<Arc<Descriptor>> {
        self.descriptor().ok_or(SocketAgentError::NotDiscovered)
    }

    /// Endpoint names in declared order.
    ///
    /// ## Errors
    ///
    /// Returns [`SocketAgentError::NotDiscovered`] without a descriptor.
    pub fn list_endpoints(&self) -> Result<Vec<String>> {
        let descriptor = self.require_descriptor()?;
        Ok(descriptor
            .endpoint_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Looks up one endpoint by name.
    ///
    /// ## Errors
    ///
    /// Returns [`SocketAgentError::NotDiscovered`] without a descriptor, or
    /// [`ResolutionError::UnknownEndpoint`] if the name matches nothing.
    pub fn get_endpoint(&self, name: &str) -> Result<EndpointSpec> {
        let descriptor = self.require_descriptor()?;
        descriptor.get_endpoint(name).cloned().ok_or_else(|| {
            ResolutionError::UnknownEndpoint {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Projects the current descriptor into tool schemas.
    ///
    /// ## Errors
    ///
    /// Returns [`SocketAgentError::NotDiscovered`] without a descriptor.
    pub fn get_tools(&self, format: ToolFormat) -> Result<Vec<ToolSchema>> {
        let descriptor = self.require_descriptor()?;
        Ok(project(&descriptor, format))
    }

    /// Registers a middleware after the existing ones.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.pipeline.push(middleware);
    }

    /// Removes middleware by name. Returns `true` if any was removed.
    pub fn remove_middleware(&mut self, name: &str) -> bool {
        self.pipeline.remove(name)
    }

    /// Registered middleware names, in registration order.
    pub fn middleware_names(&self) -> Vec<&str> {
        self.pipeline.names()
    }

    /// Calls an endpoint by name.
    ///
    /// HTTP error statuses come back as an [`ApiResponse`] with
    /// `success() == false`. Every failure, including resolution errors,
    /// passes through the middleware `on_error` hooks first.
    ///
    /// ## Errors
    ///
    /// - [`SocketAgentError::NotDiscovered`] without a descriptor
    /// - [`SocketAgentError::Resolution`] if the call does not match the endpoint
    /// - [`SocketAgentError::Transport`] if the round trip fails
    #[instrument(
        name = "call",
        skip(self, params),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn call(&self, endpoint: &str, params: Params) -> Result<ApiResponse> {
        let snapshot = self.descriptor();
        let result = self
            .pipeline
            .run(endpoint, params, |params| self.dispatch(snapshot, endpoint, params))
            .await;
        record_outcome(&result);
        result
    }

    /// Sends a request without consulting the descriptor.
    ///
    /// `query` becomes the query string and `body`, when present, the JSON
    /// body. The path is joined to the descriptor's base URL when one is
    /// installed, else to the client's. Middleware sees the call as
    /// `"<METHOD> <path>"` with `query` as its parameters.
    ///
    /// ## Errors
    ///
    /// Returns [`SocketAgentError::Transport`] if the round trip fails.
    #[instrument(
        name = "call_raw",
        skip(self, query, body, headers),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn call_raw(
        &self,
        method: RestMethod,
        path: &str,
        query: Params,
        body: Option<Value>,
        headers: Vec<(String, String)>,
    ) -> Result<ApiResponse> {
        let label = format!("{method} {path}");
        if body.is_some() && !method.has_body() {
            warn!(method = %method, path, "Sending a JSON body with a method that usually has none");
        }
        let snapshot = self.descriptor();
        let result = self
            .pipeline
            .run(&label, query, |query| {
                let plan = ResolvedRequest::raw(method, path, &query, body, headers);
                self.dispatch_raw(snapshot, plan)
            })
            .await;
        record_outcome(&result);
        result
    }

    async fn dispatch(
        &self,
        snapshot: Option<Arc<Descriptor>>,
        endpoint: &str,
        params: Params,
    ) -> Result<ApiResponse> {
        let descriptor = snapshot.ok_or(SocketAgentError::NotDiscovered)?;
        let request = CallRequest::new(endpoint, params);
        let plan = resolve(&descriptor, &request, self.policy)?;
        let base = descriptor.base_url().unwrap_or(&self.base_url);
        self.execute(plan, base).await
    }

    async fn dispatch_raw(
        &self,
        snapshot: Option<Arc<Descriptor>>,
        plan: ResolvedRequest,
    ) -> Result<ApiResponse> {
        let base = snapshot
            .as_deref()
            .and_then(Descriptor::base_url)
            .unwrap_or(&self.base_url);
        self.execute(plan, base).await
    }

    async fn execute(&self, plan: ResolvedRequest, base: &Url) -> Result<ApiResponse> {
        let mut request = plan.into_transport(base, self.timeout)?;
        for (name, value) in &self.default_headers {
            if request.header(name).is_none() {
                request.headers.push((name.clone(), value.clone()));
            }
        }
        for credential in &self.credentials {
            credential.apply(&mut request);
        }

        let span = Span::current();
        span.record("http.method", request.method.to_string().as_str());
        span.record("http.url", request.url.as_str());

        let response = self.transport.send(request).await?;
        span.record("http.status_code", response.status);
        Ok(ApiResponse::from_transport(response))
    }
}

fn record_outcome(result: &Result<ApiResponse>) {
    let otel_status = match result {
        Ok(response) if response.success() => "OK",
        Ok(response) if response.status_code() >= 500 => "ERROR",
        Ok(_) => "UNSET",
        Err(_) => "ERROR",
    };
    Span::current().record("otel.status_code", otel_status);
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("credentials", &self.credentials)
            .field("policy", &self.policy)
            .field("pipeline", &self.pipeline)
            .field("descriptor", &self.descriptor().map(|d| d.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParameterSpec;
    use crate::error::{DescriptorError, TransportError};
    use crate::params;
    use crate::transport::RecordingTransport;
    use serde_json::json;
    use tracing_test::traced_test;

    fn shop() -> Descriptor {
        Descriptor::new(
            "Shop",
            vec![
                EndpointSpec::builder()
                    .name("get_product")
                    .method(RestMethod::Get)
                    .path("/products/{id}")
                    .param(ParameterSpec::path("id"))
                    .build()
                    .unwrap(),
            ],
        )
        .unwrap()
    }

    fn client() -> Client<RecordingTransport> {
        ClientBuilder::new(Url::parse("http://shop.test").unwrap())
            .bearer_token("sk-test")
            .build_with_transport(RecordingTransport::new())
    }

    #[test]
    fn test_not_discovered() {
        let client = client();
        assert!(client.descriptor().is_none());
        assert!(matches!(
            client.list_endpoints(),
            Err(SocketAgentError::NotDiscovered)
        ));
        assert!(matches!(
            client.get_tools(ToolFormat::OpenAi),
            Err(SocketAgentError::NotDiscovered)
        ));
    }

    #[tokio::test]
    async fn test_call_before_discovery_sends_nothing() {
        let client = client();
        let err = client.call("get_product", params! { "id" => 1 }).await.unwrap_err();
        assert!(matches!(err, SocketAgentError::NotDiscovered));
        assert_eq!(client.transport().request_count().await, 0);
    }

    #[test]
    fn test_get_endpoint() {
        let client = client();
        client.install_descriptor(shop());
        assert_eq!(client.get_endpoint("get_product").unwrap().path(), "/products/{id}");
        assert!(matches!(
            client.get_endpoint("nope"),
            Err(SocketAgentError::Resolution(ResolutionError::UnknownEndpoint { .. }))
        ));
    }

    #[tokio::test]
    async fn test_call_applies_credentials() {
        let client = client();
        client.install_descriptor(shop());
        client
            .transport()
            .push_json(200, json!({ "id": "7", "name": "Widget" }))
            .await;

        let response = client.call("get_product", params! { "id" => 7 }).await.unwrap();
        assert!(response.success());
        assert_eq!(response.json().unwrap()["name"], "Widget");

        let request = client.transport().last_request().await.unwrap();
        assert_eq!(request.url.as_str(), "http://shop.test/products/7");
        assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_call_raw_without_descriptor() {
        let client = client();
        client.transport().push_json(201, json!({ "ok": true })).await;

        let response = client
            .call_raw(
                RestMethod::Post,
                "/orders",
                params! { "dry_run" => true },
                Some(json!({ "sku": "A1" })),
                vec![("X-Trace".to_string(), "1".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(response.status_code(), 201);

        let request = client.transport().last_request().await.unwrap();
        assert_eq!(request.method, RestMethod::Post);
        assert_eq!(request.url.path(), "/orders");
        assert_eq!(request.query_values("dry_run"), vec!["true"]);
        assert_eq!(request.body, Some(json!({ "sku": "A1" })));
        assert_eq!(request.header("x-trace"), Some("1"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_call_raw_warns_on_body_without_body_method() {
        let client = client();

        client
            .call_raw(
                RestMethod::Delete,
                "/orders/7",
                params!(),
                Some(json!({ "reason": "dup" })),
                vec![],
            )
            .await
            .unwrap();

        let request = client.transport().last_request().await.unwrap();
        assert_eq!(request.body, Some(json!({ "reason": "dup" })));
        assert!(logs_contain("usually has none"));
    }

    #[tokio::test]
    async fn test_discover_reports_invalid_descriptor() {
        let client = client();
        client.install_descriptor(shop());
        client
            .transport()
            .push_json(200, json!({ "name": "Shop", "endpoints": [] }))
            .await;

        let err = client.discover().await.unwrap_err();
        assert!(matches!(
            err,
            SocketAgentError::Descriptor(DescriptorError::NoEndpoints)
        ));
        assert_eq!(client.list_endpoints().unwrap(), vec!["get_product"]);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = client();
        client.install_descriptor(shop());
        client.transport().push_timeout(250).await;

        let err = client.call("get_product", params! { "id" => 1 }).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            SocketAgentError::Transport(TransportError::Timeout { duration_ms: 250 })
        ));
    }

    #[tokio::test]
    async fn test_default_header_does_not_override_caller() {
        let client = ClientBuilder::new(Url::parse("http://shop.test").unwrap())
            .default_header("X-Client", "cli")
            .unwrap()
            .build_with_transport(RecordingTransport::new());

        client
            .call_raw(RestMethod::Get, "/a", params!(), None, vec![])
            .await
            .unwrap();
        client
            .call_raw(
                RestMethod::Get,
                "/b",
                params!(),
                None,
                vec![("x-client".to_string(), "mine".to_string())],
            )
            .await
            .unwrap();

        let requests = client.transport().requests().await;
        assert_eq!(requests[0].header("X-Client"), Some("cli"));
        assert_eq!(requests[1].header("X-Client"), Some("mine"));
        assert_eq!(requests[1].headers.len(), 1);
    }
}
