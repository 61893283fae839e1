//! Builder for [`Client`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use super::Client;
use crate::auth::{ApiAuthMethod, Credential};
use crate::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::descriptor::Descriptor;
use crate::discovery::normalize_url;
use crate::dispatch::UnknownParameterPolicy;
use crate::error::{ConfigError, SocketAgentError};
use crate::middleware::{Middleware, Pipeline};
use crate::transport::{HttpTransport, Transport};

/// Builder for configuring a [`Client`].
///
/// ## Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use socket_agent::{Client, UnknownParameterPolicy};
///
/// let client = Client::builder("localhost:8000")?
///     .timeout(Duration::from_secs(10))
///     .bearer_token("sk-xxx")
///     .unknown_parameters(UnknownParameterPolicy::Ignore)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Url,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
    credentials: Vec<Credential>,
    policy: UnknownParameterPolicy,
    pipeline: Pipeline,
    descriptor: Option<Descriptor>,
}

impl ClientBuilder {
    /// Creates a builder for an already-parsed base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: Vec::new(),
            credentials: Vec::new(),
            policy: UnknownParameterPolicy::default(),
            pipeline: Pipeline::new(),
            descriptor: None,
        }
    }

    /// Creates a builder from a loosely written URL (`localhost:8000`).
    ///
    /// ## Errors
    ///
    /// Returns a discovery error if the URL cannot be normalized.
    pub fn parse(base_url: &str) -> Result<Self, SocketAgentError> {
        Ok(Self::new(normalize_url(base_url)?))
    }

    /// Creates a builder from a [`ClientConfig`].
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the config has no base URL,
    /// or a discovery error if it cannot be normalized.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SocketAgentError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or(ConfigError::missing_field("base_url"))?;

        let mut builder = Self::parse(base_url)?
            .timeout(config.timeout())
            .unknown_parameters(config.unknown_parameters);
        if let Some(token) = &config.token {
            builder = builder.bearer_token(token);
        }
        if let Some(key) = &config.api_key {
            builder = builder.auth(ApiAuthMethod::ApiKey(config.api_key_header.clone()), key);
        }
        Ok(builder)
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every dispatched request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        let name = name.as_ref();
        HeaderName::try_from(name).map_err(|e| ConfigError::invalid_header(name, e))?;
        HeaderValue::try_from(value.as_ref()).map_err(|e| ConfigError::invalid_header(name, e))?;
        self.default_headers
            .push((name.to_string(), value.as_ref().to_string()));
        Ok(self)
    }

    /// Adds a credential. Several may be configured; all are sent.
    pub fn auth(mut self, method: ApiAuthMethod, secret: impl Into<String>) -> Self {
        self.credentials.push(Credential::new(method, secret));
        self
    }

    /// Adds an `Authorization: Bearer` credential.
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.auth(ApiAuthMethod::BearerToken, token)
    }

    /// Adds an `X-API-Key` credential.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials.push(Credential::api_key(key));
        self
    }

    /// Sets the policy for undeclared parameters.
    pub fn unknown_parameters(mut self, policy: UnknownParameterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a middleware.
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.pipeline.push(middleware);
        self
    }

    /// Installs a descriptor up front, skipping discovery.
    pub fn descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Builds a client over the reqwest transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client<HttpTransport>, ConfigError> {
        let transport = HttpTransport::new()?;
        Ok(self.build_with_transport(transport))
    }

    /// Builds a client over any transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Client<T> {
        Client::from_parts(
            transport,
            self.base_url,
            self.timeout,
            self.default_headers,
            self.credentials,
            self.policy,
            self.pipeline,
            self.descriptor.map(Arc::new),
        )
    }
}
