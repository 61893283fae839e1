//! Client for self-describing HTTP APIs.
//!
//! A service publishes a descriptor at `/.well-known/socket-agent` listing
//! its endpoints, methods, paths and parameters. This crate fetches that
//! descriptor and uses it to:
//!
//! - **Dispatch by name**: `client.call("get_product", params)` resolves path,
//!   query, body and header parameters from the descriptor
//! - **Intercept calls**: an ordered middleware pipeline sees every request,
//!   response and error
//! - **Feed LLMs**: project endpoints into OpenAI or Anthropic tool schemas
//!
//! HTTP error statuses are data: a 404 comes back as an [`ApiResponse`] with
//! `success() == false`. Only failures before a response exists are errors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use socket_agent::{params, Client, ToolFormat};
//!
//! let client = Client::builder("localhost:8000")?
//!     .bearer_token("sk-xxx")
//!     .build()?;
//! client.discover().await?;
//!
//! for tool in client.get_tools(ToolFormat::OpenAi)? {
//!     println!("{}", tool.name());
//! }
//!
//! let response = client
//!     .call("create_product", params! { "name" => "Widget", "price" => 9.99 })
//!     .await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod method;
pub mod middleware;
pub mod response;
pub mod tools;
pub mod transport;

// Re-exports for convenience
pub use auth::{ApiAuthMethod, Credential};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use descriptor::{
    AuthHint, AuthKind, BaseMetadata, Descriptor, EndpointBuilder, EndpointSpec, ParamType,
    ParameterLocation, ParameterSpec,
};
pub use dispatch::{Params, UnknownParameterPolicy};
pub use error::{
    ConfigError, DescriptorError, DiscoveryError, ProjectionError, ResolutionError,
    SocketAgentError, TransportError,
};
pub use method::RestMethod;
pub use middleware::{ErrorOutcome, Middleware, MiddlewareContext};
pub use response::{ApiResponse, ResponseData};
pub use tools::{ToolFormat, ToolSchema};

#[doc(hidden)]
pub use serde_json;
