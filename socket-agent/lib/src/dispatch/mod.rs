//! Dynamic dispatch: turning a call by name into a concrete request plan.
//!
//! Resolution is pure. It reads the descriptor and the supplied parameters
//! and either produces a [`ResolvedRequest`] or fails with a
//! [`ResolutionError`]; nothing touches the network until the plan exists.

mod render;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use tracing::warn;
use url::Url;

use crate::descriptor::{Descriptor, ParameterLocation};
use crate::error::{ResolutionError, TransportError};
use crate::method::RestMethod;
use crate::transport::TransportRequest;

/// Keyword parameters of a call, keyed by parameter name.
pub type Params = Map<String, Value>;

/// Builds a [`Params`] map from `key => value` pairs.
///
/// Values go through `serde_json::json!`, so literals, nested objects and
/// expressions all work.
///
/// ## Examples
///
/// ```rust
/// use socket_agent::params;
///
/// let params = params! { "name" => "Widget", "price" => 9.99 };
/// assert_eq!(params["price"], 9.99);
/// assert!(params!().is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(
            params.insert(::std::string::String::from($key), $crate::serde_json::json!($value));
        )+
        params
    }};
}

/// A symbolic call: endpoint name plus keyword parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRequest {
    /// Endpoint name (or `METHOD:/path` route key).
    pub endpoint: String,
    /// Keyword parameters.
    pub params: Params,
}

impl CallRequest {
    /// Creates a call request.
    pub fn new(endpoint: impl Into<String>, params: Params) -> Self {
        Self {
            endpoint: endpoint.into(),
            params,
        }
    }
}

/// What to do with parameters the endpoint does not declare.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum UnknownParameterPolicy {
    /// Fail with [`ResolutionError::UnexpectedParameter`].
    #[default]
    Reject,
    /// Drop them and log a warning.
    Ignore,
}

/// A concrete HTTP request plan, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: RestMethod,
    /// Path with placeholders filled and percent-encoded.
    pub path: String,
    /// Query pairs, in declared parameter order.
    pub query: Vec<(String, String)>,
    /// JSON object of body parameters, absent if none were supplied.
    pub body: Option<Value>,
    /// Header pairs, in declared parameter order.
    pub headers: Vec<(String, String)>,
}

impl ResolvedRequest {
    /// Builds a plan directly from caller-supplied pieces, without a descriptor.
    ///
    /// `query` values are rendered the same way as declared query
    /// parameters; `null` values are skipped.
    pub fn raw(
        method: RestMethod,
        path: impl Into<String>,
        query: &Params,
        body: Option<Value>,
        headers: Vec<(String, String)>,
    ) -> Self {
        let query = query
            .iter()
            .filter(|(_, value)| !value.is_null())
            .flat_map(|(name, value)| render::query_pairs(name, value))
            .collect();
        Self {
            method,
            path: path.into(),
            query,
            body,
            headers,
        }
    }

    /// Anchors the plan at `base` and attaches the timeout.
    ///
    /// The path is appended to the base URL's own path, so a base of
    /// `https://host/api` and a path of `/products` target
    /// `https://host/api/products`.
    ///
    /// ## Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the joined URL does not parse.
    pub fn into_transport(self, base: &Url, timeout: Duration) -> Result<TransportRequest, TransportError> {
        let url = join_url(base, &self.path)?;
        Ok(TransportRequest {
            method: self.method,
            url,
            query: self.query,
            body: self.body,
            headers: self.headers,
            timeout: Some(timeout),
        })
    }
}

fn join_url(base: &Url, path: &str) -> Result<Url, TransportError> {
    let base = base.as_str().trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };
    Url::parse(&joined)
        .map_err(|e| TransportError::InvalidRequest(format!("invalid URL '{joined}': {e}")))
}

/// Resolves a call against a descriptor.
///
/// Parameters are read in declared order: missing required ones fail
/// immediately, missing optional ones are skipped, and supplied ones are
/// routed by location. A JSON `null` counts as missing.
///
/// ## Errors
///
/// - [`ResolutionError::UnknownEndpoint`] if the name matches no endpoint
/// - [`ResolutionError::MissingParameter`] for the first absent required parameter
/// - [`ResolutionError::InvalidParameter`] for an unusable header value or a
///   path value of `.` or `..`
/// - [`ResolutionError::UnexpectedParameter`] for undeclared keys under
///   [`UnknownParameterPolicy::Reject`]
///
/// ## Examples
///
/// ```rust
/// use socket_agent::dispatch::{resolve, CallRequest, UnknownParameterPolicy};
/// use socket_agent::{params, Descriptor, EndpointSpec, ParameterSpec, RestMethod};
///
/// let descriptor = Descriptor::new("Shop", vec![
///     EndpointSpec::builder()
///         .name("get_product")
///         .method(RestMethod::Get)
///         .path("/products/{id}")
///         .param(ParameterSpec::path("id"))
///         .build()
///         .unwrap(),
/// ]).unwrap();
///
/// let call = CallRequest::new("get_product", params! { "id" => "123" });
/// let plan = resolve(&descriptor, &call, UnknownParameterPolicy::Reject).unwrap();
/// assert_eq!(plan.path, "/products/123");
/// ```
pub fn resolve(
    descriptor: &Descriptor,
    request: &CallRequest,
    policy: UnknownParameterPolicy,
) -> Result<ResolvedRequest, ResolutionError> {
    let endpoint = descriptor.get_endpoint(&request.endpoint).ok_or_else(|| {
        ResolutionError::UnknownEndpoint {
            name: request.endpoint.clone(),
        }
    })?;

    let mut path_values = HashMap::new();
    let mut query = Vec::new();
    let mut body = Map::new();
    let mut headers = Vec::new();

    for spec in endpoint.parameters() {
        let Some(value) = request.params.get(&spec.name).filter(|v| !v.is_null()) else {
            if spec.required {
                return Err(ResolutionError::MissingParameter {
                    endpoint: endpoint.name().to_string(),
                    name: spec.name.clone(),
                });
            }
            continue;
        };

        match spec.location {
            ParameterLocation::Path => {
                path_values.insert(spec.name.as_str(), render::path_segment(&spec.name, value)?);
            }
            ParameterLocation::Query => query.extend(render::query_pairs(&spec.name, value)),
            ParameterLocation::Body => {
                body.insert(spec.name.clone(), value.clone());
            }
            ParameterLocation::Header => {
                headers.push((spec.name.clone(), render::header_value(&spec.name, value)?));
            }
        }
    }

    let mut unknown: Vec<String> = request
        .params
        .keys()
        .filter(|key| endpoint.parameter(key).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        match policy {
            UnknownParameterPolicy::Reject => {
                return Err(ResolutionError::UnexpectedParameter {
                    endpoint: endpoint.name().to_string(),
                    names: unknown,
                });
            }
            UnknownParameterPolicy::Ignore => {
                warn!(
                    endpoint = endpoint.name(),
                    ignored = %unknown.join(", "),
                    "Dropping undeclared parameters"
                );
            }
        }
    }

    Ok(ResolvedRequest {
        method: endpoint.method(),
        path: endpoint.render_path(&path_values),
        query,
        body: (!body.is_empty()).then_some(Value::Object(body)),
        headers,
    })
}
