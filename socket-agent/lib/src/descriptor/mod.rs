//! The descriptor model: an immutable snapshot of a remote API surface.
//!
//! A [`Descriptor`] is built once (from a discovery payload or
//! programmatically) and never mutated afterwards. Clients hold it behind an
//! `Arc` and replace the whole snapshot on rediscovery, so readers never
//! need a lock to look at it.

mod endpoint;
mod parameter;
mod wire;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

pub use endpoint::{EndpointBuilder, EndpointSpec, Missing};
pub use parameter::{ParamType, ParameterLocation, ParameterSpec};

use crate::error::DescriptorError;

/// Authentication scheme advertised by a descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// No authentication required.
    #[default]
    None,
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// A key in a custom header.
    ApiKey,
    /// HTTP basic authentication.
    Basic,
}

/// Authentication hint block of a descriptor.
///
/// Informational only: credentials are configured on the client, the hint
/// tells callers what the service expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthHint {
    /// The advertised scheme.
    #[serde(rename = "type", default)]
    pub kind: AuthKind,
    /// Header name for API key auth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Free-form scheme details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Service-level metadata carried alongside the endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetadata {
    /// Service name.
    pub name: String,
    /// Service description.
    pub description: String,
    /// API version.
    pub version: String,
    /// Descriptor format version.
    pub spec_version: String,
    /// Base URL calls should target, when the service declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    /// Authentication hint.
    pub auth: AuthHint,
    /// Unmodelled top-level keys (`schemas`, `examples`, ...), kept verbatim.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Immutable, validated snapshot of an API.
///
/// ## Examples
///
/// ```
/// use socket_agent::{Descriptor, EndpointSpec, ParameterSpec, RestMethod};
///
/// let get_product = EndpointSpec::builder()
///     .name("get_product")
///     .method(RestMethod::Get)
///     .path("/products/{id}")
///     .param(ParameterSpec::path("id"))
///     .build()
///     .unwrap();
///
/// let descriptor = Descriptor::new("Shop", vec![get_product]).unwrap();
/// assert!(descriptor.get_endpoint("get_product").is_some());
/// assert!(descriptor.get_endpoint("GET:/products/{id}").is_some());
/// assert_eq!(descriptor.endpoint_names(), vec!["get_product"]);
/// ```
#[derive(Debug, Clone)]
pub struct Descriptor {
    metadata: BaseMetadata,
    endpoints: Vec<EndpointSpec>,
    by_name: HashMap<String, usize>,
    by_route: HashMap<String, usize>,
}

impl Descriptor {
    /// Builds a descriptor from already-validated endpoints.
    ///
    /// ## Errors
    ///
    /// Returns [`DescriptorError::NoEndpoints`] for an empty list and
    /// [`DescriptorError::DuplicateEndpoint`] when two endpoints share a
    /// name or a method + path pair.
    pub fn new(name: impl Into<String>, endpoints: Vec<EndpointSpec>) -> Result<Self, DescriptorError> {
        let metadata = BaseMetadata {
            name: name.into(),
            version: wire::DEFAULT_VERSION.to_string(),
            spec_version: wire::DEFAULT_SPEC_VERSION.to_string(),
            ..BaseMetadata::default()
        };
        Self::with_metadata(metadata, endpoints)
    }

    /// Builds a descriptor with explicit service metadata.
    ///
    /// ## Errors
    ///
    /// Same as [`Descriptor::new`], plus [`DescriptorError::MissingField`]
    /// when the service name is blank.
    pub fn with_metadata(
        metadata: BaseMetadata,
        endpoints: Vec<EndpointSpec>,
    ) -> Result<Self, DescriptorError> {
        if metadata.name.trim().is_empty() {
            return Err(DescriptorError::MissingField { field: "name" });
        }
        if endpoints.is_empty() {
            return Err(DescriptorError::NoEndpoints);
        }

        let mut by_name = HashMap::with_capacity(endpoints.len());
        let mut by_route = HashMap::with_capacity(endpoints.len());
        for (index, endpoint) in endpoints.iter().enumerate() {
            if by_name.insert(endpoint.name().to_string(), index).is_some() {
                return Err(DescriptorError::DuplicateEndpoint {
                    name: endpoint.name().to_string(),
                });
            }
            let route = endpoint.route_key();
            if by_route.insert(route.clone(), index).is_some() {
                return Err(DescriptorError::DuplicateEndpoint { name: route });
            }
        }

        Ok(Self {
            metadata,
            endpoints,
            by_name,
            by_route,
        })
    }

    /// Parses a JSON discovery payload.
    ///
    /// ## Errors
    ///
    /// Returns a [`DescriptorError`] if the payload is not JSON or fails
    /// validation.
    pub fn from_json(payload: &str) -> Result<Self, DescriptorError> {
        let raw: wire::RawDescriptor = serde_json::from_str(payload)?;
        raw.into_descriptor(None)
    }

    /// Parses a JSON discovery payload from raw bytes.
    ///
    /// ## Errors
    ///
    /// See [`Descriptor::from_json`].
    pub fn from_slice(payload: &[u8]) -> Result<Self, DescriptorError> {
        let raw: wire::RawDescriptor = serde_json::from_slice(payload)?;
        raw.into_descriptor(None)
    }

    /// Parses a YAML document in the same shape as the JSON payload.
    ///
    /// ## Errors
    ///
    /// Returns a [`DescriptorError`] if the document is not YAML or fails
    /// validation.
    pub fn from_yaml(document: &str) -> Result<Self, DescriptorError> {
        let raw: wire::RawDescriptor = serde_yaml::from_str(document)?;
        raw.into_descriptor(None)
    }

    /// Parses a discovery payload, defaulting `baseUrl` to `fallback_base`.
    pub(crate) fn from_discovery(payload: &[u8], fallback_base: &Url) -> Result<Self, DescriptorError> {
        let raw: wire::RawDescriptor = serde_json::from_slice(payload)?;
        raw.into_descriptor(Some(fallback_base))
    }

    /// Looks up an endpoint by name, or by its `METHOD:/path` route key.
    pub fn get_endpoint(&self, name: &str) -> Option<&EndpointSpec> {
        self.by_name
            .get(name)
            .or_else(|| self.by_route.get(name))
            .map(|&index| &self.endpoints[index])
    }

    /// Returns all endpoints in declared order.
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// Returns the endpoint names in declared order.
    pub fn endpoint_names(&self) -> Vec<&str> {
        self.endpoints.iter().map(EndpointSpec::name).collect()
    }

    /// Returns the service metadata.
    pub fn metadata(&self) -> &BaseMetadata {
        &self.metadata
    }

    /// Returns the service name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns the base URL the service declared, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.metadata.base_url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;

    fn endpoint(name: &str, method: RestMethod, path: &str) -> EndpointSpec {
        EndpointSpec::builder()
            .name(name)
            .method(method)
            .path(path)
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_by_name_and_route() {
        let descriptor = Descriptor::new(
            "Shop",
            vec![
                endpoint("list_products", RestMethod::Get, "/products"),
                endpoint("create_product", RestMethod::Post, "/products"),
            ],
        )
        .unwrap();

        assert_eq!(
            descriptor.get_endpoint("create_product").unwrap().method(),
            RestMethod::Post
        );
        assert_eq!(
            descriptor.get_endpoint("GET:/products").unwrap().name(),
            "list_products"
        );
        assert!(descriptor.get_endpoint("delete_product").is_none());
    }

    #[test]
    fn test_names_keep_declared_order() {
        let descriptor = Descriptor::new(
            "Shop",
            vec![
                endpoint("zeta", RestMethod::Get, "/z"),
                endpoint("alpha", RestMethod::Get, "/a"),
            ],
        )
        .unwrap();
        assert_eq!(descriptor.endpoint_names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Descriptor::new(
            "Shop",
            vec![
                endpoint("products", RestMethod::Get, "/products"),
                endpoint("products", RestMethod::Post, "/products"),
            ],
        );
        assert!(matches!(
            result,
            Err(DescriptorError::DuplicateEndpoint { name }) if name == "products"
        ));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let result = Descriptor::new(
            "Shop",
            vec![
                endpoint("list_products", RestMethod::Get, "/products"),
                endpoint("all_products", RestMethod::Get, "/products"),
            ],
        );
        assert!(matches!(
            result,
            Err(DescriptorError::DuplicateEndpoint { name }) if name == "GET:/products"
        ));
    }

    #[test]
    fn test_empty_endpoints_rejected() {
        assert!(matches!(
            Descriptor::new("Shop", vec![]),
            Err(DescriptorError::NoEndpoints)
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = Descriptor::new("  ", vec![endpoint("ping", RestMethod::Get, "/ping")]);
        assert!(matches!(
            result,
            Err(DescriptorError::MissingField { field: "name" })
        ));
    }

    #[test]
    fn test_metadata_serializes_base_url_as_string() {
        let metadata = BaseMetadata {
            name: "Shop".to_string(),
            base_url: Some(Url::parse("https://shop.example.com/api").unwrap()),
            ..BaseMetadata::default()
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["name"], "Shop");
        assert_eq!(value["baseUrl"], "https://shop.example.com/api");
    }
}
