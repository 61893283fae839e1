//! Wire format of the socket-agent descriptor document.
//!
//! The raw types mirror the JSON served at `/.well-known/socket-agent`
//! (OpenAPI-flavoured: `parameters[].in`, `requestBody.content`). They are
//! converted into the validated model and then discarded.

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::endpoint::EndpointSpec;
use super::parameter::{ParamType, ParameterLocation, ParameterSpec};
use super::{AuthHint, BaseMetadata, Descriptor};
use crate::error::DescriptorError;
use crate::method::RestMethod;

pub(super) const DEFAULT_VERSION: &str = "1.0.0";
pub(super) const DEFAULT_SPEC_VERSION: &str = "2025-01-01";

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    spec_version: Option<String>,
    #[serde(default)]
    auth: Option<AuthHint>,
    #[serde(default)]
    endpoints: Vec<RawEndpoint>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpoint {
    path: String,
    method: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    #[serde(default)]
    request_body: Option<RawRequestBody>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "in")]
    location: String,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    schema: Option<RawSchema>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSchema {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    required: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRequestBody {
    #[serde(default)]
    content: Map<String, Value>,
}

impl RawDescriptor {
    /// Validates and converts into a [`Descriptor`].
    pub(super) fn into_descriptor(self, fallback_base: Option<&Url>) -> Result<Descriptor, DescriptorError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(DescriptorError::MissingField { field: "name" })?;
        if self.endpoints.is_empty() {
            return Err(DescriptorError::NoEndpoints);
        }

        let base_url = match self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Some(Url::parse(url)?),
            None => fallback_base.cloned(),
        };

        let endpoints = self
            .endpoints
            .into_iter()
            .map(RawEndpoint::into_spec)
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = BaseMetadata {
            name,
            description: self.description.unwrap_or_default(),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            spec_version: self
                .spec_version
                .unwrap_or_else(|| DEFAULT_SPEC_VERSION.to_string()),
            base_url,
            auth: self.auth.unwrap_or_default(),
            extra: self.extra,
        };

        Descriptor::with_metadata(metadata, endpoints)
    }
}

impl RawEndpoint {
    fn into_spec(self) -> Result<EndpointSpec, DescriptorError> {
        let method: RestMethod =
            self.method
                .parse()
                .map_err(|_| DescriptorError::InvalidMethod {
                    method: self.method.clone(),
                    path: self.path.clone(),
                })?;

        let name = match self.operation_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => generated_name(method, &self.path),
        };

        let mut params = Vec::with_capacity(self.parameters.len());
        for raw in self.parameters {
            params.push(raw.into_spec(&name)?);
        }
        if let Some(body) = self.request_body {
            params.extend(body.into_specs(&name)?);
        }

        let mut builder = EndpointSpec::builder()
            .name(name)
            .method(method)
            .path(self.path)
            .params(params);
        if let Some(summary) = self.summary {
            builder = builder.summary(summary);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        for tag in self.tags {
            builder = builder.tag(tag);
        }
        builder.build()
    }
}

impl RawParameter {
    fn into_spec(self, endpoint: &str) -> Result<ParameterSpec, DescriptorError> {
        let location: ParameterLocation =
            self.location
                .parse()
                .map_err(|_| DescriptorError::UnsupportedLocation {
                    endpoint: endpoint.to_string(),
                    parameter: self.name.clone(),
                    location: self.location.clone(),
                })?;
        if location == ParameterLocation::Body {
            // OpenAPI has no `in: body`; bodies come from `requestBody`.
            return Err(DescriptorError::UnsupportedLocation {
                endpoint: endpoint.to_string(),
                parameter: self.name,
                location: self.location,
            });
        }

        let schema = self.schema.unwrap_or_default();
        let kind = parse_type(endpoint, &self.name, schema.kind.as_deref())?;
        let required = self
            .required
            .unwrap_or(location == ParameterLocation::Path);

        Ok(ParameterSpec {
            kind,
            location,
            required,
            description: self.description.or(schema.description),
            items: schema.items,
            name: self.name,
        })
    }
}

impl RawRequestBody {
    /// Flattens the JSON body schema's properties into body parameters.
    fn into_specs(mut self, endpoint: &str) -> Result<Vec<ParameterSpec>, DescriptorError> {
        let Some(media) = self.content.remove(JSON_CONTENT_TYPE) else {
            return Ok(Vec::new());
        };
        let Some(schema) = media.get("schema").cloned() else {
            return Ok(Vec::new());
        };
        let schema: RawSchema = serde_json::from_value(schema)?;
        let Some(properties) = schema.properties else {
            return Ok(Vec::new());
        };

        properties
            .into_iter()
            .map(|(name, property)| -> Result<ParameterSpec, DescriptorError> {
                let property: RawSchema = serde_json::from_value(property)?;
                let kind = parse_type(endpoint, &name, property.kind.as_deref())?;
                Ok(ParameterSpec {
                    kind,
                    location: ParameterLocation::Body,
                    required: schema.required.contains(&name),
                    description: property.description,
                    items: property.items,
                    name,
                })
            })
            .collect()
    }
}

fn parse_type(endpoint: &str, parameter: &str, kind: Option<&str>) -> Result<ParamType, DescriptorError> {
    match kind {
        None => Ok(ParamType::String),
        Some(kind) => kind.parse().map_err(|_| DescriptorError::UnsupportedType {
            endpoint: endpoint.to_string(),
            parameter: parameter.to_string(),
            kind: kind.to_string(),
        }),
    }
}

/// Derives an endpoint name from method and path when no `operationId` is given.
///
/// `GET /products` becomes `list_products`, `GET /products/{id}` becomes
/// `get_products`, `POST /orders/items` becomes `create_orders_items`.
pub(super) fn generated_name(method: RestMethod, path: &str) -> String {
    let prefix = method.name_prefix(path.contains('{'));
    let parts: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|part| !part.is_empty() && !(part.starts_with('{') && part.ends_with('}')))
        .collect();

    if parts.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}_{}", parts.join("_"))
    }
}
