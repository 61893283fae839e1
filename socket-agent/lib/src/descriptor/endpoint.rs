//! Endpoint definition with type-state builder pattern.
//!
//! An [`EndpointSpec`] is one callable operation of a descriptor: a name, an
//! HTTP method, a path template and an ordered list of parameters. The
//! [`EndpointBuilder`] tracks the three required fields in its type so that
//! `build()` only exists once they are set; `build()` then validates the
//! template against the declared parameters.

use std::collections::{HashMap, HashSet};

use reqwest::header::HeaderName;
use serde::Serialize;

use super::parameter::{ParameterLocation, ParameterSpec};
use crate::error::DescriptorError;
use crate::method::RestMethod;

/// Marker for a builder field that has not been set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Missing;

/// A piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Placeholder(String),
}

/// Splits a path template into literal and `{placeholder}` segments.
fn parse_template(path: &str) -> Result<Vec<PathSegment>, DescriptorError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut placeholder: Option<String> = None;

    for c in path.chars() {
        match (c, placeholder.as_mut()) {
            ('{', None) => {
                if !literal.is_empty() {
                    segments.push(PathSegment::Literal(std::mem::take(&mut literal)));
                }
                placeholder = Some(String::new());
            }
            ('{', Some(_)) => return Err(DescriptorError::invalid_path(path, "nested '{'")),
            ('}', None) => return Err(DescriptorError::invalid_path(path, "unmatched '}'")),
            ('}', Some(name)) => {
                if name.trim().is_empty() {
                    return Err(DescriptorError::invalid_path(path, "empty placeholder"));
                }
                segments.push(PathSegment::Placeholder(std::mem::take(name)));
                placeholder = None;
            }
            (c, Some(name)) => name.push(c),
            (c, None) => literal.push(c),
        }
    }

    if placeholder.is_some() {
        return Err(DescriptorError::invalid_path(path, "unclosed '{'"));
    }
    if !literal.is_empty() {
        segments.push(PathSegment::Literal(literal));
    }
    Ok(segments)
}

/// A callable endpoint of a descriptor.
///
/// Endpoints are immutable once built; all fields are exposed through
/// accessors only.
///
/// ## Examples
///
/// ```
/// use socket_agent::{EndpointSpec, ParameterSpec, RestMethod};
///
/// let endpoint = EndpointSpec::builder()
///     .name("get_product")
///     .method(RestMethod::Get)
///     .path("/products/{id}")
///     .param(ParameterSpec::path("id"))
///     .summary("Get a product")
///     .build()
///     .unwrap();
///
/// assert_eq!(endpoint.placeholders(), vec!["id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSpec {
    name: String,
    method: RestMethod,
    path: String,
    parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip)]
    segments: Vec<PathSegment>,
}

impl EndpointSpec {
    /// Creates a new endpoint builder.
    pub fn builder() -> EndpointBuilder<Missing, Missing, Missing> {
        EndpointBuilder::new()
    }

    /// Returns the endpoint's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parameters in declared order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns the short summary, if any.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the long description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the grouping tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Lookup key of the form `METHOD:/path/template`.
    pub fn route_key(&self) -> String {
        format!("{}:{}", self.method, self.path)
    }

    /// Extracts placeholder names from the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Placeholder(name) => Some(name.as_str()),
                PathSegment::Literal(_) => None,
            })
            .collect()
    }

    /// Fills the template with already-encoded values.
    ///
    /// Placeholders without a value are left as written.
    pub fn render_path(&self, values: &HashMap<&str, String>) -> String {
        let mut path = String::with_capacity(self.path.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(text) => path.push_str(text),
                PathSegment::Placeholder(name) => match values.get(name.as_str()) {
                    Some(value) => path.push_str(value),
                    None => {
                        path.push('{');
                        path.push_str(name);
                        path.push('}');
                    }
                },
            }
        }
        path
    }

    /// Checks the template against the declared parameters.
    fn validate(&self) -> Result<(), DescriptorError> {
        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(DescriptorError::AmbiguousParameter {
                    endpoint: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
            if param.location == ParameterLocation::Header
                && HeaderName::from_bytes(param.name.as_bytes()).is_err()
            {
                return Err(DescriptorError::InvalidHeaderName {
                    endpoint: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }

        let placeholders: HashSet<&str> = self.placeholders().into_iter().collect();
        for placeholder in &placeholders {
            let declared = self
                .parameter(placeholder)
                .is_some_and(|p| p.location == ParameterLocation::Path);
            if !declared {
                return Err(DescriptorError::UndeclaredPlaceholder {
                    endpoint: self.name.clone(),
                    placeholder: (*placeholder).to_string(),
                });
            }
        }

        for param in self
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
        {
            if !placeholders.contains(param.name.as_str()) {
                return Err(DescriptorError::UnusedPathParameter {
                    endpoint: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
            if !param.required {
                return Err(DescriptorError::OptionalPathParameter {
                    endpoint: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Type-state builder for [`EndpointSpec`].
///
/// The `N`, `M` and `P` parameters are either [`Missing`] or the value type of
/// the name, method and path fields respectively.
#[derive(Debug, Clone)]
pub struct EndpointBuilder<N, M, P> {
    name: N,
    method: M,
    path: P,
    parameters: Vec<ParameterSpec>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl EndpointBuilder<Missing, Missing, Missing> {
    /// Creates a new endpoint builder with no fields set.
    pub fn new() -> Self {
        Self {
            name: Missing,
            method: Missing,
            path: Missing,
            parameters: Vec::new(),
            summary: None,
            description: None,
            tags: Vec::new(),
        }
    }
}

impl Default for EndpointBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, P> EndpointBuilder<Missing, M, P> {
    /// Sets the endpoint name.
    pub fn name(self, name: impl Into<String>) -> EndpointBuilder<String, M, P> {
        EndpointBuilder {
            name: name.into(),
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
        }
    }
}

impl<N, P> EndpointBuilder<N, Missing, P> {
    /// Sets the HTTP method.
    pub fn method(self, method: RestMethod) -> EndpointBuilder<N, RestMethod, P> {
        EndpointBuilder {
            name: self.name,
            method,
            path: self.path,
            parameters: self.parameters,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
        }
    }
}

impl<N, M> EndpointBuilder<N, M, Missing> {
    /// Sets the URL path template.
    ///
    /// The path may contain placeholders like `{id}`; each needs a matching
    /// path parameter by the time `build()` is called.
    pub fn path(self, path: impl Into<String>) -> EndpointBuilder<N, M, String> {
        EndpointBuilder {
            name: self.name,
            method: self.method,
            path: path.into(),
            parameters: self.parameters,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
        }
    }
}

impl<N, M, P> EndpointBuilder<N, M, P> {
    /// Appends a parameter.
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Appends several parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(params);
        self
    }

    /// Sets the short summary (used as tool description).
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the long description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a grouping tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl EndpointBuilder<String, RestMethod, String> {
    /// Builds and validates the endpoint.
    ///
    /// ## Errors
    ///
    /// Returns a [`DescriptorError`] if the template is malformed, a
    /// placeholder has no path parameter (or vice versa), a path parameter
    /// is optional, or two parameters share a name.
    pub fn build(self) -> Result<EndpointSpec, DescriptorError> {
        let segments = parse_template(&self.path)?;
        let endpoint = EndpointSpec {
            name: self.name,
            method: self.method,
            path: self.path,
            parameters: self.parameters,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            segments,
        };
        endpoint.validate()?;
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_user_posts() -> EndpointSpec {
        EndpointSpec::builder()
            .name("get_user_posts")
            .method(RestMethod::Get)
            .path("/users/{user_id}/posts/{post_id}")
            .param(ParameterSpec::path("user_id"))
            .param(ParameterSpec::path("post_id"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_basic() {
        let endpoint = EndpointSpec::builder()
            .name("list_products")
            .method(RestMethod::Get)
            .path("/products")
            .build()
            .unwrap();

        assert_eq!(endpoint.name(), "list_products");
        assert_eq!(endpoint.method(), RestMethod::Get);
        assert_eq!(endpoint.path(), "/products");
        assert_eq!(endpoint.summary(), None);
        assert!(endpoint.parameters().is_empty());
    }

    #[test]
    fn test_builder_order_independence() {
        let endpoint = EndpointSpec::builder()
            .path("/products")
            .summary("Create a product")
            .method(RestMethod::Post)
            .param(ParameterSpec::body("name"))
            .name("create_product")
            .build()
            .unwrap();

        assert_eq!(endpoint.name(), "create_product");
        assert_eq!(endpoint.summary(), Some("Create a product"));
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(get_user_posts().placeholders(), vec!["user_id", "post_id"]);
    }

    #[test]
    fn test_render_path() {
        let endpoint = get_user_posts();
        let values = HashMap::from([("user_id", "7".to_string()), ("post_id", "42".to_string())]);
        assert_eq!(endpoint.render_path(&values), "/users/7/posts/42");
    }

    #[test]
    fn test_render_path_leaves_unfilled_placeholder() {
        let endpoint = get_user_posts();
        let values = HashMap::from([("user_id", "7".to_string())]);
        assert_eq!(endpoint.render_path(&values), "/users/7/posts/{post_id}");
    }

    #[test]
    fn test_route_key() {
        assert_eq!(
            get_user_posts().route_key(),
            "GET:/users/{user_id}/posts/{post_id}"
        );
    }

    #[test]
    fn test_undeclared_placeholder_fails() {
        let result = EndpointSpec::builder()
            .name("get_product")
            .method(RestMethod::Get)
            .path("/products/{id}")
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::UndeclaredPlaceholder { placeholder, .. }) if placeholder == "id"
        ));
    }

    #[test]
    fn test_placeholder_declared_in_wrong_location_fails() {
        let result = EndpointSpec::builder()
            .name("get_product")
            .method(RestMethod::Get)
            .path("/products/{id}")
            .param(ParameterSpec::query("id").required())
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::UndeclaredPlaceholder { .. })
        ));
    }

    #[test]
    fn test_unused_path_parameter_fails() {
        let result = EndpointSpec::builder()
            .name("list_products")
            .method(RestMethod::Get)
            .path("/products")
            .param(ParameterSpec::path("id"))
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::UnusedPathParameter { parameter, .. }) if parameter == "id"
        ));
    }

    #[test]
    fn test_optional_path_parameter_fails() {
        let result = EndpointSpec::builder()
            .name("get_product")
            .method(RestMethod::Get)
            .path("/products/{id}")
            .param(ParameterSpec::path("id").optional())
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::OptionalPathParameter { .. })
        ));
    }

    #[test]
    fn test_same_name_in_two_locations_is_ambiguous() {
        let result = EndpointSpec::builder()
            .name("get_product")
            .method(RestMethod::Get)
            .path("/products/{id}")
            .param(ParameterSpec::path("id"))
            .param(ParameterSpec::query("id"))
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::AmbiguousParameter { parameter, .. }) if parameter == "id"
        ));
    }

    #[test]
    fn test_invalid_header_name_fails() {
        let result = EndpointSpec::builder()
            .name("create_order")
            .method(RestMethod::Post)
            .path("/orders")
            .param(ParameterSpec::header("X Tenant"))
            .build();

        assert!(matches!(
            result,
            Err(DescriptorError::InvalidHeaderName { parameter, .. }) if parameter == "X Tenant"
        ));

        let result = EndpointSpec::builder()
            .name("create_order")
            .method(RestMethod::Post)
            .path("/orders")
            .param(ParameterSpec::header("X-Tenant"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_malformed_templates() {
        for path in ["/users/{id", "/users/id}", "/users/{}", "/users/{a{b}}"] {
            let result = EndpointSpec::builder()
                .name("bad")
                .method(RestMethod::Get)
                .path(path)
                .build();
            assert!(
                matches!(result, Err(DescriptorError::InvalidPathTemplate { .. })),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_repeated_placeholder_is_allowed() {
        let endpoint = EndpointSpec::builder()
            .name("mirror")
            .method(RestMethod::Get)
            .path("/{id}/copy/{id}")
            .param(ParameterSpec::path("id"))
            .build()
            .unwrap();

        let values = HashMap::from([("id", "x".to_string())]);
        assert_eq!(endpoint.render_path(&values), "/x/copy/x");
    }
}
