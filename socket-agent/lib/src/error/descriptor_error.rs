//! Descriptor validation errors.

use thiserror::Error;

/// Errors raised while building a [`Descriptor`](crate::Descriptor).
///
/// These are fatal for the descriptor being built: a descriptor either
/// validates completely or is not constructed at all.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The payload is not valid JSON.
    #[error("Descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is not valid YAML.
    #[error("Descriptor is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required top-level field is missing or empty.
    #[error("Descriptor missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The descriptor declares no endpoints.
    #[error("Descriptor has no endpoints")]
    NoEndpoints,

    /// Two endpoints resolve to the same name.
    #[error("Duplicate endpoint name: {name}")]
    DuplicateEndpoint {
        /// The duplicated name.
        name: String,
    },

    /// An endpoint declares an HTTP method outside GET/POST/PUT/PATCH/DELETE.
    #[error("Invalid HTTP method '{method}' for {path}")]
    InvalidMethod {
        /// The method as written in the descriptor.
        method: String,
        /// The endpoint path.
        path: String,
    },

    /// The path template is syntactically invalid.
    #[error("Invalid path template '{path}': {message}")]
    InvalidPathTemplate {
        /// The offending template.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// A `{placeholder}` has no matching path parameter.
    #[error("Endpoint {endpoint}: placeholder {{{placeholder}}} has no path parameter")]
    UndeclaredPlaceholder {
        /// The endpoint name.
        endpoint: String,
        /// The placeholder without a parameter.
        placeholder: String,
    },

    /// A path parameter does not appear in the template.
    #[error("Endpoint {endpoint}: path parameter '{parameter}' does not appear in the path")]
    UnusedPathParameter {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
    },

    /// A path parameter is marked optional.
    #[error("Endpoint {endpoint}: path parameter '{parameter}' must be required")]
    OptionalPathParameter {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
    },

    /// Two parameters share a name (possibly in different locations).
    #[error("Endpoint {endpoint}: parameter '{parameter}' is declared more than once")]
    AmbiguousParameter {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
    },

    /// A header parameter's name is not a legal HTTP header name.
    #[error("Endpoint {endpoint}: '{parameter}' is not a valid header name")]
    InvalidHeaderName {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
    },

    /// A parameter location is not path, query, body or header.
    #[error("Endpoint {endpoint}: unsupported parameter location '{location}' for '{parameter}'")]
    UnsupportedLocation {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
        /// The location as written in the descriptor.
        location: String,
    },

    /// A parameter type is not a JSON-schema primitive.
    #[error("Endpoint {endpoint}: unsupported type '{kind}' for parameter '{parameter}'")]
    UnsupportedType {
        /// The endpoint name.
        endpoint: String,
        /// The parameter name.
        parameter: String,
        /// The type as written in the descriptor.
        kind: String,
    },

    /// The declared base URL does not parse.
    #[error("Invalid baseUrl in descriptor: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl DescriptorError {
    /// Creates an invalid path template error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPathTemplate {
            path: path.into(),
            message: message.into(),
        }
    }
}
