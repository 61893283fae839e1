//! Call resolution errors.

use thiserror::Error;

/// Errors turning a call (endpoint name + parameters) into a request.
///
/// Every variant is raised before any network I/O, so a failed resolution
/// never leaves a partial request on the wire.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The descriptor has no endpoint with this name.
    #[error("Unknown endpoint: {name}")]
    UnknownEndpoint {
        /// The name that was looked up.
        name: String,
    },

    /// A required parameter was not supplied.
    #[error("Missing required parameter '{name}' for {endpoint}")]
    MissingParameter {
        /// The endpoint being called.
        endpoint: String,
        /// The missing parameter.
        name: String,
    },

    /// Parameters were supplied that the endpoint does not declare.
    #[error("Unexpected parameter(s) for {endpoint}: {}", names.join(", "))]
    UnexpectedParameter {
        /// The endpoint being called.
        endpoint: String,
        /// The undeclared keys, sorted.
        names: Vec<String>,
    },

    /// A parameter value cannot be rendered for its location.
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ResolutionError {
    /// Returns the offending parameter name(s), if the error is about parameters.
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            Self::UnknownEndpoint { .. } => Vec::new(),
            Self::MissingParameter { name, .. } | Self::InvalidParameter { name, .. } => {
                vec![name.as_str()]
            }
            Self::UnexpectedParameter { names, .. } => names.iter().map(String::as_str).collect(),
        }
    }
}
