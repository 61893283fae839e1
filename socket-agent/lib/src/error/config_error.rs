//! Client configuration errors.

use thiserror::Error;

/// Errors in client configuration.
///
/// These occur while building a client, typically indicating a programmer
/// error or a bad environment variable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A required configuration field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader {
        /// The header name.
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {var}: {message}")]
    InvalidEnv {
        /// The environment variable.
        var: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ConfigError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let err = ConfigError::missing_field("base_url");
        assert_eq!(err.to_string(), "Missing required field: base_url");
    }

    #[test]
    fn test_invalid_url() {
        let url_err = url::Url::parse("not-a-url").unwrap_err();
        let err = ConfigError::InvalidUrl(url_err);
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_invalid_env() {
        let err = ConfigError::InvalidEnv {
            var: "SOCKET_AGENT_TIMEOUT_SECS",
            message: "expected seconds, got 'soon'".to_string(),
        };
        assert!(err.to_string().starts_with("Invalid value for SOCKET_AGENT_TIMEOUT_SECS"));
    }
}
