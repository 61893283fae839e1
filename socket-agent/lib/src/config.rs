//! Client configuration from values or the process environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_API_KEY_HEADER;
use crate::dispatch::UnknownParameterPolicy;
use crate::error::ConfigError;

/// Service base URL.
pub const ENV_URL: &str = "SOCKET_AGENT_URL";
/// Bearer token.
pub const ENV_TOKEN: &str = "SOCKET_AGENT_TOKEN";
/// API key.
pub const ENV_API_KEY: &str = "SOCKET_AGENT_API_KEY";
/// Header carrying the API key.
pub const ENV_API_KEY_HEADER: &str = "SOCKET_AGENT_API_KEY_HEADER";
/// Timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "SOCKET_AGENT_TIMEOUT_SECS";
/// `true`/`false`: reject undeclared parameters.
pub const ENV_STRICT: &str = "SOCKET_AGENT_STRICT";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

/// Plain configuration for a client.
///
/// Deserializable so it can live in a config file; see
/// [`ClientBuilder::from_config`](crate::ClientBuilder::from_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service.
    pub base_url: Option<String>,
    /// Bearer token sent as `Authorization: Bearer ...`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// API key.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Header carrying the API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// What to do with undeclared parameters.
    #[serde(default)]
    pub unknown_parameters: UnknownParameterPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            api_key: None,
            api_key_header: default_api_key_header(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            unknown_parameters: UnknownParameterPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Reads configuration from `SOCKET_AGENT_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a timeout or strictness value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary lookup function.
    ///
    /// ## Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self {
            base_url: get(ENV_URL),
            token: get(ENV_TOKEN),
            api_key: get(ENV_API_KEY),
            ..Self::default()
        };

        if let Some(header) = get(ENV_API_KEY_HEADER) {
            config.api_key_header = header;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_SECS,
                message: format!("expected whole seconds, got '{secs}'"),
            })?;
        }
        if let Some(strict) = get(ENV_STRICT) {
            config.unknown_parameters = if parse_bool(ENV_STRICT, &strict)? {
                UnknownParameterPolicy::Reject
            } else {
                UnknownParameterPolicy::Ignore
            };
        }
        Ok(config)
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            message: format!("expected true or false, got '{value}'"),
        }),
    }
}
