//! Credentials injected into every dispatched request.

use std::fmt;

use crate::transport::TransportRequest;

/// Header used for API keys when the descriptor does not name one.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// How a credential travels with a request.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ApiAuthMethod {
    /// `Authorization: Bearer <secret>`.
    BearerToken,
    /// The secret in the named header.
    ApiKey(String),
    /// API key passed as query parameter (e.g. `?key=<secret>`).
    QueryParam(String),
    /// Nothing is sent.
    None,
}

/// A secret plus the way it is attached.
///
/// The secret is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    method: ApiAuthMethod,
    secret: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(method: ApiAuthMethod, secret: impl Into<String>) -> Self {
        Self {
            method,
            secret: secret.into(),
        }
    }

    /// Bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(ApiAuthMethod::BearerToken, token)
    }

    /// API key in the `X-API-Key` header.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::new(ApiAuthMethod::ApiKey(DEFAULT_API_KEY_HEADER.to_string()), key)
    }

    /// Returns how the credential is attached.
    pub fn method(&self) -> &ApiAuthMethod {
        &self.method
    }

    /// Attaches the credential to a request.
    ///
    /// A header the caller already set explicitly is left alone.
    pub fn apply(&self, request: &mut TransportRequest) {
        match &self.method {
            ApiAuthMethod::BearerToken => {
                if request.header("authorization").is_none() {
                    request
                        .headers
                        .push(("Authorization".to_string(), format!("Bearer {}", self.secret)));
                }
            }
            ApiAuthMethod::ApiKey(header) => {
                if request.header(header).is_none() {
                    request.headers.push((header.clone(), self.secret.clone()));
                }
            }
            ApiAuthMethod::QueryParam(name) => {
                request.query.push((name.clone(), self.secret.clone()));
            }
            ApiAuthMethod::None => {}
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("method", &self.method)
            .field("secret", &"<redacted>")
            .finish()
    }
}
