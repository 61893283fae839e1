//! HTTP transport errors.

use thiserror::Error;

/// Errors from the transport layer.
///
/// These represent a round trip that did not produce an HTTP response at
/// all. A response with an error status is not a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed due to a network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },

    /// Failed to establish a connection to the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request could not be built (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns `true` if this error is retryable.
    ///
    /// Timeout and connection errors are typically retryable; a request
    /// that could not even be built is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection(_) => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::InvalidRequest(_) => false,
        }
    }

    /// Returns `true` if the round trip timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}
