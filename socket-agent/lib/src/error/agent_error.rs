//! Top-level error type.

use super::{
    ConfigError, DescriptorError, DiscoveryError, ProjectionError, ResolutionError, TransportError,
};
use thiserror::Error;

/// Top-level error type for all client operations.
///
/// HTTP error statuses are never represented here: a 404 or a 500 is a
/// normal [`ApiResponse`](crate::ApiResponse) with `success == false`. Only
/// failures that happen before a response exists end up in this enum.
///
/// ## Examples
///
/// ```rust,ignore
/// use socket_agent::{ResolutionError, SocketAgentError};
///
/// match client.call("get_product", params).await {
///     Ok(response) => println!("{}", response.status_code()),
///     Err(SocketAgentError::Resolution(ResolutionError::MissingParameter { name, .. })) => {
///         eprintln!("forgot {name}");
///     }
///     Err(e) => eprintln!("call failed: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum SocketAgentError {
    /// The descriptor is malformed or internally inconsistent.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// The descriptor could not be fetched.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A call could not be resolved against the descriptor.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The HTTP round trip failed (network, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Tool schema projection failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An operation needed a descriptor but none has been discovered or installed.
    #[error("No descriptor available; call discover() or install_descriptor() first")]
    NotDiscovered,
}

impl SocketAgentError {
    /// Returns `true` if the error was raised before any network I/O.
    ///
    /// Resolution failures are caller-correctable and never reach the
    /// transport.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Resolution(_) | Self::NotDiscovered)
    }

    /// Returns `true` if this is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_resolution_error() {
        let err: SocketAgentError = ResolutionError::UnknownEndpoint {
            name: "nope".to_string(),
        }
        .into();
        assert!(matches!(err, SocketAgentError::Resolution(_)));
        assert!(err.is_preflight());
    }

    #[test]
    fn test_from_transport_error() {
        let err: SocketAgentError = TransportError::Timeout { duration_ms: 5000 }.into();
        assert!(matches!(err, SocketAgentError::Transport(_)));
        assert!(err.is_timeout());
        assert!(!err.is_preflight());
    }

    #[test]
    fn test_transparent_display() {
        let err: SocketAgentError = ProjectionError::UnsupportedFormat {
            format: "xml".to_string(),
        }
        .into();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_not_discovered_display() {
        let err = SocketAgentError::NotDiscovered;
        assert!(err.to_string().contains("discover()"));
    }
}
