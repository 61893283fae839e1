//! Descriptor discovery errors.

use thiserror::Error;

use super::{DescriptorError, TransportError};

/// Errors fetching a descriptor from `/.well-known/socket-agent`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The base URL cannot be used for discovery.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service answered 404 on the well-known path.
    #[error("No socket-agent descriptor found at {url}")]
    NotFound {
        /// The descriptor URL that was requested.
        url: String,
    },

    /// The service answered with another non-success status.
    #[error("HTTP {status} when fetching descriptor from {url}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The descriptor URL that was requested.
        url: String,
    },

    /// The round trip itself failed.
    #[error("Failed to fetch descriptor: {0}")]
    Transport(#[from] TransportError),

    /// The payload was fetched but is not a valid descriptor.
    #[error("Invalid descriptor: {0}")]
    Invalid(#[from] DescriptorError),
}
