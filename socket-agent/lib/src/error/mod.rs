//! Layered error types for the socket-agent client.
//!
//! The hierarchy follows the lifecycle of a call:
//! - [`DescriptorError`] - The descriptor payload is malformed or inconsistent
//! - [`DiscoveryError`] - Fetching the descriptor failed
//! - [`ResolutionError`] - A call could not be turned into a request (no I/O happened)
//! - [`TransportError`] - The request was built but the round trip failed
//! - [`ProjectionError`] - A tool schema dialect was not recognized
//! - [`ConfigError`] - Client construction or environment configuration failed
//!
//! [`SocketAgentError`] aggregates all of them.

mod agent_error;
mod config_error;
mod descriptor_error;
mod discovery_error;
mod projection_error;
mod resolution_error;
mod transport_error;

pub use agent_error::SocketAgentError;
pub use config_error::ConfigError;
pub use descriptor_error::DescriptorError;
pub use discovery_error::DiscoveryError;
pub use projection_error::ProjectionError;
pub use resolution_error::ResolutionError;
pub use transport_error::TransportError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SocketAgentError> = std::result::Result<T, E>;
