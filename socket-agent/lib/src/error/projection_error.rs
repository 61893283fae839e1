//! Tool schema projection errors.

use thiserror::Error;

/// Errors projecting a descriptor into LLM tool schemas.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The requested tool dialect is not supported.
    #[error("Unsupported tool format: {format} (expected openai, anthropic or generic)")]
    UnsupportedFormat {
        /// The format that was requested.
        format: String,
    },
}
