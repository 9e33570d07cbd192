//! # Hearth
//!
//! Exposes a local Ollama server as callable actions for a
//! home-automation flow engine.
//!
//! Hearth is a thin bridge: it reads connection settings from a
//! key/value store, issues generation and model-listing requests to a
//! single Ollama instance, and shapes the responses into the payloads a
//! flow engine expects. There is no queuing, no caching, and no retry;
//! every invocation is a single linear attempt.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hearth::actions::ActionRegistry;
//! use hearth::settings::{MemoryStore, Settings};
//! use serde_json::json;
//!
//! let registry = ActionRegistry::new(Settings::new(MemoryStore::new()));
//! let result = registry.execute(
//!     "generate_response",
//!     json!({"model": {"name": "llama3", "id": "llama3"}, "prompt": "Turn on the lights"}),
//! )?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod actions;
pub mod image;
pub mod llm;
pub mod observability;
pub mod settings;

// Re-exports for convenience
pub use actions::{ActionDefinition, ActionRegistry, GenerationOutput};
pub use llm::{LlmHttpConfig, ModelEntry, OllamaClient};
pub use settings::{Connection, FileStore, MemoryStore, Settings, SettingsStore};

/// Error type for hearth operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait
/// implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Configuration` | Host, port, or system prompt missing or invalid in settings |
/// | `InvalidInput` | Missing or malformed action arguments |
/// | `Upstream` | Network failure, non-2xx status, or malformed Ollama response |
/// | `ImageRead` | Stream error while draining an attached image |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Settings are missing or invalid.
    ///
    /// Raised when:
    /// - The server host or port is not set
    /// - A stored port lies outside [1,65535]
    /// - No system prompt is available for a generation call
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Required action arguments are missing (e.g., no image handle)
    /// - JSON deserialization of action arguments fails
    /// - An empty system prompt is submitted for persistence
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The Ollama server could not be reached or answered badly.
    ///
    /// Raised when:
    /// - The HTTP transport fails (connect, timeout, request)
    /// - The server returns a non-2xx status
    /// - The response body cannot be decoded
    ///
    /// The context names the call site ("Error generating response from
    /// Ollama", "Error fetching models from Ollama") and the cause
    /// carries the underlying error message.
    #[error("{context}: {cause}")]
    Upstream {
        /// Call-site-specific description.
        context: String,
        /// The underlying cause.
        cause: String,
    },

    /// An attached image stream failed before completion.
    #[error("image read failed: {0}")]
    ImageRead(String),
}

impl Error {
    /// Builds an [`Error::Upstream`] from a context prefix and a cause.
    pub(crate) fn upstream(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::Upstream {
            context: context.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for hearth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("Ollama IP or port not set in settings".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: Ollama IP or port not set in settings"
        );

        let err = Error::InvalidInput("image required".to_string());
        assert_eq!(err.to_string(), "invalid input: image required");

        let err = Error::upstream("Error generating response from Ollama", "connect error");
        assert_eq!(
            err.to_string(),
            "Error generating response from Ollama: connect error"
        );

        let err = Error::ImageRead("unexpected end of stream".to_string());
        assert_eq!(
            err.to_string(),
            "image read failed: unexpected end of stream"
        );
    }
}
