//! Ollama client plumbing.
//!
//! Holds the HTTP client configuration shared by all requests and the
//! model-descriptor types used by the autocomplete action.

mod ollama;

pub use ollama::{GenerateRequest, OllamaClient};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Context prefix for generation failures.
pub(crate) const GENERATE_CONTEXT: &str = "Error generating response from Ollama";

/// Context prefix for model-listing failures.
pub(crate) const MODELS_CONTEXT: &str = "Error fetching models from Ollama";

/// A model known to the Ollama server.
///
/// Autocomplete entries carry the upstream model identifier in both
/// fields; the `id` is what reaches the wire in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Display name.
    pub name: String,
    /// Model identifier sent to the server.
    pub id: String,
}

impl ModelEntry {
    /// Builds an entry from an upstream model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: model.clone(),
            id: model,
        }
    }
}

/// Filters model entries to those whose name contains the query,
/// case-insensitively. An empty query matches everything; upstream
/// order is preserved.
#[must_use]
pub fn filter_models(mut entries: Vec<ModelEntry>, query: &str) -> Vec<ModelEntry> {
    let query = query.to_lowercase();
    entries.retain(|entry| entry.name.to_lowercase().contains(&query));
    entries
}

/// HTTP client configuration for Ollama requests.
#[derive(Debug, Clone, Copy)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("HEARTH_LLM_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("HEARTH_LLM_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.connect_timeout_ms = connect_timeout_ms;
            }
        }
        self
    }
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build Ollama HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<ModelEntry> {
        names.iter().map(|name| ModelEntry::new(*name)).collect()
    }

    #[test]
    fn test_model_entry_mirrors_identifier() {
        let entry = ModelEntry::new("llama3");
        assert_eq!(entry.name, "llama3");
        assert_eq!(entry.id, "llama3");
    }

    #[test]
    fn test_filter_models_substring() {
        let filtered = filter_models(entries(&["llama3", "llava", "mistral"]), "lla");
        assert_eq!(filtered, entries(&["llama3", "llava"]));
    }

    #[test]
    fn test_filter_models_case_insensitive() {
        let filtered = filter_models(entries(&["LLaVA", "mistral"]), "llava");
        assert_eq!(filtered, entries(&["LLaVA"]));

        let filtered = filter_models(entries(&["llava"]), "LLA");
        assert_eq!(filtered, entries(&["llava"]));
    }

    #[test]
    fn test_filter_models_empty_query_matches_all() {
        let all = entries(&["llama3", "llava", "mistral"]);
        assert_eq!(filter_models(all.clone(), ""), all);
    }

    #[test]
    fn test_filter_models_preserves_order() {
        let filtered = filter_models(entries(&["b-model", "a-model", "c-model"]), "model");
        assert_eq!(filtered, entries(&["b-model", "a-model", "c-model"]));
    }

    #[test]
    fn test_http_config_defaults() {
        let config = LlmHttpConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }
}
