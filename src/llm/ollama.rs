//! Ollama client.

use super::{
    GENERATE_CONTEXT, LlmHttpConfig, MODELS_CONTEXT, ModelEntry, build_http_client, filter_models,
};
use crate::settings::Connection;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Client for a single Ollama server.
///
/// Built fresh per action invocation from the current connection
/// settings; holds no cross-invocation state.
pub struct OllamaClient {
    /// Base URL, `http://{host}:{port}`.
    base_url: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Creates a client for the given connection with environment-derived
    /// HTTP timeouts.
    #[must_use]
    pub fn new(connection: &Connection) -> Self {
        Self::with_http_config(connection, LlmHttpConfig::from_env())
    }

    /// Creates a client with explicit HTTP timeouts.
    #[must_use]
    pub fn with_http_config(connection: &Connection, config: LlmHttpConfig) -> Self {
        Self {
            base_url: connection.base_url(),
            client: build_http_client(config),
        }
    }

    /// Checks if the server is reachable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Sends a generation request and returns the response text.
    ///
    /// A single attempt: transport errors, non-2xx statuses, and
    /// malformed bodies all fail the invocation with no retry.
    pub fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(request)
            .send()
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::error!(
                    model = %request.model,
                    error = %e,
                    error_kind = error_kind,
                    "Ollama generate request failed"
                );
                Error::upstream(GENERATE_CONTEXT, format!("{error_kind} error: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                model = %request.model,
                status = %status,
                body = %body,
                "Ollama generate returned error status"
            );
            return Err(Error::upstream(
                GENERATE_CONTEXT,
                format!("API returned status: {status} - {body}"),
            ));
        }

        let response: GenerateResponse = response.json().map_err(|e| {
            tracing::error!(
                model = %request.model,
                error = %e,
                "Failed to parse Ollama generate response"
            );
            Error::upstream(GENERATE_CONTEXT, e)
        })?;

        Ok(response.response)
    }

    /// Lists models matching the query.
    ///
    /// Queries the tags endpoint and filters case-insensitively by
    /// substring; an empty query returns everything in upstream order.
    pub fn list_models(&self, query: &str) -> Result<Vec<ModelEntry>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .map_err(|e| {
                tracing::error!(error = %e, "Ollama tags request failed");
                Error::upstream(MODELS_CONTEXT, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "Ollama tags returned error status");
            return Err(Error::upstream(
                MODELS_CONTEXT,
                format!("API returned status: {status}"),
            ));
        }

        let tags: TagsResponse = response.json().map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Ollama tags response");
            Error::upstream(MODELS_CONTEXT, e)
        })?;

        let entries = tags
            .models
            .into_iter()
            .map(|tag| ModelEntry::new(tag.model))
            .collect();
        Ok(filter_models(entries, query))
    }
}

/// Request body for the generate endpoint.
///
/// `stream` is always false; incremental token handling is not
/// implemented.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    model: String,
    prompt: String,
    system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    stream: bool,
}

impl GenerateRequest {
    /// Builds a text-only generation request.
    #[must_use]
    pub fn text(
        model: impl Into<String>,
        prompt: impl Into<String>,
        system: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: system.into(),
            images: None,
            stream: false,
        }
    }

    /// Builds a generation request carrying one base64-encoded image.
    #[must_use]
    pub fn with_image(
        model: impl Into<String>,
        prompt: impl Into<String>,
        system: impl Into<String>,
        image_base64: String,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: system.into(),
            images: Some(vec![image_base64]),
            stream: false,
        }
    }

    /// The model identifier this request targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Response body from the generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response body from the tags endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

/// One model entry in the tags listing.
#[derive(Debug, Deserialize)]
struct TagModel {
    model: String,
}
