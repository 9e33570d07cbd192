//! Flow actions.
//!
//! The engine-facing adapter: each action is a named operation with
//! JSON arguments and a JSON result, matching the host automation
//! engine's calling convention.
//!
//! # Module Structure
//!
//! - [`definitions`]: Action schema definitions (JSON Schema for input validation)
//! - `handlers`: Action execution logic
//!
//! The image attachment for `generate_response_image` is not JSON; it
//! travels beside the arguments as an opaque byte stream and is checked
//! for presence before any read.

mod definitions;
mod handlers;

use crate::llm::{GenerateRequest, LlmHttpConfig, ModelEntry, OllamaClient};
use crate::settings::Settings;
use crate::{Error, Result, image};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

/// Result payload of a generation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The generated text.
    pub response: String,
}

/// Registry of flow actions.
pub struct ActionRegistry {
    /// Settings accessor, read fresh on every invocation.
    settings: Settings,
    /// HTTP timeouts applied to every client built per call.
    http: LlmHttpConfig,
    /// Available actions.
    actions: HashMap<String, ActionDefinition>,
}

impl ActionRegistry {
    /// Creates a registry with environment-derived HTTP timeouts.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_http_config(settings, LlmHttpConfig::from_env())
    }

    /// Creates a registry with explicit HTTP timeouts.
    #[must_use]
    pub fn with_http_config(settings: Settings, http: LlmHttpConfig) -> Self {
        let mut actions = HashMap::new();
        actions.insert(
            "generate_response".to_string(),
            definitions::generate_response_action(),
        );
        actions.insert(
            "generate_response_image".to_string(),
            definitions::generate_response_image_action(),
        );
        actions.insert(
            "set_system_prompt".to_string(),
            definitions::set_system_prompt_action(),
        );

        Self {
            settings,
            http,
            actions,
        }
    }

    /// Returns all action definitions.
    #[must_use]
    pub fn list_actions(&self) -> Vec<&ActionDefinition> {
        self.actions.values().collect()
    }

    /// Gets an action definition by name.
    #[must_use]
    pub fn get_action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    /// Executes an action with the given arguments.
    ///
    /// `generate_response_image` dispatched through this entry point
    /// carries no attachment and fails its image-presence check; use
    /// [`Self::execute_with_image`] for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is unknown or its execution fails.
    pub fn execute(&self, name: &str, arguments: Value) -> Result<Value> {
        match name {
            "generate_response" => handlers::execute_generate(self, arguments),
            "generate_response_image" => handlers::execute_generate_image(self, arguments, None),
            "set_system_prompt" => handlers::execute_set_system_prompt(self, arguments),
            _ => Err(Error::InvalidInput(format!("Unknown action: {name}"))),
        }
    }

    /// Executes an action that carries an image attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is unknown or its execution fails.
    pub fn execute_with_image(
        &self,
        name: &str,
        arguments: Value,
        image: Option<&mut dyn Read>,
    ) -> Result<Value> {
        match name {
            "generate_response_image" => handlers::execute_generate_image(self, arguments, image),
            _ => Err(Error::InvalidInput(format!(
                "Unknown image action: {name}"
            ))),
        }
    }

    /// Autocomplete lookup for the model argument.
    ///
    /// Queries the server's model listing and filters it by the partial
    /// query the user has typed so far. An unset connection surfaces as
    /// an upstream failure with the cause embedded, like any other
    /// listing failure.
    pub fn autocomplete_models(&self, query: &str) -> Result<Vec<ModelEntry>> {
        let connection = self
            .settings
            .connection()
            .map_err(|e| Error::upstream(crate::llm::MODELS_CONTEXT, e))?;
        let client = OllamaClient::with_http_config(&connection, self.http);
        client.list_models(query)
    }

    /// Runs a text-only generation.
    ///
    /// Fails fast with [`Error::Configuration`] before any network call
    /// when the connection or system prompt is unset.
    pub fn generate_response(&self, model: &str, prompt: &str) -> Result<GenerationOutput> {
        let connection = self.settings.connection()?;
        let system = self.settings.require_system_prompt()?;
        let client = OllamaClient::with_http_config(&connection, self.http);
        let request = GenerateRequest::text(model, prompt, system);
        let response = client.generate(&request)?;
        Ok(GenerationOutput { response })
    }

    /// Runs a generation with an attached image.
    ///
    /// Precondition order matches the action contract: connection and
    /// system prompt first, image presence next, then the stream is
    /// drained and the request sent.
    pub fn generate_response_image(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&mut dyn Read>,
    ) -> Result<GenerationOutput> {
        let connection = self.settings.connection()?;
        let system = self.settings.require_system_prompt()?;
        let image = image.ok_or_else(|| Error::InvalidInput("image required".to_string()))?;
        let encoded = image::encode_image(image)?;
        let client = OllamaClient::with_http_config(&connection, self.http);
        let request = GenerateRequest::with_image(model, prompt, system, encoded);
        let response = client.generate(&request)?;
        Ok(GenerationOutput { response })
    }

    /// Persists a new default system prompt.
    ///
    /// Returns `true` on success, per the action's boolean contract.
    pub fn set_system_prompt(&self, prompt: &str) -> Result<bool> {
        self.settings.set_system_prompt(prompt)?;
        Ok(true)
    }

    /// The settings accessor backing this registry.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The HTTP timeouts applied to clients built per call.
    #[must_use]
    pub const fn http_config(&self) -> LlmHttpConfig {
        self.http
    }
}

/// Definition of a flow action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Action name.
    pub name: String,
    /// Action description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// The model argument of a generation action.
///
/// The engine's autocomplete hands back `{name, id}` objects; a bare
/// string is accepted for direct callers. The `id` is what reaches the
/// wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ModelArg {
    /// An autocomplete selection.
    Entry(ModelEntry),
    /// A raw model identifier.
    Name(String),
}

impl ModelArg {
    pub(crate) fn id(&self) -> &str {
        match self {
            Self::Entry(entry) => &entry.id,
            Self::Name(name) => name,
        }
    }
}
