//! Action definitions.
//!
//! Contains the JSON Schema definitions for all flow actions.

use super::ActionDefinition;

/// Defines the text generation action.
pub fn generate_response_action() -> ActionDefinition {
    ActionDefinition {
        name: "generate_response".to_string(),
        description: "Generate a text response from the configured Ollama server".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": ["object", "string"],
                    "description": "Model to use; autocomplete selections are {name, id} objects, a bare identifier string is also accepted",
                    "properties": {
                        "name": { "type": "string" },
                        "id": { "type": "string" }
                    }
                },
                "prompt": {
                    "type": "string",
                    "description": "The user prompt to send"
                }
            },
            "required": ["model", "prompt"]
        }),
    }
}

/// Defines the image generation action.
pub fn generate_response_image_action() -> ActionDefinition {
    ActionDefinition {
        name: "generate_response_image".to_string(),
        description: "Generate a response describing an attached image using a vision-capable model"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": ["object", "string"],
                    "description": "Vision-capable model; autocomplete selections are {name, id} objects",
                    "properties": {
                        "name": { "type": "string" },
                        "id": { "type": "string" }
                    }
                },
                "prompt": {
                    "type": "string",
                    "description": "The user prompt to send alongside the image"
                },
                "image": {
                    "description": "Image attachment; supplied by the engine as an opaque byte stream beside these arguments"
                }
            },
            "required": ["model", "prompt", "image"]
        }),
    }
}

/// Defines the system prompt update action.
pub fn set_system_prompt_action() -> ActionDefinition {
    ActionDefinition {
        name: "set_system_prompt".to_string(),
        description: "Persist a new default system prompt for generation actions".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "sysprompt": {
                    "type": "string",
                    "description": "The new system prompt; must not be empty"
                }
            },
            "required": ["sysprompt"]
        }),
    }
}
