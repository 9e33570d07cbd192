//! Action execution handlers.
//!
//! Each handler deserializes the engine's loosely-typed JSON arguments
//! into a typed struct, then delegates to the registry's typed methods.
//! Precondition failures surface before any network call or stream
//! read.

use super::{ActionRegistry, ModelArg};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

/// Arguments of the generation actions.
#[derive(Debug, Deserialize)]
struct GenerateArgs {
    /// Model selection from autocomplete, or a bare identifier.
    model: ModelArg,
    /// The user prompt.
    prompt: String,
}

/// Arguments of the system prompt update action.
#[derive(Debug, Deserialize)]
struct SetPromptArgs {
    /// The new system prompt.
    sysprompt: String,
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Executes the text generation action.
pub(super) fn execute_generate(registry: &ActionRegistry, arguments: Value) -> Result<Value> {
    let args: GenerateArgs = parse_args(arguments)?;
    let output = registry.generate_response(args.model.id(), &args.prompt)?;
    serde_json::to_value(output).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Executes the image generation action.
pub(super) fn execute_generate_image(
    registry: &ActionRegistry,
    arguments: Value,
    image: Option<&mut dyn Read>,
) -> Result<Value> {
    let args: GenerateArgs = parse_args(arguments)?;
    let output = registry.generate_response_image(args.model.id(), &args.prompt, image)?;
    serde_json::to_value(output).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Executes the system prompt update action.
pub(super) fn execute_set_system_prompt(
    registry: &ActionRegistry,
    arguments: Value,
) -> Result<Value> {
    let args: SetPromptArgs = parse_args(arguments)?;
    let ok = registry.set_system_prompt(&args.sysprompt)?;
    Ok(Value::Bool(ok))
}
