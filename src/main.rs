//! Binary entry point for hearth.
//!
//! This binary drives the same flow actions the automation engine
//! invokes, from the command line.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print output in the main binary for CLI results
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]

use clap::{Parser, Subcommand};
use hearth::settings::DEFAULT_SYSTEM_PROMPT;
use hearth::{ActionRegistry, FileStore, OllamaClient, Settings, observability};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

/// Hearth - expose a local Ollama server as flow actions.
#[derive(Parser)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the settings file.
    #[arg(short, long, global = true, env = "HEARTH_SETTINGS")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a text response.
    Generate {
        /// The prompt to send.
        prompt: String,

        /// Model to use.
        #[arg(short, long)]
        model: String,
    },

    /// Generate a response describing an image.
    GenerateImage {
        /// The prompt to send alongside the image.
        prompt: String,

        /// Vision-capable model to use.
        #[arg(short, long)]
        model: String,

        /// Path to the image file.
        #[arg(short, long)]
        image: PathBuf,
    },

    /// List models available on the server.
    Models {
        /// Filter models by substring.
        query: Option<String>,
    },

    /// Persist a new default system prompt.
    SetPrompt {
        /// The new system prompt.
        prompt: String,
    },

    /// Show connection settings and server reachability.
    Status,

    /// Inspect or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Settings subcommands.
#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current settings.
    Show,

    /// Update settings values.
    Set {
        /// Ollama server host or IP.
        #[arg(long)]
        host: Option<String>,

        /// Ollama server port.
        #[arg(long)]
        port: Option<u16>,

        /// Default system prompt.
        #[arg(long)]
        system_prompt: Option<String>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    observability::init(cli.verbose);

    let store = match cli.config.map_or_else(FileStore::open_default, |path| {
        Ok(FileStore::new(path))
    }) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open settings: {e}");
            return ExitCode::FAILURE;
        },
    };

    let settings = Settings::new(store);
    settings.repair_port();

    match run(cli.command, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Dispatches a command.
fn run(command: Commands, settings: Settings) -> hearth::Result<()> {
    let registry = ActionRegistry::new(settings);

    match command {
        Commands::Generate { prompt, model } => {
            let output = registry.generate_response(&model, &prompt)?;
            println!("{}", output.response);
            Ok(())
        },
        Commands::GenerateImage {
            prompt,
            model,
            image,
        } => {
            let mut file = File::open(&image)
                .map_err(|e| hearth::Error::ImageRead(format!("{}: {e}", image.display())))?;
            let output = registry.generate_response_image(&model, &prompt, Some(&mut file))?;
            println!("{}", output.response);
            Ok(())
        },
        Commands::Models { query } => {
            let models = registry.autocomplete_models(query.as_deref().unwrap_or_default())?;
            if models.is_empty() {
                println!("No matching models.");
            }
            for model in models {
                println!("{}", model.name);
            }
            Ok(())
        },
        Commands::SetPrompt { prompt } => {
            registry.set_system_prompt(&prompt)?;
            println!("System prompt updated.");
            Ok(())
        },
        Commands::Status => run_status(&registry),
        Commands::Config { command } => run_config(command, registry.settings()),
    }
}

/// Shows connection settings and probes the server.
fn run_status(registry: &ActionRegistry) -> hearth::Result<()> {
    match registry.settings().connection() {
        Ok(connection) => {
            println!("Server: {}", connection.base_url());
            let client = OllamaClient::with_http_config(&connection, registry.http_config());
            if client.is_available() {
                println!("Reachable: yes");
            } else {
                println!("Reachable: no");
            }
        },
        Err(e) => println!("Server: not configured ({e})"),
    }

    match registry.settings().system_prompt()? {
        Some(prompt) => println!("System prompt: {prompt}"),
        None => println!("System prompt: unset (built-in fallback in use)"),
    }
    Ok(())
}

/// Handles the config subcommands.
fn run_config(command: ConfigCommands, settings: &Settings) -> hearth::Result<()> {
    match command {
        ConfigCommands::Show => {
            match settings.connection() {
                Ok(connection) => {
                    println!("host = {}", connection.host);
                    println!("port = {}", connection.port);
                },
                Err(e) => println!("connection: {e}"),
            }
            println!(
                "systemPrompt = {}",
                settings.system_prompt_or(DEFAULT_SYSTEM_PROMPT)?
            );
            Ok(())
        },
        ConfigCommands::Set {
            host,
            port,
            system_prompt,
        } => {
            settings.set_connection(host.as_deref(), port)?;
            if let Some(prompt) = system_prompt {
                settings.set_system_prompt(&prompt)?;
            }
            println!("Settings updated.");
            Ok(())
        },
    }
}
