//! Settings storage and typed accessors.
//!
//! The host platform persists three scalar values: the Ollama host
//! (`ip`), the port (`port`), and the default system prompt
//! (`systemPrompt`). Any key/value store satisfies the contract; this
//! module ships a TOML-file-backed store and an in-memory store for
//! tests. Values are read fresh on every action invocation and never
//! cached across calls.

use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Settings key for the Ollama server host.
pub const KEY_HOST: &str = "ip";

/// Settings key for the Ollama server port.
pub const KEY_PORT: &str = "port";

/// Settings key for the default system prompt.
pub const KEY_SYSTEM_PROMPT: &str = "systemPrompt";

/// Default Ollama port, restored when a stored port is out of range.
pub const DEFAULT_PORT: u16 = 11434;

/// Built-in system prompt used when none is stored.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant for a home automation system. \
     Users send messages and you should generate a response. \
     Always respond friendly and give detailed responses.";

/// Resolved connection settings for the Ollama server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Server host name or IP address.
    pub host: String,
    /// Server port, guaranteed to lie in [1,65535].
    pub port: u16,
}

impl Connection {
    /// Returns the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Key/value settings store.
///
/// Mirrors the host platform's settings API: loosely-typed scalars
/// addressed by string keys.
pub trait SettingsStore: Send + Sync {
    /// Reads a value, `None` when the key is unset.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a value.
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .read()
            .map_err(|e| Error::Configuration(format!("settings store poisoned: {e}")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| Error::Configuration(format!("settings store poisoned: {e}")))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// TOML-file-backed settings store.
///
/// The file is re-read on every `get` so that edits made through the
/// settings UI (or another process) are picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the given file path.
    ///
    /// The file does not need to exist yet; a missing file reads as an
    /// empty store.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the platform-default settings file path
    /// (`<config dir>/hearth/settings.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new().ok_or_else(|| {
            Error::Configuration("could not determine a home directory".to_string())
        })?;
        Ok(base_dirs.config_dir().join("hearth").join("settings.toml"))
    }

    /// Opens a store at the platform-default path.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Configuration(format!("failed to read settings file: {e}")))?;
        toml::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("failed to parse settings file: {e}")))
    }

    fn write_table(&self, table: &toml::Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Configuration(format!("failed to create settings directory: {e}"))
            })?;
        }
        let contents = toml::to_string(table)
            .map_err(|e| Error::Configuration(format!("failed to serialize settings: {e}")))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| Error::Configuration(format!("failed to write settings file: {e}")))
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let table = self.read_table()?;
        table.get(key).map(toml_to_json).transpose()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), json_to_toml(&value)?);
        self.write_table(&table)
    }
}

/// Converts a scalar TOML value to JSON.
fn toml_to_json(value: &toml::Value) -> Result<Value> {
    match value {
        toml::Value::String(s) => Ok(Value::String(s.clone())),
        toml::Value::Integer(i) => Ok(Value::from(*i)),
        toml::Value::Float(f) => Ok(Value::from(*f)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        other => Err(Error::Configuration(format!(
            "unsupported settings value type: {}",
            other.type_str()
        ))),
    }
}

/// Converts a scalar JSON value to TOML.
fn json_to_toml(value: &Value) -> Result<toml::Value> {
    match value {
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => n.as_i64().map(toml::Value::Integer).map_or_else(
            || {
                n.as_f64().map(toml::Value::Float).ok_or_else(|| {
                    Error::InvalidInput(format!("unrepresentable settings number: {n}"))
                })
            },
            Ok,
        ),
        _ => Err(Error::InvalidInput(
            "settings values must be scalars".to_string(),
        )),
    }
}

/// Typed accessor over a [`SettingsStore`].
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    /// Wraps a settings store.
    pub fn new(store: impl SettingsStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn SettingsStore {
        self.store.as_ref()
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.store.get(key)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// Resolves the Ollama connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the host or port is absent
    /// or empty, or when a stored port lies outside [1,65535].
    pub fn connection(&self) -> Result<Connection> {
        let host = self.get_string(KEY_HOST)?;
        let port = self.store.get(KEY_PORT)?.and_then(|v| v.as_i64());

        let (Some(host), Some(port)) = (host, port) else {
            return Err(Error::Configuration(
                "Ollama IP or port not set in settings".to_string(),
            ));
        };

        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| {
                Error::Configuration(format!("stored port {port} is outside 1-65535"))
            })?;

        Ok(Connection { host, port })
    }

    /// One-shot startup repair of the stored port.
    ///
    /// If a stored port lies outside [1,65535] it is overwritten with
    /// [`DEFAULT_PORT`]. Best-effort: failures are logged and never
    /// propagated.
    pub fn repair_port(&self) {
        match self.store.get(KEY_PORT) {
            Ok(Some(value)) => {
                let Some(port) = value.as_i64() else {
                    return;
                };
                if !(1..=65535).contains(&port) {
                    tracing::info!(port, fallback = DEFAULT_PORT, "repairing stored port");
                    if let Err(e) = self.store.set(KEY_PORT, Value::from(i64::from(DEFAULT_PORT)))
                    {
                        tracing::warn!(error = %e, "failed to repair stored port");
                    }
                }
            },
            Ok(None) => {},
            Err(e) => {
                tracing::warn!(error = %e, "failed to validate stored port");
            },
        }
    }

    /// Returns the stored system prompt, `None` when absent or empty.
    pub fn system_prompt(&self) -> Result<Option<String>> {
        self.get_string(KEY_SYSTEM_PROMPT)
    }

    /// Returns the stored system prompt or the given fallback.
    pub fn system_prompt_or(&self, fallback: &str) -> Result<String> {
        Ok(self.system_prompt()?.unwrap_or_else(|| fallback.to_string()))
    }

    /// Returns the stored system prompt, failing when none is set.
    ///
    /// Generation calls require a configured prompt; this is the
    /// fail-fast precondition check.
    pub fn require_system_prompt(&self) -> Result<String> {
        self.system_prompt()?.ok_or_else(|| {
            Error::Configuration("Please set a system prompt in the app settings".to_string())
        })
    }

    /// Persists a new system prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the prompt is empty.
    pub fn set_system_prompt(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::InvalidInput("system prompt required".to_string()));
        }
        self.store
            .set(KEY_SYSTEM_PROMPT, Value::String(value.to_string()))
    }

    /// Persists connection settings from the configuration CLI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty host or a port of 0.
    pub fn set_connection(&self, host: Option<&str>, port: Option<u16>) -> Result<()> {
        if let Some(host) = host {
            if host.trim().is_empty() {
                return Err(Error::InvalidInput("host must not be empty".to_string()));
            }
            self.store.set(KEY_HOST, Value::String(host.to_string()))?;
        }
        if let Some(port) = port {
            if port == 0 {
                return Err(Error::InvalidInput(
                    "port must lie in 1-65535".to_string(),
                ));
            }
            self.store.set(KEY_PORT, Value::from(i64::from(port)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn settings() -> Settings {
        Settings::new(MemoryStore::new())
    }

    #[test]
    fn test_connection_requires_host_and_port() {
        let settings = settings();
        assert!(matches!(
            settings.connection(),
            Err(Error::Configuration(_))
        ));

        settings
            .store()
            .set(KEY_HOST, Value::from("192.168.1.10"))
            .ok();
        assert!(matches!(
            settings.connection(),
            Err(Error::Configuration(_))
        ));

        settings.store().set(KEY_PORT, Value::from(11434)).ok();
        let conn = settings.connection().ok();
        assert_eq!(
            conn,
            Some(Connection {
                host: "192.168.1.10".to_string(),
                port: 11434,
            })
        );
    }

    #[test]
    fn test_connection_rejects_empty_host() {
        let settings = settings();
        settings.store().set(KEY_HOST, Value::from("  ")).ok();
        settings.store().set(KEY_PORT, Value::from(11434)).ok();
        assert!(matches!(
            settings.connection(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_connection_rejects_out_of_range_port() {
        let settings = settings();
        settings.store().set(KEY_HOST, Value::from("localhost")).ok();
        settings.store().set(KEY_PORT, Value::from(70000)).ok();
        assert!(matches!(
            settings.connection(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url() {
        let conn = Connection {
            host: "192.168.1.10".to_string(),
            port: 11434,
        };
        assert_eq!(conn.base_url(), "http://192.168.1.10:11434");
    }

    #[test_case(0; "zero")]
    #[test_case(-5; "negative")]
    #[test_case(65536; "above range")]
    #[test_case(1_000_000; "far above range")]
    fn test_repair_port_resets_out_of_range(port: i64) {
        let settings = settings();
        settings.store().set(KEY_PORT, Value::from(port)).ok();
        settings.repair_port();
        assert_eq!(
            settings.store().get(KEY_PORT).ok().flatten(),
            Some(Value::from(i64::from(DEFAULT_PORT)))
        );
    }

    #[test_case(1; "lower bound")]
    #[test_case(11434; "default")]
    #[test_case(65535; "upper bound")]
    fn test_repair_port_keeps_in_range(port: i64) {
        let settings = settings();
        settings.store().set(KEY_PORT, Value::from(port)).ok();
        settings.repair_port();
        assert_eq!(
            settings.store().get(KEY_PORT).ok().flatten(),
            Some(Value::from(port))
        );
    }

    #[test]
    fn test_repair_port_ignores_unset() {
        let settings = settings();
        settings.repair_port();
        assert_eq!(settings.store().get(KEY_PORT).ok().flatten(), None);
    }

    #[test]
    fn test_system_prompt_fallback() {
        let settings = settings();
        assert_eq!(settings.system_prompt().ok().flatten(), None);
        assert_eq!(
            settings.system_prompt_or(DEFAULT_SYSTEM_PROMPT).ok(),
            Some(DEFAULT_SYSTEM_PROMPT.to_string())
        );
        assert!(matches!(
            settings.require_system_prompt(),
            Err(Error::Configuration(_))
        ));

        settings.set_system_prompt("You are a home assistant.").ok();
        assert_eq!(
            settings.require_system_prompt().ok(),
            Some("You are a home assistant.".to_string())
        );
    }

    #[test]
    fn test_set_system_prompt_rejects_empty() {
        let settings = settings();
        assert!(matches!(
            settings.set_system_prompt(""),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            settings.set_system_prompt("   "),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_set_connection_validates() {
        let settings = settings();
        assert!(matches!(
            settings.set_connection(Some(""), None),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            settings.set_connection(None, Some(0)),
            Err(Error::InvalidInput(_))
        ));
        assert!(settings.set_connection(Some("localhost"), Some(11434)).is_ok());
    }
}
