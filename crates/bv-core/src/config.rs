//! Configuration management
//!
//! Settings are resolved in the following order (later wins):
//! 1. Default values
//! 2. `bingo-vault.toml` in the working directory
//! 3. Environment variables
//!
//! Inside the TOML file, `${VAR_NAME}` is expanded from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Error;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "bingo-vault.toml";

/// Embedded database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file (`:memory:` for an in-memory store)
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// How long a request waits on a locked database file, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Configuration for a throwaway in-memory database
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory session exports are written to
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

/// Main configuration for bingo-vault
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

fn default_db_path() -> String {
    "data/bingo-vault.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unset variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(c) = chars.next() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse configuration from TOML text (after `${VAR}` expansion)
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// Load from `./bingo-vault.toml` if it exists, otherwise from the environment
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE_NAME).exists() {
            return Self::from_toml_file(CONFIG_FILE_NAME);
        }
        Ok(Self::from_env())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("BV_DB_PATH") {
            if !path.is_empty() {
                self.store.db_path = path;
            }
        }
        if let Ok(timeout) = std::env::var("BV_BUSY_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.store.busy_timeout_ms = ms;
            }
        }
        if let Ok(dir) = std::env::var("BV_EXPORT_DIR") {
            if !dir.is_empty() {
                self.export.dir = PathBuf::from(dir);
            }
        }
    }
}
