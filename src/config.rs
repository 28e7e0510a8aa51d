//! Layered configuration: defaults, then a JSON file, then environment.
//!
//! The file lives at `<config_dir>/methodology-assistant/config.json` unless
//! a path is given explicitly. Environment variables override the file:
//!
//! - `METHODOLOGY_LLM_URL` - provider base URL
//! - `METHODOLOGY_LLM_API_KEY` - bearer token for the provider
//! - `METHODOLOGY_LLM_MODEL` - model name
//! - `METHODOLOGY_LLM_MAX_RETRIES` - retries on transport failure
//! - `METHODOLOGY_LLM_TIMEOUT_MS` - per-call deadline, `0` disables it
//! - `METHODOLOGY_PORT` - HTTP API port
//! - `METHODOLOGY_DB_PATH` - SQLite database file

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "methodology-assistant";
const CONFIG_FILE: &str = "config.json";

/// Default provider endpoint (OpenAI-compatible).
const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Retry and deadline policy for generation calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Extra attempts after a retryable failure. `0` means a single attempt.
    pub max_retries: u32,
    /// Per-attempt deadline in milliseconds. `0` disables it.
    pub timeout_ms: u64,
    /// Base delay between retries, doubled after each attempt.
    pub retry_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            timeout_ms: 30_000,
            retry_backoff_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Falls back to the platform data directory when unset.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load from `path` (or the default location) and apply environment
    /// overrides. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Ok(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply overrides from a variable lookup. Split out from [`Config::load`]
    /// so tests do not have to touch the process environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("METHODOLOGY_LLM_URL") {
            self.provider.base_url = url;
        }
        if let Some(key) = var("METHODOLOGY_LLM_API_KEY") {
            self.provider.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(model) = var("METHODOLOGY_LLM_MODEL") {
            self.provider.model = model;
        }
        if let Some(retries) = var("METHODOLOGY_LLM_MAX_RETRIES") {
            self.generation.max_retries = retries
                .parse()
                .context("METHODOLOGY_LLM_MAX_RETRIES must be a non-negative integer")?;
        }
        if let Some(timeout) = var("METHODOLOGY_LLM_TIMEOUT_MS") {
            self.generation.timeout_ms = timeout
                .parse()
                .context("METHODOLOGY_LLM_TIMEOUT_MS must be a non-negative integer")?;
        }
        if let Some(port) = var("METHODOLOGY_PORT") {
            self.server.port = port.parse().context("METHODOLOGY_PORT must be a port number")?;
        }
        if let Some(path) = var("METHODOLOGY_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Write a default config file to `path` (or the default location) and
    /// return where it went. An existing file is kept unless `force` is set.
    pub fn init_file(path: Option<&Path>, force: bool) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if path.exists() && !force {
            anyhow::bail!(
                "Config file {} already exists (use --force to overwrite)",
                path.display()
            );
        }
        Self::default().save(&path)?;
        Ok(path)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
