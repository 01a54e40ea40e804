//! Configuration file handling.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables, so a container can be configured without a file.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/depbrief/config.toml`
//! - macOS: `~/Library/Application Support/depbrief/config.toml`
//! - Windows: `%APPDATA%\depbrief\config.toml`
//!
//! # Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LLM_PROVIDER` | `llm.provider` (`ollama` or `openai`) |
//! | `OLLAMA_URL` | `llm.ollama_url` |
//! | `OLLAMA_MODEL` | `llm.ollama_model` |
//! | `OPENAI_API_KEY` | `llm.openai_api_key` |
//! | `OPENAI_MODEL` | `llm.openai_model` |
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! log_level = "warn"
//!
//! [osv]
//! api_url = "https://api.osv.dev"
//! timeout_secs = 25
//! max_concurrent_queries = 8
//!
//! [llm]
//! provider = "ollama"
//! ollama_url = "http://ollama:11434"
//! ollama_model = "llama3.1:8b"
//! openai_model = "gpt-4.1-mini"
//! max_brief_vulns = 25
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::checker::OSV_API_URL;

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use depbrief::Config;
///
/// let config = Config::load().unwrap();
/// println!("Brief provider: {}", config.llm.provider);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Log filter used when `RUST_LOG` is not set.
    ///
    /// Default: "warn"
    pub log_level: String,

    /// Vulnerability database settings.
    pub osv: OsvConfig,

    /// Executive brief settings.
    pub llm: LlmConfig,
}

/// Settings for the OSV.dev query client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsvConfig {
    /// Base URL; `/v1/query` is appended.
    pub api_url: String,

    /// Per-query timeout in seconds.
    ///
    /// Default: 25
    pub timeout_secs: u64,

    /// Upper bound on lookups in flight at once.
    ///
    /// Default: 8
    pub max_concurrent_queries: usize,
}

impl Default for OsvConfig {
    fn default() -> Self {
        Self {
            api_url: OSV_API_URL.to_string(),
            timeout_secs: 25,
            max_concurrent_queries: 8,
        }
    }
}

/// Which text-generation backend writes the executive brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Locally hosted Ollama server.
    #[default]
    Ollama,
    /// OpenAI Responses API.
    OpenAi,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            _ => Err(format!("Unknown LLM provider: {}. Use 'ollama' or 'openai'", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the executive brief backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Default: "ollama"
    pub provider: LlmProvider,

    /// Default: "http://ollama:11434"
    pub ollama_url: String,

    /// Default: "llama3.1:8b"
    pub ollama_model: String,

    /// Default: 120
    pub ollama_timeout_secs: u64,

    /// Bearer token for the hosted API. Usually supplied via `OPENAI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Default: "https://api.openai.com/v1/responses"
    pub openai_url: String,

    /// Default: "gpt-4.1-mini"
    pub openai_model: String,

    /// Default: 60
    pub openai_timeout_secs: u64,

    /// Cap on vulnerability entries sent to the model across all packages.
    ///
    /// Default: 25
    pub max_brief_vulns: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            ollama_url: "http://ollama:11434".to_string(),
            ollama_model: "llama3.1:8b".to_string(),
            ollama_timeout_secs: 120,
            openai_api_key: None,
            openai_url: "https://api.openai.com/v1/responses".to_string(),
            openai_model: "gpt-4.1-mini".to_string(),
            openai_timeout_secs: 60,
            max_brief_vulns: 25,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            log_level: "warn".to_string(),
            osv: OsvConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file (defaults if absent) and applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from `path` without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Overrides LLM settings from environment-style variables.
    ///
    /// Empty values are ignored. An unrecognized `LLM_PROVIDER` falls back to
    /// Ollama.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = provider.parse().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to ollama");
                LlmProvider::Ollama
            });
        }
        if let Some(url) = get("OLLAMA_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.llm.ollama_model = model;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.llm.openai_model = model;
        }
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depbrief")
            .join("config.toml")
    }

    /// Renders the default configuration as TOML.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
