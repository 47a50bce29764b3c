//! Configuration for formpilot.
//!
//! Settings live in `~/.formpilot/config.json`. Environment overrides
//! (`OPENAI_API_KEY`, `GOOGLE_FORMS_MCP_PATH`) are resolved by the CLI
//! layer; this crate only reads and writes the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Model endpoint credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Per-run defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDefaults {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_iterations")]
    pub max_tool_iterations: u32,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_tool_iterations: default_max_iterations(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_iterations() -> u32 {
    10
}

/// How to launch the Forms tool server
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Command or script path of the MCP server
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub defaults: RunDefaults,
    #[serde(default)]
    pub forms_server: ServerConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn api_key(&self) -> Option<String> {
        let key = self.openai.api_key.clone();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    pub fn api_base(&self) -> Option<String> {
        self.openai.api_base.clone()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn default_model(&self) -> String {
        self.defaults.model.clone()
    }

    pub fn temperature(&self) -> f32 {
        self.defaults.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.defaults.max_tokens
    }

    pub fn max_tool_iterations(&self) -> u32 {
        self.defaults.max_tool_iterations
    }

    /// Configured server command, if any
    pub fn server_command(&self) -> Option<String> {
        let command = self.forms_server.command.clone();
        if command.is_empty() {
            None
        } else {
            Some(command)
        }
    }

    pub fn server_args(&self) -> Vec<String> {
        self.forms_server.args.clone()
    }
}

/// Write a default config file if none exists yet.
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        info!("config already exists at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("config created at {:?}", config_path);
    }

    Config::load().await
}
