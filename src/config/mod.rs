//! # Configuration Management Module
//!
//! All tunables for the trader live in one TOML file (default `config.toml`). Every section
//! has defaults, so a missing file or a missing section still yields a playable game.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Starting balance, market cadence, batch limits
//! - [`StorageConfig`] - Save, export, and prompt-library directories
//! - [`GeneratorConfig`] - LLM provider, credentials, and request limits
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voidtrader::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default("config.toml").await?;
//!     println!("Starting credits: {}", config.game.starting_credits);
//!     Config::create_default("config.example.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! starting_credits = 50
//! market_update_frequency = 5
//! max_batch_size = 10
//!
//! [storage]
//! save_dir = "saves"
//! output_dir = "artifacts"
//! config_dir = "config"
//!
//! [generator]
//! provider = "openai"
//! api_key = ""            # empty: read OPENAI_API_KEY / ANTHROPIC_API_KEY
//! max_tokens = 2000
//! temperature = 0.7
//! timeout_seconds = 120
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Credits granted to a brand new player.
    pub starting_credits: u64,
    /// Market ticks every this many turns. Zero disables market drift.
    pub market_update_frequency: u32,
    /// Upper bound on artifacts requested in one generation.
    pub max_batch_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_credits: crate::economy::DEFAULT_STARTING_CREDITS,
            market_update_frequency: 5,
            max_batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub save_dir: String,
    pub output_dir: String,
    /// Holds `prompt_libraries.json`.
    pub config_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "saves".to_string(),
            output_dir: "artifacts".to_string(),
            config_dir: "config".to_string(),
        }
    }
}

impl StorageConfig {
    /// All three directories rooted under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let join = |leaf: &str| root.join(leaf).to_string_lossy().to_string();
        Self {
            save_dir: join("saves"),
            output_dir: join("artifacts"),
            config_dir: join("config"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// "openai" or "anthropic".
    pub provider: String,
    /// API key. Empty means read the provider's environment variable.
    #[serde(default)]
    pub api_key: String,
    /// Model override; each provider has its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Endpoint override (for proxies and OpenAI-compatible servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: String::new(),
            model: None,
            base_url: None,
            max_tokens: 2000,
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

impl GeneratorConfig {
    /// Environment variable consulted when `api_key` is empty.
    pub fn api_key_env_var(&self) -> &'static str {
        if self.provider.eq_ignore_ascii_case("anthropic") {
            "ANTHROPIC_API_KEY"
        } else {
            "OPENAI_API_KEY"
        }
    }

    /// Configured key, falling back to the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(self.api_key_env_var())
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: Some("voidtrader.log".to_string()),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.level.to_ascii_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Warn,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise. A file that exists but does not parse
    /// is still an error.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
