//! Configuration management for offcache

pub mod schema;

pub use schema::Config;

use crate::error::{OffcacheError, OffcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("offcache")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> OffcacheResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load and validate configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> OffcacheResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| OffcacheError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| OffcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        validate(&config).map_err(|reason| OffcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> OffcacheResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            OffcacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> OffcacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OffcacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Check values serde cannot enforce
fn validate(config: &Config) -> Result<(), String> {
    if config.cache.name.trim().is_empty() {
        return Err("cache.name must not be empty".to_string());
    }

    Url::parse(&config.cache.scope)
        .map_err(|e| format!("cache.scope '{}' is not an absolute URL: {}", config.cache.scope, e))?;

    if config.fetch.timeout_ms == Some(0) {
        return Err("fetch.timeout_ms must be greater than 0 (omit it to disable)".to_string());
    }

    if config.network.max_body_bytes == 0 {
        return Err("network.max_body_bytes must be greater than 0".to_string());
    }

    Ok(())
}
