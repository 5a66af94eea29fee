//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "YTDL_GATEWAY_CONFIG";

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from YTDL_GATEWAY_CONFIG or the default location
    ///
    /// Priority:
    /// 1. YTDL_GATEWAY_CONFIG environment variable
    /// 2. ~/.config/ytdl-gateway/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<std::path::PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = std::path::PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from {}: {:?}", CONFIG_ENV_VAR, path);
                return Some(path);
            } else {
                warn!("{} points to non-existent file: {:?}", CONFIG_ENV_VAR, path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("ytdl-gateway").join("config.toml");
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (applied by the caller)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        info!("Configuration loaded successfully");
        if settings.cdn.decryption_key.is_none() {
            warn!("No CDN decryption key configured; metadata will come from the direct path only");
        }

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
