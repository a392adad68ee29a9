//! Configuration management for Voltport
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    API_TIMEOUT_DEFAULT_SECS, CONFIG_GENERATED, LATEST_PRODUCTS_DEFAULT_LIMIT, SEARCH_DEBOUNCE_DEFAULT_MS,
    SEARCH_DEBOUNCE_MAX_MS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub identity: IdentityConfig,
    pub search: SearchConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Marketplace REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Environment variable holding the identity provider's public API key
    pub api_key_env: String,
    /// Base URL of the account endpoints (`accounts:signUp`, ...)
    pub auth_base_url: String,
    /// Base URL of the token refresh endpoint
    pub token_base_url: String,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period in milliseconds before a search term is sent
    pub debounce_ms: u64,
}

/// Home page feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// How many of the newest products the home feed shows
    pub latest_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Level filter: "error", "warn", "info", "debug" or "trace"
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: API_TIMEOUT_DEFAULT_SECS,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key_env: "VOLTPORT_IDENTITY_API_KEY".to_string(),
            auth_base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            token_base_url: "https://securetoken.googleapis.com/v1".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SEARCH_DEBOUNCE_DEFAULT_MS,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            latest_limit: LATEST_PRODUCTS_DEFAULT_LIMIT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl IdentityConfig {
    /// Read the identity provider API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("Identity API key not found in env var '{}'", self.api_key_env))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("voltport.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("voltport").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Self::validate_url("api.base_url", &self.api.base_url)?;
        Self::validate_url("identity.auth_base_url", &self.identity.auth_base_url)?;
        Self::validate_url("identity.token_base_url", &self.identity.token_base_url)?;

        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than 0");
        }

        if self.identity.api_key_env.is_empty() {
            anyhow::bail!("identity.api_key_env cannot be empty");
        }

        if self.search.debounce_ms == 0 || self.search.debounce_ms > SEARCH_DEBOUNCE_MAX_MS {
            anyhow::bail!(
                "search.debounce_ms must be between 1 and {}, got {}",
                SEARCH_DEBOUNCE_MAX_MS,
                self.search.debounce_ms
            );
        }

        if self.feed.latest_limit == 0 {
            anyhow::bail!("feed.latest_limit must be greater than 0");
        }

        crate::logger::parse_level(&self.logging.level)?;

        Ok(())
    }

    fn validate_url(field: &str, value: &str) -> Result<()> {
        let parsed = url::Url::parse(value).with_context(|| format!("{} is not a valid URL: '{}'", field, value))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("{} must use http or https, got '{}'", field, parsed.scheme());
        }
        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# Voltport Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        log::info!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("voltport"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
