//! Configuration for melo-ls
//!
//! Values come from the TOML file located by `melo_common::config` (see its priority
//! order), then individual environment overrides, then command-line flags.

use melo_common::config::{is_valid_secret, load_toml_config, resolve_config_path, LoggingConfig};
use melo_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::clients::catalog::CATALOG_BASE_URL;
use crate::clients::genius::GENIUS_BASE_URL;
use crate::search::tuning::SearchTuning;

/// Config file name under `~/.config/melo/` and `/etc/melo/`
pub const CONFIG_FILE_NAME: &str = "melo-ls.toml";
/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MELO_LS_CONFIG";
pub const GENIUS_TOKEN_ENV_VAR: &str = "GENIUS_ACCESS_TOKEN";
pub const CATALOG_BASE_ENV_VAR: &str = "MELO_CATALOG_API_BASE";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5730;

/// Contents of `melo-ls.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub genius: GeniusConfig,
    pub catalog: CatalogConfig,
    pub search: SearchTuning,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeniusConfig {
    pub access_token: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: GENIUS_BASE_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl GeniusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Client-level ceiling; per-request limits come from `[search] catalog_timeout_ms`
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: CATALOG_BASE_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ServiceConfig {
    /// Apply environment overrides that are not handled by the CLI parser
    pub fn apply_env_overrides(&mut self) {
        if let Some(base) = std::env::var(CATALOG_BASE_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            info!("Catalog base URL overridden by {}", CATALOG_BASE_ENV_VAR);
            self.catalog.base_url = base.trim().to_string();
        }
    }
}

/// Locate, load and env-override the service config
///
/// Returns the file actually read, if any. Run it under a subscriber: missing files and
/// overrides are only reported through `tracing`.
pub fn load_service_config(cli_path: Option<&Path>) -> Result<(Option<PathBuf>, ServiceConfig)> {
    let config_path = resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME);
    let mut config: ServiceConfig = load_toml_config(config_path.as_deref())?;
    config.apply_env_overrides();
    Ok((config_path, config))
}

/// Resolve the Genius access token
///
/// **Priority:** ENV (`GENIUS_ACCESS_TOKEN`) → TOML (`[genius] access_token`)
pub fn resolve_genius_access_token(config: &GeniusConfig) -> Result<String> {
    let env_token = std::env::var(GENIUS_TOKEN_ENV_VAR).ok();
    select_access_token(env_token, config.access_token.clone())
}

fn select_access_token(env_token: Option<String>, toml_token: Option<String>) -> Result<String> {
    let env_token = env_token.filter(|token| is_valid_secret(token));
    let toml_token = toml_token.filter(|token| is_valid_secret(token));

    if env_token.is_some() && toml_token.is_some() {
        warn!("Genius access token found in both environment and TOML. Using environment.");
    }

    if let Some(token) = env_token {
        info!("Genius access token loaded from environment variable");
        return Ok(token.trim().to_string());
    }

    if let Some(token) = toml_token {
        info!("Genius access token loaded from TOML config");
        return Ok(token.trim().to_string());
    }

    Err(Error::Config(format!(
        "Genius access token not configured. Set one of:\n\
         1. Environment: {}=your-token\n\
         2. TOML config: ~/.config/melo/{} ([genius] access_token = \"your-token\")",
        GENIUS_TOKEN_ENV_VAR, CONFIG_FILE_NAME
    )))
}
