//! Configuration management for the Conduit client.
//!
//! Loads configuration from ${CONDUIT_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Base URL used when neither flag, env var, nor config file sets one.
pub const DEFAULT_API_URL: &str = "https://api.realworld.io/api";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CONDUIT_API_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Conduit API (without a trailing slash).
    pub api_url: Option<String>,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// Fails if a config file already exists there.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("config already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// Resolves the API base URL with precedence: flag > env > config > default.
///
/// The resolved URL is validated and returned without a trailing slash.
pub fn resolve_api_url(flag: Option<&str>, config: &Config) -> Result<String> {
    if let Some(url) = non_empty(flag) {
        return validated(url);
    }

    if let Ok(env_url) = std::env::var(API_URL_ENV)
        && let Some(url) = non_empty(Some(&env_url))
    {
        return validated(url);
    }

    if let Some(url) = non_empty(config.api_url.as_deref()) {
        return validated(url);
    }

    Ok(DEFAULT_API_URL.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validated(url: &str) -> Result<String> {
    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Returns the commented template written by `config init`.
pub fn default_config_template() -> &'static str {
    r#"# Conduit client configuration.
#
# Base URL of the Conduit API. The CONDUIT_API_URL environment variable
# and the --api-url flag take precedence over this value.
# api_url = "https://api.realworld.io/api"
"#
}

pub mod paths {
    //! Path resolution for Conduit configuration and credential files.
    //!
    //! CONDUIT_HOME resolution order:
    //! 1. CONDUIT_HOME environment variable (if set)
    //! 2. ~/.config/conduit (default)

    use std::path::PathBuf;

    /// Returns the Conduit home directory.
    ///
    /// Checks CONDUIT_HOME env var first, falls back to ~/.config/conduit
    pub fn conduit_home() -> PathBuf {
        if let Ok(home) = std::env::var("CONDUIT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("conduit"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        conduit_home().join("config.toml")
    }

    /// Returns the path to the stored credential file.
    pub fn token_path() -> PathBuf {
        conduit_home().join("token.json")
    }
}
