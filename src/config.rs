//! Client configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which includes the service endpoint, subscription key, and request
//! timeout.
//!
//! Configuration is stored at `~/.config/facegate/config.json`; the
//! `FACE_API_ENDPOINT` and `FACE_API_KEY` environment variables override
//! the stored values.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "facegate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment override for the service endpoint
const ENDPOINT_ENV: &str = "FACE_API_ENDPOINT";

/// Environment override for the subscription key
const KEY_ENV: &str = "FACE_API_KEY";

/// HTTP request timeout in seconds.
/// 30s allows for slow detect calls on large images while failing fast
/// enough for interactive callers.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the face service, e.g.
    /// `https://westus.api.cognitive.microsoft.com/face/v1.0`.
    pub endpoint: String,
    pub subscription_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from the config file, applying environment overrides.
    pub fn load() -> Result<Self> {
        Self::from_sources(
            &Self::config_path()?,
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(KEY_ENV).ok(),
        )
    }

    /// Load from an explicit file path with explicit overrides. Environment
    /// values always win over file values.
    fn from_sources(
        path: &Path,
        endpoint_override: Option<String>,
        key_override: Option<String>,
    ) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::new("", "")
        };

        if let Some(endpoint) = endpoint_override {
            config.endpoint = endpoint;
        }
        if let Some(key) = key_override {
            config.subscription_key = key;
        }

        if config.endpoint.is_empty() || config.subscription_key.is_empty() {
            anyhow::bail!(
                "Missing face service endpoint or subscription key; set {} and {} or write {}",
                ENDPOINT_ENV,
                KEY_ENV,
                path.display()
            );
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
