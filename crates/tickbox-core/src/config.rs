//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend URL, which transport profile to use, the request timeout
//! and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/tickbox/config.json`. Environment
//! variables override the file for a single run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::TransportMode;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "tickbox";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the file nor the environment names one
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BACKEND_URL: &str = "TICKBOX_BACKEND_URL";
pub const ENV_TRANSPORT: &str = "TICKBOX_TRANSPORT";
pub const ENV_EMAIL: &str = "TICKBOX_EMAIL";

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub transport: TransportMode,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            transport: TransportMode::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
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

    /// Apply environment overrides on top of whatever was loaded.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(mode) = var(ENV_TRANSPORT).filter(|v| !v.trim().is_empty()) {
            self.transport = mode
                .parse()
                .with_context(|| format!("Invalid {}", ENV_TRANSPORT))?;
        }
        if let Some(email) = var(ENV_EMAIL).filter(|v| !v.trim().is_empty()) {
            self.last_email = Some(email.trim().to_string());
        }
        debug!(backend_url = %self.backend_url, transport = %self.transport, "Config resolved");
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where tokens and logs live.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.transport, TransportMode::Cookie);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.last_email, None);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"transport": "bearer"}"#).expect("parse");
        assert_eq!(config.transport, TransportMode::Bearer);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides(vars(&[
                (ENV_BACKEND_URL, " https://todo.example.com "),
                (ENV_TRANSPORT, "bearer"),
                (ENV_EMAIL, "amy@example.com"),
            ]))
            .expect("overrides");
        assert_eq!(config.backend_url, "https://todo.example.com");
        assert_eq!(config.transport, TransportMode::Bearer);
        assert_eq!(config.last_email.as_deref(), Some("amy@example.com"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = Config::default()
            .with_overrides(vars(&[(ENV_BACKEND_URL, "  "), (ENV_TRANSPORT, "")]))
            .expect("overrides");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_transport_is_an_error() {
        let result = Config::default().with_overrides(vars(&[(ENV_TRANSPORT, "kerberos")]));
        assert!(result.is_err());
    }
}
