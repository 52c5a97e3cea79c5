//! Host Configuration
//!
//! JSON configuration for the capability host, written with defaults on
//! first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Environment variable selecting the configuration file
pub const CONFIG_ENV_VAR: &str = "APP_ACTIONS_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "app_actions.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    pub service_name: String,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Capability names that are not registered at startup
    pub disabled_capabilities: Vec<String>,
    /// Alarm identifiers the bundled alarm clock starts with
    pub active_alarms: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            service_name: "app_actions".to_string(),
            log_filter: "app_actions=info".to_string(),
            disabled_capabilities: Vec::new(),
            active_alarms: Vec::new(),
        }
    }
}

impl HostConfig {
    pub fn is_enabled(&self, capability_name: &str) -> bool {
        !self.disabled_capabilities.iter().any(|c| c == capability_name)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `APP_ACTIONS_CONFIG`, falling back to `app_actions.json`
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> Result<HostConfig> {
        if !self.path.exists() {
            let default = HostConfig::default();
            self.save(&default).await?;
            return Ok(default);
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read config at {:?}", self.path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config at {:?}", self.path))?;
        Ok(config)
    }

    pub async fn save(&self, config: &HostConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write config at {:?}", self.path))?;
        Ok(())
    }
}
