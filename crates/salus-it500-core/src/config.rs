//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds
//! the portal username, the device id and client tuning knobs.
//!
//! Configuration is stored at `~/.config/salus-it500/config.json`.
//! `SALUS_USERNAME` and `SALUS_DEVICE_ID` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ClientOptions, DEFAULT_BASE_URL, MAX_ATTEMPTS};

/// Application name used for the config directory path
const APP_NAME: &str = "salus-it500";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_USERNAME: &str = "SALUS_USERNAME";
pub const ENV_PASSWORD: &str = "SALUS_PASSWORD";
pub const ENV_DEVICE_ID: &str = "SALUS_DEVICE_ID";

/// Poll every 10 minutes, as often as the portal's own page refreshes.
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 600;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: Option<String>,
    pub device_id: Option<String>,
    pub thermostat_name: Option<String>,
    pub water_heater_name: Option<String>,
    pub base_url: String,
    pub scan_interval_secs: u64,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            device_id: None,
            thermostat_name: None,
            water_heater_name: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `SALUS_USERNAME` / `SALUS_DEVICE_ID` from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_USERNAME).ok(),
            std::env::var(ENV_DEVICE_ID).ok(),
        );
    }

    fn apply_overrides(&mut self, username: Option<String>, device_id: Option<String>) {
        if let Some(username) = username.filter(|u| !u.trim().is_empty()) {
            self.username = Some(username);
        }
        if let Some(device_id) = device_id.filter(|d| !d.trim().is_empty()) {
            self.device_id = Some(device_id);
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_attempts: MAX_ATTEMPTS,
        }
    }
}
