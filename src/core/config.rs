use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::system_monitor::history::DEFAULT_HISTORY_SIZE;
use crate::core::system_monitor::AlertConfiguration;
use crate::error::MonitorError;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub refresh_interval_ms: u64,
    pub history_size: usize,
    pub thresholds: AlertConfiguration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            history_size: DEFAULT_HISTORY_SIZE,
            thresholds: AlertConfiguration::default(),
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    ///
    /// A missing, empty or unreadable file yields the defaults.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("{:#}, using default settings", e);
                return Self::default();
            }
        };

        if !config_path.exists() {
            return Self::default();
        }

        Self::load_from(&config_path).unwrap_or_else(|e| {
            log::warn!("{:#}, using default settings", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write settings file: {:?}", path))?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hostpulse").join("settings.json"))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(MonitorError::invalid_configuration(
                "refresh interval must be greater than zero",
            ));
        }
        if self.history_size == 0 {
            return Err(MonitorError::invalid_configuration(
                "history size must be greater than zero",
            ));
        }
        Ok(())
    }
}
