use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Overrides `api_url` from the config file when set.
pub const API_URL_ENV: &str = "TRAVEL_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    /// Base URL of the search API, e.g. "https://localhost:7060/api"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Quiet period before an autocomplete request is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How many page numbers the pager shows at once
    #[serde(default = "default_page_window")]
    pub page_window: u32,
}

fn default_api_url() -> String {
    travel_search::api::DEFAULT_API_URL.to_string()
}

fn default_debounce_ms() -> u64 {
    travel_search::DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_page_window() -> u32 {
    5
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debounce_ms: default_debounce_ms(),
            page_window: default_page_window(),
        }
    }
}

impl TravelConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("travel-search")
            .join("config.toml"))
    }

    /// Load config from the default location, then apply the environment.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Write config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
