//! Application configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::view::PageSize;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot files
    #[serde(default)]
    pub data: DataConfig,

    /// Progress server
    #[serde(default)]
    pub server: ServerConfig,

    /// Table and chart settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Snapshot files opened at start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub snapshots: Vec<PathBuf>,
}

/// Progress endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL (e.g., "http://localhost:5000")
    #[serde(default)]
    pub url: String,

    /// Delay between progress polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// View configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Rows per page: 25, 50, 100 or 0 for all
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Show the chart panel
    #[serde(default = "default_true")]
    pub show_charts: bool,

    /// Records converted per step while loading
    #[serde(default = "default_load_chunk_size")]
    pub load_chunk_size: usize,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_page_size() -> usize {
    50
}

fn default_load_chunk_size() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            show_charts: true,
            load_chunk_size: default_load_chunk_size(),
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("spiffy-tui").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.normalize();
        Ok(config)
    }

    /// Replace out-of-range values with defaults.
    pub fn normalize(&mut self) {
        let valid = PageSize::CHOICES.iter().any(|c| c.value() == self.view.page_size);
        if !valid {
            warn!(
                "Unsupported page size {}, using {}",
                self.view.page_size,
                default_page_size()
            );
            self.view.page_size = default_page_size();
        }

        self.view.load_chunk_size = self.view.load_chunk_size.max(1);
        self.server.poll_interval_ms = self.server.poll_interval_ms.max(100);
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::from_value(self.view.page_size)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.server.poll_interval_ms)
    }

    /// Check if a progress server is configured.
    pub fn has_server(&self) -> bool {
        self.server.url.starts_with("http://") || self.server.url.starts_with("https://")
    }
}
