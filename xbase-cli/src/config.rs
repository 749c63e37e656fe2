//! Configuration file for the `xbase` command
//!
//! ```toml
//! encoding = "windows-1252"
//! log_level = "info"
//! limit = 50
//! show_deleted = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings read from the TOML config file; flags override them
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Text encoding name, or "auto" to follow the table's code page mark
    pub encoding: String,
    pub log_level: String,
    /// Maximum rows printed by `rows`
    pub limit: Option<u32>,
    pub show_deleted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            encoding: "auto".to_string(),
            log_level: "warn".to_string(),
            limit: None,
            show_deleted: false,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text)
    }
}
