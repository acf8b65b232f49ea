//! Configuration for LocalWrite, loaded from `config.toml`.
//!
//! A content directory is configured by the nearest `.localwrite/config.toml`
//! in it or an ancestor, else by `localwrite/config.toml` under the user's
//! config directory. `--config` on the command line replaces both, and the
//! embedded defaults apply when nothing is found.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Per-project configuration directory name.
pub const DOT_DIR: &str = ".localwrite";

const CONFIG_FILE: &str = "config.toml";

/// The config file that applies to `content_dir`, if any exists.
pub fn discover_config_path(content_dir: &Path) -> Option<PathBuf> {
    let project = content_dir
        .ancestors()
        .map(|dir| dir.join(DOT_DIR).join(CONFIG_FILE))
        .find(|path| path.is_file());
    if let Some(path) = project {
        tracing::info!(path = %path.display(), "using project config");
        return Some(path);
    }

    let user = dirs::config_dir()
        .map(|dir| dir.join("localwrite").join(CONFIG_FILE))
        .filter(|path| path.is_file());
    match &user {
        Some(path) => tracing::info!(path = %path.display(), "using user config"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    user
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub editor: EditorConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Quiet period after the last edit before the file is written.
    pub save_debounce_ms: u64,
    /// Whether block shortcuts fire while typing.
    pub autoformat: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 1000,
            autoformat: true,
        }
    }
}

impl EditorConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Minimum time between two automatic snapshots of a file.
    pub auto_save_interval_secs: u64,
    pub recent_versions: usize,
    pub daily_window_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            auto_save_interval_secs: 600,
            recent_versions: 10,
            daily_window_days: 10,
        }
    }
}

impl HistoryConfig {
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration with priority: CLI override > discovered path > defaults.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    /// Discover the config for a content directory and load it.
    pub fn for_content_dir(content_dir: &Path, cli_override: Option<&Path>) -> Result<Self> {
        let discovered = discover_config_path(content_dir);
        Self::load_with_overrides(cli_override, discovered.as_deref())
    }

    fn load_embedded() -> Result<Self> {
        let source = include_str!("../../config.toml");
        toml::from_str(source).context("Failed to parse embedded config.toml")
    }
}
