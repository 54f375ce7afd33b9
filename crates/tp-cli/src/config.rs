//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tp_core::{DEFAULT_MAX_SUGGESTIONS, FreeBlockConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Path to the JSON file of busy intervals read by `free` and `suggest --clamp`.
    pub calendar_path: PathBuf,
    /// Minutes assumed available when `suggest` gets no `--minutes`.
    pub default_minutes: i64,
    /// Suggestions shown when `suggest` gets no `--max`.
    pub max_suggestions: usize,
    /// Length of the default `free` window.
    pub window_hours: i64,
    /// Shortest inner or trailing gap reported as a free block.
    pub min_gap_minutes: i64,
    /// Coalesce overlapping busy intervals before looking for gaps.
    pub merge_overlapping: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let free_blocks = FreeBlockConfig::default();
        Self {
            database_path: data_dir.join("tp.db"),
            calendar_path: data_dir.join("calendar.json"),
            default_minutes: 30,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            window_hours: 12,
            min_gap_minutes: free_blocks.min_gap_minutes,
            merge_overlapping: free_blocks.merge_overlapping,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/tp/config.toml`, `config_path`,
    /// then `TP_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TP_"));

        figment.extract()
    }

    /// Free-block calculator options taken from this configuration.
    pub const fn free_blocks(&self) -> FreeBlockConfig {
        FreeBlockConfig {
            min_gap_minutes: self.min_gap_minutes,
            merge_overlapping: self.merge_overlapping,
        }
    }
}

/// Returns the platform-specific config directory for tp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tp"))
}

/// Returns the platform-specific data directory for tp.
///
/// On Linux: `~/.local/share/tp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tp"))
}
