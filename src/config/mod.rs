//! Configuration for the suggestion engine.
//!
//! All settings have sensible defaults and can be loaded from a TOML file.
//!
//! # Example
//!
//! ```
//! use queryquill::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.max_cache_size, 10);
//! assert_eq!(config.max_depth, 5);
//!
//! let custom = Config {
//!     max_depth: 8,
//!     ..Config::default()
//! };
//! assert_eq!(custom.max_depth, 8);
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration.
///
/// # Fields
///
/// * `max_cache_size` - Number of parsed documents kept in the LRU cache (default: 10)
/// * `max_depth` - Depth bound for path-catalog extraction (default: 5)
/// * `debounce_ms` - Suggested keystroke debounce for callers (default: 1000)
/// * `max_suggestions` - Cap on returned suggestions (default: 10)
/// * `enable_pipe_functions` - Offer pipe-function completions (default: true)
/// * `enable_filters` - Offer filter completions (default: true)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of parsed documents kept in the LRU cache
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,

    /// Depth bound for path-catalog extraction
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Suggested keystroke debounce in milliseconds.
    /// A caller-side hint to throttle invocation rate, not a cancellation
    /// mechanism; the engine never sleeps.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Cap on the number of suggestions returned per call
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Offer pipe-function completions
    #[serde(default = "default_enable_pipe_functions")]
    pub enable_pipe_functions: bool,

    /// Offer filter completions
    #[serde(default = "default_enable_filters")]
    pub enable_filters: bool,
}

/// Returns the default document-cache capacity.
fn default_max_cache_size() -> usize {
    10
}

/// Returns the default extraction depth bound.
fn default_max_depth() -> usize {
    5
}

/// Returns the default debounce hint.
fn default_debounce_ms() -> u64 {
    1000
}

/// Returns the default suggestion cap.
fn default_max_suggestions() -> usize {
    10
}

/// Returns the default for pipe-function completions.
fn default_enable_pipe_functions() -> bool {
    true
}

/// Returns the default for filter completions.
fn default_enable_filters() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_size: default_max_cache_size(),
            max_depth: default_max_depth(),
            debounce_ms: default_debounce_ms(),
            max_suggestions: default_max_suggestions(),
            enable_pipe_functions: default_enable_pipe_functions(),
            enable_filters: default_enable_filters(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/queryquill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("queryquill");
            path.push("config.toml");
            path
        })
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Loads the user configuration, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}
