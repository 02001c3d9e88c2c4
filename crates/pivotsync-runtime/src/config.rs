use crate::{Error, Result};
use pivotsync_types::AggregationType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. PIVOTSYNC_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
/// 4. ~/.pivotsync/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("PIVOTSYNC_CONFIG") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("pivotsync").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".pivotsync").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_numeric_aggregation() -> AggregationType {
    AggregationType::Sum
}

fn default_text_aggregation() -> AggregationType {
    AggregationType::Count
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Quiet period after the last qualifying selection change before the
    /// region detail is fetched.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SelectionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Aggregation given to a numeric field entering the values zone.
    #[serde(default = "default_numeric_aggregation")]
    pub numeric_aggregation: AggregationType,
    /// Aggregation given to a text field entering the values zone.
    #[serde(default = "default_text_aggregation")]
    pub text_aggregation: AggregationType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            numeric_aggregation: default_numeric_aggregation(),
            text_aggregation: default_text_aggregation(),
        }
    }
}

impl EditorConfig {
    pub fn default_aggregation(&self, is_numeric: bool) -> AggregationType {
        if is_numeric {
            self.numeric_aggregation
        } else {
            self.text_aggregation
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrillThroughConfig {
    #[serde(default)]
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub drill_through: DrillThroughConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        resolve_config_path(None)
    }
}
