//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/memo/config.toml)
//! 3. Environment variables (MEMO_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::{Criteria, SortField, SortOrder};

/// Environment variable prefix
const ENV_PREFIX: &str = "MEMO";

/// Keys accepted by [`Config::set_value`]
pub const CONFIG_KEYS: [&str; 4] = ["data_dir", "log_file", "sort_field", "sort_order"];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (notes.json, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file path (defaults to `<data_dir>/memo.log`)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Sort field used when a listing does not name one
    #[serde(default)]
    pub sort_field: SortField,

    /// Sort order used when a listing does not name one
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MEMO_DATA_DIR, MEMO_LOG_FILE, MEMO_SORT_FIELD, MEMO_SORT_ORDER)
    /// 2. Config file (~/.config/memo/config.toml or MEMO_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path (e.g. `--config`)
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // MEMO_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // MEMO_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // MEMO_SORT_FIELD / MEMO_SORT_ORDER; unparseable values are ignored
        if let Ok(val) = std::env::var(format!("{}_SORT_FIELD", ENV_PREFIX)) {
            match val.parse() {
                Ok(field) => self.sort_field = field,
                Err(e) => tracing::warn!("Ignoring {}_SORT_FIELD: {}", ENV_PREFIX, e),
            }
        }
        if let Ok(val) = std::env::var(format!("{}_SORT_ORDER", ENV_PREFIX)) {
            match val.parse() {
                Ok(order) => self.sort_order = order,
                Err(e) => tracing::warn!("Ignoring {}_SORT_ORDER: {}", ENV_PREFIX, e),
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key, as `memo config set` does
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "sort_field" => self.sort_field = value.parse()?,
            "sort_order" => self.sort_order = value.parse()?,
            _ => bail!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with MEMO_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("memo")
            .join("config.toml")
    }

    /// Get the path to the note collection
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join("notes.json")
    }

    /// Get the effective log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("memo.log"))
    }

    /// Criteria carrying the configured default sort and no filters
    pub fn default_criteria(&self) -> Criteria {
        Criteria::new().sorted_by(self.sort_field, self.sort_order)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memo")
}
