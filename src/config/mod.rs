//! Configuration management for Tributary.
//!
//! Settings are read from `~/.config/tributary/config.toml` unless a path is given.
//! If the default file doesn't exist, a default configuration with comments is created.
//! The topic list lives in a separate JSON file, see [`topics`].

pub mod topics;

pub use topics::load_topics;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::enrich::geo::DEFAULT_SKIP_LANGUAGES;
use crate::fetcher::parallel::DEFAULT_COLLECTORS;
use crate::pipeline::DEFAULT_ENRICHMENT_WORKERS;

pub const DEFAULT_DAYS_BACK: u32 = 2;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parallel feed fetchers
    pub collectors: usize,
    /// Parallel enrichment workers
    pub enrichment_workers: usize,
    /// Calendar days kept, today included
    pub days_back: u32,
    pub output_dir: PathBuf,
    pub topics_path: PathBuf,
    pub geo: GeoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// GeoNames `cities500.txt`-style file added to the built-in gazetteer
    pub cities_path: Option<PathBuf>,
    /// Languages for which country extraction is skipped
    pub skip_languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collectors: DEFAULT_COLLECTORS,
            enrichment_workers: DEFAULT_ENRICHMENT_WORKERS,
            days_back: DEFAULT_DAYS_BACK,
            output_dir: PathBuf::from("./data"),
            topics_path: PathBuf::from("./config.json"),
            geo: GeoConfig::default(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            cities_path: None,
            skip_languages: DEFAULT_SKIP_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/tributary/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tributary").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Tributary Configuration

# Number of feeds fetched in parallel
collectors = 4

# Number of items enriched in parallel
enrichment_workers = 3

# Calendar days kept per topic, today included
days_back = 2

# Directory receiving one file per topic (its outputFile, else <name>.json)
output_dir = "./data"

# JSON list of topics: [{"name": "...", "sites": ["https://..."], "outputFile": "..."}]
topics_path = "./config.json"

[geo]
# Optional GeoNames dump (tab-separated, cities500.txt layout) extending the built-in places
# cities_path = "./cities500.txt"

# Skip country extraction for titles detected in these languages
skip_languages = ["zh"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse topic list at {path}: {source}")]
    Topics {
        path: PathBuf,
        source: serde_json::Error,
    },
}
