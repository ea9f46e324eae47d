//! Run configuration.
//!
//! Loaded from a JSON file, with every field defaulted so a missing file is
//! fine. Lookup order:
//! - `FEATURE_SIGNALS_CONFIG` - explicit path to the config file
//! - `<config dir>/feature-signals/config.json`
//!
//! `FEATURE_SIGNALS_REPOSITORY` overrides the repository, and `GITHUB_TOKEN`
//! supplies the API token (never read from the file).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "feature-signals";
const CONFIG_FILE: &str = "config.json";

/// Default location of the standards-position feed.
pub const DEFAULT_POSITIONS_URL: &str =
    "https://web-platform-dx.github.io/web-features-mappings/standards-positions.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub repository holding the tracking issues, as `owner/name`.
    pub repository: String,
    /// Base URL of the GitHub REST API.
    pub api_url: String,
    /// Label carried by every tracking issue.
    pub label: String,
    /// Prefix of the marker comment, as in `<!-- web-features:grid -->`.
    pub marker_prefix: String,
    /// Path to the web-features `data.json`.
    pub catalog_path: PathBuf,
    pub positions_url: String,
    /// Position values that count as opposition.
    pub negative_positions: Vec<String>,
    /// Organizations whose positions are considered. Empty means all.
    pub organizations: Vec<String>,
    pub manifest_path: PathBuf,
    /// Also write the manifest on dry runs. It then lists only issues that
    /// already existed.
    pub write_manifest_in_dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: "web-platform-dx/developer-signals".to_string(),
            api_url: "https://api.github.com".to_string(),
            label: "feature".to_string(),
            marker_prefix: "web-features".to_string(),
            catalog_path: PathBuf::from("node_modules/web-features/data.json"),
            positions_url: DEFAULT_POSITIONS_URL.to_string(),
            negative_positions: vec!["negative".to_string(), "oppose".to_string()],
            organizations: vec!["mozilla".to_string(), "webkit".to_string()],
            manifest_path: PathBuf::from("manifest.json"),
            write_manifest_in_dry_run: false,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("FEATURE_SIGNALS_CONFIG") {
            Some(path) => Some(PathBuf::from(path)),
            None => get_config_path().ok(),
        };

        let mut config = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        if let Ok(repository) = std::env::var("FEATURE_SIGNALS_REPOSITORY") {
            config.repository = repository;
        }
        Ok(config)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// The GitHub token from the environment, if any.
    pub fn token() -> Option<String> {
        std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
