//! Configuration loading and types

use std::path::{Path, PathBuf};

use pkgtrail_pkg::apt::DEFAULT_DPKG_INFO_DIR;
use pkgtrail_pkg::pip::DEFAULT_PYTHON;
use serde::{Deserialize, Serialize};

use crate::cli::ManagerChoice;
use crate::output::OutputFormat;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "PKGTRAIL_CONFIG";

/// Top-level configuration for pkgtrail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error) when neither `-v` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Defaults for report flags
    #[serde(default)]
    pub report: ReportConfig,
    /// Where collectors look for tools and files
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            report: ReportConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

/// Defaults used when the matching CLI flag is absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub manager: ManagerChoice,
    #[serde(default)]
    pub format: OutputFormat,
    /// 0 or negative means unlimited
    #[serde(default)]
    pub limit: i64,
    /// Display timestamps in UTC instead of local time
    #[serde(default)]
    pub utc: bool,
}

/// Collector inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Directory holding dpkg's `<pkg>.list` files
    #[serde(default = "default_dpkg_info_dir")]
    pub dpkg_info_dir: PathBuf,
    /// Directory holding `cargo install` binaries; resolved from `CARGO_HOME` when unset
    #[serde(default)]
    pub cargo_bin_dir: Option<PathBuf>,
    /// Python interpreter whose pip is queried
    #[serde(default = "default_python")]
    pub python: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dpkg_info_dir: default_dpkg_info_dir(),
            cargo_bin_dir: None,
            python: default_python(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_dpkg_info_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DPKG_INFO_DIR)
}

fn default_python() -> String {
    DEFAULT_PYTHON.to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| eyre::eyre!("failed to parse {}: {e}", path.display()))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration TOML
    pub fn parse(content: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from an explicit path, `PKGTRAIL_CONFIG`, or the default locations
    ///
    /// # Errors
    /// Returns error if a config file was found but could not be loaded
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }

        let paths = [
            Some(PathBuf::from("pkgtrail.toml")),
            dirs::config_dir().map(|p| p.join("pkgtrail").join("pkgtrail.toml")),
        ];

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }
}
