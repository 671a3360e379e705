use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::version::{DottedVersionComparator, VersionComparator};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root of the locale tree, one subdirectory per locale code
    #[serde(default = "default_locale_root")]
    pub locale_root: PathBuf,

    /// Where language pack archives and the availability index are written
    #[serde(default = "default_language_pack_root")]
    pub language_pack_root: PathBuf,

    /// Directory holding `subtitle_counts.json`
    #[serde(default = "default_subtitles_data_root")]
    pub subtitles_data_root: PathBuf,

    /// Static files root, checked for the legacy `srt` directory
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,

    /// Software release the packs are built for
    #[serde(default = "default_software_version")]
    pub software_version: String,

    /// Remote translation service settings
    #[serde(default)]
    pub crowdin: CrowdinConfig,

    /// Subtitle refresh pre-step
    #[serde(default)]
    pub subtitles: SubtitleRefreshConfig,

    /// Catalog compilation
    #[serde(default)]
    pub catalogs: CatalogConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Remote translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrowdinConfig {
    // @field: Project identifier
    #[serde(default = "String::new")]
    pub project_id: String,

    // @field: Project API key
    #[serde(default = "String::new")]
    pub project_key: String,

    // @field: Base URL of the project API
    #[serde(default = "default_crowdin_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Locale to download, or "all"
    #[serde(default = "default_language_filter")]
    pub language_filter: String,
}

impl Default for CrowdinConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            project_key: String::new(),
            endpoint: default_crowdin_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            language_filter: default_language_filter(),
        }
    }
}

/// Configuration for the subtitle refresh pre-step
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SubtitleRefreshConfig {
    /// External commands run in order; `{date}` is replaced by the cutoff date
    #[serde(default)]
    pub refresh_commands: Vec<String>,
}

/// Configuration for compiling message catalogs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Path or name of the msgfmt binary
    #[serde(default = "default_msgfmt_path")]
    pub msgfmt_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            msgfmt_path: default_msgfmt_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_locale_root() -> PathBuf {
    PathBuf::from("locale")
}

fn default_language_pack_root() -> PathBuf {
    PathBuf::from("language_packs")
}

fn default_subtitles_data_root() -> PathBuf {
    PathBuf::from("data/subtitles")
}

fn default_static_root() -> PathBuf {
    PathBuf::from("static")
}

fn default_software_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_crowdin_endpoint() -> String {
    "https://api.crowdin.net/api/project".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_language_filter() -> String {
    "all".to_string()
}

fn default_msgfmt_path() -> String {
    "msgfmt".to_string()
}

impl Config {
    /// Load the configuration from a JSON file, writing a default one first if missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.crowdin.project_id.trim().is_empty() {
            return Err(anyhow!("crowdin.project_id is required"));
        }
        if self.crowdin.project_key.trim().is_empty() {
            return Err(anyhow!("crowdin.project_key is required"));
        }
        if self.crowdin.language_filter.trim().is_empty() {
            return Err(anyhow!("crowdin.language_filter must not be empty (use \"all\")"));
        }
        if self.software_version.trim().is_empty() {
            return Err(anyhow!("software_version is required"));
        }

        // The version must be comparable, or the version policy can never advance
        DottedVersionComparator
            .version_diff(&self.software_version, &self.software_version)
            .with_context(|| format!("Invalid software_version: {}", self.software_version))?;

        if self.locale_root == self.language_pack_root {
            return Err(anyhow!(
                "locale_root and language_pack_root must differ: {}",
                self.locale_root.display()
            ));
        }

        Ok(())
    }

    /// Path of the aggregate availability index
    pub fn availability_index_path(&self) -> PathBuf {
        self.language_pack_root.join(crate::merger::LANGUAGE_PACK_AVAILABILITY_FILENAME)
    }

    /// Path of the subtitle count input file
    pub fn subtitle_counts_path(&self) -> PathBuf {
        self.subtitles_data_root.join(crate::subtitles::SUBTITLE_COUNTS_FILENAME)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            locale_root: default_locale_root(),
            language_pack_root: default_language_pack_root(),
            subtitles_data_root: default_subtitles_data_root(),
            static_root: default_static_root(),
            software_version: default_software_version(),
            crowdin: CrowdinConfig::default(),
            subtitles: SubtitleRefreshConfig::default(),
            catalogs: CatalogConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
