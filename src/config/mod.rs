//! Configuration management for the toplists scraper
//!
//! Configuration comes from built-in defaults, an optional TOML file and
//! `TOPLISTS_*` environment variable overrides, in that order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::retry::RetryPolicy;

/// Public results site the toplists are scraped from
pub const DEFAULT_BASE_URL: &str = "https://worldathletics.org";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scraper configuration
    pub scraper: ScraperConfig,

    /// Retry policy for page requests
    pub retry: RetryPolicy,

    /// Input and output locations
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scraper-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Scheme and host of the results site
    pub base_url: String,

    /// Worker pool width (jobs running at once)
    pub workers: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Pause after each successful page, in milliseconds
    pub page_pause_ms: u64,

    /// Global request cap across all workers (requests per second, 0 = uncapped)
    pub rate_limit: u32,

    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,

    /// Skip jobs whose output file already exists and is non-empty
    pub skip_existing: bool,
}

/// Filesystem layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Discipline mapping document
    pub options_file: PathBuf,

    /// Root for per-job CSVs (`<root>/<gender>/...`)
    pub scrape_root: PathBuf,

    /// Per-(gender, type, discipline) combined CSVs
    pub combined_dir: PathBuf,

    /// Merged and split datasets
    pub datasets_dir: PathBuf,

    /// Root for dated error logs
    pub log_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workers: 30,
            request_timeout_secs: 10,
            page_pause_ms: 200,
            rate_limit: 0,
            accept_invalid_certs: false,
            skip_existing: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            options_file: PathBuf::from("options.json"),
            scrape_root: PathBuf::from("processing/output"),
            combined_dir: PathBuf::from("processing/combined"),
            datasets_dir: PathBuf::from("datasets"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from a file (if given) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides();
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
        }

        if let Ok(base_url) = std::env::var("TOPLISTS_BASE_URL") {
            self.scraper.base_url = base_url;
        }
        if let Some(workers) = var("TOPLISTS_WORKERS") {
            self.scraper.workers = workers;
        }
        if let Some(timeout) = var("TOPLISTS_REQUEST_TIMEOUT") {
            self.scraper.request_timeout_secs = timeout;
        }
        if let Some(pause) = var("TOPLISTS_PAGE_PAUSE_MS") {
            self.scraper.page_pause_ms = pause;
        }
        if let Some(rate) = var("TOPLISTS_RATE_LIMIT") {
            self.scraper.rate_limit = rate;
        }
        if let Some(attempts) = var("TOPLISTS_MAX_ATTEMPTS") {
            self.retry.max_attempts = attempts;
        }
        if let Ok(path) = std::env::var("TOPLISTS_OPTIONS_FILE") {
            self.paths.options_file = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("TOPLISTS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TOPLISTS_LOG_FORMAT") {
            self.logging.format = format;
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scraper.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be greater than 0");
        }

        if self.scraper.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }

        url::Url::parse(&self.scraper.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.scraper.base_url))?;

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper.request_timeout_secs)
    }

    /// Get the inter-page pause as Duration
    #[must_use]
    pub fn page_pause(&self) -> Duration {
        Duration::from_millis(self.scraper.page_pause_ms)
    }
}
