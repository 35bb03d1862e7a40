//! Configuration module for newsgate.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::news::Source;
use crate::{NewsError, Result};

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "NEWSGATE_DATABASE_URL";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the static web application.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to the static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_static_path() -> String {
    "webapp".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://path/to/file.db` or `postgres://...`).
    #[serde(default = "default_db_url")]
    pub url: String,
    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Enforce one stored item per origin link.
    #[serde(default)]
    pub unique_links: bool,
}

fn default_db_url() -> String {
    "sqlite://data/news.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
            unique_links: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Feed fetcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Maximum number of entries kept from one fetch.
    #[serde(default = "default_max_items")]
    pub max_items_per_fetch: usize,
    /// Maximum item content length in characters.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_items() -> usize {
    100
}

fn default_max_content_length() -> usize {
    10000
}

fn default_user_agent() -> String {
    concat!("newsgate/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            max_items_per_fetch: default_max_items(),
            max_content_length: default_max_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

/// Retry delay strategy applied between poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same interval whether the previous cycle failed or not.
    #[default]
    Fixed,
    /// Interval doubles per consecutive failure, up to `max_backoff_minutes`.
    Exponential,
}

/// One configured feed source.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Feed URL.
    pub url: String,
    /// Poll interval in minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

fn default_interval_minutes() -> u64 {
    5
}

impl SourceConfig {
    /// Convert into a runtime [`Source`].
    pub fn to_source(&self) -> Source {
        Source::new(&self.url, self.interval_minutes)
    }
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Whether the pollers are started at all.
    #[serde(default = "default_ingest_enabled")]
    pub enabled: bool,
    /// Capacity of the item and error channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Delay strategy between cycles.
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Upper bound for the exponential strategy, in minutes.
    #[serde(default = "default_max_backoff_minutes")]
    pub max_backoff_minutes: u64,
    /// Feed sources.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_ingest_enabled() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    16
}

fn default_max_backoff_minutes() -> u64 {
    60
}

impl IngestConfig {
    /// Runtime sources in configuration order.
    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().map(SourceConfig::to_source).collect()
    }

    /// Upper bound for the exponential strategy.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_minutes * 60)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: default_ingest_enabled(),
            channel_capacity: default_channel_capacity(),
            backoff: BackoffKind::default(),
            max_backoff_minutes: default_max_backoff_minutes(),
            sources: vec![],
        }
    }
}

/// Content filter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Remote check endpoint. The local word list is used when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Timeout for the remote check in seconds.
    #[serde(default = "default_filter_timeout")]
    pub timeout_secs: u64,
    /// Words refused by the local filter.
    #[serde(default = "default_forbidden_words")]
    pub forbidden_words: Vec<String>,
}

fn default_filter_timeout() -> u64 {
    5
}

fn default_forbidden_words() -> Vec<String> {
    vec!["qwerty".to_string(), "йцукен".to_string(), "zxcvbn".to_string()]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_filter_timeout(),
            forbidden_words: default_forbidden_words(),
        }
    }
}

/// Comment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentsConfig {
    /// Maximum comment length in characters.
    #[serde(default = "default_comment_max_length")]
    pub max_length: usize,
}

fn default_comment_max_length() -> usize {
    2000
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            max_length: default_comment_max_length(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Feed fetcher configuration.
    #[serde(default)]
    pub fetcher: FetcherConfig,
    /// Ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Content filter configuration.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Comment configuration.
    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NewsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NewsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEWSGATE_DATABASE_URL`: Override the database connection URL
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.channel_capacity == 0 {
            return Err(NewsError::Config(
                "ingest.channel_capacity must be greater than zero".to_string(),
            ));
        }
        for source in &self.ingest.sources {
            if source.url.trim().is_empty() {
                return Err(NewsError::Config("feed source with empty url".to_string()));
            }
            if source.interval_minutes == 0 {
                return Err(NewsError::Config(format!(
                    "feed source {} has a zero poll interval",
                    source.url
                )));
            }
        }
        if self.database.max_connections == 0 {
            return Err(NewsError::Config(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
