//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::hallticket::MAX_RANGE_SPAN;

/// Fallback Redis URL for local development.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Key-value store settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Time-to-live for each family of cache entries
    #[serde(default)]
    pub ttl: TtlConfig,

    /// Bulk range fetch limits
    #[serde(default)]
    pub bulk: BulkConfig,

    /// Result portal location and scraping behavior
    #[serde(default)]
    pub portal: PortalConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// `REDISURL` wins over `REDIS_URL`; `RESULT_SERVER_BIND` replaces the
    /// bind address. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("REDISURL").or_else(|| non_empty("REDIS_URL")) {
            self.cache.url = Some(url);
        }
        if let Some(bind) = non_empty("RESULT_SERVER_BIND") {
            self.server.bind_address = bind;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.portal.user_agent.trim().is_empty() {
            return Err(AppError::validation("portal.user_agent is empty"));
        }
        if self.portal.timeout_secs == 0 {
            return Err(AppError::validation("portal.timeout_secs must be > 0"));
        }
        if self.portal.max_concurrent == 0 {
            return Err(AppError::validation("portal.max_concurrent must be > 0"));
        }
        url::Url::parse(&self.portal.base_url)?;
        if self.server.request_timeout_ms == 0 {
            return Err(AppError::validation(
                "server.request_timeout_ms must be > 0",
            ));
        }
        if self.bulk.max_span == 0 || self.bulk.max_span > MAX_RANGE_SPAN {
            return Err(AppError::validation(format!(
                "bulk.max_span must be between 1 and {MAX_RANGE_SPAN}"
            )));
        }
        if !matches!(self.cache.backend.as_str(), "redis" | "memory" | "none") {
            return Err(AppError::validation(format!(
                "cache.backend '{}' is not one of redis, memory, none",
                self.cache.backend
            )));
        }
        if self.cache.connect_timeout_secs == 0 || self.cache.operation_timeout_ms == 0 {
            return Err(AppError::validation("cache timeouts must be > 0"));
        }
        let ttl = &self.ttl;
        if [
            ttl.result_secs,
            ttl.all_results_secs,
            ttl.bulk_secs,
            ttl.listing_secs,
        ]
        .contains(&0)
        {
            return Err(AppError::validation("ttl values must be > 0"));
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Whole-request timeout in milliseconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            request_timeout_ms: defaults::request_timeout(),
        }
    }
}

/// Key-value store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend name: `redis`, `memory` or `none`
    #[serde(default = "defaults::cache_backend")]
    pub backend: String,

    /// Redis connection URL (falls back to localhost)
    #[serde(default)]
    pub url: Option<String>,

    /// Entry limit for the in-memory backend
    #[serde(default = "defaults::memory_max_capacity")]
    pub memory_max_capacity: u64,

    /// Give up connecting to Redis at startup after this many seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-command deadline in milliseconds
    #[serde(default = "defaults::operation_timeout")]
    pub operation_timeout_ms: u64,
}

impl CacheConfig {
    /// Redis URL to connect to.
    pub fn redis_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: defaults::cache_backend(),
            url: None,
            memory_max_capacity: defaults::memory_max_capacity(),
            connect_timeout_secs: defaults::connect_timeout(),
            operation_timeout_ms: defaults::operation_timeout(),
        }
    }
}

/// Cache lifetimes in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlConfig {
    /// Single results, plain or with SGPA
    #[serde(default = "defaults::result_ttl")]
    pub result_secs: u64,

    /// All results across every exam period
    #[serde(default = "defaults::all_results_ttl")]
    pub all_results_secs: u64,

    /// Bulk aggregate and its loading placeholder
    #[serde(default = "defaults::bulk_ttl")]
    pub bulk_secs: u64,

    /// Exam listings and notifications
    #[serde(default = "defaults::listing_ttl")]
    pub listing_secs: u64,
}

impl TtlConfig {
    pub fn result(&self) -> Duration {
        Duration::from_secs(self.result_secs)
    }

    pub fn all_results(&self) -> Duration {
        Duration::from_secs(self.all_results_secs)
    }

    pub fn bulk(&self) -> Duration {
        Duration::from_secs(self.bulk_secs)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_secs(self.listing_secs)
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            result_secs: defaults::result_ttl(),
            all_results_secs: defaults::all_results_ttl(),
            bulk_secs: defaults::bulk_ttl(),
            listing_secs: defaults::listing_ttl(),
        }
    }
}

/// Bulk range fetch limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Largest accepted `end - start` between two hallticket suffixes
    #[serde(default = "defaults::max_span")]
    pub max_span: u32,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_span: defaults::max_span(),
        }
    }
}

/// Result portal location and scraping behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal origin, e.g. `http://results.jntuh.ac.in`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Page listing every published examination
    #[serde(default = "defaults::listing_path")]
    pub listing_path: String,

    /// Endpoint rendering a single result
    #[serde(default = "defaults::result_path")]
    pub result_path: String,

    /// Page listing notifications
    #[serde(default = "defaults::notifications_path")]
    pub notifications_path: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent result page requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Degree used when a route does not name one
    #[serde(default = "defaults::default_degree")]
    pub default_degree: String,

    /// Regulation fetched by the all-results route
    #[serde(default = "defaults::all_results_regulation")]
    pub all_results_regulation: String,

    /// CSS selectors for the listing and notification pages
    #[serde(default)]
    pub selectors: PortalSelectors,
}

impl PortalConfig {
    /// Absolute URL for a portal path.
    pub fn url(&self, path: &str) -> Result<url::Url> {
        Ok(url::Url::parse(&self.base_url)?.join(path)?)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listing_path: defaults::listing_path(),
            result_path: defaults::result_path(),
            notifications_path: defaults::notifications_path(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            default_degree: defaults::default_degree(),
            all_results_regulation: defaults::all_results_regulation(),
            selectors: PortalSelectors::default(),
        }
    }
}

/// CSS selectors for the listing and notification pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSelectors {
    #[serde(default = "defaults::row_selector")]
    pub listing_row: String,
    #[serde(default = "defaults::link_selector")]
    pub listing_link: String,
    #[serde(default = "defaults::date_selector")]
    pub listing_date: String,
    #[serde(default = "defaults::row_selector")]
    pub notification_row: String,
    #[serde(default = "defaults::link_selector")]
    pub notification_link: String,
    #[serde(default = "defaults::date_selector")]
    pub notification_date: String,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            listing_row: defaults::row_selector(),
            listing_link: defaults::link_selector(),
            listing_date: defaults::date_selector(),
            notification_row: defaults::row_selector(),
            notification_link: defaults::link_selector(),
            notification_date: defaults::date_selector(),
        }
    }
}

mod defaults {
    use crate::models::hallticket::MAX_RANGE_SPAN;

    // Server defaults
    pub fn bind_address() -> String {
        "0.0.0.0:5000".into()
    }
    pub fn request_timeout() -> u64 {
        30_000
    }

    // Cache defaults
    pub fn cache_backend() -> String {
        "redis".into()
    }
    pub fn memory_max_capacity() -> u64 {
        10_000
    }
    pub fn connect_timeout() -> u64 {
        5
    }
    pub fn operation_timeout() -> u64 {
        2_000
    }
    pub fn result_ttl() -> u64 {
        30 * 60
    }
    pub fn all_results_ttl() -> u64 {
        3 * 60 * 60
    }
    pub fn bulk_ttl() -> u64 {
        10 * 60
    }
    pub fn listing_ttl() -> u64 {
        30 * 60
    }
    pub fn max_span() -> u32 {
        MAX_RANGE_SPAN
    }

    // Portal defaults
    pub fn base_url() -> String {
        "http://results.jntuh.ac.in".into()
    }
    pub fn listing_path() -> String {
        "/jsp/home.jsp".into()
    }
    pub fn result_path() -> String {
        "/resultAction".into()
    }
    pub fn notifications_path() -> String {
        "/jsp/notifications.jsp".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; result-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn default_degree() -> String {
        "btech".into()
    }
    pub fn all_results_regulation() -> String {
        "R18".into()
    }

    // Selector defaults
    pub fn row_selector() -> String {
        "table tr".into()
    }
    pub fn link_selector() -> String {
        "a".into()
    }
    pub fn date_selector() -> String {
        "td:last-child".into()
    }
}
