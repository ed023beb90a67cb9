//! Cache abstractions for result persistence.
//!
//! ```text
//! ResultCache                      <- fail-open wrapper used by every caller
//!   └── Arc<dyn CacheService>
//!         ├── RedisCacheService    <- ConnectionManager-based async Redis
//!         ├── MokaCacheService     <- in-process, per-entry TTL
//!         └── NoOpCacheService     <- always miss, always succeed
//! ```
//!
//! Backends report errors; `ResultCache` swallows them. A store outage
//! degrades every route to "always recompute", never to an error response.

pub mod keys;
pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::CacheConfig;

pub use providers::{MokaCacheService, NoOpCacheService, RedisCacheService};

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to cache backend
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Trait for key-value cache backends.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// `Ok(Some(value))` on hit, `Ok(None)` on miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;
}

/// Backend status reported by the health route.
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub provider: &'static str,
    pub healthy: bool,
}

/// Fail-open cache wrapper.
///
/// `get` never fails (errors become misses) and `set`/`delete` report
/// success as a plain `bool`.
#[derive(Clone)]
pub struct ResultCache {
    backend: Arc<dyn CacheService>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("provider", &self.backend.provider_name())
            .finish()
    }
}

impl ResultCache {
    pub fn new(backend: Arc<dyn CacheService>) -> Self {
        Self { backend }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoOpCacheService::new()))
    }

    /// Build the configured backend, degrading to no-op when Redis is
    /// unreachable. Startup never fails because of the cache.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        match config.backend.as_str() {
            "redis" => match RedisCacheService::from_config(config).await {
                Ok(service) => {
                    info!(backend = "redis", "Cache provider initialized");
                    Self::new(Arc::new(service))
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, caching disabled");
                    Self::disabled()
                }
            },
            "memory" => {
                info!(
                    backend = "memory",
                    max_capacity = config.memory_max_capacity,
                    "Cache provider initialized"
                );
                Self::new(Arc::new(MokaCacheService::new(config.memory_max_capacity)))
            }
            other => {
                info!(backend = other, "Caching disabled by configuration");
                Self::disabled()
            }
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    /// Read a raw value; any backend error is treated as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Cache GET failed, treating as miss");
                None
            }
        }
    }

    /// Write a raw value; returns whether the write landed.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> bool {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache SET failed");
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        match self.backend.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache DEL failed");
                false
            }
        }
    }

    /// Read and deserialize; undecodable entries count as misses.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Cached value is not valid JSON, ignoring");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl).await,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache value");
                false
            }
        }
    }

    pub async fn health(&self) -> CacheHealth {
        let healthy = match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Cache health check failed");
                false
            }
        };
        CacheHealth {
            provider: self.provider_name(),
            healthy,
        }
    }
}
