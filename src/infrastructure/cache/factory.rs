//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::CacheSettings;
use crate::domain::cache::{Cache, NamedCache};
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// In-memory cache using moka
    #[default]
    InMemory,
    /// Redis cache
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Type of cache to create
    pub cache_type: CacheType,
    /// Redis URL (required for Redis type)
    pub redis_url: Option<String>,
    /// Key prefix shared by all namespaces (Redis only)
    pub key_prefix: Option<String>,
    /// Default TTL for entries
    pub default_ttl: Duration,
    /// Maximum capacity per namespace (in-memory only)
    pub max_capacity: Option<u64>,
    /// Time to idle (in-memory only)
    pub time_to_idle: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            default_ttl: Duration::from_secs(3600),
            max_capacity: Some(10_000),
            time_to_idle: None,
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration for in-memory cache
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a new configuration for Redis cache
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the maximum capacity (in-memory only)
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Builds the factory configuration from the `cache` section of the app config
    pub fn from_settings(settings: &CacheSettings) -> Result<Self, DomainError> {
        Ok(Self {
            cache_type: settings.backend.parse()?,
            redis_url: settings.redis_url.clone(),
            key_prefix: settings.key_prefix.clone(),
            default_ttl: Duration::from_secs(settings.default_ttl_secs),
            max_capacity: settings.max_capacity,
            time_to_idle: settings.time_to_idle_secs.map(Duration::from_secs),
        })
    }

    fn in_memory_config(&self) -> InMemoryCacheConfig {
        let mut config = InMemoryCacheConfig::default().with_default_ttl(self.default_ttl);

        if let Some(capacity) = self.max_capacity {
            config = config.with_max_capacity(capacity);
        }

        if let Some(tti) = self.time_to_idle {
            config = config.with_time_to_idle(tti);
        }

        config
    }

    fn redis_config(&self) -> Result<RedisCacheConfig, DomainError> {
        let url = self.redis_url.clone().ok_or_else(|| {
            DomainError::configuration("Redis URL is required for Redis cache type")
        })?;

        let mut config = RedisCacheConfig::new(url).with_default_ttl(self.default_ttl);

        if let Some(prefix) = &self.key_prefix {
            config = config.with_key_prefix(prefix.clone());
        }

        Ok(config)
    }
}

/// Factory for creating the shared stores behind named caches
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates one named cache per namespace.
    ///
    /// In-memory namespaces each get their own moka instance. Redis namespaces
    /// share a single connection and are separated by key prefix.
    pub async fn create_named(
        &self,
        config: &CacheConfig,
        namespaces: &[String],
    ) -> Result<Vec<NamedCache>, DomainError> {
        debug!(backend = %config.cache_type, count = namespaces.len(), "Creating named caches");

        match config.cache_type {
            CacheType::InMemory => {
                let in_memory_config = config.in_memory_config();

                Ok(namespaces
                    .iter()
                    .map(|namespace| {
                        let store: Arc<dyn Cache> =
                            Arc::new(InMemoryCache::with_config(in_memory_config.clone()));
                        NamedCache::new(namespace.as_str(), store)
                    })
                    .collect())
            }
            CacheType::Redis => {
                let base = RedisCache::new(config.redis_config()?).await?;

                Ok(namespaces
                    .iter()
                    .map(|namespace| {
                        let store: Arc<dyn Cache> = Arc::new(base.namespaced(namespace.as_str()));
                        NamedCache::new(namespace.as_str(), store)
                    })
                    .collect())
            }
        }
    }
}
