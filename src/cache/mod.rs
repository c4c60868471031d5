//! Cache layer
//!
//! In-process cache (moka) for public catalog and content reads. Entries are
//! stored as JSON so any serializable value can be cached. Services invalidate
//! keys on every mutation of the cached entity.
//!
//! ```rust,ignore
//! use rentmoldova::cache::{create_cache, CacheLayer};
//! use rentmoldova::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("cars:list", &cars, cache.default_ttl()).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache key prefixes shared by services
pub mod keys {
    pub const CARS_LIST: &str = "cars:list:";
    pub const CAR_BY_ID: &str = "cars:id:";
    pub const FAQS: &str = "faqs:";
    pub const BANNERS: &str = "banners:";
    pub const LEGAL: &str = "legal:";
    pub const CONTACTS: &str = "contacts";
}

/// Cache layer trait
///
/// Generic methods make this trait unusable as `dyn CacheLayer`; services
/// hold a concrete `Arc<MemoryCache>`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

/// Shared cache handle
pub type SharedCache = Arc<MemoryCache>;

/// Create the cache from configuration
pub fn create_cache(config: &CacheConfig) -> SharedCache {
    let ttl = Duration::from_secs(config.ttl_seconds);
    Arc::new(MemoryCache::with_capacity_and_ttl(config.max_capacity, ttl))
}
