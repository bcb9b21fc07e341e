//! Keyed dataset cache abstraction and its statistics.
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 10 * 1024 * 1024;

/// A TTL cache of whole datasets keyed by name.
///
/// Every `get` counts as either a hit or a miss. `set` may refuse oversized
/// payloads, in which case the previous entry stays as it was.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    /// Stores `value`, returning `false` if it was too large to cache.
    async fn set(&self, key: &str, value: V) -> bool;

    /// Drops the payload for `key`. Call after every write to the
    /// underlying dataset.
    async fn invalidate(&self, key: &str);

    async fn stats(&self) -> CacheStats;
}

/// Counters for one cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    /// hits / (hits + misses), 0 when the key was never read.
    pub hit_rate: f64,
    pub cached: bool,
    pub size_kb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub ttl_seconds: u64,
    pub max_entry_mb: f64,
    pub keys: BTreeMap<String, KeyStats>,
}

impl CacheStats {
    /// Folds another cache's per-key counters into this report.
    pub fn merge(mut self, other: CacheStats) -> Self {
        self.keys.extend(other.keys);
        self
    }
}
