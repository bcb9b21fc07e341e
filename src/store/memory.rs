use crate::core::cache::{
    Cache, CacheStats, DEFAULT_MAX_ENTRY_BYTES, DEFAULT_TTL, KeyStats,
};
use crate::core::clock::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
    size_bytes: usize,
}

struct Slot<V> {
    entry: Option<CacheEntry<V>>,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            entry: None,
            hits: 0,
            misses: 0,
            invalidations: 0,
        }
    }
}

/// In-memory TTL cache with a per-entry size ceiling and hit/miss accounting.
///
/// All state sits behind one mutex, so an entry's payload, timestamp and size
/// always change together.
pub struct MemoryCache<V> {
    ttl: Duration,
    max_entry_bytes: usize,
    clock: Arc<dyn Clock>,
    inner: Mutex<HashMap<String, Slot<V>>>,
}

impl<V> MemoryCache<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    /// Creates a cache with the default 5 minute TTL and 10 MiB ceiling.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_MAX_ENTRY_BYTES, Arc::new(SystemClock))
    }

    pub fn with_limits(ttl: Duration, max_entry_bytes: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entry_bytes,
            clock,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-registers keys so they show up in statistics before first use.
    pub async fn register(&self, keys: &[&str]) {
        let mut slots = self.inner.lock().await;
        for key in keys {
            slots.entry(key.to_string()).or_insert_with(Slot::default);
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        let age = self.clock.now() - entry.created_at;
        // A clock that went backwards counts as fresh.
        age.to_std().map_or(true, |age| age < self.ttl)
    }

    /// Approximate in-memory footprint, measured as the JSON encoding length.
    fn payload_size(value: &V) -> usize {
        serde_json::to_vec(value).map_or(usize::MAX, |bytes| bytes.len())
    }
}

impl<V> Default for MemoryCache<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let mut slots = self.inner.lock().await;
        let slot = slots.entry(key.to_string()).or_insert_with(Slot::default);
        match &slot.entry {
            Some(entry) if self.is_fresh(entry) => {
                slot.hits += 1;
                debug!("Cache HIT for key: {key}");
                Some(entry.value.clone())
            }
            Some(_) => {
                slot.misses += 1;
                debug!("Cache entry expired for key: {key}");
                None
            }
            None => {
                slot.misses += 1;
                debug!("Cache MISS for key: {key}");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: V) -> bool {
        let size_bytes = Self::payload_size(&value);
        if size_bytes > self.max_entry_bytes {
            warn!(
                "Cache data for '{key}' ({:.2} MB) exceeds max size. Not caching.",
                size_bytes as f64 / 1024.0 / 1024.0
            );
            return false;
        }

        let created_at = self.clock.now();
        let mut slots = self.inner.lock().await;
        let slot = slots.entry(key.to_string()).or_insert_with(Slot::default);
        slot.entry = Some(CacheEntry {
            value,
            created_at,
            size_bytes,
        });
        debug!(
            "Cache PUT for key: {key} ({:.2} KB)",
            size_bytes as f64 / 1024.0
        );
        true
    }

    async fn invalidate(&self, key: &str) {
        let mut slots = self.inner.lock().await;
        let slot = slots.entry(key.to_string()).or_insert_with(Slot::default);
        slot.entry = None;
        slot.invalidations += 1;
        debug!("Cache INVALIDATE for key: {key}");
    }

    async fn stats(&self) -> CacheStats {
        let slots = self.inner.lock().await;
        let keys = slots
            .iter()
            .map(|(key, slot)| {
                let requests = slot.hits + slot.misses;
                let hit_rate = if requests > 0 {
                    slot.hits as f64 / requests as f64
                } else {
                    0.0
                };
                let size_bytes = slot.entry.as_ref().map_or(0, |e| e.size_bytes);
                (
                    key.clone(),
                    KeyStats {
                        hits: slot.hits,
                        misses: slot.misses,
                        invalidations: slot.invalidations,
                        hit_rate,
                        cached: slot.entry.is_some(),
                        size_kb: size_bytes as f64 / 1024.0,
                    },
                )
            })
            .collect();

        CacheStats {
            ttl_seconds: self.ttl.as_secs(),
            max_entry_mb: self.max_entry_bytes as f64 / 1024.0 / 1024.0,
            keys,
        }
    }
}
