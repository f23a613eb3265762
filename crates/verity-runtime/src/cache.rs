//! Expiring in-memory caches for search results and articles.
//!
//! Keys are hashed, so callers may pass arbitrarily long strings (full
//! queries, URLs). Entries expire `ttl` after they were stored and are
//! evicted lazily on access or in bulk on insert.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CacheConfig;

/// Slots freed by a single eviction batch when the cache is full.
const EVICTION_HEADROOM: usize = 10;

/// Characters of a key shown in log lines.
const LOG_KEY_CHARS: usize = 50;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    #[serde(serialize_with = "crate::config::duration_str::serialize")]
    pub ttl: Duration,
}

/// A size-bounded key/value store with per-entry time-to-live.
///
/// All operations take a short internal lock and never await, so the cache
/// can be shared freely between concurrent tasks.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<u64, CacheEntry<V>>>,
    ttl: Duration,
    max_size: usize,
    name: &'static str,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_size,
            name,
        }
    }

    pub fn from_config(name: &'static str, config: &CacheConfig) -> Self {
        Self::new(name, config.ttl, config.max_size)
    }

    /// Get a live entry. Expired entries are removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let hashed = hash_key(key);
        let mut entries = self.entries.lock();

        let expired = match entries.get(&hashed) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                tracing::debug!(cache = self.name, key = %log_key(key), "Cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(&hashed);
            tracing::debug!(cache = self.name, key = %log_key(key), "Cache entry expired");
        } else {
            tracing::debug!(cache = self.name, key = %log_key(key), "Cache miss");
        }
        None
    }

    /// Store a value, sweeping expired entries first and evicting the oldest
    /// in a batch when the cache is full.
    pub fn set(&self, key: &str, value: V) {
        if self.max_size == 0 {
            return;
        }

        let hashed = hash_key(key);
        let mut entries = self.entries.lock();

        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        if entries.len() >= self.max_size && !entries.contains_key(&hashed) {
            let target = self.max_size.saturating_sub(EVICTION_HEADROOM);
            let mut by_age: Vec<(u64, Instant)> = entries
                .iter()
                .map(|(k, entry)| (*k, entry.stored_at))
                .collect();
            by_age.sort_by_key(|(_, stored_at)| *stored_at);

            let excess = entries.len().saturating_sub(target);
            for (k, _) in by_age.into_iter().take(excess) {
                entries.remove(&k);
            }
            tracing::debug!(
                cache = self.name,
                evicted = excess,
                remaining = entries.len(),
                "Evicted oldest cache entries"
            );
        }

        entries.insert(
            hashed,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
        tracing::debug!(cache = self.name, key = %log_key(key), "Cached entry");
    }

    /// Number of stored entries, including any not yet swept.
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        tracing::info!(cache = self.name, "Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.size(),
            max_size: self.max_size,
            ttl: self.ttl,
        }
    }
}

fn hash_key(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

pub(crate) fn log_key(key: &str) -> String {
    if key.chars().count() > LOG_KEY_CHARS {
        let prefix: String = key.chars().take(LOG_KEY_CHARS).collect();
        format!("{}...", prefix)
    } else {
        key.to_string()
    }
}
