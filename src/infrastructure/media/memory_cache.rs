//! In-memory LRU media cache implementation.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CacheKey, Media};
use crate::domain::ports::MediaCachePort;
use crate::infrastructure::config::CacheConfig;

/// Default maximum number of decoded media entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Default ceiling on decoded bytes held by the cache.
pub const DEFAULT_MAX_COST_BYTES: usize = 256 * 1024 * 1024;

struct Entries {
    lru: LruCache<CacheKey, Media>,
    total_cost: usize,
}

impl Entries {
    fn pop_lru(&mut self) -> Option<CacheKey> {
        let (key, media) = self.lru.pop_lru()?;
        self.total_cost = self.total_cost.saturating_sub(media.cost_bytes());
        Some(key)
    }
}

/// In-memory LRU cache for decoded media, bounded by entry count and by the
/// total size of decoded pixels.
pub struct MemoryMediaCache {
    entries: Mutex<Entries>,
    max_cost_bytes: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryMediaCache {
    /// Creates a new cache with the specified bounds.
    #[must_use]
    pub fn new(capacity: usize, max_cost_bytes: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(cap),
                total_cost: 0,
            }),
            max_cost_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default bounds.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_COST_BYTES)
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.max_cost_bytes)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let entries = self.entries.lock();
        CacheStats {
            hits,
            misses,
            hit_rate,
            evictions: self.evictions.load(Ordering::Relaxed),
            size: entries.lru.len(),
            cost_bytes: entries.total_cost,
        }
    }

    /// Peeks at an entry without promoting it in the LRU.
    pub fn peek(&self, key: &CacheKey) -> Option<Media> {
        self.entries.lock().lru.peek(key).cloned()
    }

    /// Returns the decoded bytes currently held.
    #[must_use]
    pub fn cost_bytes(&self) -> usize {
        self.entries.lock().total_cost
    }
}

impl Default for MemoryMediaCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryMediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMediaCache")
            .field("max_cost_bytes", &self.max_cost_bytes)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Entries dropped to respect the bounds.
    pub evictions: u64,
    /// Current number of cached entries.
    pub size: usize,
    /// Decoded bytes currently held.
    pub cost_bytes: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} entries ({} KiB), {:.1}% hit rate ({} hits, {} misses, {} evicted)",
            self.size,
            self.cost_bytes / 1024,
            self.hit_rate,
            self.hits,
            self.misses,
            self.evictions
        )
    }
}

impl MediaCachePort for MemoryMediaCache {
    fn get(&self, key: &CacheKey) -> Option<Media> {
        let mut entries = self.entries.lock();
        if let Some(media) = entries.lru.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(media.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    fn put(&self, key: CacheKey, media: Media) -> Media {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.lru.get(&key) {
            trace!(key = %key, "Keeping media already cached");
            return existing.clone();
        }

        let cost = media.cost_bytes();
        if cost > self.max_cost_bytes {
            debug!(key = %key, cost, "Media too large to cache");
            return media;
        }

        while entries.total_cost + cost > self.max_cost_bytes {
            let Some(evicted) = entries.pop_lru() else {
                break;
            };
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %evicted, "Evicted media to stay within cost bound");
        }

        debug!(key = %key, cost, "Storing media in memory cache");
        if let Some((evicted, old)) = entries.lru.push(key, media.clone()) {
            entries.total_cost = entries.total_cost.saturating_sub(old.cost_bytes());
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %evicted, "Evicted media to stay within capacity");
        }
        entries.total_cost += cost;
        media
    }

    fn evict(&self, key: &CacheKey) {
        let mut entries = self.entries.lock();
        if let Some(media) = entries.lru.pop(key) {
            entries.total_cost = entries.total_cost.saturating_sub(media.cost_bytes());
            debug!(key = %key, "Evicted media from memory cache");
        }
    }

    fn len(&self) -> usize {
        self.entries.lock().lru.len()
    }

    fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.lru.clear();
        entries.total_cost = 0;
        debug!("Cleared memory media cache");
    }
}
