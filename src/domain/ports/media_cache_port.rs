//! Port definition for the shared decoded-media cache.

use crate::domain::entities::{CacheKey, Media};

/// Process-wide store of decoded media, shared by all media views.
///
/// Implementations must be thread-safe and may evict entries at any time.
/// While an entry is present, every read for its key returns the same
/// decoded object.
pub trait MediaCachePort: Send + Sync {
    /// Returns the cached media for `key`. Never produces media.
    fn get(&self, key: &CacheKey) -> Option<Media>;

    /// Stores `media` under `key` and returns the value now cached for it.
    ///
    /// If `key` is already present the existing object is kept and returned,
    /// so concurrent producers of one key converge on a single object.
    fn put(&self, key: CacheKey, media: Media) -> Media;

    /// Removes an entry from the cache.
    fn evict(&self, key: &CacheKey);

    /// Returns the current number of cached entries.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    fn clear(&self);
}
