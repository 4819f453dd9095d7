//! Per-view load attempt controller.
//!
//! Serves media from the shared cache when possible, otherwise asks a
//! producer, and remembers a definitive failure for the lifetime of the view
//! so a decode known to fail is never retried.

use std::cell::Cell;
use std::sync::Arc;
use std::thread::ThreadId;

use tracing::{debug, error, trace, warn};

use crate::domain::context::UiContext;
use crate::domain::entities::{CacheKey, LoadAttemptState, Media};
use crate::domain::ports::{MediaCachePort, Production};

/// Enforces at most one production attempt per media view.
///
/// Thread-confined: the state lives in `Cell`s and every operation takes the
/// [`UiContext`] the controller was created with.
pub struct LoadAttemptController {
    cache: Arc<dyn MediaCachePort>,
    owner: ThreadId,
    state: Cell<LoadAttemptState>,
    in_flight: Cell<bool>,
    completions: Cell<u64>,
    dedupe_in_flight: bool,
}

impl LoadAttemptController {
    /// Creates a controller in the `NotAttempted` state.
    ///
    /// With `dedupe_in_flight`, a pending asynchronous production blocks
    /// further producer calls until it completes.
    #[must_use]
    pub fn new(ctx: &UiContext, cache: Arc<dyn MediaCachePort>, dedupe_in_flight: bool) -> Self {
        Self {
            cache,
            owner: ctx.thread_id(),
            state: Cell::new(LoadAttemptState::NotAttempted),
            in_flight: Cell::new(false),
            completions: Cell::new(0),
            dedupe_in_flight,
        }
    }

    /// Returns the current attempt state.
    #[must_use]
    pub fn state(&self) -> LoadAttemptState {
        self.state.get()
    }

    /// Returns true while an asynchronous production is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Returns media for `key`, producing it on a cache miss.
    ///
    /// A pending production yields `None` without recording failure when
    /// `allow_async` is set. Any other empty outcome marks the controller as
    /// permanently failed, after which this returns `None` without touching
    /// the cache or the producer.
    pub fn try_load<F>(
        &self,
        ctx: &UiContext,
        key: &CacheKey,
        produce: F,
        allow_async: bool,
    ) -> Option<Media>
    where
        F: FnOnce() -> Production,
    {
        ctx.assert_owner(self.owner);

        if self.state.get().is_failed() {
            return None;
        }

        if let Some(media) = self.cache.get(key) {
            trace!(key = %key, "Media cache hit");
            self.state.set(LoadAttemptState::Loaded);
            return Some(media);
        }

        if self.dedupe_in_flight && self.in_flight.get() {
            trace!(key = %key, "Media production already in flight");
            return None;
        }

        let completions = self.completions.get();
        let production = produce();

        // Resolved through its callback before `produce` returned.
        if production.is_pending() && self.completions.get() != completions {
            return None;
        }

        match production {
            Production::Ready(media) => {
                trace!(key = %key, "Media cache miss");
                let media = self.cache.put(key.clone(), media);
                self.state.set(LoadAttemptState::Loaded);
                Some(media)
            }
            Production::Pending if allow_async => {
                debug!(key = %key, "Media production pending");
                self.in_flight.set(true);
                None
            }
            Production::Pending | Production::Failed => {
                self.mark_failed(key);
                None
            }
        }
    }

    /// Resolves a pending production.
    ///
    /// Success stores the media in the cache (keeping an object already
    /// cached for `key`) and returns the canonical value. Failure is only
    /// logged: the state is left untouched so the next load asks the
    /// producer again.
    pub fn complete_async(
        &self,
        ctx: &UiContext,
        key: &CacheKey,
        result: Option<Media>,
    ) -> Option<Media> {
        ctx.assert_owner(self.owner);

        self.in_flight.set(false);
        self.completions.set(self.completions.get() + 1);

        if self.state.get().is_failed() {
            return None;
        }

        match result {
            Some(media) => {
                debug!(key = %key, "Media produced asynchronously");
                let media = self.cache.put(key.clone(), media);
                self.state.set(LoadAttemptState::Loaded);
                Some(media)
            }
            None if self.state.get().is_loaded() => {
                debug!(key = %key, "Ignoring late production failure");
                None
            }
            None => {
                warn!(key = %key, "Asynchronous media production failed");
                None
            }
        }
    }

    fn mark_failed(&self, key: &CacheKey) {
        error!(key = %key, "Failed to load media");
        self.in_flight.set(false);
        self.state.set(LoadAttemptState::PermanentlyFailed);
    }
}

impl std::fmt::Debug for LoadAttemptController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadAttemptController")
            .field("state", &self.state.get())
            .field("in_flight", &self.in_flight.get())
            .field("dedupe_in_flight", &self.dedupe_in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::media::MemoryMediaCache;

    fn media() -> Media {
        Media::still(image::DynamicImage::new_rgb8(8, 8))
    }

    fn setup(dedupe: bool) -> (UiContext, Arc<MemoryMediaCache>, LoadAttemptController) {
        let ctx = UiContext::current();
        let cache = Arc::new(MemoryMediaCache::new(10, usize::MAX));
        let controller = LoadAttemptController::new(&ctx, cache.clone(), dedupe);
        (ctx, cache, controller)
    }

    #[test]
    fn test_cache_hit_returns_same_object() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let stored = cache.put(key.clone(), media());
        let calls = Cell::new(0);

        let first = controller.try_load(
            &ctx,
            &key,
            || {
                calls.set(calls.get() + 1);
                Production::Failed
            },
            true,
        );
        let second = controller.try_load(
            &ctx,
            &key,
            || {
                calls.set(calls.get() + 1);
                Production::Failed
            },
            true,
        );

        assert!(first.unwrap().same_object(&stored));
        assert!(second.unwrap().same_object(&stored));
        assert_eq!(calls.get(), 0);
        assert_eq!(controller.state(), LoadAttemptState::Loaded);
    }

    #[test]
    fn test_miss_produces_and_caches() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Production::Ready(media())
        };

        let first = controller.try_load(&ctx, &key, produce, true).unwrap();
        let second = controller.try_load(&ctx, &key, produce, true).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(first.same_object(&second));
        assert_eq!(cache.len(), 1);
        assert!(controller.state().is_loaded());
    }

    #[test]
    fn test_failure_is_remembered() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("corrupt");
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Production::Failed
        };

        assert!(controller.try_load(&ctx, &key, produce, true).is_none());
        assert!(controller.state().is_failed());

        // Even a later cache entry for the key is not consulted.
        cache.put(key.clone(), media());
        for _ in 0..5 {
            assert!(controller.try_load(&ctx, &key, produce, true).is_none());
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_empty_result_without_async_fails() {
        let (ctx, _cache, controller) = setup(true);
        let key = CacheKey::new("k");

        let result = controller.try_load(&ctx, &key, || Production::from(None), false);

        assert!(result.is_none());
        assert!(controller.state().is_failed());
    }

    #[test]
    fn test_pending_is_not_failure() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("k");

        let result = controller.try_load(&ctx, &key, || Production::from(None), true);

        assert!(result.is_none());
        assert_eq!(controller.state(), LoadAttemptState::NotAttempted);
        assert!(controller.is_in_flight());

        let delivered = controller.complete_async(&ctx, &key, Some(media()));
        assert!(delivered.is_some());
        assert!(controller.state().is_loaded());
        assert!(!controller.is_in_flight());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_async_failure_allows_retry() {
        let (ctx, _cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let calls = Cell::new(0);
        let _ = controller.try_load(&ctx, &key, || Production::Pending, true);

        assert!(controller.complete_async(&ctx, &key, None).is_none());
        assert_eq!(controller.state(), LoadAttemptState::NotAttempted);
        assert!(!controller.is_in_flight());

        let retried = controller.try_load(
            &ctx,
            &key,
            || {
                calls.set(calls.get() + 1);
                Production::Ready(media())
            },
            true,
        );
        assert!(retried.is_some());
        assert_eq!(calls.get(), 1);
        assert!(controller.state().is_loaded());
    }

    #[test]
    fn test_late_failure_after_load_is_ignored() {
        let (ctx, _cache, controller) = setup(false);
        let key = CacheKey::new("k");
        let _ = controller.try_load(&ctx, &key, || Production::Pending, true);
        let _ = controller.try_load(&ctx, &key, || Production::Pending, true);

        assert!(controller.complete_async(&ctx, &key, Some(media())).is_some());
        assert!(controller.complete_async(&ctx, &key, None).is_none());
        assert!(controller.state().is_loaded());
    }

    #[test]
    fn test_in_flight_dedupe() {
        let (ctx, _cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Production::Pending
        };

        for _ in 0..3 {
            let _ = controller.try_load(&ctx, &key, produce, true);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_without_dedupe_pending_reinvokes_producer() {
        let (ctx, _cache, controller) = setup(false);
        let key = CacheKey::new("k");
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Production::Pending
        };

        for _ in 0..3 {
            let _ = controller.try_load(&ctx, &key, produce, true);
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(controller.state(), LoadAttemptState::NotAttempted);
    }

    #[test]
    fn test_eviction_triggers_reproduction() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Production::Ready(media())
        };

        assert!(controller.try_load(&ctx, &key, produce, false).is_some());
        cache.evict(&key);
        assert!(controller.try_load(&ctx, &key, produce, false).is_some());

        assert_eq!(calls.get(), 2);
        assert!(controller.state().is_loaded());
    }

    #[test]
    fn test_async_result_converges_on_cached_object() {
        let (ctx, cache, controller) = setup(true);
        let key = CacheKey::new("k");
        let _ = controller.try_load(&ctx, &key, || Production::Pending, true);

        let first = cache.put(key.clone(), media());
        let delivered = controller.complete_async(&ctx, &key, Some(media())).unwrap();

        assert!(delivered.same_object(&first));
    }
}
