//! In-memory transfer trackers.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::domain::context::UiContext;
use crate::domain::entities::{CacheKey, ProgressInfo};
use crate::domain::ports::{
    DownloadProgressPort, ReadyCallback, UploadProgressPort, UploadWatch,
};

/// Tracks active attachment downloads. Thread-safe.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    active: RwLock<HashMap<CacheKey, ProgressInfo>>,
}

impl DownloadTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a download.
    pub fn start(&self, id: CacheKey, total_bytes: Option<u64>) {
        debug!(id = %id, "Download started");
        self.active
            .write()
            .insert(id, ProgressInfo::new(0, total_bytes));
    }

    /// Updates the received byte count of an active download.
    pub fn update(&self, id: &CacheKey, bytes_received: u64) {
        if let Some(progress) = self.active.write().get_mut(id) {
            progress.bytes_received = bytes_received;
        }
    }

    /// Removes a finished or cancelled download.
    pub fn finish(&self, id: &CacheKey) {
        if self.active.write().remove(id).is_some() {
            debug!(id = %id, "Download finished");
        }
    }
}

impl DownloadProgressPort for DownloadTracker {
    fn progress(&self, attachment_id: &CacheKey) -> Option<ProgressInfo> {
        self.active.read().get(attachment_id).copied()
    }
}

type Watchers = HashMap<CacheKey, Vec<(u64, ReadyCallback)>>;

/// Tracks upload readiness of outgoing attachments. UI-thread confined.
#[derive(Default)]
pub struct UploadTracker {
    uploaded: RefCell<HashSet<CacheKey>>,
    watchers: Rc<RefCell<Watchers>>,
    next_watch: Cell<u64>,
}

impl UploadTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `id` finished uploading.
    #[must_use]
    pub fn is_uploaded(&self, id: &CacheKey) -> bool {
        self.uploaded.borrow().contains(id)
    }

    /// Marks `id` as uploaded and notifies its watchers.
    pub fn mark_uploaded(&self, ctx: &UiContext, id: &CacheKey) {
        if !self.uploaded.borrow_mut().insert(id.clone()) {
            return;
        }
        debug!(id = %id, "Upload ready");

        let watchers = self.watchers.borrow_mut().remove(id).unwrap_or_default();
        for (_, on_ready_changed) in &watchers {
            on_ready_changed(ctx, true);
        }
    }

    /// Number of attachments with registered watchers.
    #[must_use]
    pub fn watched_count(&self) -> usize {
        self.watchers.borrow().len()
    }
}

fn unregister(watchers: &Weak<RefCell<Watchers>>, id: &CacheKey, watch_id: u64) {
    let Some(watchers) = watchers.upgrade() else {
        return;
    };
    let mut watchers = watchers.borrow_mut();
    if let Some(entries) = watchers.get_mut(id) {
        entries.retain(|(entry_id, _)| *entry_id != watch_id);
        if entries.is_empty() {
            watchers.remove(id);
            trace!(id = %id, "Upload watcher removed");
        }
    }
}

impl UploadProgressPort for UploadTracker {
    fn watch(
        &self,
        ctx: &UiContext,
        attachment_id: &CacheKey,
        on_ready_changed: ReadyCallback,
    ) -> UploadWatch {
        let ready = self.is_uploaded(attachment_id);
        on_ready_changed(ctx, ready);
        if ready {
            return UploadWatch::detached();
        }

        let watch_id = self.next_watch.get();
        self.next_watch.set(watch_id + 1);
        self.watchers
            .borrow_mut()
            .entry(attachment_id.clone())
            .or_default()
            .push((watch_id, on_ready_changed));

        let watchers = Rc::downgrade(&self.watchers);
        let id = attachment_id.clone();
        UploadWatch::new(move || unregister(&watchers, &id, watch_id))
    }
}

impl std::fmt::Debug for UploadTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTracker")
            .field("uploaded", &self.uploaded.borrow().len())
            .field("watched", &self.watched_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress_lifecycle() {
        let tracker = DownloadTracker::new();
        let id = CacheKey::new("abc");
        assert!(tracker.progress(&id).is_none());

        tracker.start(id.clone(), Some(100));
        tracker.update(&id, 40);
        assert_eq!(tracker.progress(&id), Some(ProgressInfo::new(40, Some(100))));

        tracker.finish(&id);
        assert!(tracker.progress(&id).is_none());
    }

    #[test]
    fn test_upload_watchers_notified_once() {
        let ctx = UiContext::current();
        let tracker = UploadTracker::new();
        let id = CacheKey::new("out");
        let notifications = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(None));

        let (count, seen) = (notifications.clone(), last.clone());
        let _watch = tracker.watch(
            &ctx,
            &id,
            Box::new(move |_, ready| {
                count.set(count.get() + 1);
                seen.set(Some(ready));
            }),
        );
        assert_eq!(last.get(), Some(false));

        tracker.mark_uploaded(&ctx, &id);
        tracker.mark_uploaded(&ctx, &id);

        assert_eq!(notifications.get(), 2);
        assert_eq!(last.get(), Some(true));
        assert_eq!(tracker.watched_count(), 0);
    }

    #[test]
    fn test_watch_after_upload_reports_ready() {
        let ctx = UiContext::current();
        let tracker = UploadTracker::new();
        let id = CacheKey::new("done");
        tracker.mark_uploaded(&ctx, &id);

        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let watch = tracker.watch(&ctx, &id, Box::new(move |_, ready| sink.set(Some(ready))));

        assert_eq!(seen.get(), Some(true));
        assert!(!watch.is_registered());
        assert_eq!(tracker.watched_count(), 0);
    }

    #[test]
    fn test_dropped_watch_is_unregistered() {
        let ctx = UiContext::current();
        let tracker = UploadTracker::new();
        let id = CacheKey::new("stalled");
        let notified = Rc::new(Cell::new(0));

        let first_sink = notified.clone();
        let first = tracker.watch(
            &ctx,
            &id,
            Box::new(move |_, _| first_sink.set(first_sink.get() + 1)),
        );
        let second_sink = notified.clone();
        let second = tracker.watch(
            &ctx,
            &id,
            Box::new(move |_, _| second_sink.set(second_sink.get() + 1)),
        );
        assert_eq!(tracker.watched_count(), 1);

        drop(first);
        assert_eq!(tracker.watched_count(), 1);
        drop(second);
        assert_eq!(tracker.watched_count(), 0);

        tracker.mark_uploaded(&ctx, &id);
        assert_eq!(notified.get(), 2);
    }

    #[test]
    fn test_watch_outliving_tracker_drops_cleanly() {
        let ctx = UiContext::current();
        let tracker = UploadTracker::new();
        let watch = tracker.watch(&ctx, &CacheKey::new("x"), Box::new(|_, _| {}));

        drop(tracker);
        drop(watch);
    }
}
