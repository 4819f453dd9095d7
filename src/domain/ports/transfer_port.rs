//! Ports for attachment transfer progress.

use crate::domain::context::UiContext;
use crate::domain::entities::{CacheKey, ProgressInfo};

/// Invoked on the UI thread when upload readiness changes.
pub type ReadyCallback = Box<dyn Fn(&UiContext, bool)>;

/// Source of download progress for pending attachments.
#[cfg_attr(test, mockall::automock)]
pub trait DownloadProgressPort: Send + Sync {
    /// Returns the progress of an active download, or `None` when the
    /// attachment is not being downloaded.
    fn progress(&self, attachment_id: &CacheKey) -> Option<ProgressInfo>;
}

/// Registration of an upload watcher. Dropping it unregisters the watcher.
#[must_use = "dropping the watch unregisters its callback"]
pub struct UploadWatch {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl UploadWatch {
    /// Watch that runs `cancel` when dropped.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Watch with nothing left to unregister.
    pub const fn detached() -> Self {
        Self { cancel: None }
    }

    /// Returns true if dropping this watch unregisters a callback.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for UploadWatch {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for UploadWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadWatch")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Source of upload readiness for outgoing attachments.
pub trait UploadProgressPort {
    /// Registers `on_ready_changed` for `attachment_id`.
    ///
    /// Implementations report the current readiness immediately and again on
    /// every transition, until the returned watch is dropped.
    fn watch(
        &self,
        ctx: &UiContext,
        attachment_id: &CacheKey,
        on_ready_changed: ReadyCallback,
    ) -> UploadWatch;
}
