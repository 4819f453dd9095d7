//! Binding of download and upload progress overlays.

use std::rc::Rc;
use std::sync::Arc;

use tracing::trace;

use crate::domain::context::UiContext;
use crate::domain::entities::{CacheKey, DisplayVariant, ProgressInfo, ResolvedStream};
use crate::domain::ports::{
    DownloadProgressPort, ReadyCallback, UploadProgressPort, UploadWatch,
};

/// Download indicator radius relative to the maximum message width.
pub const DOWNLOAD_RADIUS_RATIO: f32 = 0.1;

/// Transient progress affordance drawn over a media view.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayHandle {
    /// Circular download indicator for a pending attachment.
    Download {
        /// Attachment being downloaded.
        attachment_id: CacheKey,
        /// Progress when the overlay was attached.
        progress: ProgressInfo,
        /// Indicator radius in points.
        radius: f32,
    },
    /// Upload indicator for an outgoing attachment.
    Upload {
        /// Attachment being uploaded.
        attachment_id: CacheKey,
    },
}

/// Attaches progress overlays sourced from the transfer trackers.
pub struct ProgressOverlayBinder {
    downloads: Arc<dyn DownloadProgressPort>,
    uploads: Rc<dyn UploadProgressPort>,
    max_message_width: f32,
}

impl ProgressOverlayBinder {
    /// Creates a binder for views constrained to `max_message_width`.
    #[must_use]
    pub fn new(
        downloads: Arc<dyn DownloadProgressPort>,
        uploads: Rc<dyn UploadProgressPort>,
        max_message_width: f32,
    ) -> Self {
        Self {
            downloads,
            uploads,
            max_message_width,
        }
    }

    /// Download overlay for `variant`; only pending attachments qualify.
    #[must_use]
    pub fn download_overlay(&self, variant: &DisplayVariant) -> Option<OverlayHandle> {
        match variant {
            DisplayVariant::Pending(id) => self.attach_if_downloading(id),
            _ => None,
        }
    }

    /// Attaches a download indicator if `attachment_id` is being downloaded.
    #[must_use]
    pub fn attach_if_downloading(&self, attachment_id: &CacheKey) -> Option<OverlayHandle> {
        let Some(progress) = self.downloads.progress(attachment_id) else {
            trace!(id = %attachment_id, "Attachment not being downloaded");
            return None;
        };

        Some(OverlayHandle::Download {
            attachment_id: attachment_id.clone(),
            progress,
            radius: self.max_message_width * DOWNLOAD_RADIUS_RATIO,
        })
    }

    /// Attaches an upload indicator to an outgoing stream that has not been
    /// uploaded, registering `on_ready_changed` with the upload tracker.
    ///
    /// The callback stays registered for as long as the returned watch lives.
    pub fn attach_if_not_uploaded(
        &self,
        ctx: &UiContext,
        stream: &ResolvedStream,
        is_outgoing: bool,
        on_ready_changed: ReadyCallback,
    ) -> Option<(OverlayHandle, UploadWatch)> {
        if !is_outgoing || stream.stream().is_uploaded() {
            return None;
        }

        let watch = self.uploads.watch(ctx, stream.key(), on_ready_changed);
        let overlay = OverlayHandle::Upload {
            attachment_id: stream.key().clone(),
        };
        Some((overlay, watch))
    }
}

impl std::fmt::Debug for ProgressOverlayBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressOverlayBinder")
            .field("max_message_width", &self.max_message_width)
            .finish_non_exhaustive()
    }
}
