//! Medium thumbnail generation.
//!
//! Decoding runs on the tokio blocking pool; results travel back over a
//! channel and their callbacks run only when the UI thread drains it with
//! [`ThumbnailGenerator::dispatch_completed`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::ImageFormat;
use image::imageops::FilterType;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::domain::context::UiContext;
use crate::domain::entities::{AttachmentStream, Media};
use crate::domain::errors::MediaError;
use crate::domain::ports::{FailureCallback, Production, SuccessCallback, ThumbnailProducer};
use crate::infrastructure::config::ThumbnailConfig;

/// Default bounding box edge of a medium thumbnail.
pub const DEFAULT_MEDIUM_DIMENSION: u32 = 400;

#[derive(Debug)]
struct ThumbnailCompleted {
    ticket: u64,
    result: Result<Media, MediaError>,
}

/// Decodes a file and scales it to fit a `max_dimension` square.
///
/// # Errors
/// Returns [`MediaError::Decode`] if the file cannot be opened or decoded.
pub fn generate_medium(path: &Path, max_dimension: u32) -> Result<Media, MediaError> {
    let image = image::open(path).map_err(|e| MediaError::decode(path, e))?;

    let image = if image.width() > max_dimension || image.height() > max_dimension {
        image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        image
    };

    Ok(Media::still(image))
}

/// Thumbnail producer backed by the `image` crate.
pub struct ThumbnailGenerator {
    max_dimension: u32,
    runtime: Option<Handle>,
    next_ticket: Cell<u64>,
    waiting: RefCell<HashMap<u64, (SuccessCallback, FailureCallback)>>,
    completed_tx: mpsc::UnboundedSender<ThumbnailCompleted>,
    completed_rx: RefCell<mpsc::UnboundedReceiver<ThumbnailCompleted>>,
}

impl ThumbnailGenerator {
    /// Creates a generator that decodes on the current tokio runtime, or
    /// inline when called outside of one.
    #[must_use]
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self::build(config.max_dimension, Handle::try_current().ok())
    }

    /// Creates a generator that always decodes synchronously.
    #[must_use]
    pub fn inline(max_dimension: u32) -> Self {
        Self::build(max_dimension, None)
    }

    /// Creates a generator that decodes on `runtime`.
    #[must_use]
    pub fn with_runtime(max_dimension: u32, runtime: Handle) -> Self {
        Self::build(max_dimension, Some(runtime))
    }

    fn build(max_dimension: u32, runtime: Option<Handle>) -> Self {
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        Self {
            max_dimension: max_dimension.max(1),
            runtime,
            next_ticket: Cell::new(0),
            waiting: RefCell::new(HashMap::new()),
            completed_tx,
            completed_rx: RefCell::new(completed_rx),
        }
    }

    /// Returns the number of thumbnails still being generated.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Runs the callbacks of every finished thumbnail on the UI thread.
    /// Returns how many were delivered.
    pub fn dispatch_completed(&self, ctx: &UiContext) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.completed_rx.borrow_mut().try_recv();
            let Ok(completed) = next else {
                break;
            };
            let Some((on_success, on_failure)) = self.waiting.borrow_mut().remove(&completed.ticket)
            else {
                continue;
            };

            match completed.result {
                Ok(media) => on_success(ctx, media),
                Err(e) => {
                    warn!(error = %e, "Could not load thumbnail");
                    on_failure(ctx);
                }
            }
            delivered += 1;
        }
        delivered
    }

    /// Polls until every outstanding thumbnail has been delivered.
    pub async fn settle(&self, ctx: &UiContext, poll_interval: Duration) -> usize {
        let mut delivered = self.dispatch_completed(ctx);
        while self.pending_count() > 0 {
            tokio::time::sleep(poll_interval).await;
            delivered += self.dispatch_completed(ctx);
        }
        delivered
    }

    fn schedule(
        &self,
        runtime: &Handle,
        path: PathBuf,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) {
        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket + 1);
        self.waiting
            .borrow_mut()
            .insert(ticket, (on_success, on_failure));

        let tx = self.completed_tx.clone();
        let max_dimension = self.max_dimension;
        runtime.spawn_blocking(move || {
            let result = generate_medium(&path, max_dimension);
            if tx.send(ThumbnailCompleted { ticket, result }).is_err() {
                trace!(ticket, "Thumbnail generator dropped before completion");
            }
        });
        debug!(ticket, "Thumbnail generation scheduled");
    }
}

impl ThumbnailProducer for ThumbnailGenerator {
    fn produce_medium(
        &self,
        _ctx: &UiContext,
        stream: &AttachmentStream,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> Production {
        let Some(path) = stream.original_file_path() else {
            if let Some(key) = stream.unique_id() {
                warn!(error = %MediaError::MissingFilePath { key: key.clone() }, "Cannot generate thumbnail");
            }
            return Production::Failed;
        };

        if stream.is_video() && ImageFormat::from_path(path).is_err() {
            let e = MediaError::decode(path, "no frame decoder for video containers");
            warn!(error = %e, "Cannot generate thumbnail");
            return Production::Failed;
        }

        let Some(runtime) = &self.runtime else {
            return match generate_medium(path, self.max_dimension) {
                Ok(media) => Production::Ready(media),
                Err(e) => {
                    warn!(error = %e, "Could not load thumbnail");
                    Production::Failed
                }
            };
        };

        self.schedule(runtime, path.to_path_buf(), on_success, on_failure);
        Production::Pending
    }
}

impl std::fmt::Debug for ThumbnailGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailGenerator")
            .field("max_dimension", &self.max_dimension)
            .field("async", &self.runtime.is_some())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}
