//! Ports for turning attachments into decoded media.

use std::path::Path;

use crate::domain::context::UiContext;
use crate::domain::entities::{AttachmentStream, Media};

/// Delivers asynchronously produced media on the UI thread.
pub type SuccessCallback = Box<dyn FnOnce(&UiContext, Media)>;

/// Reports an asynchronous production failure on the UI thread.
pub type FailureCallback = Box<dyn FnOnce(&UiContext)>;

/// Outcome of asking a producer for media.
#[derive(Debug, Clone)]
pub enum Production {
    /// Media is available now.
    Ready(Media),
    /// Work continues elsewhere and will report back through a callback.
    Pending,
    /// Nothing was produced and nothing will be.
    Failed,
}

impl Production {
    /// Returns true for [`Production::Pending`].
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Maps a bare optional result. Absent media is reported as pending and the
/// caller decides whether an asynchronous continuation is allowed.
impl From<Option<Media>> for Production {
    fn from(media: Option<Media>) -> Self {
        media.map_or(Self::Pending, Self::Ready)
    }
}

/// Produces medium-sized thumbnails for still images and videos.
pub trait ThumbnailProducer {
    /// Requests a medium thumbnail for `stream`.
    ///
    /// Returns `Ready` without invoking either callback when a thumbnail is
    /// available at once. Returns `Pending` when exactly one callback will be
    /// invoked later, always on the UI thread. Returns `Failed` (dropping
    /// both callbacks) when no thumbnail can be made.
    fn produce_medium(
        &self,
        ctx: &UiContext,
        stream: &AttachmentStream,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> Production;
}

/// Decodes a complete file synchronously. Used for animated images.
pub trait FullFileDecoder: Send + Sync {
    /// Decodes the file at `path`, returning `None` on failure.
    fn decode(&self, path: &Path) -> Option<Media>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted thumbnail producer that counts invocations.
    ///
    /// In deferred mode the callbacks are parked until [`complete`] or
    /// [`fail`] is called, simulating a background decode.
    ///
    /// [`complete`]: MockThumbnailProducer::complete
    /// [`fail`]: MockThumbnailProducer::fail
    pub struct MockThumbnailProducer {
        mode: Mode,
        calls: Cell<usize>,
        parked: RefCell<Vec<(SuccessCallback, FailureCallback)>>,
    }

    enum Mode {
        Ready(Media),
        Deferred,
        Failing,
    }

    impl MockThumbnailProducer {
        /// Producer that returns `media` synchronously.
        pub fn ready(media: Media) -> Self {
            Self::with_mode(Mode::Ready(media))
        }

        /// Producer that always completes later.
        pub fn deferred() -> Self {
            Self::with_mode(Mode::Deferred)
        }

        /// Producer that fails synchronously.
        pub fn failing() -> Self {
            Self::with_mode(Mode::Failing)
        }

        fn with_mode(mode: Mode) -> Self {
            Self {
                mode,
                calls: Cell::new(0),
                parked: RefCell::new(Vec::new()),
            }
        }

        /// Number of `produce_medium` invocations.
        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        /// Number of requests waiting for completion.
        pub fn parked(&self) -> usize {
            self.parked.borrow().len()
        }

        /// Completes every parked request with `media`.
        pub fn complete(&self, ctx: &UiContext, media: &Media) {
            let parked: Vec<_> = self.parked.borrow_mut().drain(..).collect();
            for (on_success, _) in parked {
                on_success(ctx, media.clone());
            }
        }

        /// Fails every parked request.
        pub fn fail(&self, ctx: &UiContext) {
            let parked: Vec<_> = self.parked.borrow_mut().drain(..).collect();
            for (_, on_failure) in parked {
                on_failure(ctx);
            }
        }
    }

    impl ThumbnailProducer for MockThumbnailProducer {
        fn produce_medium(
            &self,
            _ctx: &UiContext,
            _stream: &AttachmentStream,
            on_success: SuccessCallback,
            on_failure: FailureCallback,
        ) -> Production {
            self.calls.set(self.calls.get() + 1);
            match &self.mode {
                Mode::Ready(media) => Production::Ready(media.clone()),
                Mode::Deferred => {
                    self.parked.borrow_mut().push((on_success, on_failure));
                    Production::Pending
                }
                Mode::Failing => Production::Failed,
            }
        }
    }

    /// Full-file decoder returning a fixed result and counting calls.
    pub struct MockFullFileDecoder {
        media: Option<Media>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl MockFullFileDecoder {
        /// Decoder that succeeds with `media`.
        pub fn returning(media: Media) -> Self {
            Self {
                media: Some(media),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        /// Decoder that always fails.
        pub fn failing() -> Self {
            Self {
                media: None,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        /// Number of `decode` invocations.
        pub fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::Relaxed)
        }
    }

    impl FullFileDecoder for MockFullFileDecoder {
        fn decode(&self, _path: &Path) -> Option<Media> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            self.media.clone()
        }
    }
}
