//! Media view lifecycle engine.
//!
//! A [`MediaView`] displays one attachment inside a message row. The variant
//! is resolved once at construction and binds a load and an unload operation;
//! the containing list calls [`MediaView::load_media`] and
//! [`MediaView::unload_media`] as the row scrolls in and out of view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::thread::ThreadId;

use tracing::{debug, error, trace};

use crate::application::services::{
    LoadAttemptController, OverlayHandle, ProgressOverlayBinder, resolve,
};
use crate::domain::context::UiContext;
use crate::domain::entities::{
    Attachment, CacheKey, DisplayVariant, LoadAttemptState, Media, ResolvedStream, VariantKind,
};
use crate::domain::errors::MediaError;
use crate::domain::ports::{
    DownloadProgressPort, FailureCallback, FullFileDecoder, MediaCachePort, Production,
    ReadyCallback, SuccessCallback, ThumbnailProducer, UploadProgressPort, UploadWatch,
};
use crate::infrastructure::config::EngineConfig;

/// Construction parameters that do not come from collaborators.
#[derive(Debug, Clone, Copy)]
pub struct MediaViewOptions {
    /// Whether the message was sent by the local user.
    pub is_outgoing: bool,
    /// Layout width constraint; affects sizing only.
    pub max_message_width: f32,
    /// Skip the producer while an asynchronous production is in flight.
    pub dedupe_in_flight: bool,
}

impl MediaViewOptions {
    /// Options for a received message.
    #[must_use]
    pub const fn incoming(max_message_width: f32) -> Self {
        Self {
            is_outgoing: false,
            max_message_width,
            dedupe_in_flight: true,
        }
    }

    /// Options for a sent message.
    #[must_use]
    pub const fn outgoing(max_message_width: f32) -> Self {
        Self {
            is_outgoing: true,
            max_message_width,
            dedupe_in_flight: true,
        }
    }

    /// Options derived from configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig, is_outgoing: bool) -> Self {
        Self {
            is_outgoing,
            max_message_width: config.max_message_width,
            dedupe_in_flight: config.dedupe_in_flight,
        }
    }
}

impl Default for MediaViewOptions {
    fn default() -> Self {
        Self::incoming(300.0)
    }
}

/// External collaborators shared by every media view of a list.
#[derive(Clone)]
pub struct MediaCollaborators {
    /// Medium thumbnails for still images and videos.
    pub thumbnails: Rc<dyn ThumbnailProducer>,
    /// Full-file decoder for animated images.
    pub decoder: Arc<dyn FullFileDecoder>,
    /// Download progress for pending attachments.
    pub downloads: Arc<dyn DownloadProgressPort>,
    /// Upload readiness for outgoing attachments.
    pub uploads: Rc<dyn UploadProgressPort>,
}

/// Background treatment behind the media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Regular background under loaded or loading media.
    Default,
    /// Light tint under a download indicator.
    Downloading,
    /// Darker tint marking missing or invalid media.
    Placeholder,
}

/// Visual state of a media view apart from its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    /// Background treatment.
    pub background: Background,
    /// Attached progress overlay.
    pub overlay: Option<OverlayHandle>,
    /// Play icon visibility; `None` for variants without one.
    pub play_icon_visible: Option<bool>,
}

/// The displayed reference and the state asynchronous callbacks may touch.
/// Callbacks hold a `Weak` to it, so a dropped view ignores late results.
struct DisplaySlot {
    controller: LoadAttemptController,
    media: RefCell<Option<Media>>,
    wants_media: Cell<bool>,
    play_icon_visible: Cell<bool>,
}

impl DisplaySlot {
    fn new(controller: LoadAttemptController) -> Self {
        Self {
            controller,
            media: RefCell::new(None),
            wants_media: Cell::new(false),
            play_icon_visible: Cell::new(true),
        }
    }

    fn is_displaying(&self) -> bool {
        self.media.borrow().is_some()
    }

    fn show(&self, media: Media) {
        *self.media.borrow_mut() = Some(media);
    }

    fn clear(&self) -> bool {
        self.media.borrow_mut().take().is_some()
    }

    fn deliver(&self, key: &CacheKey, media: Media) {
        if self.wants_media.get() && !self.is_displaying() {
            self.show(media);
        } else {
            debug!(key = %key, "View unloaded before production finished");
        }
    }
}

type MediaOp = Box<dyn Fn(&UiContext, &Rc<DisplaySlot>)>;

struct Binding {
    background: Background,
    overlay: Option<OverlayHandle>,
    upload_watch: Option<UploadWatch>,
    load_op: Option<MediaOp>,
    unload_op: Option<MediaOp>,
}

impl Binding {
    fn placeholder(background: Background, overlay: Option<OverlayHandle>) -> Self {
        Self {
            background,
            overlay,
            upload_watch: None,
            load_op: None,
            unload_op: None,
        }
    }

    fn stream(upload: Option<(OverlayHandle, UploadWatch)>, load_op: MediaOp) -> Self {
        let (overlay, upload_watch) = upload.unzip();
        Self {
            background: Background::Default,
            overlay,
            upload_watch,
            load_op: Some(load_op),
            unload_op: Some(unload_op()),
        }
    }
}

/// Displays one attachment and manages the lifetime of its decoded media.
pub struct MediaView {
    attachment: Arc<Attachment>,
    variant: DisplayVariant,
    slot: Rc<DisplaySlot>,
    load_op: Option<MediaOp>,
    unload_op: Option<MediaOp>,
    background: Background,
    overlay: Option<OverlayHandle>,
    _upload_watch: Option<UploadWatch>,
    max_message_width: f32,
    owner: ThreadId,
}

impl MediaView {
    /// Resolves the attachment's variant and binds its load and unload
    /// operations. Progress overlays are attached here as well.
    #[must_use]
    pub fn new(
        ctx: &UiContext,
        cache: Arc<dyn MediaCachePort>,
        attachment: Arc<Attachment>,
        options: MediaViewOptions,
        collaborators: &MediaCollaborators,
    ) -> Self {
        let variant = resolve(&attachment);
        let slot = Rc::new(DisplaySlot::new(LoadAttemptController::new(
            ctx,
            cache,
            options.dedupe_in_flight,
        )));
        let binder = ProgressOverlayBinder::new(
            collaborators.downloads.clone(),
            collaborators.uploads.clone(),
            options.max_message_width,
        );

        let binding = match &variant {
            DisplayVariant::Pending(_) => match binder.download_overlay(&variant) {
                Some(overlay) => Binding::placeholder(Background::Downloading, Some(overlay)),
                None => Binding::placeholder(Background::Placeholder, None),
            },
            DisplayVariant::InvalidOrMissing => {
                Binding::placeholder(Background::Placeholder, None)
            }
            DisplayVariant::StillImage(stream) => Binding::stream(
                binder.attach_if_not_uploaded(ctx, stream, options.is_outgoing, ignore_readiness()),
                thumbnail_load_op(
                    stream.clone(),
                    VariantKind::StillImage,
                    collaborators.thumbnails.clone(),
                ),
            ),
            DisplayVariant::Video(stream) => {
                let weak = Rc::downgrade(&slot);
                let on_ready_changed = Box::new(move |_: &UiContext, is_ready: bool| {
                    if let Some(slot) = weak.upgrade() {
                        slot.play_icon_visible.set(is_ready);
                    }
                });
                Binding::stream(
                    binder.attach_if_not_uploaded(
                        ctx,
                        stream,
                        options.is_outgoing,
                        on_ready_changed,
                    ),
                    thumbnail_load_op(
                        stream.clone(),
                        VariantKind::Video,
                        collaborators.thumbnails.clone(),
                    ),
                )
            }
            DisplayVariant::AnimatedImage(stream) => Binding::stream(
                binder.attach_if_not_uploaded(ctx, stream, options.is_outgoing, ignore_readiness()),
                animated_load_op(stream.clone(), collaborators.decoder.clone()),
            ),
        };

        trace!(variant = %variant.kind(), "Media view bound");

        Self {
            attachment,
            variant,
            slot,
            load_op: binding.load_op,
            unload_op: binding.unload_op,
            background: binding.background,
            overlay: binding.overlay,
            _upload_watch: binding.upload_watch,
            max_message_width: options.max_message_width,
            owner: ctx.thread_id(),
        }
    }

    /// Requests display of the media. Safe to call on every visibility tick:
    /// a no-op while media is displayed, after permanent failure, or for
    /// variants without a load operation.
    pub fn load_media(&self, ctx: &UiContext) {
        ctx.assert_owner(self.owner);

        let Some(load_op) = &self.load_op else {
            return;
        };
        self.slot.wants_media.set(true);
        load_op(ctx, &self.slot);
    }

    /// Releases the displayed media. Never touches the shared cache or the
    /// load attempt state.
    pub fn unload_media(&self, ctx: &UiContext) {
        ctx.assert_owner(self.owner);

        let Some(unload_op) = &self.unload_op else {
            return;
        };
        self.slot.wants_media.set(false);
        unload_op(ctx, &self.slot);
    }

    /// Returns the displayed attachment.
    #[must_use]
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// Returns the resolved variant.
    #[must_use]
    pub const fn variant(&self) -> &DisplayVariant {
        &self.variant
    }

    /// Returns the load attempt state.
    #[must_use]
    pub fn load_state(&self) -> LoadAttemptState {
        self.slot.controller.state()
    }

    /// Returns true while an asynchronous production is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.slot.controller.is_in_flight()
    }

    /// Returns the currently displayed media.
    #[must_use]
    pub fn displayed(&self) -> Option<Media> {
        self.slot.media.borrow().clone()
    }

    /// Returns true if media is currently displayed.
    #[must_use]
    pub fn is_displaying(&self) -> bool {
        self.slot.is_displaying()
    }

    /// Returns true if a load operation is bound.
    #[must_use]
    pub const fn is_loadable(&self) -> bool {
        self.load_op.is_some()
    }

    /// Returns the background treatment.
    #[must_use]
    pub const fn background(&self) -> Background {
        self.background
    }

    /// Returns the attached progress overlay.
    #[must_use]
    pub const fn overlay(&self) -> Option<&OverlayHandle> {
        self.overlay.as_ref()
    }

    /// Visibility of the play icon; `None` for variants without one.
    #[must_use]
    pub fn play_icon_visible(&self) -> Option<bool> {
        matches!(self.variant, DisplayVariant::Video(_)).then(|| self.slot.play_icon_visible.get())
    }

    /// Snapshot of the background, overlay and play icon.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        Appearance {
            background: self.background,
            overlay: self.overlay.clone(),
            play_icon_visible: self.play_icon_visible(),
        }
    }

    /// Size of the displayed media scaled down to the width constraint.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fitted_size(&self) -> Option<(f32, f32)> {
        let (width, height) = self.slot.media.borrow().as_ref()?.dimensions();
        if width == 0 {
            return None;
        }
        let fitted = self.max_message_width.min(width as f32);
        Some((fitted, fitted * height as f32 / width as f32))
    }
}

impl std::fmt::Debug for MediaView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaView")
            .field("variant", &self.variant.kind())
            .field("state", &self.load_state())
            .field("displaying", &self.is_displaying())
            .field("background", &self.background)
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

fn validate(stream: &ResolvedStream, kind: VariantKind) -> Result<(), MediaError> {
    let valid = match kind {
        VariantKind::Video => stream.stream().is_valid_video(),
        _ => stream.stream().is_valid_image(),
    };
    if valid {
        Ok(())
    } else {
        Err(MediaError::InvalidMedia {
            key: stream.key().clone(),
            kind,
        })
    }
}

fn thumbnail_load_op(
    stream: ResolvedStream,
    kind: VariantKind,
    producer: Rc<dyn ThumbnailProducer>,
) -> MediaOp {
    Box::new(move |ctx: &UiContext, slot: &Rc<DisplaySlot>| {
        if slot.is_displaying() {
            return;
        }
        let key = stream.key();
        let media = slot.controller.try_load(
            ctx,
            key,
            || {
                if let Err(e) = validate(&stream, kind) {
                    error!(error = %e, "Ignoring invalid attachment");
                    return Production::Failed;
                }
                producer.produce_medium(
                    ctx,
                    stream.stream(),
                    on_success(slot, key),
                    on_failure(slot, key),
                )
            },
            true,
        );
        if let Some(media) = media {
            slot.show(media);
        }
    })
}

fn animated_load_op(stream: ResolvedStream, decoder: Arc<dyn FullFileDecoder>) -> MediaOp {
    Box::new(move |ctx: &UiContext, slot: &Rc<DisplaySlot>| {
        if slot.is_displaying() {
            return;
        }
        let key = stream.key();
        let media = slot.controller.try_load(
            ctx,
            key,
            || {
                if let Err(e) = validate(&stream, VariantKind::AnimatedImage) {
                    error!(error = %e, "Ignoring invalid attachment");
                    return Production::Failed;
                }
                let Some(path) = stream.stream().original_file_path() else {
                    let e = MediaError::MissingFilePath { key: key.clone() };
                    error!(error = %e, "Cannot decode animated image");
                    return Production::Failed;
                };
                Production::from(decoder.decode(path))
            },
            false,
        );
        if let Some(media) = media {
            slot.show(media);
        }
    })
}

fn unload_op() -> MediaOp {
    Box::new(|_: &UiContext, slot: &Rc<DisplaySlot>| {
        if slot.clear() {
            trace!("Released displayed media");
        }
    })
}

fn ignore_readiness() -> ReadyCallback {
    Box::new(|_: &UiContext, _: bool| {})
}

fn on_success(slot: &Rc<DisplaySlot>, key: &CacheKey) -> SuccessCallback {
    let slot = Rc::downgrade(slot);
    let key = key.clone();
    Box::new(move |ctx: &UiContext, media: Media| {
        let Some(slot) = slot.upgrade() else {
            trace!(key = %key, "Media view dropped before production finished");
            return;
        };
        if let Some(media) = slot.controller.complete_async(ctx, &key, Some(media)) {
            slot.deliver(&key, media);
        }
    })
}

fn on_failure(slot: &Rc<DisplaySlot>, key: &CacheKey) -> FailureCallback {
    let slot = Rc::downgrade(slot);
    let key = key.clone();
    Box::new(move |ctx: &UiContext| {
        let Some(slot) = slot.upgrade() else {
            trace!(key = %key, "Media view dropped before production failed");
            return;
        };
        let _ = slot.controller.complete_async(ctx, &key, None);
    })
}
