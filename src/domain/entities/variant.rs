//! Display classification of an attachment.

use super::attachment::{AttachmentStream, CacheKey};

/// Stream attachment paired with the key it is cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    key: CacheKey,
    stream: AttachmentStream,
}

impl ResolvedStream {
    /// Pairs a stream with its cache key.
    #[must_use]
    pub const fn new(key: CacheKey, stream: AttachmentStream) -> Self {
        Self { key, stream }
    }

    /// Returns the cache key.
    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns the underlying stream.
    #[must_use]
    pub const fn stream(&self) -> &AttachmentStream {
        &self.stream
    }
}

/// How an attachment is displayed. Fixed for the lifetime of a media view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayVariant {
    /// Not downloaded yet; may show download progress.
    Pending(CacheKey),
    /// Nothing displayable; a static placeholder is shown.
    InvalidOrMissing,
    /// Still image shown through a medium thumbnail.
    StillImage(ResolvedStream),
    /// Animated image decoded from the full file.
    AnimatedImage(ResolvedStream),
    /// Video shown through a medium thumbnail with a play icon.
    Video(ResolvedStream),
}

impl DisplayVariant {
    /// Returns the payload-free kind.
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::Pending(_) => VariantKind::Pending,
            Self::InvalidOrMissing => VariantKind::InvalidOrMissing,
            Self::StillImage(_) => VariantKind::StillImage,
            Self::AnimatedImage(_) => VariantKind::AnimatedImage,
            Self::Video(_) => VariantKind::Video,
        }
    }

    /// Returns the stream payload for the locally available variants.
    #[must_use]
    pub const fn stream(&self) -> Option<&ResolvedStream> {
        match self {
            Self::StillImage(s) | Self::AnimatedImage(s) | Self::Video(s) => Some(s),
            Self::Pending(_) | Self::InvalidOrMissing => None,
        }
    }
}

/// Payload-free tag of a [`DisplayVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// See [`DisplayVariant::Pending`].
    Pending,
    /// See [`DisplayVariant::InvalidOrMissing`].
    InvalidOrMissing,
    /// See [`DisplayVariant::StillImage`].
    StillImage,
    /// See [`DisplayVariant::AnimatedImage`].
    AnimatedImage,
    /// See [`DisplayVariant::Video`].
    Video,
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InvalidOrMissing => write!(f, "invalid"),
            Self::StillImage => write!(f, "image"),
            Self::AnimatedImage => write!(f, "animated"),
            Self::Video => write!(f, "video"),
        }
    }
}
