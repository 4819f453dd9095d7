//! Attachment entities as seen by the media view.

use std::path::{Path, PathBuf};

/// Stable identity of an attachment.
/// Used as the key for decoded media in the shared cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a new `CacheKey` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a `CacheKey` for a local file by hashing its path.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Attachment that is known but not yet available locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPointer {
    unique_id: Option<CacheKey>,
}

impl AttachmentPointer {
    /// Creates a pointer with a stable id.
    #[must_use]
    pub fn new(id: impl Into<CacheKey>) -> Self {
        Self {
            unique_id: Some(id.into()),
        }
    }

    /// Creates a pointer that never received an id.
    #[must_use]
    pub const fn without_id() -> Self {
        Self { unique_id: None }
    }

    /// Returns the stable id, if any.
    #[must_use]
    pub const fn unique_id(&self) -> Option<&CacheKey> {
        self.unique_id.as_ref()
    }
}

/// Attachment whose content is materialized on local storage.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentStream {
    unique_id: Option<CacheKey>,
    is_image: bool,
    is_animated: bool,
    is_video: bool,
    is_valid_image: bool,
    is_valid_video: bool,
    is_uploaded: bool,
    original_file_path: Option<PathBuf>,
}

impl AttachmentStream {
    /// Creates a stream attachment with a stable id and no kind flags.
    #[must_use]
    pub fn new(id: impl Into<CacheKey>) -> Self {
        Self {
            unique_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Stream attachment lacking a stable id.
    #[must_use]
    pub fn without_id() -> Self {
        Self::default()
    }

    /// Marks the content as a still image.
    #[must_use]
    pub const fn as_image(mut self) -> Self {
        self.is_image = true;
        self
    }

    /// Marks the content as an animated image.
    #[must_use]
    pub const fn as_animated(mut self) -> Self {
        self.is_image = true;
        self.is_animated = true;
        self
    }

    /// Marks the content as a video.
    #[must_use]
    pub const fn as_video(mut self) -> Self {
        self.is_video = true;
        self
    }

    /// Sets whether the content decodes as an image and as a video.
    #[must_use]
    pub const fn with_validity(mut self, valid_image: bool, valid_video: bool) -> Self {
        self.is_valid_image = valid_image;
        self.is_valid_video = valid_video;
        self
    }

    /// Sets whether an outgoing attachment finished uploading.
    #[must_use]
    pub const fn with_uploaded(mut self, uploaded: bool) -> Self {
        self.is_uploaded = uploaded;
        self
    }

    /// Sets the location of the full file on local storage.
    #[must_use]
    pub fn with_original_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.original_file_path = Some(path.into());
        self
    }

    /// Returns the stable id, if any.
    #[must_use]
    pub const fn unique_id(&self) -> Option<&CacheKey> {
        self.unique_id.as_ref()
    }

    /// Returns true for still or animated images.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        self.is_image
    }

    /// Returns true for animated images.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.is_animated
    }

    /// Returns true for videos.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        self.is_video
    }

    /// Returns true if the content decodes as an image.
    #[must_use]
    pub const fn is_valid_image(&self) -> bool {
        self.is_valid_image
    }

    /// Returns true if the content decodes as a video.
    #[must_use]
    pub const fn is_valid_video(&self) -> bool {
        self.is_valid_video
    }

    /// Returns true once an outgoing attachment finished uploading.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        self.is_uploaded
    }

    /// Returns the location of the full file, if known.
    #[must_use]
    pub fn original_file_path(&self) -> Option<&Path> {
        self.original_file_path.as_deref()
    }
}

/// A piece of message media, either pending or materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Remote attachment that has not been downloaded.
    Pending(AttachmentPointer),
    /// Attachment record exists but its content cannot be shown.
    InvalidOrMissing,
    /// Locally available attachment.
    Stream(AttachmentStream),
}

impl Attachment {
    /// Returns the stable id, if the attachment carries one.
    #[must_use]
    pub const fn unique_id(&self) -> Option<&CacheKey> {
        match self {
            Self::Pending(pointer) => pointer.unique_id(),
            Self::Stream(stream) => stream.unique_id(),
            Self::InvalidOrMissing => None,
        }
    }

    /// Returns the stream payload for local attachments.
    #[must_use]
    pub const fn as_stream(&self) -> Option<&AttachmentStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl From<AttachmentStream> for Attachment {
    fn from(stream: AttachmentStream) -> Self {
        Self::Stream(stream)
    }
}

impl From<AttachmentPointer> for Attachment {
    fn from(pointer: AttachmentPointer) -> Self {
        Self::Pending(pointer)
    }
}
