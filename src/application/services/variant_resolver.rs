//! Classification of attachments into display variants.

use tracing::{error, warn};

use crate::domain::entities::{Attachment, AttachmentStream, DisplayVariant, ResolvedStream};
use crate::domain::errors::MediaError;

/// Classifies an attachment. Infallible: anything that cannot be displayed
/// becomes [`DisplayVariant::InvalidOrMissing`] and is logged.
#[must_use]
pub fn resolve(attachment: &Attachment) -> DisplayVariant {
    match attachment {
        Attachment::Pending(pointer) => match pointer.unique_id() {
            Some(id) => DisplayVariant::Pending(id.clone()),
            None => {
                warn!(error = %MediaError::MissingIdentity, "Pending attachment cannot be tracked");
                DisplayVariant::InvalidOrMissing
            }
        },
        Attachment::InvalidOrMissing => DisplayVariant::InvalidOrMissing,
        Attachment::Stream(stream) => resolve_stream(stream),
    }
}

fn resolve_stream(stream: &AttachmentStream) -> DisplayVariant {
    let Some(key) = stream.unique_id().cloned() else {
        warn!(error = %MediaError::MissingIdentity, "Attachment stream cannot be cached");
        return DisplayVariant::InvalidOrMissing;
    };

    let resolved = ResolvedStream::new(key, stream.clone());
    if stream.is_animated() {
        DisplayVariant::AnimatedImage(resolved)
    } else if stream.is_image() {
        DisplayVariant::StillImage(resolved)
    } else if stream.is_video() {
        DisplayVariant::Video(resolved)
    } else {
        let err = MediaError::unexpected_type("stream is neither image, animation nor video");
        error!(key = %resolved.key(), error = %err, "Attachment has unexpected type");
        DisplayVariant::InvalidOrMissing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AttachmentPointer, CacheKey, VariantKind};
    use test_case::test_case;

    #[test_case(AttachmentStream::new("s").as_animated(), VariantKind::AnimatedImage ; "animated")]
    #[test_case(AttachmentStream::new("s").as_image(), VariantKind::StillImage ; "still_image")]
    #[test_case(AttachmentStream::new("s").as_video(), VariantKind::Video ; "video")]
    #[test_case(AttachmentStream::new("s"), VariantKind::InvalidOrMissing ; "no_kind_flags")]
    #[test_case(AttachmentStream::without_id().as_image(), VariantKind::InvalidOrMissing ; "stream_without_id")]
    fn test_resolve_stream(stream: AttachmentStream, expected: VariantKind) {
        assert_eq!(resolve(&Attachment::Stream(stream)).kind(), expected);
    }

    #[test]
    fn test_animated_wins_over_video_flag() {
        let stream = AttachmentStream::new("s").as_video().as_animated();
        assert_eq!(
            resolve(&stream.into()).kind(),
            VariantKind::AnimatedImage
        );
    }

    #[test]
    fn test_resolve_pending() {
        let variant = resolve(&AttachmentPointer::new("abc").into());
        assert_eq!(variant, DisplayVariant::Pending(CacheKey::new("abc")));
    }

    #[test]
    fn test_resolve_pending_without_id() {
        let variant = resolve(&AttachmentPointer::without_id().into());
        assert_eq!(variant, DisplayVariant::InvalidOrMissing);
    }

    #[test]
    fn test_resolved_stream_carries_key() {
        let variant = resolve(&AttachmentStream::new("key-1").as_image().into());
        let stream = variant.stream().expect("stream variant");
        assert_eq!(stream.key().as_str(), "key-1");
    }

    #[test]
    fn test_resolve_invalid() {
        assert_eq!(
            resolve(&Attachment::InvalidOrMissing),
            DisplayVariant::InvalidOrMissing
        );
    }
}
