//! Domain entity definitions.

mod attachment;
mod load_state;
mod media;
mod transfer;
mod variant;

pub use attachment::{Attachment, AttachmentPointer, AttachmentStream, CacheKey};
pub use load_state::LoadAttemptState;
pub use media::{AnimatedImage, AnimationFrame, Media};
pub use transfer::ProgressInfo;
pub use variant::{DisplayVariant, ResolvedStream, VariantKind};
