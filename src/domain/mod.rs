//! Domain layer with core media entities and port definitions.

/// UI execution context.
pub mod context;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use context::UiContext;
pub use entities::{Attachment, CacheKey, DisplayVariant, LoadAttemptState, Media};
pub use errors::MediaError;
pub use ports::{MediaCachePort, Production};
