//! Infrastructure layer with adapters for the media engine's collaborators.

/// Application configuration.
pub mod config;
/// Media caching, decoding and probing.
pub mod media;
/// Download and upload progress tracking.
pub mod transfers;

pub use config::{AppConfig, CliArgs, ConfigStore, LogLevel};
pub use media::{AnimatedImageDecoder, CacheStats, MemoryMediaCache, ThumbnailGenerator};
pub use transfers::{DownloadTracker, UploadTracker};
