//! Media handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU and cost-based eviction
//! - Medium thumbnail generation off the UI thread
//! - Full-file decoding of animated images
//! - Attachment probing for local files

pub mod animated;
pub mod memory_cache;
pub mod probe;
pub mod thumbnail;

pub use animated::AnimatedImageDecoder;
pub use memory_cache::{CacheStats, MemoryMediaCache};
pub use probe::{partial_target, probe_directory, probe_file};
pub use thumbnail::ThumbnailGenerator;
