//! Mediaview - lazy media loading for message lists.
//!
//! This crate displays image, animated image and video attachments inside
//! scrolling message rows, keeping decoded media in a shared bounded cache and
//! releasing it as rows scroll out of view.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing load orchestration services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing the cache, decoders and configuration.
pub mod infrastructure;
/// Presentation layer containing media views and their list container.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "mediaview";
