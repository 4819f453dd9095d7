//! Application layer with the media engine services.

/// Variant resolution, load attempts and overlay binding.
pub mod services;

pub use services::{LoadAttemptController, OverlayHandle, ProgressOverlayBinder, resolve};
