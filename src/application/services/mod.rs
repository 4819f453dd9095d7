//! Application services driving the media engine.

pub mod load_attempt;
pub mod overlay_binder;
pub mod variant_resolver;

pub use load_attempt::LoadAttemptController;
pub use overlay_binder::{OverlayHandle, ProgressOverlayBinder};
pub use variant_resolver::resolve;
