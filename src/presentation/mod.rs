//! Presentation layer with the media views and their list container.

/// Media widgets.
pub mod widgets;

pub use widgets::{
    Appearance, Background, MediaCollaborators, MediaList, MediaView, MediaViewOptions,
    ViewportUpdate,
};
