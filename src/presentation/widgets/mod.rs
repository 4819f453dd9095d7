//! Media display widgets.

mod media_list;
mod media_view;

pub use media_list::{MediaList, ViewportUpdate};
pub use media_view::{Appearance, Background, MediaCollaborators, MediaView, MediaViewOptions};
