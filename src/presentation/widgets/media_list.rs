//! Scrolling container driving media view lifecycles.

use tracing::debug;

use super::media_view::MediaView;
use crate::domain::context::UiContext;
use crate::infrastructure::config::ListConfig;

/// Outcome of a viewport update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportUpdate {
    /// Views asked to load that were not displaying.
    pub loaded: usize,
    /// Views whose displayed media was released.
    pub unloaded: usize,
}

/// Ordered list of media views, loaded around the visible rows and unloaded
/// once they scroll far enough away.
#[derive(Debug)]
pub struct MediaList {
    views: Vec<MediaView>,
    load_buffer: usize,
    memory_buffer: usize,
}

impl MediaList {
    /// Creates a list from `views`.
    #[must_use]
    pub fn new(views: Vec<MediaView>, config: &ListConfig) -> Self {
        Self {
            views,
            load_buffer: config.load_buffer,
            memory_buffer: config.memory_buffer.max(config.load_buffer),
        }
    }

    /// Appends a view at the bottom.
    pub fn push(&mut self, view: MediaView) {
        self.views.push(view);
    }

    /// Number of views in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns true if the list has no views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns the view at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaView> {
        self.views.get(index)
    }

    /// Iterates over the views from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &MediaView> {
        self.views.iter()
    }

    /// Number of views currently displaying media.
    #[must_use]
    pub fn displaying_count(&self) -> usize {
        self.views.iter().filter(|v| v.is_displaying()).count()
    }

    /// Applies a new viewport covering rows `visible_start..=visible_end`.
    ///
    /// Views within `load_buffer` rows of the viewport are loaded. Displaying
    /// views further than `memory_buffer` rows away are unloaded.
    pub fn update_viewport(
        &self,
        ctx: &UiContext,
        visible_start: usize,
        visible_end: usize,
    ) -> ViewportUpdate {
        let load_start = visible_start.saturating_sub(self.load_buffer);
        let load_end = visible_end.saturating_add(self.load_buffer);
        let memory_start = visible_start.saturating_sub(self.memory_buffer);
        let memory_end = visible_end.saturating_add(self.memory_buffer);

        let mut update = ViewportUpdate::default();
        for (idx, view) in self.views.iter().enumerate() {
            if (load_start..=load_end).contains(&idx) {
                if view.is_loadable() && !view.is_displaying() {
                    view.load_media(ctx);
                    update.loaded += 1;
                }
            } else if !(memory_start..=memory_end).contains(&idx) && view.is_displaying() {
                view.unload_media(ctx);
                update.unloaded += 1;
            }
        }

        if update != ViewportUpdate::default() {
            debug!(
                visible_start,
                visible_end,
                loaded = update.loaded,
                unloaded = update.unloaded,
                "Viewport updated"
            );
        }
        update
    }

    /// Releases the media of every view.
    pub fn unload_all(&self, ctx: &UiContext) {
        for view in &self.views {
            view.unload_media(ctx);
        }
    }
}
