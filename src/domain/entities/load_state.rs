//! Per-view load attempt state.

/// Outcome of the load attempts made by one media view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadAttemptState {
    /// No media obtained yet. Async production may be in flight.
    #[default]
    NotAttempted,
    /// Media was obtained from the cache or produced.
    Loaded,
    /// Production failed for good; no further attempts are made.
    PermanentlyFailed,
}

impl LoadAttemptState {
    /// Returns true once media has been obtained.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Returns true if loading failed permanently.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::PermanentlyFailed)
    }
}

impl std::fmt::Display for LoadAttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "not-attempted"),
            Self::Loaded => write!(f, "loaded"),
            Self::PermanentlyFailed => write!(f, "failed"),
        }
    }
}
