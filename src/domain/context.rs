//! Execution context for UI-confined operations.

use std::marker::PhantomData;
use std::thread::{self, ThreadId};

/// Proof that the caller runs on the thread owning the media views.
///
/// The token is neither `Send` nor `Sync`, so a reference to it cannot cross
/// threads. Every media view operation takes one.
#[derive(Debug)]
pub struct UiContext {
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl UiContext {
    /// Designates the current thread as the UI thread.
    #[must_use]
    pub fn current() -> Self {
        Self {
            thread: thread::current().id(),
            _not_send: PhantomData,
        }
    }

    /// Returns the designated thread.
    #[must_use]
    pub const fn thread_id(&self) -> ThreadId {
        self.thread
    }

    /// Asserts (in debug builds) that this context belongs to `owner`.
    pub fn assert_owner(&self, owner: ThreadId) {
        debug_assert_eq!(
            self.thread, owner,
            "media view operation invoked from a foreign UI context"
        );
    }
}
