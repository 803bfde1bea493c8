//! Recording `SignOut` hook.

use std::sync::atomic::{AtomicUsize, Ordering};

use taleweave_core::credentials::SignOut;

/// Counts how many times sign-out was requested.
#[derive(Debug, Default)]
pub struct RecordingSignOut {
    count: AtomicUsize,
}

impl RecordingSignOut {
    /// Creates a hook that has not fired yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sign-outs requested so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl SignOut for RecordingSignOut {
    fn sign_out(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
