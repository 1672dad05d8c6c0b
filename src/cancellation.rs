//! Cooperative cancellation token, pollable from worker threads.
//!
//! Redesigns the polled-predicate-callback pattern of the original `Ctl`
//! interface into a plain, cloneable handle: a task hands every worker the
//! same token and polls it at the documented suspension points (before each
//! bed, before each item, before each optimizer iteration).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable, thread-safe flag that a running task checks periodically.
///
/// Cloning shares the underlying flag; calling [`CancellationToken::cancel`]
/// on any clone is visible to all others.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from any thread, at any time.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancellationToken::cancel`] has been called.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_across_clones() {
        let a = CancellationToken::new();
        let b = a.clone();
        assert!(!a.is_canceled());
        b.cancel();
        assert!(a.is_canceled());
    }
}
