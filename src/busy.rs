//! Reference-counted activity tracker.
//!
//! The sync engine enters the tracker around every asynchronous
//! sub-operation; external observers poll [`BusyTracker::is_idle`] to
//! detect quiescence (the test-synchronization hook the engine exposes).
//! The guard decrements on drop, so every exit path releases exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;

/// Counts in-flight asynchronous operations.
#[derive(Clone, Default)]
pub struct BusyTracker {
    active: Arc<AtomicUsize>,
}

impl BusyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an operation as started. Hold the returned guard for its
    /// duration; dropping it marks the operation finished.
    pub fn enter(&self, reason: &str) -> BusyGuard {
        let count = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        trace!("busy +1 ({reason}), active={count}");
        BusyGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.load(Ordering::SeqCst) == 0
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// RAII guard pairing one increment with exactly one decrement.
pub struct BusyGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let tracker = BusyTracker::new();
        assert!(tracker.is_idle());
        {
            let _a = tracker.enter("a");
            let _b = tracker.enter("b");
            assert_eq!(tracker.active_count(), 2);
        }
        assert!(tracker.is_idle());
    }

    #[test]
    fn guard_releases_on_panic() {
        let tracker = BusyTracker::new();
        let clone = tracker.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = clone.enter("panicky");
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(tracker.is_idle());
    }
}
