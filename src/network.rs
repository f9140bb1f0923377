//! Network reachability oracle.
//!
//! The sync engine consults this before any remote I/O and subscribes to
//! it for online/offline transitions. The production wiring decides how
//! reachability is actually detected; the engine only depends on the
//! trait.

use tokio::sync::watch;

/// Reports current and streaming network reachability.
pub trait NetworkMonitor: Send + Sync {
    /// Current reachability.
    fn is_online(&self) -> bool;

    /// Subscribe to reachability changes.
    fn watch(&self) -> watch::Receiver<bool>;
}

/// A monitor whose state is set explicitly. Used for wiring where an
/// external component reports connectivity, and in tests.
pub struct StaticNetworkMonitor {
    state: watch::Sender<bool>,
}

impl StaticNetworkMonitor {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        Self { state }
    }

    pub fn set_online(&self, online: bool) {
        // send() fails only when every receiver is gone; state still updates.
        self.state.send_replace(online);
    }
}

impl NetworkMonitor for StaticNetworkMonitor {
    fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
