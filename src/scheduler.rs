//! Background sync scheduling.
//!
//! Mirrors the trigger surface of a platform job scheduler: a recurring
//! sync at a fixed cadence, on-demand one-shot syncs, unique job names so
//! triggers coalesce instead of piling up, and linear backoff when a pass
//! fails. Jobs only run while the network oracle reports online; an
//! offline job parks on the connectivity feed instead of burning retries.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::constants::{
    MAX_BACKOFF_MULTIPLIER, ONE_TIME_SYNC_WORK_NAME, PERIODIC_SYNC_INTERVAL_MINUTES,
    PERIODIC_SYNC_WORK_NAME, SYNC_BACKOFF_BASE_MINUTES,
};
use crate::network::NetworkMonitor;
use crate::sync::{SyncService, SyncStatus};

/// What to do when a job with the same unique name is already scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingWorkPolicy {
    /// Leave the existing job in place and drop the new request.
    Keep,
    /// Cancel the existing job and schedule the new one.
    Replace,
}

/// Schedules sync passes on top of a [`SyncService`].
pub struct SyncScheduler {
    service: SyncService,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(service: SyncService) -> Self {
        Self {
            service,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Start the recurring background sync. With [`ExistingWorkPolicy::Keep`]
    /// an already-running schedule is left untouched.
    pub fn schedule_periodic_sync(&self, policy: ExistingWorkPolicy) {
        let service = self.service.clone();
        self.schedule_unique(PERIODIC_SYNC_WORK_NAME, policy, move || {
            tokio::spawn(async move {
                let interval = Duration::from_secs(PERIODIC_SYNC_INTERVAL_MINUTES * 60);
                let mut attempt: u64 = 0;
                loop {
                    wait_for_connectivity(service.network.as_ref()).await;
                    match service.sync_with_remote().await {
                        SyncStatus::Error { message } => {
                            attempt += 1;
                            let delay = backoff_delay(attempt);
                            warn!("periodic sync failed ({message}), retrying in {delay:?}");
                            tokio::time::sleep(delay).await;
                        }
                        status => {
                            debug!("periodic sync finished: {status:?}");
                            attempt = 0;
                            tokio::time::sleep(interval).await;
                        }
                    }
                }
            })
        });
    }

    /// Request an immediate one-shot sync. Retries a failing pass with
    /// linear backoff, then gives up until the next trigger.
    pub fn request_sync(&self, policy: ExistingWorkPolicy) {
        let service = self.service.clone();
        self.schedule_unique(ONE_TIME_SYNC_WORK_NAME, policy, move || {
            tokio::spawn(async move {
                for attempt in 1..=MAX_BACKOFF_MULTIPLIER {
                    wait_for_connectivity(service.network.as_ref()).await;
                    match service.sync_with_remote().await {
                        SyncStatus::Error { message } => {
                            let delay = backoff_delay(attempt);
                            warn!("requested sync failed ({message}), retrying in {delay:?}");
                            tokio::time::sleep(delay).await;
                        }
                        status => {
                            debug!("requested sync finished: {status:?}");
                            return;
                        }
                    }
                }
                warn!("requested sync gave up after {MAX_BACKOFF_MULTIPLIER} attempts");
            })
        });
    }

    /// Cancel the recurring background sync.
    pub fn cancel_periodic_sync(&self) {
        self.cancel(PERIODIC_SYNC_WORK_NAME);
    }

    /// Cancel one job by its unique name.
    pub fn cancel(&self, name: &str) {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = jobs.remove(name) {
            handle.abort();
            info!("cancelled sync job '{name}'");
        }
    }

    /// Cancel every scheduled job.
    pub fn cancel_all(&self) {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        for (name, handle) in jobs.drain() {
            handle.abort();
            debug!("cancelled sync job '{name}'");
        }
    }

    /// Whether a job with this unique name is currently scheduled.
    pub fn is_scheduled(&self, name: &str) -> bool {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.get(name).is_some_and(|handle| !handle.is_finished())
    }

    fn schedule_unique<F>(&self, name: &str, policy: ExistingWorkPolicy, spawn: F)
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = jobs.get(name) {
            if !existing.is_finished() {
                match policy {
                    ExistingWorkPolicy::Keep => {
                        debug!("sync job '{name}' already scheduled, keeping it");
                        return;
                    }
                    ExistingWorkPolicy::Replace => {
                        existing.abort();
                        debug!("sync job '{name}' replaced");
                    }
                }
            }
        }
        jobs.insert(name.to_string(), spawn());
        info!("scheduled sync job '{name}'");
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Park until the network oracle reports online.
async fn wait_for_connectivity(network: &dyn NetworkMonitor) {
    if network.is_online() {
        return;
    }
    debug!("sync job waiting for connectivity");
    let mut rx = network.watch();
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Monitor gone; proceed and let the pass report NoConnectivity.
            return;
        }
    }
}

/// Linear backoff: base delay times the attempt number, capped.
fn backoff_delay(attempt: u64) -> Duration {
    let multiplier = attempt.min(MAX_BACKOFF_MULTIPLIER);
    Duration::from_secs(SYNC_BACKOFF_BASE_MINUTES * 60 * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(15 * 60));
        assert_eq!(backoff_delay(2), Duration::from_secs(30 * 60));
        assert_eq!(backoff_delay(4), Duration::from_secs(60 * 60));
        assert_eq!(backoff_delay(9), Duration::from_secs(60 * 60));
    }
}
