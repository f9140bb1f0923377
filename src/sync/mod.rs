//! Synchronization engine.
//!
//! [`SyncService`] reconciles the local todo store against a remote task
//! service. Reads are always served locally (offline-first); writes are
//! queued as PENDING and pushed opportunistically, with a full
//! bidirectional pass ([`SyncService::sync_with_remote`]) providing the
//! actual convergence guarantee. The pass uploads pending changes and
//! downloads remote changes concurrently, detects conflicting concurrent
//! edits, and resolves them last-writer-wins by timestamp.

pub mod conflict;
pub mod download;
pub mod mutations;
pub mod queries;
pub mod upload;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::busy::BusyTracker;
use crate::constants::{DEFAULT_LOOKBACK_HOURS, LAST_SYNC_KEY};
use crate::network::NetworkMonitor;
use crate::remote::RemoteService;
use crate::repositories::{SyncMetaRepository, TodoRepository};
use crate::storage::LocalStorage;
use crate::utils::time;

pub use conflict::{Conflict, ConflictResolution};
pub use mutations::CreateTodoArgs;

/// Result of a sync pass, as seen by callers. The engine never propagates
/// an `Err` across this boundary; internal failures fold into
/// [`SyncStatus::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Another pass is already running (only from [`SyncService::try_sync`]).
    InProgress,
    /// The connectivity oracle reported offline; nothing was attempted.
    NoConnectivity,
    /// The pass completed; per-item failures, if any, are in the stats.
    Success { stats: SyncStats },
    /// The pass aborted on an unexpected error.
    Error { message: String },
}

/// Counters for one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records confirmed by the batch-upsert endpoint.
    pub uploaded: usize,
    /// Records inserted or overwritten from the server.
    pub downloaded: usize,
    /// Records removed locally after a confirmed remote delete.
    pub deleted: usize,
    /// Conflicts detected and resolved.
    pub conflicts: usize,
    /// Per-item failures across both phases.
    pub failed: usize,
}

/// Outcome of one phase (upload or download). Per-item errors are
/// absorbed into the counters; only the collected conflicts flow onward.
#[derive(Debug, Default)]
pub(crate) struct PhaseOutcome {
    pub successful: usize,
    pub failed: usize,
    pub deleted: usize,
    pub conflicts: Vec<Conflict>,
}

/// Service that manages data synchronization between the remote task
/// service and local storage.
#[derive(Clone)]
pub struct SyncService {
    pub(crate) storage: Arc<Mutex<LocalStorage>>,
    pub(crate) remote: Arc<dyn RemoteService>,
    pub(crate) network: Arc<dyn NetworkMonitor>,
    pub(crate) busy: BusyTracker,
    /// Serializes whole passes; concurrent callers wait behind it.
    sync_lock: Arc<Mutex<()>>,
    syncing: Arc<AtomicBool>,
}

impl SyncService {
    pub fn new(
        storage: Arc<Mutex<LocalStorage>>,
        remote: Arc<dyn RemoteService>,
        network: Arc<dyn NetworkMonitor>,
    ) -> Self {
        Self {
            storage,
            remote,
            network,
            busy: BusyTracker::new(),
            sync_lock: Arc::new(Mutex::new(())),
            syncing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The activity tracker observers poll to detect quiescence.
    pub fn busy_tracker(&self) -> BusyTracker {
        self.busy.clone()
    }

    /// Whether a pass is currently running.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Run a pass unless one is already in flight, in which case return
    /// [`SyncStatus::InProgress`] immediately instead of waiting.
    pub async fn try_sync(&self) -> SyncStatus {
        if self.is_syncing() {
            return SyncStatus::InProgress;
        }
        self.sync_with_remote().await
    }

    /// Perform one full reconciliation pass.
    ///
    /// Checks connectivity first, then uploads pending local changes and
    /// downloads remote changes concurrently, resolves any conflicts,
    /// records the sync timestamp, and purges confirmed deletions.
    /// Overlapping calls are serialized; each caller gets its own pass.
    pub async fn sync_with_remote(&self) -> SyncStatus {
        if !self.network.is_online() {
            debug!("sync skipped: no connectivity");
            return SyncStatus::NoConnectivity;
        }

        let _pass = self.sync_lock.lock().await;
        self.syncing.store(true, Ordering::SeqCst);
        let _busy = self.busy.enter("sync_with_remote");

        let result = self.perform_sync().await;
        self.syncing.store(false, Ordering::SeqCst);

        match result {
            Ok(stats) => {
                info!(
                    "✅ Sync complete: {} up, {} down, {} deleted, {} conflicts, {} failed",
                    stats.uploaded, stats.downloaded, stats.deleted, stats.conflicts, stats.failed
                );
                SyncStatus::Success { stats }
            }
            Err(e) => {
                error!("❌ Sync failed: {e:#}");
                SyncStatus::Error { message: format!("{e:#}") }
            }
        }
    }

    /// Internal pass implementation. Phases absorb their own per-item
    /// failures; an `Err` here means the pass aborted before the
    /// timestamp was recorded.
    async fn perform_sync(&self) -> Result<SyncStats> {
        let since = self.last_sync_time().await?;
        debug!("🔄 Sync pass started, downloading changes since {}", time::format_millis(since));

        let (upload, download) = tokio::join!(self.upload_pending(), self.download_since(since));

        let mut conflicts = upload.conflicts;
        let mut outcome = SyncStats {
            uploaded: upload.successful,
            downloaded: download.successful,
            deleted: upload.deleted,
            conflicts: 0,
            failed: upload.failed + download.failed,
        };
        conflicts.extend(download.conflicts);

        if !conflicts.is_empty() {
            outcome.conflicts = self.resolve_conflicts(conflicts).await?;
        }

        self.save_last_sync_time(time::now_millis()).await?;
        outcome.deleted += self.cleanup_deleted().await?;

        Ok(outcome)
    }

    /// Last successful sync timestamp, defaulting to a fixed lookback
    /// window when none has been recorded yet.
    async fn last_sync_time(&self) -> Result<i64> {
        let storage = self.storage.lock().await;
        let stored = SyncMetaRepository::get_millis(&storage.conn, LAST_SYNC_KEY).await?;
        Ok(stored.unwrap_or_else(|| time::now_millis() - DEFAULT_LOOKBACK_HOURS * 60 * 60 * 1000))
    }

    async fn save_last_sync_time(&self, millis: i64) -> Result<()> {
        let storage = self.storage.lock().await;
        SyncMetaRepository::set_millis(&storage.conn, LAST_SYNC_KEY, millis).await
    }

    /// Purge deletion-marked records the server has already confirmed.
    /// Residual cleanup for anything the upload phase missed.
    async fn cleanup_deleted(&self) -> Result<usize> {
        let storage = self.storage.lock().await;
        let confirmed = TodoRepository::get_confirmed_deletions(&storage.conn).await?;
        let count = confirmed.len();
        for todo in confirmed {
            TodoRepository::delete(&storage.conn, todo).await?;
        }
        if count > 0 {
            storage.mark_changed();
            debug!("purged {count} confirmed deletions");
        }
        Ok(count)
    }
}
