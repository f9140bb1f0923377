//! Upload phase: push pending local changes to the server.

use log::{debug, warn};

use crate::constants::SYNC_BATCH_SIZE;
use crate::entities::todo::{self, SyncStatus};
use crate::mapper;
use crate::repositories::TodoRepository;

use super::{PhaseOutcome, SyncService};

impl SyncService {
    /// Push every PENDING record to the server in fixed-size batches.
    ///
    /// Each batch is partitioned into deletions (records flagged for
    /// removal) and live records. Deletions go through the single-record
    /// delete endpoint and are removed locally once the server confirms;
    /// live records go through the batch upsert, whose response carries
    /// the server-assigned ids back in request order. Failures are
    /// counted and logged, never fatal to the pass.
    pub(crate) async fn upload_pending(&self) -> PhaseOutcome {
        let _busy = self.busy.enter("upload_pending");
        let mut outcome = PhaseOutcome::default();

        let pending = {
            let storage = self.storage.lock().await;
            match TodoRepository::get_by_sync_status(&storage.conn, SyncStatus::Pending).await {
                Ok(todos) => todos,
                Err(e) => {
                    warn!("upload skipped, failed to read pending records: {e:#}");
                    outcome.failed += 1;
                    return outcome;
                }
            }
        };

        if pending.is_empty() {
            return outcome;
        }
        debug!("uploading {} pending records", pending.len());

        for chunk in pending.chunks(SYNC_BATCH_SIZE) {
            let (deletions, live): (Vec<_>, Vec<_>) =
                chunk.iter().cloned().partition(|t| t.pending_delete);

            for todo in deletions {
                self.push_deletion(&todo, &mut outcome).await;
            }
            if !live.is_empty() {
                self.push_batch(&live, &mut outcome).await;
            }
        }

        outcome
    }

    /// Delete one record remotely, then drop the local tombstone.
    async fn push_deletion(&self, todo: &todo::Model, outcome: &mut PhaseOutcome) {
        let Some(remote_id) = todo.remote_id.as_deref() else {
            // Never reached the server; nothing remote to delete.
            return;
        };

        match self.remote.delete_todo(remote_id).await {
            Ok(()) => {
                let storage = self.storage.lock().await;
                match TodoRepository::delete_by_id(&storage.conn, todo.id).await {
                    Ok(_) => {
                        storage.mark_changed();
                        outcome.deleted += 1;
                    }
                    Err(e) => {
                        warn!("remote delete confirmed but local purge failed for {}: {e:#}", todo.id);
                        outcome.failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!("failed to delete {remote_id} remotely: {e}");
                outcome.failed += 1;
            }
        }
    }

    /// Upsert a batch and record the server-assigned ids. The response is
    /// positionally aligned with the request.
    async fn push_batch(&self, live: &[todo::Model], outcome: &mut PhaseOutcome) {
        let payload: Vec<_> = live.iter().map(mapper::dto_from_model).collect();

        let returned = match self.remote.sync_batch(&payload).await {
            Ok(returned) => returned,
            Err(e) => {
                warn!("batch upload of {} records failed: {e}", live.len());
                outcome.failed += live.len();
                return;
            }
        };

        let storage = self.storage.lock().await;
        let mut changed = false;
        for (dto, local) in returned.iter().zip(live) {
            let Some(remote_id) = dto.id.as_deref() else {
                warn!("server returned no id for uploaded record {}", local.id);
                outcome.failed += 1;
                continue;
            };
            match TodoRepository::set_remote_id(&storage.conn, local.id, remote_id, SyncStatus::Synced)
                .await
            {
                Ok(()) => {
                    changed = true;
                    outcome.successful += 1;
                }
                Err(e) => {
                    warn!("failed to record remote id {remote_id} for {}: {e:#}", local.id);
                    outcome.failed += 1;
                }
            }
        }
        if changed {
            storage.mark_changed();
        }
    }
}
