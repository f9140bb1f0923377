//! Download phase: pull remote changes since the last sync.

use log::{debug, warn};
use sea_orm::ActiveValue;

use crate::entities::todo::SyncStatus;
use crate::mapper;
use crate::repositories::TodoRepository;

use super::{Conflict, PhaseOutcome, SyncService};

impl SyncService {
    /// Fetch every record the server changed after `since_millis` and fold
    /// it into the local store.
    ///
    /// Unknown records are inserted as SYNCED. A newer remote copy
    /// overwrites a clean SYNCED row; if the local row has unpushed edits
    /// the pair is surfaced as a conflict instead, and a row parked in any
    /// other state is kept as-is. A stale remote copy is ignored. The whole phase fails soft; a fetch error is counted and
    /// the pass carries on with the upload results.
    pub(crate) async fn download_since(&self, since_millis: i64) -> PhaseOutcome {
        let _busy = self.busy.enter("download_remote_changes");
        let mut outcome = PhaseOutcome::default();

        let remote_todos = match self.remote.list_updated_since(since_millis).await {
            Ok(todos) => todos,
            Err(e) => {
                warn!("failed to fetch remote changes: {e}");
                outcome.failed += 1;
                return outcome;
            }
        };

        if remote_todos.is_empty() {
            return outcome;
        }
        debug!("applying {} remote changes", remote_todos.len());

        let storage = self.storage.lock().await;
        let mut changed = false;

        for dto in remote_todos {
            let Some(remote_id) = dto.id.as_deref() else {
                warn!("ignoring remote record without id: {:?}", dto.title);
                outcome.failed += 1;
                continue;
            };

            let local = match TodoRepository::get_by_remote_id(&storage.conn, remote_id).await {
                Ok(local) => local,
                Err(e) => {
                    warn!("lookup failed for remote record {remote_id}: {e:#}");
                    outcome.failed += 1;
                    continue;
                }
            };

            match local {
                None => {
                    let active = mapper::active_model_from_dto(&dto, SyncStatus::Synced);
                    match TodoRepository::insert(&storage.conn, active).await {
                        Ok(_) => {
                            changed = true;
                            outcome.successful += 1;
                        }
                        Err(e) => {
                            warn!("failed to insert remote record {remote_id}: {e:#}");
                            outcome.failed += 1;
                        }
                    }
                }
                Some(local) if dto.updated_at > local.updated_at => {
                    if local.is_pending_sync() {
                        // Both sides changed since the last pass.
                        outcome.conflicts.push(Conflict { local, remote: dto });
                        continue;
                    }
                    if local.sync_status != SyncStatus::Synced {
                        // Parked states (LOCAL, CONFLICT) are the caller's to
                        // release; a newer server copy does not clobber them.
                        debug!("keeping local copy of {remote_id}, parked as {:?}", local.sync_status);
                        continue;
                    }
                    let mut active = mapper::active_model_from_dto(&dto, SyncStatus::Synced);
                    active.id = ActiveValue::Unchanged(local.id);
                    match TodoRepository::update(&storage.conn, active).await {
                        Ok(_) => {
                            changed = true;
                            outcome.successful += 1;
                        }
                        Err(e) => {
                            warn!("failed to apply remote record {remote_id}: {e:#}");
                            outcome.failed += 1;
                        }
                    }
                }
                Some(local) => {
                    debug!("keeping local copy of {remote_id}, it is as new as the server's ({} >= {})",
                        local.updated_at, dto.updated_at);
                }
            }
        }

        if changed {
            storage.mark_changed();
        }
        outcome
    }
}
