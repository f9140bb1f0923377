//! Conflict resolution for records edited on both sides.

use anyhow::Result;
use log::{debug, warn};
use sea_orm::ActiveValue;

use crate::entities::todo::{self, SyncStatus};
use crate::mapper;
use crate::remote::TodoDto;
use crate::repositories::TodoRepository;

use super::SyncService;

/// A record with unpushed local edits that the server also changed.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub local: todo::Model,
    pub remote: TodoDto,
}

/// Strategy applied to each conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictResolution {
    /// Keep the local copy; it stays PENDING and wins on the next upload.
    KeepLocal,
    /// Take the server copy unconditionally.
    KeepRemote,
    /// Take whichever side was modified last; ties favor the local copy.
    #[default]
    KeepLatest,
    /// Server copy as the base, local title on top, requeued for upload.
    Merge,
}

impl SyncService {
    /// Apply the default strategy to every detected conflict. Returns the
    /// number resolved; per-item write failures are logged and skipped.
    pub(crate) async fn resolve_conflicts(&self, conflicts: Vec<Conflict>) -> Result<usize> {
        self.resolve_conflicts_with(conflicts, ConflictResolution::default()).await
    }

    pub(crate) async fn resolve_conflicts_with(
        &self,
        conflicts: Vec<Conflict>,
        strategy: ConflictResolution,
    ) -> Result<usize> {
        let storage = self.storage.lock().await;
        let mut resolved = 0;
        let mut changed = false;

        for conflict in conflicts {
            let outcome = apply(&storage.conn, &conflict, strategy).await;
            match outcome {
                Ok(wrote) => {
                    resolved += 1;
                    changed |= wrote;
                }
                Err(e) => {
                    warn!("failed to resolve conflict on {}: {e:#}", conflict.local.id);
                }
            }
        }

        if changed {
            storage.mark_changed();
        }
        Ok(resolved)
    }
}

/// Resolve one conflict. Returns whether the local row was written.
async fn apply<C>(conn: &C, conflict: &Conflict, strategy: ConflictResolution) -> Result<bool>
where
    C: sea_orm::ConnectionTrait,
{
    let local = &conflict.local;
    let remote = &conflict.remote;

    match strategy {
        ConflictResolution::KeepLocal => {
            debug!("conflict on {}: keeping local copy", local.id);
            Ok(false)
        }
        ConflictResolution::KeepRemote => {
            overwrite_with_remote(conn, local, remote).await?;
            Ok(true)
        }
        ConflictResolution::KeepLatest => {
            if remote.updated_at > local.updated_at {
                debug!("conflict on {}: remote copy is newer, taking it", local.id);
                overwrite_with_remote(conn, local, remote).await?;
                Ok(true)
            } else {
                debug!("conflict on {}: local copy is newer, keeping it", local.id);
                Ok(false)
            }
        }
        ConflictResolution::Merge => {
            let mut active = mapper::active_model_from_dto(remote, SyncStatus::Pending);
            active.id = ActiveValue::Unchanged(local.id);
            active.title = ActiveValue::Set(local.title.clone());
            TodoRepository::update(conn, active).await?;
            Ok(true)
        }
    }
}

async fn overwrite_with_remote<C>(conn: &C, local: &todo::Model, remote: &TodoDto) -> Result<()>
where
    C: sea_orm::ConnectionTrait,
{
    let mut active = mapper::active_model_from_dto(remote, SyncStatus::Synced);
    active.id = ActiveValue::Unchanged(local.id);
    TodoRepository::update(conn, active).await?;
    Ok(())
}
