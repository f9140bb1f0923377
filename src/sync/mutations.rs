//! Local write surface.
//!
//! Every mutation lands in local storage first and is queued as PENDING.
//! When the network is up, a single-record push is attempted right away;
//! its failure is logged and absorbed, since the next full pass will
//! carry the change anyway.

use anyhow::{bail, Result};
use log::{debug, warn};
use sea_orm::{ActiveValue, IntoActiveModel};

use crate::entities::todo::{self, Priority, SyncStatus};
use crate::mapper;
use crate::repositories::TodoRepository;
use crate::utils::time;

use super::SyncService;

/// Fields for a new todo. Everything except the title is optional.
#[derive(Debug, Clone)]
pub struct CreateTodoArgs {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
}

impl CreateTodoArgs {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Normal,
            category: None,
            due_date: None,
        }
    }
}

impl SyncService {
    /// Create a todo locally, then try to push it if the network is up.
    /// Returns the assigned local id.
    pub async fn create_todo(&self, args: CreateTodoArgs) -> Result<i64> {
        if args.title.trim().is_empty() {
            bail!("todo title must not be empty");
        }

        let now = time::now_millis();
        let active = todo::ActiveModel {
            id: ActiveValue::NotSet,
            remote_id: ActiveValue::Set(None),
            title: ActiveValue::Set(args.title),
            description: ActiveValue::Set(args.description),
            is_completed: ActiveValue::Set(false),
            priority: ActiveValue::Set(args.priority),
            category: ActiveValue::Set(args.category),
            due_date: ActiveValue::Set(args.due_date),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            sync_status: ActiveValue::Set(SyncStatus::Pending),
            pending_delete: ActiveValue::Set(false),
        };

        let id = {
            let storage = self.storage.lock().await;
            let id = TodoRepository::insert(&storage.conn, active).await?;
            storage.mark_changed();
            id
        };

        self.try_push_single(id).await;
        Ok(id)
    }

    /// Bulk insert, queued for the next sync pass. Returns local ids in order.
    pub async fn insert_todos(&self, todos: Vec<CreateTodoArgs>) -> Result<Vec<i64>> {
        let now = time::now_millis();
        let mut batch = Vec::with_capacity(todos.len());
        for args in todos {
            if args.title.trim().is_empty() {
                bail!("todo title must not be empty");
            }
            batch.push(todo::ActiveModel {
                id: ActiveValue::NotSet,
                remote_id: ActiveValue::Set(None),
                title: ActiveValue::Set(args.title),
                description: ActiveValue::Set(args.description),
                is_completed: ActiveValue::Set(false),
                priority: ActiveValue::Set(args.priority),
                category: ActiveValue::Set(args.category),
                due_date: ActiveValue::Set(args.due_date),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                sync_status: ActiveValue::Set(SyncStatus::Pending),
                pending_delete: ActiveValue::Set(false),
            });
        }

        let storage = self.storage.lock().await;
        let ids = TodoRepository::insert_many(&storage.conn, batch).await?;
        storage.mark_changed();
        Ok(ids)
    }

    /// Apply edited fields to an existing todo.
    ///
    /// Refreshes the modification timestamp and requeues the record: a
    /// SYNCED record becomes PENDING again, every other state is kept
    /// (a LOCAL record stays local until explicitly marked for sync).
    pub async fn update_todo(&self, todo: todo::Model) -> Result<()> {
        let id = todo.id;
        {
            let storage = self.storage.lock().await;
            let Some(existing) = TodoRepository::get_by_id(&storage.conn, id).await? else {
                bail!("todo {id} not found");
            };
            let next_status = match existing.sync_status {
                SyncStatus::Synced => SyncStatus::Pending,
                other => other,
            };

            let mut active = existing.into_active_model();
            active.title = ActiveValue::Set(todo.title);
            active.description = ActiveValue::Set(todo.description);
            active.is_completed = ActiveValue::Set(todo.is_completed);
            active.priority = ActiveValue::Set(todo.priority);
            active.category = ActiveValue::Set(todo.category);
            active.due_date = ActiveValue::Set(todo.due_date);
            active.updated_at = ActiveValue::Set(time::now_millis());
            active.sync_status = ActiveValue::Set(next_status);
            TodoRepository::update(&storage.conn, active).await?;
            storage.mark_changed();
        }

        self.try_push_single(id).await;
        Ok(())
    }

    /// Mark a todo completed and queue the change.
    pub async fn mark_completed(&self, id: i64) -> Result<()> {
        self.set_completion(id, true).await
    }

    /// Reopen a completed todo and queue the change.
    pub async fn mark_active(&self, id: i64) -> Result<()> {
        self.set_completion(id, false).await
    }

    /// Flip the completion flag.
    pub async fn toggle_completion(&self, id: i64) -> Result<()> {
        let current = self
            .get_todo_by_id(id)
            .await?
            .map(|t| t.is_completed)
            .unwrap_or(false);
        self.set_completion(id, !current).await
    }

    async fn set_completion(&self, id: i64, is_completed: bool) -> Result<()> {
        {
            let storage = self.storage.lock().await;
            TodoRepository::set_completion(&storage.conn, id, is_completed, time::now_millis()).await?;
            TodoRepository::set_sync_status(&storage.conn, id, SyncStatus::Pending).await?;
            storage.mark_changed();
        }
        self.try_push_single(id).await;
        Ok(())
    }

    /// Delete a todo.
    ///
    /// A record the server knows about is only flagged for deletion here;
    /// the row survives as a tombstone until a pass confirms the remote
    /// delete. A record that never reached the server is removed outright.
    pub async fn delete_todo(&self, todo: todo::Model) -> Result<()> {
        let id = todo.id;
        let known_remotely = todo.remote_id.is_some();

        {
            let storage = self.storage.lock().await;
            if known_remotely {
                TodoRepository::mark_pending_delete(&storage.conn, id, time::now_millis()).await?;
            } else {
                TodoRepository::delete(&storage.conn, todo).await?;
            }
            storage.mark_changed();
        }

        if known_remotely {
            self.try_push_single(id).await;
        }
        Ok(())
    }

    /// [`SyncService::delete_todo`] by local id. Unknown ids are a no-op.
    pub async fn delete_todo_by_id(&self, id: i64) -> Result<()> {
        let todo = self.get_todo_by_id(id).await?;
        match todo {
            Some(todo) => self.delete_todo(todo).await,
            None => Ok(()),
        }
    }

    /// Queue an off-sync record (LOCAL or CONFLICT) for upload.
    pub async fn mark_for_sync(&self, id: i64) -> Result<()> {
        let storage = self.storage.lock().await;
        TodoRepository::set_sync_status(&storage.conn, id, SyncStatus::Pending).await?;
        storage.mark_changed();
        Ok(())
    }

    /// Records waiting for upload, tombstones included.
    pub async fn pending_sync_todos(&self) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_sync_status(&storage.conn, SyncStatus::Pending).await
    }

    /// Remove all completed todos locally. Returns the number removed.
    pub async fn delete_completed(&self) -> Result<u64> {
        let storage = self.storage.lock().await;
        let count = TodoRepository::delete_completed(&storage.conn).await?;
        if count > 0 {
            storage.mark_changed();
        }
        Ok(count)
    }

    /// Wipe the local store. Returns the number of rows removed.
    pub async fn delete_all(&self) -> Result<u64> {
        let storage = self.storage.lock().await;
        let count = TodoRepository::delete_all(&storage.conn).await?;
        if count > 0 {
            storage.mark_changed();
        }
        Ok(count)
    }

    /// Best-effort push of a single record. Failures only get logged; the
    /// record stays PENDING and the next full pass retries it.
    pub(crate) async fn try_push_single(&self, id: i64) {
        if !self.network.is_online() {
            return;
        }
        let _busy = self.busy.enter("push_single");

        let todo = {
            let storage = self.storage.lock().await;
            match TodoRepository::get_by_id(&storage.conn, id).await {
                Ok(Some(todo)) => todo,
                Ok(None) => return,
                Err(e) => {
                    warn!("push skipped, failed to load record {id}: {e:#}");
                    return;
                }
            }
        };
        if !todo.is_pending_sync() {
            return;
        }

        if todo.pending_delete {
            self.try_push_deletion(&todo).await;
            return;
        }

        let dto = mapper::dto_from_model(&todo);
        let pushed = match &todo.remote_id {
            Some(remote_id) => self.remote.update_todo(remote_id, &dto).await,
            None => self.remote.create_todo(&dto).await,
        };

        match pushed {
            Ok(returned) => {
                let Some(remote_id) = returned.id.as_deref() else {
                    warn!("server returned no id for record {id}, leaving it queued");
                    return;
                };
                let storage = self.storage.lock().await;
                match TodoRepository::set_remote_id(&storage.conn, id, remote_id, SyncStatus::Synced).await
                {
                    Ok(()) => {
                        storage.mark_changed();
                        debug!("pushed record {id} as {remote_id}");
                    }
                    Err(e) => warn!("pushed record {id} but failed to store its remote id: {e:#}"),
                }
            }
            Err(e) => debug!("push of record {id} failed, will retry on next sync: {e}"),
        }
    }

    async fn try_push_deletion(&self, todo: &todo::Model) {
        let Some(remote_id) = todo.remote_id.as_deref() else {
            return;
        };
        match self.remote.delete_todo(remote_id).await {
            Ok(()) => {
                let storage = self.storage.lock().await;
                match TodoRepository::delete_by_id(&storage.conn, todo.id).await {
                    Ok(()) => storage.mark_changed(),
                    Err(e) => warn!("remote delete confirmed but local purge failed for {}: {e:#}", todo.id),
                }
            }
            Err(e) => debug!("remote delete of {remote_id} failed, will retry on next sync: {e}"),
        }
    }
}
