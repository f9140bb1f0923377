//! Local read surface.
//!
//! Reads never touch the network. Each accessor answers straight from the
//! local store, so the full query surface works identically online and
//! offline. [`SyncService::changes`] hands out a revision feed that ticks
//! on every local write, sync-driven or user-driven.

use anyhow::Result;
use tokio::sync::watch;

use crate::entities::todo::{self, Priority};
use crate::repositories::TodoRepository;

use super::SyncService;

impl SyncService {
    /// All todos, highest priority first, newest first within a priority.
    pub async fn get_all_todos(&self) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_all(&storage.conn).await
    }

    pub async fn get_todo_by_id(&self, id: i64) -> Result<Option<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_id(&storage.conn, id).await
    }

    pub async fn get_todo_by_remote_id(&self, remote_id: &str) -> Result<Option<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_remote_id(&storage.conn, remote_id).await
    }

    /// Open todos, most urgent and soonest-due first.
    pub async fn get_active_todos(&self) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_active(&storage.conn).await
    }

    /// Completed todos, most recently touched first.
    pub async fn get_completed_todos(&self) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_completed(&storage.conn).await
    }

    pub async fn get_todos_by_category(&self, category: &str) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_category(&storage.conn, category).await
    }

    pub async fn get_todos_by_priority(&self, priority: Priority) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_priority(&storage.conn, priority).await
    }

    /// Todos due inside `[start_millis, end_millis]`, soonest first.
    pub async fn get_todos_due_between(&self, start_millis: i64, end_millis: i64) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::get_by_date_range(&storage.conn, start_millis, end_millis).await
    }

    /// Case-insensitive substring search over title and description.
    pub async fn search_todos(&self, query: &str) -> Result<Vec<todo::Model>> {
        let storage = self.storage.lock().await;
        TodoRepository::search(&storage.conn, query).await
    }

    pub async fn active_count(&self) -> Result<u64> {
        let storage = self.storage.lock().await;
        TodoRepository::active_count(&storage.conn).await
    }

    pub async fn completed_count(&self) -> Result<u64> {
        let storage = self.storage.lock().await;
        TodoRepository::completed_count(&storage.conn).await
    }

    pub async fn count_by_priority(&self, priority: Priority) -> Result<u64> {
        let storage = self.storage.lock().await;
        TodoRepository::count_by_priority(&storage.conn, priority).await
    }

    /// Revision feed; ticks after every local write. Await
    /// `changed()` on the receiver to observe new data.
    pub async fn changes(&self) -> watch::Receiver<u64> {
        let storage = self.storage.lock().await;
        storage.changes()
    }
}
