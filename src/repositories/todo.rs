//! Todo repository for database operations.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::entities::todo;
use crate::entities::todo::{Priority, SyncStatus};

/// Repository for todo-related database operations.
///
/// User-facing reads exclude rows queued for remote deletion; the sync
/// engine reaches those through [`TodoRepository::get_by_sync_status`] and
/// [`TodoRepository::get_confirmed_deletions`].
pub struct TodoRepository;

impl TodoRepository {
    /// Get all todos ordered by priority, then most recently created.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::Priority)
            .order_by_desc(todo::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get a single todo by local id.
    pub async fn get_by_id<C>(conn: &C, id: i64) -> Result<Option<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find_by_id(id).one(conn).await?)
    }

    /// Get a single todo by its server-assigned id.
    pub async fn get_by_remote_id<C>(conn: &C, remote_id: &str) -> Result<Option<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    /// Get open todos, most urgent and soonest-due first.
    pub async fn get_active<C>(conn: &C) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::IsCompleted.eq(false))
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::Priority)
            .order_by_asc(todo::Column::DueDate)
            .all(conn)
            .await?)
    }

    /// Get completed todos, most recently touched first.
    pub async fn get_completed<C>(conn: &C) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::IsCompleted.eq(true))
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::UpdatedAt)
            .all(conn)
            .await?)
    }

    /// Get todos in a category.
    pub async fn get_by_category<C>(conn: &C, category: &str) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::Category.eq(category))
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::Priority)
            .order_by_desc(todo::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get todos with a specific priority.
    pub async fn get_by_priority<C>(conn: &C, priority: Priority) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::Priority.eq(priority))
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get todos due inside a window, soonest first. Bounds are epoch millis.
    pub async fn get_by_date_range<C>(conn: &C, start_millis: i64, end_millis: i64) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::DueDate.between(start_millis, end_millis))
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_asc(todo::Column::DueDate)
            .all(conn)
            .await?)
    }

    /// Search todos by title or description, case-insensitive substring.
    pub async fn search<C>(conn: &C, query: &str) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(
                Condition::any()
                    .add(todo::Column::Title.contains(query))
                    .add(todo::Column::Description.contains(query)),
            )
            .filter(todo::Column::PendingDelete.eq(false))
            .order_by_desc(todo::Column::Priority)
            .order_by_desc(todo::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get all todos in a given sync state, deletion-marked rows included.
    pub async fn get_by_sync_status<C>(conn: &C, status: SyncStatus) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::SyncStatus.eq(status))
            .all(conn)
            .await?)
    }

    /// Deletion-marked rows the server has already confirmed; safe to purge.
    pub async fn get_confirmed_deletions<C>(conn: &C) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::PendingDelete.eq(true))
            .filter(todo::Column::SyncStatus.eq(SyncStatus::Synced))
            .all(conn)
            .await?)
    }

    /// Count of open todos.
    pub async fn active_count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::IsCompleted.eq(false))
            .filter(todo::Column::PendingDelete.eq(false))
            .count(conn)
            .await?)
    }

    /// Count of completed todos.
    pub async fn completed_count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::IsCompleted.eq(true))
            .filter(todo::Column::PendingDelete.eq(false))
            .count(conn)
            .await?)
    }

    /// Count of open todos with a given priority.
    pub async fn count_by_priority<C>(conn: &C, priority: Priority) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::Priority.eq(priority))
            .filter(todo::Column::IsCompleted.eq(false))
            .filter(todo::Column::PendingDelete.eq(false))
            .count(conn)
            .await?)
    }

    /// Insert a todo, returning the assigned local id.
    pub async fn insert<C>(conn: &C, todo: todo::ActiveModel) -> Result<i64>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::insert(todo).exec(conn).await?.last_insert_id)
    }

    /// Insert several todos in one transaction, returning their ids in order.
    pub async fn insert_many<C>(conn: &C, todos: Vec<todo::ActiveModel>) -> Result<Vec<i64>>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn.begin().await?;
        let mut ids = Vec::with_capacity(todos.len());
        for todo in todos {
            ids.push(todo::Entity::insert(todo).exec(&txn).await?.last_insert_id);
        }
        txn.commit().await?;
        Ok(ids)
    }

    /// Update a todo from an active model.
    pub async fn update<C>(conn: &C, todo: todo::ActiveModel) -> Result<todo::Model>
    where
        C: ConnectionTrait,
    {
        Ok(todo.update(conn).await?)
    }

    /// Set the completion flag and refresh the updated-at timestamp.
    pub async fn set_completion<C>(conn: &C, id: i64, is_completed: bool, updated_at_millis: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(todo) = Self::get_by_id(conn, id).await? {
            let mut active = todo.into_active_model();
            active.is_completed = ActiveValue::Set(is_completed);
            active.updated_at = ActiveValue::Set(updated_at_millis);
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Set the sync state only; timestamps are untouched.
    pub async fn set_sync_status<C>(conn: &C, id: i64, status: SyncStatus) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(todo) = Self::get_by_id(conn, id).await? {
            let mut active = todo.into_active_model();
            active.sync_status = ActiveValue::Set(status);
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Attach a server-assigned id and set the sync state in one step.
    pub async fn set_remote_id<C>(conn: &C, id: i64, remote_id: &str, status: SyncStatus) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(todo) = Self::get_by_id(conn, id).await? {
            let mut active = todo.into_active_model();
            active.remote_id = ActiveValue::Set(Some(remote_id.to_string()));
            active.sync_status = ActiveValue::Set(status);
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Queue a todo for remote deletion.
    pub async fn mark_pending_delete<C>(conn: &C, id: i64, updated_at_millis: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(todo) = Self::get_by_id(conn, id).await? {
            let mut active = todo.into_active_model();
            active.pending_delete = ActiveValue::Set(true);
            active.sync_status = ActiveValue::Set(SyncStatus::Pending);
            active.updated_at = ActiveValue::Set(updated_at_millis);
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Physically delete a todo.
    pub async fn delete<C>(conn: &C, todo: todo::Model) -> Result<()>
    where
        C: ConnectionTrait,
    {
        todo.delete(conn).await?;
        Ok(())
    }

    /// Physically delete a todo by local id.
    pub async fn delete_by_id<C>(conn: &C, id: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        todo::Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Delete all completed todos.
    pub async fn delete_completed<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let res = todo::Entity::delete_many()
            .filter(todo::Column::IsCompleted.eq(true))
            .exec(conn)
            .await?;
        Ok(res.rows_affected)
    }

    /// Delete everything.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let res = todo::Entity::delete_many().exec(conn).await?;
        Ok(res.rows_affected)
    }
}
