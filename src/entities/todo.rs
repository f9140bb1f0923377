use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task priority, ordered LOW < NORMAL < HIGH < URGENT.
///
/// Stored as its numeric value so SQL `ORDER BY priority DESC` sorts
/// urgent tasks first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Priority {
    #[sea_orm(num_value = 1)]
    Low,
    #[sea_orm(num_value = 2)]
    Normal,
    #[sea_orm(num_value = 3)]
    High,
    #[sea_orm(num_value = 4)]
    Urgent,
}

/// Where a record stands relative to the remote service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SyncStatus {
    /// Never uploaded, not queued either.
    #[sea_orm(string_value = "LOCAL")]
    Local,
    /// Local changes exist that the remote has not confirmed.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Local and remote agree as of the last round-trip.
    #[sea_orm(string_value = "SYNCED")]
    Synced,
    /// Both sides changed since the last sync.
    #[sea_orm(string_value = "CONFLICT")]
    Conflict,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Server-assigned identifier; None until the first successful upload.
    #[sea_orm(unique)]
    pub remote_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub priority: Priority,
    pub category: Option<String>,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
    /// Epoch milliseconds, immutable after creation.
    pub created_at: i64,
    /// Epoch milliseconds, advanced on every mutation.
    pub updated_at: i64,
    pub sync_status: SyncStatus,
    /// Queued for remote deletion; the row is purged once the server confirms.
    pub pending_delete: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_pending_sync(&self) -> bool {
        self.sync_status == SyncStatus::Pending
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority >= Priority::High
    }

    /// Past its due date and still open.
    pub fn is_overdue(&self, now_millis: i64) -> bool {
        self.due_date.is_some_and(|due| due < now_millis && !self.is_completed)
    }
}
