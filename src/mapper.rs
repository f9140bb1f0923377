//! Mapping between the storage model and the wire format.
//!
//! The storage model ([`todo::Model`]) is also the domain type; the wire
//! shape ([`TodoDto`]) differs in identifier roles (the server id is the
//! primary key remotely, the local id is advisory) and encodes enums as
//! upper-case strings.

use sea_orm::ActiveValue;

use crate::entities::todo;
use crate::entities::todo::{Priority, SyncStatus};
use crate::remote::TodoDto;

/// Wire name of a priority.
pub fn priority_to_wire(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "LOW",
        Priority::Normal => "NORMAL",
        Priority::High => "HIGH",
        Priority::Urgent => "URGENT",
    }
}

/// Parse a wire priority; unknown values fall back to NORMAL.
pub fn priority_from_wire(value: &str) -> Priority {
    match value {
        "LOW" => Priority::Low,
        "HIGH" => Priority::High,
        "URGENT" => Priority::Urgent,
        _ => Priority::Normal,
    }
}

/// Wire name of a sync state.
pub fn sync_status_to_wire(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Local => "LOCAL",
        SyncStatus::Pending => "PENDING",
        SyncStatus::Synced => "SYNCED",
        SyncStatus::Conflict => "CONFLICT",
    }
}

/// Build the upload payload for a local record.
pub fn dto_from_model(model: &todo::Model) -> TodoDto {
    TodoDto {
        id: model.remote_id.clone(),
        local_id: Some(model.id),
        user_id: None,
        title: model.title.clone(),
        description: model.description.clone(),
        completed: model.is_completed,
        priority: priority_to_wire(model.priority).to_string(),
        category: model.category.clone(),
        due_date: model.due_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
        sync_status: sync_status_to_wire(model.sync_status).to_string(),
    }
}

/// Build an active model from a downloaded record. The local id is left
/// unset; callers set it when overwriting an existing row.
pub fn active_model_from_dto(dto: &TodoDto, status: SyncStatus) -> todo::ActiveModel {
    todo::ActiveModel {
        id: ActiveValue::NotSet,
        remote_id: ActiveValue::Set(dto.id.clone()),
        title: ActiveValue::Set(dto.title.clone()),
        description: ActiveValue::Set(dto.description.clone()),
        is_completed: ActiveValue::Set(dto.completed),
        priority: ActiveValue::Set(priority_from_wire(&dto.priority)),
        category: ActiveValue::Set(dto.category.clone()),
        due_date: ActiveValue::Set(dto.due_date),
        created_at: ActiveValue::Set(dto.created_at),
        updated_at: ActiveValue::Set(dto.updated_at),
        sync_status: ActiveValue::Set(status),
        pending_delete: ActiveValue::Set(false),
    }
}
