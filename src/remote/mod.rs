//! Remote task service abstraction.
//!
//! Defines the request/response interface the sync engine talks to, the
//! wire representation of a todo, and the error taxonomy for remote
//! failures. The engine never sees transport details; any non-success
//! response surfaces as a [`RemoteError`] for that item or batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

pub use http::HttpRemoteService;

/// Error types for remote operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response data: {0}")]
    InvalidData(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Wire representation of a todo. Field names are part of the server
/// contract; timestamps are epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub local_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub priority: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub sync_status: String,
}

/// Remote task service interface.
///
/// Stateless request/response; every call is a suspension point and none
/// of them block. The batch endpoint returns its results order-correlated
/// with the request so callers can re-attach server ids.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn list_todos(&self) -> RemoteResult<Vec<TodoDto>>;
    async fn get_todo(&self, id: &str) -> RemoteResult<TodoDto>;
    async fn create_todo(&self, todo: &TodoDto) -> RemoteResult<TodoDto>;
    async fn update_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto>;
    async fn patch_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto>;
    async fn delete_todo(&self, id: &str) -> RemoteResult<()>;

    /// All todos the server has seen change since the given timestamp.
    async fn list_updated_since(&self, since_millis: i64) -> RemoteResult<Vec<TodoDto>>;

    /// Batch upsert; response order matches request order.
    async fn sync_batch(&self, todos: &[TodoDto]) -> RemoteResult<Vec<TodoDto>>;
}
