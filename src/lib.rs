//! Offline-first task synchronization engine.
//!
//! Local SQLite storage is the single source of truth: every read is
//! served locally and every write lands locally first, tagged with a sync
//! state. A [`sync::SyncService`] reconciles the store against a remote
//! task service, uploading pending changes and downloading remote ones
//! concurrently, resolving conflicts last-writer-wins. A
//! [`scheduler::SyncScheduler`] drives recurring and on-demand passes.

pub mod busy;
pub mod config;
pub mod constants;
pub mod entities;
pub mod logger;
pub mod mapper;
pub mod network;
pub mod remote;
pub mod repositories;
pub mod scheduler;
pub mod storage;
pub mod sync;
pub mod utils;

pub use busy::{BusyGuard, BusyTracker};
pub use config::Config;
pub use network::{NetworkMonitor, StaticNetworkMonitor};
pub use remote::{HttpRemoteService, RemoteService, TodoDto};
pub use scheduler::{ExistingWorkPolicy, SyncScheduler};
pub use storage::LocalStorage;
pub use sync::{CreateTodoArgs, SyncService, SyncStats, SyncStatus};
