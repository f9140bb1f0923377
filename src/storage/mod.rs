//! Local storage module for todo data persistence.
//!
//! Provides the SQLite-backed [`LocalStorage`] handle used by the sync
//! engine and the repository layer. All reads and writes go through
//! SeaORM; the storage handle also carries the change feed that backs
//! reactive queries.

pub mod db;

pub use db::LocalStorage;
