use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Schema};
use tokio::sync::watch;

use crate::entities::{sync_meta, todo};

/// Local storage manager backed by SQLite.
///
/// Owns the database connection and a revision counter that observers can
/// watch to re-run their queries after any mutation (the reactive-read
/// contract: finite per emission, unbounded in count, restartable by
/// re-subscribing).
pub struct LocalStorage {
    pub conn: DatabaseConnection,
    revision: watch::Sender<u64>,
}

impl LocalStorage {
    /// Open (or create) the database at the given SQLite URL.
    pub async fn open(database_url: &str) -> Result<Self> {
        let conn = Database::connect(database_url).await?;
        let (revision, _) = watch::channel(0);

        let storage = LocalStorage { conn, revision };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Open a private in-memory database. Used by tests and the demo binary.
    pub async fn in_memory() -> Result<Self> {
        Self::open("sqlite::memory:").await
    }

    /// Create tables from the entity definitions if they do not exist.
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut todos = schema.create_table_from_entity(todo::Entity);
        todos.if_not_exists();
        self.conn.execute(backend.build(&todos)).await?;

        let mut meta = schema.create_table_from_entity(sync_meta::Entity);
        meta.if_not_exists();
        self.conn.execute(backend.build(&meta)).await?;

        Ok(())
    }

    /// Subscribe to the change feed. The receiver yields a new revision
    /// number after every storage mutation; re-query on each change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Bump the revision counter, waking all change-feed subscribers.
    pub fn mark_changed(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Check if the database has any task data.
    pub async fn has_data(&self) -> Result<bool> {
        let count = todo::Entity::find().count(&self.conn).await?;
        Ok(count > 0)
    }

    /// Clear all data from the database.
    pub async fn clear_all_data(&self) -> Result<()> {
        todo::Entity::delete_many().exec(&self.conn).await?;
        sync_meta::Entity::delete_many().exec(&self.conn).await?;
        self.mark_changed();
        Ok(())
    }
}
