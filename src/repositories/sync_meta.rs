//! Key-value repository for sync bookkeeping.

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::sync_meta;
use crate::utils::time;

/// Repository for the `sync_meta` key-value table.
pub struct SyncMetaRepository;

impl SyncMetaRepository {
    /// Read a value by key.
    pub async fn get<C>(conn: &C, key: &str) -> Result<Option<String>>
    where
        C: ConnectionTrait,
    {
        Ok(sync_meta::Entity::find()
            .filter(sync_meta::Column::Key.eq(key))
            .one(conn)
            .await?
            .map(|row| row.value))
    }

    /// Write a value, replacing any previous one.
    pub async fn set<C>(conn: &C, key: &str, value: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let row = sync_meta::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(time::now_millis()),
        };

        sync_meta::Entity::insert(row)
            .on_conflict(
                OnConflict::column(sync_meta::Column::Key)
                    .update_columns([sync_meta::Column::Value, sync_meta::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Read a value parsed as epoch milliseconds.
    pub async fn get_millis<C>(conn: &C, key: &str) -> Result<Option<i64>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::get(conn, key).await?.and_then(|v| v.parse().ok()))
    }

    /// Write an epoch-milliseconds value.
    pub async fn set_millis<C>(conn: &C, key: &str, millis: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        Self::set(conn, key, &millis.to_string()).await
    }
}
