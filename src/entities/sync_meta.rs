use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Small key-value table for sync bookkeeping (e.g. the last successful
/// sync timestamp). Values are stored as strings.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    /// Epoch milliseconds of the last write.
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
