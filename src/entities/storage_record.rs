//! Storage record entity - the key/value table backing durable storage.
//! Each row holds one opaque string payload (the state snapshot or the
//! notification token table) under its storage key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key/value storage row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_record")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g. `"bill-storage"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Opaque string payload
    pub value: String,
    /// When this row was last written
    pub updated_at: DateTime,
}

/// `StorageRecord` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
