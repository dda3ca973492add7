//! SQLite-backed [`StorageBackend`] using `SeaORM`.
//!
//! Each storage key maps to one row of the `storage_record` table. Writes
//! follow a find-then-update-or-insert pattern keyed on the unique `key`
//! column; reads and deletes filter on the same column.

use crate::entities::{StorageRecord, storage_record};
use crate::errors::Result;
use crate::storage::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Durable storage over a `SeaORM` `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db: DatabaseConnection,
}

impl SqliteStorage {
    /// Wraps an established database connection. The `storage_record` table
    /// must already exist (see [`crate::config::database::create_tables`]).
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_record(&self, key: &str) -> Result<Option<storage_record::Model>> {
        StorageRecord::find()
            .filter(storage_record::Column::Key.eq(key))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.find_record(key).await?.map(|record| record.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().naive_utc();

        if let Some(record) = self.find_record(key).await? {
            // Update existing row
            let mut active_model: storage_record::ActiveModel = record.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            // Insert new row
            let new_record = storage_record::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
                ..Default::default()
            };
            new_record.insert(&self.db).await?;
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        StorageRecord::delete_many()
            .filter(storage_record::Column::Key.eq(key))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
