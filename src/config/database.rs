//! Database configuration module for `BillBuddy`.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. The
//! schema is generated from the entity definitions with
//! `Schema::create_table_from_entity`, so no hand-written SQL is needed and
//! the table always matches the Rust struct.

use crate::entities::StorageRecord;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// returns the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/bill_buddy.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using
/// [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates the storage table from the entity definition if needed.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut storage_table = schema.create_table_from_entity(StorageRecord);
    storage_table.if_not_exists();
    db.execute(builder.build(&storage_table)).await?;

    Ok(())
}
