//! Durable storage capability.
//!
//! The store persists its snapshot and the notification token table through
//! the [`StorageBackend`] trait: asynchronous string key/value access where
//! every call may fail independently. Failures are caught and logged at the
//! write-through boundary, never surfaced into a user-visible mutation.

use crate::errors::Result;
use async_trait::async_trait;

/// SQLite-backed storage using the `storage_record` table.
pub mod sqlite;

/// In-memory storage for tests and degraded operation.
pub mod memory;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Storage key of the serialized state snapshot.
pub const SNAPSHOT_KEY: &str = "bill-storage";

/// Storage key of the notification token table, kept separate from the
/// snapshot so reminder bookkeeping never clobbers user data.
pub const NOTIFICATION_TOKEN_KEY: &str = "bill_notifications";

/// Asynchronous, independently-fallible string key/value storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
