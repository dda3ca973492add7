//! Entity module - Contains all SeaORM entity definitions for the database.
//! The durable side of this crate is a single key/value table; everything
//! else lives in the serialized snapshot payloads.

pub mod storage_record;

// Re-export specific types to avoid conflicts
pub use storage_record::{
    Column as StorageRecordColumn, Entity as StorageRecord, Model as StorageRecordModel,
};
