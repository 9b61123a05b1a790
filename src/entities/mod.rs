//! Entity module - Contains the SeaORM entity definitions for the database.
//! The loan desk persists everything through a single key-value table.

/// Key-value rows holding serialized loan collections
pub mod storage_entry;

pub use storage_entry::{
    Column as StorageEntryColumn, Entity as StorageEntry, Model as StorageEntryModel,
};
