//! Key-value persistence seam. The book store and the theme both talk to a
//! `KeyValueStore` so the on-disk SQLite file and the in-memory fallback are
//! interchangeable.

mod memory;
mod sqlite;

use std::rc::Rc;

use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::{default_data_dir, default_db_path, SqliteStore};

/// Key holding the serialized book collection.
pub const STORAGE_KEY: &str = "BOOKSHELF_APPS";
/// Key holding the dark-mode flag as `"true"` / `"false"`.
pub const DARK_MODE_KEY: &str = "DARK_MODE_ENABLED";

/// Failures surfaced by a storage backend. Callers in the core log these and
/// carry on with session-only state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Minimal string key-value contract.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage handle shared between the store and the theme on the control
/// thread.
pub type SharedStorage = Rc<dyn KeyValueStore>;
