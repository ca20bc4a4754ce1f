use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Folder name used beneath the user's home directory for application data.
pub(crate) const DATA_DIR_NAME: &str = ".bookshelf";
/// SQLite file name stored inside the application data directory.
pub(crate) const DB_FILE_NAME: &str = "bookshelf.sqlite";

/// Key-value table inside an embedded SQLite file. Each key holds one opaque
/// text value, overwritten in full on every `set`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Ensure the database file exists, create the `kv` table lazily, and
    /// return a live store.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }
}

/// Resolve the default data directory inside the user's home.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Absolute path to the SQLite database inside `data_dir`.
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_previous_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("BOOKSHELF_APPS").unwrap(), None);
        store.set("BOOKSHELF_APPS", "[]").unwrap();
        store.set("BOOKSHELF_APPS", "[1]").unwrap();
        assert_eq!(store.get("BOOKSHELF_APPS").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shelf.sqlite");
        let store = SqliteStore::open(&path).unwrap();
        store.set("DARK_MODE_ENABLED", "true").unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("DARK_MODE_ENABLED").unwrap().as_deref(),
            Some("true")
        );
    }
}
