use rusqlite::{Connection, OptionalExtension};

use crate::error::StorageError;
use crate::traits::BlobStore;

/// Durable single-key blob store backed by a SQLite key/value table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO blobs (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![key, blob],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_of_missing_key_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.read("suspension-history").unwrap().is_none());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write("suspension-history", "[]").unwrap();
        assert_eq!(store.read("suspension-history").unwrap().as_deref(), Some("[]"));

        store.write("suspension-history", "[{\"timestamp\":1}]").unwrap();
        assert_eq!(
            store.read("suspension-history").unwrap().as_deref(),
            Some("[{\"timestamp\":1}]")
        );
    }

    #[test]
    fn blob_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let path = path.to_str().unwrap();

        {
            let mut store = SqliteStore::open(path).unwrap();
            store.write("suspension-history", "[1,2,3]").unwrap();
        }

        let store = SqliteStore::open(path).unwrap();
        assert_eq!(store.read("suspension-history").unwrap().as_deref(), Some("[1,2,3]"));
    }
}
