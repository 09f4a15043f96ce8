use std::collections::HashMap;

use crate::error::StorageError;

/// Single-key blob transport for the serialized history.
///
/// The store decides *what* is persisted; implementations only move the
/// serialized text. `read` of a never-written key returns `None`.
pub trait BlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Process-local backend: nothing survives the process, which is exactly
/// the degraded mode the engine must tolerate anyway.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
