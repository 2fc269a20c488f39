//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory storage backend.
///
/// This backend stores the blob in memory and is suitable for:
/// - Unit tests
/// - Ephemeral groups that don't need persistence
///
/// Clones share the same blob, so two groups built from clones of one
/// backend observe each other's writes the way two handles on one file do.
///
/// # Example
///
/// ```rust
/// use amazedb_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(!backend.exists());
/// backend.replace(b"test data").unwrap();
/// assert_eq!(backend.read_all().unwrap(), b"test data");
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    data: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(Some(data))),
        }
    }

    /// Returns a copy of the stored blob, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .clone()
            .ok_or_else(|| StorageError::not_found(self.location()))
    }

    fn replace(&mut self, new_data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(new_data.to_vec());
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        match self.data.write().take() {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(self.location())),
        }
    }

    fn exists(&self) -> bool {
        self.data.read().is_some()
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
