//! Per-database metadata record.
//!
//! The record names the database, lists its groups in creation order, and
//! holds the database key as URL-safe base64. It is stored as JSON next to
//! the group files and rewritten atomically on every change.

use crate::crypto::EncryptionKey;
use crate::error::{CoreError, CoreResult};
use crate::registry::GroupRegistry;
use amazedb_storage::write_atomic;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the metadata record inside a database directory.
pub const METADATA_FILE: &str = "metadata.json";

/// The persisted metadata of one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Database name.
    pub name: String,
    /// Registered group names.
    pub groups: Vec<String>,
    /// Database key, URL-safe base64.
    pub key: String,
}

impl Metadata {
    /// Creates the record for a new database with no groups.
    #[must_use]
    pub fn new(name: impl Into<String>, key: &EncryptionKey) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            key: key.to_base64(),
        }
    }

    /// Decodes the stored key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the stored text is not a valid key.
    pub fn decode_key(&self) -> CoreResult<EncryptionKey> {
        EncryptionKey::from_base64(&self.key)
    }
}

/// The metadata record of an open database, kept in memory and on disk.
///
/// Every change is applied to a copy, written to disk, and only then made
/// visible, so a failed write leaves both views unchanged.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    sync: bool,
    state: RwLock<Metadata>,
}

impl MetadataStore {
    /// Writes a new record at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn create(path: &Path, metadata: Metadata, sync: bool) -> CoreResult<Self> {
        persist(path, &metadata, sync)?;
        Ok(Self {
            path: path.to_path_buf(),
            sync,
            state: RwLock::new(metadata),
        })
    }

    /// Reads the record at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and
    /// `CorruptMetadata` if it does not parse.
    pub fn load(path: &Path, sync: bool) -> CoreResult<Self> {
        let data = fs::read(path)?;
        let metadata: Metadata = serde_json::from_slice(&data)
            .map_err(|e| CoreError::corrupt_metadata(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            sync,
            state: RwLock::new(metadata),
        })
    }

    /// Returns a copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> Metadata {
        self.state.read().clone()
    }

    /// Returns the path of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the database key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the stored key is malformed.
    pub fn key(&self) -> CoreResult<EncryptionKey> {
        self.state.read().decode_key()
    }

    /// Replaces the whole record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn replace(&self, metadata: Metadata) -> CoreResult<()> {
        self.update(|current| *current = metadata)
    }

    fn update<F>(&self, change: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Metadata),
    {
        let mut state = self.state.write();
        let mut next = state.clone();
        change(&mut next);
        persist(&self.path, &next, self.sync)?;
        *state = next;
        Ok(())
    }
}

impl GroupRegistry for MetadataStore {
    fn register_group(&self, name: &str) -> CoreResult<()> {
        if self.contains_group(name) {
            return Ok(());
        }
        self.update(|m| m.groups.push(name.to_string()))
    }

    fn unregister_group(&self, name: &str) -> CoreResult<()> {
        if !self.contains_group(name) {
            return Err(CoreError::group_not_found(name));
        }
        self.update(|m| m.groups.retain(|g| g != name))
    }

    fn contains_group(&self, name: &str) -> bool {
        self.state.read().groups.iter().any(|g| g == name)
    }

    fn group_names(&self) -> Vec<String> {
        self.state.read().groups.clone()
    }
}

fn persist(path: &Path, metadata: &Metadata, sync: bool) -> CoreResult<()> {
    let data = serde_json::to_vec_pretty(metadata)
        .map_err(|e| CoreError::corrupt_metadata(e.to_string()))?;
    write_atomic(path, &data, sync)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_store(dir: &Path) -> MetadataStore {
        let key = EncryptionKey::generate();
        MetadataStore::create(&dir.join(METADATA_FILE), Metadata::new("shop", &key), false).unwrap()
    }

    #[test]
    fn registry_changes_are_persisted() {
        let dir = tempdir().unwrap();
        let store = new_store(dir.path());

        store.register_group("orders").unwrap();
        store.register_group("customers").unwrap();
        store.unregister_group("orders").unwrap();

        let reloaded = MetadataStore::load(store.path(), false).unwrap();
        assert_eq!(reloaded.group_names(), vec!["customers"]);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn key_survives_reload() {
        let dir = tempdir().unwrap();
        let store = new_store(dir.path());
        let reloaded = MetadataStore::load(store.path(), false).unwrap();
        assert_eq!(reloaded.key().unwrap(), store.key().unwrap());
    }

    #[test]
    fn record_is_plain_json() {
        let dir = tempdir().unwrap();
        let store = new_store(dir.path());
        store.register_group("orders").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "shop");
        assert_eq!(value["groups"][0], "orders");
    }

    #[test]
    fn garbage_is_corrupt_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            MetadataStore::load(&path, false),
            Err(CoreError::CorruptMetadata { .. })
        ));
    }

    #[test]
    fn unregister_unknown_is_group_not_found() {
        let dir = tempdir().unwrap();
        let store = new_store(dir.path());
        assert!(matches!(
            store.unregister_group("ghost"),
            Err(CoreError::GroupNotFound { .. })
        ));
    }
}
