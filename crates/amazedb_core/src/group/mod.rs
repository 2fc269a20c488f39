//! Groups: named, encrypted, ordered document collections.
//!
//! A [`Group`] binds a name, a storage backend holding one encrypted blob,
//! the database's shared [`CryptoManager`], and the database's
//! [`GroupRegistry`]. Every read decrypts and parses the whole blob unless
//! the group is preloaded, in which case reads are served from an
//! in-memory mirror. Every write reloads the blob, mutates it, and replaces
//! it.
//!
//! # Example
//!
//! ```rust
//! use amazedb_core::{CryptoManager, EncryptionKey, Group, MemoryRegistry};
//! use amazedb_core::query::Filter;
//! use amazedb_codec::Document;
//! use amazedb_storage::InMemoryBackend;
//! use std::sync::Arc;
//!
//! let crypto = Arc::new(CryptoManager::new(EncryptionKey::generate()));
//! let registry = Arc::new(MemoryRegistry::new());
//! let mut users = Group::create(
//!     "users",
//!     Box::new(InMemoryBackend::new()),
//!     crypto,
//!     registry,
//!     false,
//! )?;
//!
//! users.insert(Document::from([("name", "Alice")]))?;
//! let alice = users.find_one(&Filter::new().eq("name", "Alice"), None)?;
//! assert!(alice.is_some());
//! # Ok::<(), amazedb_core::CoreError>(())
//! ```

mod cache;
mod codec;
mod mutation;

pub(crate) use codec::read_token;

use crate::crypto::CryptoManager;
use crate::error::{CoreError, CoreResult};
use crate::query::{self, Filter};
use crate::registry::GroupRegistry;
use amazedb_codec::Document;
use amazedb_storage::{StorageBackend, StorageError};
use cache::CacheMirror;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// A named collection of documents persisted as one encrypted blob.
pub struct Group {
    name: String,
    backend: Box<dyn StorageBackend>,
    crypto: Arc<CryptoManager>,
    registry: Arc<dyn GroupRegistry>,
    cache: Option<CacheMirror>,
}

impl Group {
    /// Creates a new group holding an empty sequence and registers it.
    ///
    /// # Errors
    ///
    /// Returns `GroupExists` if the backend already holds a blob, or an
    /// error if the blob or the registry cannot be written.
    pub fn create(
        name: impl Into<String>,
        backend: Box<dyn StorageBackend>,
        crypto: Arc<CryptoManager>,
        registry: Arc<dyn GroupRegistry>,
        preload: bool,
    ) -> CoreResult<Self> {
        let name = name.into();
        if backend.exists() {
            return Err(CoreError::group_exists(name));
        }

        let mut group = Self {
            name,
            backend,
            crypto,
            registry,
            cache: preload.then(CacheMirror::default),
        };
        group.write(Vec::new())?;
        group.registry.register_group(&group.name)?;

        info!(group = %group.name, location = %group.backend.location(), "created group");
        Ok(group)
    }

    /// Opens a registered group.
    ///
    /// With `preload`, the sequence is decoded once here and later reads
    /// are served from memory.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the name is not registered, and load
    /// errors (`ResourceNotFound`, `DecryptionFailed`) when preloading.
    pub fn open(
        name: impl Into<String>,
        backend: Box<dyn StorageBackend>,
        crypto: Arc<CryptoManager>,
        registry: Arc<dyn GroupRegistry>,
        preload: bool,
    ) -> CoreResult<Self> {
        let mut group = Self {
            name: name.into(),
            backend,
            crypto,
            registry,
            cache: None,
        };
        if !group.registry.contains_group(&group.name) {
            return Err(CoreError::group_not_found(group.name));
        }
        if preload {
            group.cache = Some(CacheMirror::new(group.load_from_disk()?));
        }
        Ok(group)
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the group's blob is stored.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Returns whether reads are served from the in-memory mirror.
    #[must_use]
    pub fn is_preloaded(&self) -> bool {
        self.cache.is_some()
    }

    /// Returns the number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns load errors when the group is not preloaded.
    pub fn len(&self) -> CoreResult<usize> {
        match &self.cache {
            Some(cache) => Ok(cache.len()),
            None => Ok(self.load_from_disk()?.len()),
        }
    }

    /// Returns whether the group holds no documents.
    ///
    /// # Errors
    ///
    /// Returns load errors when the group is not preloaded.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns every document in stored order.
    ///
    /// # Errors
    ///
    /// Returns load errors when the group is not preloaded.
    pub fn documents(&self) -> CoreResult<Vec<Document>> {
        Ok(self.read_documents()?.into_owned())
    }

    /// Reloads the in-memory mirror from disk. A no-op for groups that are
    /// not preloaded.
    ///
    /// # Errors
    ///
    /// Returns load errors; the mirror is left unchanged on failure.
    pub fn refresh(&mut self) -> CoreResult<()> {
        if self.cache.is_some() {
            let documents = self.load_from_disk()?;
            self.cache = Some(CacheMirror::new(documents));
        }
        Ok(())
    }

    /// Returns the first document matching `filter`, optionally taking the
    /// smallest by `sort_by` among all matches.
    ///
    /// # Errors
    ///
    /// Returns load errors, filter errors (`InvalidFilter`,
    /// `InvalidRegExp`), and with `sort_by` the sort errors.
    pub fn find_one(&self, filter: &Filter, sort_by: Option<&str>) -> CoreResult<Option<Document>> {
        query::find_one(&self.read_documents()?, filter, sort_by)
    }

    /// Returns every document matching `filter`, in stored order or sorted
    /// ascending by `sort_by`.
    ///
    /// # Errors
    ///
    /// Returns load errors, filter errors, and with `sort_by` the sort
    /// errors.
    pub fn find_all(&self, filter: &Filter, sort_by: Option<&str>) -> CoreResult<Vec<Document>> {
        query::find_all(&self.read_documents()?, filter, sort_by)
    }

    /// Deletes the group's blob and removes its name from the registry.
    ///
    /// This is irreversible. Other `Group` handles on the same name fail
    /// with `GroupNotFound` afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be deleted or the registry
    /// cannot be updated.
    pub fn drop(self) -> CoreResult<()> {
        let Self {
            name,
            mut backend,
            registry,
            ..
        } = self;

        match backend.remove() {
            Ok(()) => {}
            Err(StorageError::NotFound { location }) => {
                warn!(group = %name, %location, "group blob already missing");
            }
            Err(e) => return Err(e.into()),
        }
        registry.unregister_group(&name)?;

        info!(group = %name, "dropped group");
        Ok(())
    }

    fn read_documents(&self) -> CoreResult<Cow<'_, [Document]>> {
        match &self.cache {
            Some(cache) => Ok(Cow::Borrowed(cache.documents())),
            None => Ok(Cow::Owned(self.load_from_disk()?)),
        }
    }

    fn load_from_disk(&self) -> CoreResult<Vec<Document>> {
        if !self.registry.contains_group(&self.name) {
            return Err(CoreError::group_not_found(&self.name));
        }
        codec::load(&*self.backend, &self.crypto)
    }

    fn write(&mut self, documents: Vec<Document>) -> CoreResult<()> {
        codec::save(&mut *self.backend, &self.crypto, &documents)?;
        if let Some(cache) = &mut self.cache {
            cache.replace(&documents);
        }
        Ok(())
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("location", &self.backend.location())
            .field("preloaded", &self.is_preloaded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKey;
    use crate::registry::MemoryRegistry;
    use amazedb_codec::Value;
    use amazedb_storage::InMemoryBackend;

    struct Fixture {
        backend: InMemoryBackend,
        crypto: Arc<CryptoManager>,
        registry: Arc<MemoryRegistry>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                backend: InMemoryBackend::new(),
                crypto: Arc::new(CryptoManager::new(EncryptionKey::generate())),
                registry: Arc::new(MemoryRegistry::new()),
            }
        }

        fn create(&self, preload: bool) -> Group {
            Group::create(
                "items",
                Box::new(self.backend.clone()),
                Arc::clone(&self.crypto),
                self.registry.clone(),
                preload,
            )
            .unwrap()
        }

        fn open(&self, preload: bool) -> CoreResult<Group> {
            Group::open(
                "items",
                Box::new(self.backend.clone()),
                Arc::clone(&self.crypto),
                self.registry.clone(),
                preload,
            )
        }
    }

    #[test]
    fn create_writes_empty_sequence_and_registers() {
        let fx = Fixture::new();
        let group = fx.create(false);

        assert!(fx.backend.exists());
        assert!(fx.registry.contains_group("items"));
        assert!(group.is_empty().unwrap());
    }

    #[test]
    fn create_over_existing_blob_is_group_exists() {
        let fx = Fixture::new();
        fx.create(false);
        let err = Group::create(
            "items",
            Box::new(fx.backend.clone()),
            Arc::clone(&fx.crypto),
            fx.registry.clone(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::GroupExists { ref name } if name == "items"));
    }

    #[test]
    fn open_unregistered_is_group_not_found() {
        let fx = Fixture::new();
        assert!(matches!(fx.open(false), Err(CoreError::GroupNotFound { .. })));
    }

    #[test]
    fn open_registered_without_blob_is_resource_not_found() {
        let fx = Fixture::new();
        fx.registry.register_group("items").unwrap();

        let group = fx.open(false).unwrap();
        assert!(matches!(group.len(), Err(CoreError::ResourceNotFound { .. })));
        assert!(matches!(fx.open(true), Err(CoreError::ResourceNotFound { .. })));
    }

    #[test]
    fn preloaded_reads_use_the_mirror() {
        let fx = Fixture::new();
        let mut writer = fx.create(false);
        writer.insert(Document::from([("n", 1)])).unwrap();

        let mut reader = fx.open(true).unwrap();
        writer.insert(Document::from([("n", 2)])).unwrap();

        // stale until refreshed
        assert_eq!(reader.len().unwrap(), 1);
        reader.refresh().unwrap();
        assert_eq!(reader.len().unwrap(), 2);
    }

    #[test]
    fn drop_removes_blob_and_registration() {
        let fx = Fixture::new();
        let group = fx.create(false);
        let other = fx.open(false).unwrap();

        group.drop().unwrap();

        assert!(!fx.backend.exists());
        assert!(!fx.registry.contains_group("items"));
        assert!(matches!(
            other.find_all(&Filter::new(), None),
            Err(CoreError::GroupNotFound { .. })
        ));
        assert!(matches!(fx.open(false), Err(CoreError::GroupNotFound { .. })));
    }

    #[test]
    fn find_paths_agree_on_preloaded_and_disk() {
        let fx = Fixture::new();
        let mut group = fx.create(true);
        group
            .insert_many((0..10).map(|i| Document::from([("k", Value::from(i % 3)), ("i", Value::from(i))])))
            .unwrap();

        let disk = fx.open(false).unwrap();
        let filter = Filter::new().eq("k", 1);
        assert_eq!(
            group.find_all(&filter, Some("i")).unwrap(),
            disk.find_all(&filter, Some("i")).unwrap()
        );
        assert_eq!(
            group.find_one(&filter, None).unwrap(),
            disk.find_one(&filter, None).unwrap()
        );
    }

    #[test]
    fn debug_does_not_expose_key() {
        let fx = Fixture::new();
        let group = fx.create(false);
        let debug = format!("{group:?}");
        assert!(debug.contains("items"));
        assert!(!debug.contains(&fx.crypto.key().to_base64()));
    }
}
