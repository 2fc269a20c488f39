//! Database facade.

use crate::backup::{Package, PackagedGroup};
use crate::config::{Config, GroupOptions};
use crate::crypto::{CryptoManager, EncryptionKey};
use crate::dir::{self, DatabaseDir};
use crate::error::{CoreError, CoreResult};
use crate::group::{read_token, Group};
use crate::metadata::{Metadata, MetadataStore};
use crate::registry::GroupRegistry;
use amazedb_storage::{write_atomic, FileBackend, StorageBackend};
use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A named database: a directory of encrypted group files sharing one key.
///
/// `Database` is the entry point for AmazeDB. It owns:
/// - the metadata record (group registry and key)
/// - the key, handed to every group it opens
/// - group creation, lookup, and export/import
///
/// # Opening a Database
///
/// ```rust
/// use amazedb_core::{Config, Database};
/// use amazedb_core::query::Filter;
/// use amazedb_codec::Document;
///
/// let root = tempfile::tempdir()?;
/// Database::init_root(root.path())?;
///
/// let db = Database::open(root.path(), "shop", Config::default())?;
/// let mut orders = db.group("orders")?;
/// orders.insert(Document::from([("id", 1)]))?;
///
/// assert_eq!(db.group_names(), vec!["orders"]);
/// assert_eq!(orders.find_all(&Filter::new(), None)?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Database {
    name: String,
    dir: DatabaseDir,
    config: Config,
    metadata: Arc<MetadataStore>,
    crypto: RwLock<Arc<CryptoManager>>,
}

impl Database {
    /// Prepares `root` to hold databases by creating `root/db`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn init_root(root: &Path) -> CoreResult<()> {
        dir::init_root(root)
    }

    /// Lists the databases under `root`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if `root` has no `db` directory.
    pub fn list(root: &Path) -> CoreResult<Vec<String>> {
        dir::list_databases(root)
    }

    /// Creates database `name` under `root`.
    ///
    /// If it already exists it is opened, unless `error_if_exists` is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `InvalidRoot`, `DatabaseExists`, or an I/O
    /// error.
    pub fn create(root: &Path, name: &str, config: Config) -> CoreResult<Self> {
        let dir = DatabaseDir::locate(root, name)?;
        if dir.exists() {
            if config.error_if_exists {
                return Err(CoreError::database_exists(name));
            }
            return Self::load(name, dir, config);
        }
        Self::initialize(name, dir, config)
    }

    /// Opens database `name` under `root`.
    ///
    /// A missing database is created when `create_if_missing` is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `InvalidRoot`, `DatabaseNotFound`,
    /// `CorruptMetadata`, or an I/O error.
    pub fn open(root: &Path, name: &str, config: Config) -> CoreResult<Self> {
        let dir = DatabaseDir::locate(root, name)?;
        if dir.exists() {
            Self::load(name, dir, config)
        } else if config.create_if_missing {
            Self::initialize(name, dir, config)
        } else {
            Err(CoreError::database_not_found(name))
        }
    }

    fn initialize(name: &str, dir: DatabaseDir, config: Config) -> CoreResult<Self> {
        dir.create()?;
        let key = EncryptionKey::generate();
        let metadata = MetadataStore::create(
            &dir.metadata_path(),
            Metadata::new(name, &key),
            config.sync_on_write,
        )?;
        info!(database = name, path = %dir.path().display(), "created database");
        Ok(Self::assemble(name, dir, config, metadata, key))
    }

    fn load(name: &str, dir: DatabaseDir, config: Config) -> CoreResult<Self> {
        let metadata = MetadataStore::load(&dir.metadata_path(), config.sync_on_write)?;
        let key = metadata.key()?;
        debug!(database = name, groups = metadata.group_names().len(), "opened database");
        Ok(Self::assemble(name, dir, config, metadata, key))
    }

    fn assemble(
        name: &str,
        dir: DatabaseDir,
        config: Config,
        metadata: MetadataStore,
        key: EncryptionKey,
    ) -> Self {
        Self {
            name: name.to_string(),
            dir,
            config,
            metadata: Arc::new(metadata),
            crypto: RwLock::new(Arc::new(CryptoManager::new(key))),
        }
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the database key.
    #[must_use]
    pub fn key(&self) -> EncryptionKey {
        self.crypto.read().key().clone()
    }

    /// Returns the registered group names in creation order.
    #[must_use]
    pub fn group_names(&self) -> Vec<String> {
        self.metadata.group_names()
    }

    /// Returns whether a group is registered.
    #[must_use]
    pub fn has_group(&self, name: &str) -> bool {
        self.metadata.contains_group(name)
    }

    /// Creates a group with this database's group options.
    ///
    /// # Errors
    ///
    /// See [`create_group_with`](Self::create_group_with).
    pub fn create_group(&self, name: &str) -> CoreResult<Group> {
        self.create_group_with(name, self.config.group_options())
    }

    /// Creates a group.
    ///
    /// In safe mode an existing group is opened instead. A group file left
    /// without a registry entry is adopted in safe mode.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `GroupExists` outside safe mode, or an error
    /// writing the group file or the metadata.
    pub fn create_group_with(&self, name: &str, options: GroupOptions) -> CoreResult<Group> {
        dir::validate_name(name)?;
        if self.has_group(name) {
            if !options.safe_mode {
                return Err(CoreError::group_exists(name));
            }
            return self.open_group(name, options.preload);
        }

        match Group::create(
            name,
            self.backend(name),
            self.crypto(),
            self.registry(),
            options.preload,
        ) {
            Err(CoreError::GroupExists { .. }) if options.safe_mode => {
                info!(database = %self.name, group = name, "adopting unregistered group file");
                self.metadata.register_group(name)?;
                self.open_group(name, options.preload)
            }
            result => result,
        }
    }

    /// Opens a group with this database's group options.
    ///
    /// # Errors
    ///
    /// See [`group_with`](Self::group_with).
    pub fn group(&self, name: &str) -> CoreResult<Group> {
        self.group_with(name, self.config.group_options())
    }

    /// Opens a group; in safe mode an unknown group is created.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `GroupNotFound` outside safe mode, and load
    /// errors when preloading.
    pub fn group_with(&self, name: &str, options: GroupOptions) -> CoreResult<Group> {
        dir::validate_name(name)?;
        if self.has_group(name) {
            self.open_group(name, options.preload)
        } else if options.safe_mode {
            self.create_group_with(name, options)
        } else {
            Err(CoreError::group_not_found(name))
        }
    }

    /// Deletes the database directory with every group in it.
    ///
    /// This is irreversible.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails.
    pub fn drop(self) -> CoreResult<()> {
        self.dir.remove()?;
        info!(database = %self.name, "dropped database");
        Ok(())
    }

    /// Writes `<dir>/<name>.amazedb` holding every group, sealed under a new
    /// key, and returns that key.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `dir` is not a directory or the package
    /// exists, `ResourceNotFound` if a registered group has no file, and
    /// `DecryptionFailed` if a group file is not a token.
    pub fn export(&self, dir: &Path) -> CoreResult<EncryptionKey> {
        let groups = self
            .group_names()
            .into_iter()
            .map(|name| {
                let token = read_token(&*self.backend(&name))?;
                let data = String::from_utf8(token).map_err(|_| {
                    CoreError::decryption_failed(format!("group `{name}` does not hold a token"))
                })?;
                Ok(PackagedGroup { name, data })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let package = Package {
            name: self.name.clone(),
            key: self.key().to_base64(),
            groups,
        };
        let key = package.write_to(dir)?;
        info!(
            database = %self.name,
            groups = package.groups.len(),
            path = %package.path_in(dir).display(),
            "exported database"
        );
        Ok(key)
    }

    /// Replaces this database's content with a package.
    ///
    /// Every existing group is deleted, each packaged group file is written
    /// as-is, and the packaged key becomes this database's key. `Group`
    /// handles opened before the import keep the old key.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` for a wrong package key, `InvalidPackage`
    /// for a package that does not parse or holds an invalid group name or
    /// key, and I/O errors.
    pub fn import(&self, path: &Path, key: &EncryptionKey) -> CoreResult<()> {
        let package = Package::read_from(path, key)?;
        let database_key = EncryptionKey::from_base64(&package.key)
            .map_err(|e| CoreError::invalid_package(e.to_string()))?;
        for group in &package.groups {
            dir::validate_name(&group.name)
                .map_err(|e| CoreError::invalid_package(e.to_string()))?;
        }

        for name in self.group_names() {
            match fs::remove_file(self.dir.group_path(&name)) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }
        for group in &package.groups {
            write_atomic(
                &self.dir.group_path(&group.name),
                group.data.as_bytes(),
                self.config.sync_on_write,
            )?;
        }

        let mut metadata = Metadata::new(self.name.clone(), &database_key);
        metadata.groups = package.groups.iter().map(|g| g.name.clone()).collect();
        self.metadata.replace(metadata)?;
        *self.crypto.write() = Arc::new(CryptoManager::new(database_key));

        info!(
            database = %self.name,
            source = %package.name,
            groups = package.groups.len(),
            "imported database"
        );
        Ok(())
    }

    fn open_group(&self, name: &str, preload: bool) -> CoreResult<Group> {
        Group::open(name, self.backend(name), self.crypto(), self.registry(), preload)
    }

    fn backend(&self, name: &str) -> Box<dyn StorageBackend> {
        let backend =
            FileBackend::new(&self.dir.group_path(name)).sync_on_write(self.config.sync_on_write);
        Box::new(backend)
    }

    fn crypto(&self) -> Arc<CryptoManager> {
        Arc::clone(&self.crypto.read())
    }

    fn registry(&self) -> Arc<dyn GroupRegistry> {
        self.metadata.clone()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("path", &self.dir.path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;
    use amazedb_codec::Document;
    use tempfile::{tempdir, TempDir};

    fn root() -> TempDir {
        let temp = tempdir().unwrap();
        Database::init_root(temp.path()).unwrap();
        temp
    }

    #[test]
    fn open_creates_in_safe_mode() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        assert_eq!(db.name(), "shop");
        assert!(db.path().join("metadata.json").is_file());
        assert_eq!(Database::list(temp.path()).unwrap(), vec!["shop"]);
    }

    #[test]
    fn open_missing_without_safe_mode() {
        let temp = root();
        let config = Config::new().create_if_missing(false);
        assert!(matches!(
            Database::open(temp.path(), "shop", config),
            Err(CoreError::DatabaseNotFound { .. })
        ));
    }

    #[test]
    fn create_existing() {
        let temp = root();
        Database::create(temp.path(), "shop", Config::default()).unwrap();

        assert!(Database::create(temp.path(), "shop", Config::default()).is_ok());
        assert!(matches!(
            Database::create(temp.path(), "shop", Config::new().error_if_exists(true)),
            Err(CoreError::DatabaseExists { .. })
        ));
    }

    #[test]
    fn invalid_names_and_roots() {
        let temp = root();
        assert!(matches!(
            Database::open(temp.path(), "bad name", Config::default()),
            Err(CoreError::InvalidName { .. })
        ));

        let bare = tempdir().unwrap();
        assert!(matches!(
            Database::open(bare.path(), "shop", Config::default()),
            Err(CoreError::InvalidRoot { .. })
        ));
    }

    #[test]
    fn key_persists_across_opens() {
        let temp = root();
        let key = Database::open(temp.path(), "shop", Config::default()).unwrap().key();
        let reopened = Database::open(temp.path(), "shop", Config::default()).unwrap();
        assert_eq!(reopened.key(), key);
    }

    #[test]
    fn groups_share_the_database_key() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        db.group("a").unwrap().insert(Document::from([("x", 1)])).unwrap();

        let reopened = Database::open(temp.path(), "shop", Config::default()).unwrap();
        assert_eq!(reopened.group("a").unwrap().len().unwrap(), 1);
    }

    #[test]
    fn create_group_outside_safe_mode() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::new().group_safe_mode(false)).unwrap();

        db.create_group("orders").unwrap();
        assert!(matches!(
            db.create_group("orders"),
            Err(CoreError::GroupExists { .. })
        ));
        assert!(matches!(db.group("missing"), Err(CoreError::GroupNotFound { .. })));
    }

    #[test]
    fn create_group_in_safe_mode_returns_existing() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();

        db.create_group("orders")
            .unwrap()
            .insert(Document::from([("id", 1)]))
            .unwrap();
        let again = db.create_group("orders").unwrap();
        assert_eq!(again.len().unwrap(), 1);
        assert_eq!(db.group_names(), vec!["orders"]);
    }

    #[test]
    fn orphan_group_file_is_adopted() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        let group = db.create_group("orders").unwrap();
        group.drop().unwrap();

        // put a valid file back without registering it
        let token = db.crypto().seal(br#"[{"id": 9}]"#).unwrap();
        fs::write(db.dir.group_path("orders"), token).unwrap();

        let adopted = db.create_group("orders").unwrap();
        assert!(db.has_group("orders"));
        assert!(adopted
            .find_one(&Filter::new().eq("id", 9), None)
            .unwrap()
            .is_some());
    }

    #[test]
    fn dropped_group_is_not_found() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::new().group_safe_mode(false)).unwrap();
        let group = db.create_group("orders").unwrap();
        let path = db.dir.group_path("orders");

        group.drop().unwrap();
        assert!(!path.exists());
        assert!(!db.has_group("orders"));
        assert!(matches!(db.group("orders"), Err(CoreError::GroupNotFound { .. })));
    }

    #[test]
    fn drop_database_removes_directory() {
        let temp = root();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        let path = db.path().to_path_buf();
        db.drop().unwrap();

        assert!(!path.exists());
        assert!(Database::list(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn export_import_round_trip() {
        let temp = root();
        let exports = tempdir().unwrap();

        let source = Database::open(temp.path(), "source", Config::default()).unwrap();
        source
            .group("orders")
            .unwrap()
            .insert(Document::from([("id", 1)]))
            .unwrap();
        let package_key = source.export(exports.path()).unwrap();

        let target = Database::open(temp.path(), "target", Config::default()).unwrap();
        target.group("stale").unwrap();
        target
            .import(&exports.path().join("source.amazedb"), &package_key)
            .unwrap();

        assert_eq!(target.group_names(), vec!["orders"]);
        assert_eq!(target.key(), source.key());
        assert!(!target.dir.group_path("stale").exists());
        assert_eq!(target.group("orders").unwrap().len().unwrap(), 1);

        // the new key is persisted
        let reopened = Database::open(temp.path(), "target", Config::default()).unwrap();
        assert_eq!(reopened.group("orders").unwrap().len().unwrap(), 1);
    }

    #[test]
    fn export_reports_missing_group_file() {
        let temp = root();
        let exports = tempdir().unwrap();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        db.group("orders").unwrap();
        fs::remove_file(db.dir.group_path("orders")).unwrap();

        assert!(matches!(
            db.export(exports.path()),
            Err(CoreError::ResourceNotFound { .. })
        ));
        assert!(!exports.path().join("shop.amazedb").exists());
    }

    #[test]
    fn export_rejects_non_token_group_file() {
        let temp = root();
        let exports = tempdir().unwrap();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        db.group("orders").unwrap();
        fs::write(db.dir.group_path("orders"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            db.export(exports.path()),
            Err(CoreError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn import_with_wrong_key_changes_nothing() {
        let temp = root();
        let exports = tempdir().unwrap();
        let db = Database::open(temp.path(), "shop", Config::default()).unwrap();
        db.group("orders").unwrap();
        db.export(exports.path()).unwrap();

        let err = db
            .import(&exports.path().join("shop.amazedb"), &EncryptionKey::generate())
            .unwrap_err();
        assert!(matches!(err, CoreError::DecryptionFailed { .. }));
        assert_eq!(db.group_names(), vec!["orders"]);
    }
}
