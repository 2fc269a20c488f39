//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use amazedb_codec::{Document, Value};
use amazedb_core::{Config, CryptoManager, Database, EncryptionKey, Group, MemoryRegistry};
use amazedb_storage::InMemoryBackend;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Name of the database every fixture opens.
pub const TEST_DATABASE: &str = "test";

/// A test database in a temporary root, removed on drop.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary root (kept alive to prevent cleanup).
    root: TempDir,
}

impl TestDatabase {
    /// Creates a database with the default configuration, without fsync.
    pub fn new() -> Self {
        Self::with_config(Config::default().sync_on_write(false))
    }

    /// Creates a database with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        Database::init_root(root.path()).expect("Failed to initialize root");
        let db = Database::open(root.path(), TEST_DATABASE, config)
            .expect("Failed to open test database");
        Self { db, root }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Opens the same database again, as another process would.
    pub fn reopen(&self) -> Database {
        Database::open(self.root(), TEST_DATABASE, self.db.config().clone())
            .expect("Failed to reopen test database")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary database.
///
/// # Example
///
/// ```rust
/// use amazedb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     let users = db.group("users").unwrap();
///     assert!(users.is_empty().unwrap());
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::new();
    f(&test_db.db)
}

/// Creates a group backed by memory, with its own key and registry.
pub fn memory_group(name: &str, preload: bool) -> Group {
    Group::create(
        name,
        Box::new(InMemoryBackend::new()),
        Arc::new(CryptoManager::new(EncryptionKey::generate())),
        Arc::new(MemoryRegistry::new()),
        preload,
    )
    .expect("Failed to create memory group")
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Documents `{"id": i, "parity": "even" | "odd"}` for `i` in `0..count`.
    pub fn numbered_documents(count: usize) -> Vec<Document> {
        (0..count)
            .map(|i| {
                let id = i64::try_from(i).expect("count fits in i64");
                let parity = if i % 2 == 0 { "even" } else { "odd" };
                Document::from([("id", Value::from(id)), ("parity", Value::from(parity))])
            })
            .collect()
    }

    /// Creates a database with one group holding numbered documents.
    pub fn populated_database(group: &str, count: usize) -> TestDatabase {
        let test_db = TestDatabase::new();
        test_db
            .group(group)
            .expect("Failed to open group")
            .insert_many(numbered_documents(count))
            .expect("Failed to insert documents");
        test_db
    }

    /// Creates a database with `group_count` groups of one document each.
    pub fn multi_group_database(group_count: usize) -> (TestDatabase, Vec<String>) {
        let test_db = TestDatabase::new();
        let mut names = Vec::with_capacity(group_count);

        for i in 0..group_count {
            let name = format!("group_{i}");
            test_db
                .group(&name)
                .expect("Failed to open group")
                .insert(Document::from([("group", Value::from(name.as_str()))]))
                .expect("Failed to insert document");
            names.push(name);
        }

        (test_db, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amazedb_core::Filter;

    #[test]
    fn test_database_is_usable() {
        let test_db = TestDatabase::new();
        assert_eq!(test_db.name(), TEST_DATABASE);
        assert!(test_db.group_names().is_empty());
    }

    #[test]
    fn reopen_sees_writes() {
        let test_db = scenarios::populated_database("numbers", 4);
        let again = test_db.reopen();
        assert_eq!(again.group("numbers").unwrap().len().unwrap(), 4);
    }

    #[test]
    fn populated_scenario() {
        let test_db = scenarios::populated_database("numbers", 10);
        let evens = test_db
            .group("numbers")
            .unwrap()
            .find_all(&Filter::new().eq("parity", "even"), None)
            .unwrap();
        assert_eq!(evens.len(), 5);
    }

    #[test]
    fn multi_group_scenario() {
        let (test_db, names) = scenarios::multi_group_database(3);
        assert_eq!(test_db.group_names(), names);
    }

    #[test]
    fn memory_group_round_trip() {
        let mut group = memory_group("scratch", true);
        group.insert(Document::from([("k", 1)])).unwrap();
        assert_eq!(group.len().unwrap(), 1);
    }
}
