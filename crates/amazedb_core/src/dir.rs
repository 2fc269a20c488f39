//! Database directory layout.
//!
//! ```text
//! <root>/
//! └─ db/
//!    └─ <database>/
//!       ├─ metadata.json   # name, group list, key
//!       ├─ users.group     # one encrypted blob per group
//!       └─ orders.group
//! ```

use crate::error::{CoreError, CoreResult};
use crate::metadata::METADATA_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the root holding one directory per database.
const DATABASES_DIR: &str = "db";
/// Extension of group files.
const GROUP_EXTENSION: &str = "group";

/// Checks a database or group name.
///
/// # Errors
///
/// Returns `InvalidName` unless the name is non-empty ASCII letters,
/// digits, `-` and `_`.
pub fn validate_name(name: &str) -> CoreResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::invalid_name(name))
    }
}

/// Creates `<root>/db` if it does not exist.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn init_root(root: &Path) -> CoreResult<()> {
    fs::create_dir_all(root.join(DATABASES_DIR))?;
    Ok(())
}

/// Returns `<root>/db`.
///
/// # Errors
///
/// Returns `InvalidRoot` if it is not a directory.
pub fn databases_dir(root: &Path) -> CoreResult<PathBuf> {
    let dir = root.join(DATABASES_DIR);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(CoreError::invalid_root(root.display().to_string()))
    }
}

/// Lists the databases under `root`, sorted by name.
///
/// Only directories with a valid name and a metadata record count.
///
/// # Errors
///
/// Returns `InvalidRoot` for a root without `db/`, or an I/O error.
pub fn list_databases(root: &Path) -> CoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(databases_dir(root)?)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if validate_name(&name).is_ok() && entry.path().join(METADATA_FILE).is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Paths inside one database directory.
#[derive(Debug, Clone)]
pub struct DatabaseDir {
    path: PathBuf,
}

impl DatabaseDir {
    /// Locates the directory of database `name` under `root`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` or `InvalidRoot`.
    pub fn locate(root: &Path, name: &str) -> CoreResult<Self> {
        validate_name(name)?;
        Ok(Self {
            path: databases_dir(root)?.join(name),
        })
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the database has been created.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.metadata_path().is_file()
    }

    /// Returns the path of the metadata record.
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    /// Returns the path of a group's file.
    #[must_use]
    pub fn group_path(&self, group: &str) -> PathBuf {
        self.path.join(format!("{group}.{GROUP_EXTENSION}"))
    }

    /// Creates the directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if it cannot be created.
    pub fn create(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }

    /// Deletes the directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails.
    pub fn remove(&self) -> CoreResult<()> {
        fs::remove_dir_all(&self.path)?;
        Ok(())
    }
}
