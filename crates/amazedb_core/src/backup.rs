//! Export packages.
//!
//! An export bundles a database's name, key, and every group's raw token
//! into one JSON package, then seals the package under a freshly generated
//! key. That key is handed to the caller and is the only way to open the
//! package again.
//!
//! ## Package Format
//!
//! ```text
//! <dir>/<database>.amazedb = token( {"name", "key", "groups": [{"name", "data"}]} )
//! ```
//!
//! The group `data` fields are the group files verbatim, so importing does
//! not re-encrypt anything.

use crate::crypto::{CryptoManager, EncryptionKey};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extension of package files.
pub const PACKAGE_EXTENSION: &str = "amazedb";

/// One group inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagedGroup {
    /// Group name.
    pub name: String,
    /// The group file's token, unchanged.
    pub data: String,
}

/// A whole database in exportable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Database name.
    pub name: String,
    /// Database key, URL-safe base64.
    pub key: String,
    /// Groups in registration order.
    pub groups: Vec<PackagedGroup>,
}

impl Package {
    /// Returns the path the package is written to inside `dir`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{PACKAGE_EXTENSION}", self.name))
    }

    /// Seals the package under a new key and writes it into `dir`.
    ///
    /// Returns the new key.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` I/O error if `dir` is not a directory, an
    /// `AlreadyExists` I/O error if the package file is present, or an
    /// error if encryption or the write fails.
    pub fn write_to(&self, dir: &Path) -> CoreResult<EncryptionKey> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir.display()),
            )
            .into());
        }

        let plaintext =
            serde_json::to_vec(self).map_err(|e| CoreError::invalid_package(e.to_string()))?;
        let key = EncryptionKey::generate();
        let token = CryptoManager::new(key.clone()).seal(&plaintext)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_in(dir))?;
        file.write_all(&token)?;
        file.sync_all()?;
        Ok(key)
    }

    /// Reads and opens a package file.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` for a wrong key or tampered file and
    /// `InvalidPackage` when the plaintext is not a package.
    pub fn read_from(path: &Path, key: &EncryptionKey) -> CoreResult<Self> {
        let token = fs::read(path)?;
        let plaintext = CryptoManager::new(key.clone()).open(&token)?;
        serde_json::from_slice(&plaintext).map_err(|e| CoreError::invalid_package(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn package() -> Package {
        Package {
            name: "shop".into(),
            key: EncryptionKey::generate().to_base64(),
            groups: vec![PackagedGroup {
                name: "orders".into(),
                data: "opaque-token".into(),
            }],
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let package = package();

        let key = package.write_to(dir.path()).unwrap();
        let path = dir.path().join("shop.amazedb");
        assert_eq!(Package::read_from(&path, &key).unwrap(), package);
    }

    #[test]
    fn package_file_does_not_leak_key() {
        let dir = tempdir().unwrap();
        let package = package();
        package.write_to(dir.path()).unwrap();

        let raw = fs::read_to_string(package.path_in(dir.path())).unwrap();
        assert!(!raw.contains(&package.key));
    }

    #[test]
    fn wrong_key_is_decryption_failed() {
        let dir = tempdir().unwrap();
        let package = package();
        package.write_to(dir.path()).unwrap();

        let err = Package::read_from(&package.path_in(dir.path()), &EncryptionKey::generate())
            .unwrap_err();
        assert!(matches!(err, CoreError::DecryptionFailed { .. }));
    }

    #[test]
    fn sealed_non_package_is_invalid_package() {
        let dir = tempdir().unwrap();
        let key = EncryptionKey::generate();
        let path = dir.path().join("bogus.amazedb");
        fs::write(&path, CryptoManager::new(key.clone()).seal(b"[1, 2]").unwrap()).unwrap();

        assert!(matches!(
            Package::read_from(&path, &key),
            Err(CoreError::InvalidPackage { .. })
        ));
    }

    #[test]
    fn refuses_to_overwrite_or_write_into_a_file() {
        let dir = tempdir().unwrap();
        let package = package();
        package.write_to(dir.path()).unwrap();
        assert!(matches!(package.write_to(dir.path()), Err(CoreError::Io(_))));

        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        match package.write_to(&file) {
            Err(CoreError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
