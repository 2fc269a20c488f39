//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// The blob is the whole content of one file. Replacement follows the
/// write-then-rename pattern:
/// 1. Write the new content to `<file>.tmp`
/// 2. Sync the temporary file (if `sync_on_write`)
/// 3. Rename it over the original
/// 4. Sync the parent directory so the rename itself is durable
///
/// # Example
///
/// ```no_run
/// use amazedb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("users.group"));
/// backend.replace(b"persistent data").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    sync_on_write: bool,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// The file is not touched until the first read or write.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync_on_write: true,
        }
    }

    /// Sets whether replacements fsync before renaming.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(self.location()),
            _ => StorageError::Io(e),
        })
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        write_atomic(&self.path, data, self.sync_on_write)
    }

    fn remove(&mut self) -> StorageResult<()> {
        fs::remove_file(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(self.location()),
            _ => StorageError::Io(e),
        })?;
        sync_parent(&self.path)
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Replaces the content of `path` atomically.
///
/// On error the temporary file is removed and the original is untouched.
///
/// # Errors
///
/// Returns an error if writing, syncing, or renaming fails.
pub fn write_atomic(path: &Path, data: &[u8], sync: bool) -> StorageResult<()> {
    let temp_path = temp_path_for(path);

    let written = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    })();

    if let Err(e) = written.and_then(|()| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    if sync {
        sync_parent(path)?;
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, |n| n.to_os_string());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // fsync on a directory syncs its entries
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> StorageResult<()> {
    // Directory fsync is not supported on Windows
    Ok(())
}
