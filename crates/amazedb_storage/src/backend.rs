//! Storage backend trait definition.

use crate::error::StorageResult;

/// A whole-blob storage backend for one group.
///
/// Backends are **opaque byte stores** holding exactly one blob. They never
/// interpret the bytes: encryption and JSON are layered on top by the group
/// engine.
///
/// # Invariants
///
/// - `read_all` returns exactly the bytes of the last successful `replace`
/// - `replace` is all-or-nothing: a failure or crash part-way leaves the
///   previous content readable
/// - after `remove`, `exists` is false and `read_all` fails with `NotFound`
pub trait StorageBackend: Send + Sync {
    /// Reads the whole stored blob.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is stored, or an I/O error.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the whole stored blob with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the new content could not be made durable. The
    /// previous content is left in place in that case.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Deletes the stored blob.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is stored, or an I/O error.
    fn remove(&mut self) -> StorageResult<()>;

    /// Returns whether a blob is currently stored.
    fn exists(&self) -> bool;

    /// Human-readable location, used in log lines and error messages.
    fn location(&self) -> String;
}
