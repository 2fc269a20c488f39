//! # AmazeDB Storage
//!
//! Storage backend trait and implementations for AmazeDB.
//!
//! Every group is persisted as a single blob. Backends are **opaque byte
//! stores** - they do not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends hold one blob (read, replace, remove)
//! - Replacement is atomic: readers see the old blob or the new one
//! - No knowledge of encryption or JSON
//! - Must be `Send + Sync`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use amazedb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.replace(b"hello world").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{write_atomic, FileBackend};
pub use memory::InMemoryBackend;
