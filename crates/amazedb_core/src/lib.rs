//! # AmazeDB Core
//!
//! Embedded, file-backed, encrypted document store.
//!
//! This crate provides:
//! - Groups: named document collections, one encrypted file each
//! - Filtering with equality and operator conditions
//! - Stable sorting and the single-equality binary-search fast path
//! - Insert, update, and remove over the whole stored sequence
//! - Databases: directory layout, group registry, shared key
//! - Export and import of whole databases as sealed packages

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod config;
pub mod crypto;
mod database;
mod dir;
mod error;
mod group;
mod metadata;
pub mod query;
mod registry;

pub use backup::{Package, PackagedGroup, PACKAGE_EXTENSION};
pub use config::{Config, GroupOptions};
pub use crypto::{CryptoManager, EncryptionKey};
pub use database::Database;
pub use dir::validate_name;
pub use error::{CoreError, CoreResult, PredicateError};
pub use group::Group;
pub use metadata::{Metadata, MetadataStore, METADATA_FILE};
pub use query::Filter;
pub use registry::{GroupRegistry, MemoryRegistry};

/// Version of the AmazeDB core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
