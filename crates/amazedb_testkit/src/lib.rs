//! # AmazeDB Testkit
//!
//! Test utilities for AmazeDB.
//!
//! This crate provides:
//! - Test fixtures: temporary databases and in-memory groups
//! - Property-based test generators using proptest
//! - A model-checking harness for group mutations
//!
//! ## Usage
//!
//! ```rust
//! use amazedb_testkit::prelude::*;
//!
//! with_temp_db(|db| {
//!     let mut notes = db.group("notes").unwrap();
//!     notes.insert_many(scenarios::numbered_documents(3)).unwrap();
//!     assert_eq!(notes.len().unwrap(), 3);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
