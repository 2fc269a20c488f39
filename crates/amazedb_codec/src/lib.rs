//! # AmazeDB Codec
//!
//! Document values and semantic-JSON encoding for AmazeDB.
//!
//! A group's plaintext is a JSON array of objects. This crate provides the
//! dynamic [`Value`] type, the [`Document`] record built from it, and the
//! functions that turn a document sequence into JSON bytes and back.
//!
//! ## Usage
//!
//! ```
//! use amazedb_codec::{from_json, to_json, Document, Value};
//!
//! let doc = Document::from([("name", Value::from("Alice")), ("age", Value::from(31))]);
//! let bytes = to_json(&[doc.clone()]).unwrap();
//!
//! let decoded = from_json(&bytes).unwrap();
//! assert_eq!(decoded, vec![doc]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod document;
mod encoder;
mod error;
mod value;

pub use decoder::{document_from_json, from_json, value_from_json};
pub use document::Document;
pub use encoder::{to_json, value_to_json};
pub use error::{CodecError, CodecResult};
pub use value::Value;
