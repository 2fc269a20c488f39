//! Semantic-JSON encoder.

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Encode a document sequence as a JSON array.
///
/// Fields are written in each document's insertion order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(documents: &[Document]) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(documents).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Encode a single value as JSON text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn value_to_json(value: &Value) -> CodecResult<String> {
    serde_json::to_string(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}
