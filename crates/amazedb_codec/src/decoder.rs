//! Semantic-JSON decoder.

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Decode a JSON array of objects into a document sequence.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] if the bytes are not valid JSON and
/// [`CodecError::UnexpectedShape`] if the JSON is not an array of objects.
pub fn from_json(bytes: &[u8]) -> CodecResult<Vec<Document>> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CodecError::unexpected_shape(
                "array of documents",
                other.type_name(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Map(doc) => Ok(doc),
            other => Err(CodecError::unexpected_shape(
                format!("document at index {index}"),
                other.type_name(),
            )),
        })
        .collect()
}

/// Decode a single JSON value.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON.
pub fn value_from_json(text: &str) -> CodecResult<Value> {
    serde_json::from_str(text).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Decode a single JSON object as a document.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or not an object.
pub fn document_from_json(text: &str) -> CodecResult<Document> {
    match value_from_json(text)? {
        Value::Map(doc) => Ok(doc),
        other => Err(CodecError::unexpected_shape("document", other.type_name())),
    }
}
