//! Binary search over documents sorted by one field.

use amazedb_codec::{Document, Value};
use std::cmp::Ordering;

/// Finds a document whose `key` equals `value` in a slice sorted ascending
/// by `key`.
///
/// When several documents share the value, the leftmost one is returned,
/// which after a stable sort is also the first in the original order.
/// Documents lacking `key`, or whose value cannot be ordered against
/// `value`, make the slice unsearchable; the search then degrades to a
/// linear scan so the answer stays correct.
#[must_use]
pub fn binary_search<'a>(documents: &'a [Document], key: &str, value: &Value) -> Option<&'a Document> {
    let mut low = 0;
    let mut high = documents.len();

    // lower bound: first index whose key is not less than `value`
    while low < high {
        let mid = low + (high - low) / 2;
        match documents[mid].get(key).and_then(|v| v.compare(value)) {
            Some(Ordering::Less) => low = mid + 1,
            Some(_) => high = mid,
            None => return linear_find(documents, key, value),
        }
    }

    documents
        .get(low)
        .filter(|doc| doc.get(key) == Some(value))
        .or_else(|| {
            // `value` itself may be unorderable (a map, or null)
            if value.compare(value).is_none() {
                linear_find(documents, key, value)
            } else {
                None
            }
        })
}

fn linear_find<'a>(documents: &'a [Document], key: &str, value: &Value) -> Option<&'a Document> {
    documents.iter().find(|doc| doc.get(key) == Some(value))
}
