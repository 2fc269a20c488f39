//! Stable merge sort of documents by one field.

use crate::error::{CoreError, CoreResult};
use amazedb_codec::Document;
use std::cmp::Ordering;

/// Sorts documents ascending by the value of `key`.
///
/// The sort is a top-down merge sort and is stable: documents with equal
/// keys keep their input order. Every document must carry `key`, which is
/// checked before any comparison is made.
///
/// # Errors
///
/// Returns `MissingSortKey` naming the first document without the field,
/// or `IncomparableValues` when two key values cannot be ordered.
pub fn merge_sort(documents: Vec<Document>, key: &str) -> CoreResult<Vec<Document>> {
    if let Some(index) = documents.iter().position(|d| !d.contains_key(key)) {
        return Err(CoreError::missing_sort_key(key, index));
    }
    sort_run(documents, key)
}

fn sort_run(mut documents: Vec<Document>, key: &str) -> CoreResult<Vec<Document>> {
    if documents.len() <= 1 {
        return Ok(documents);
    }
    let right = documents.split_off(documents.len() / 2);
    let left = sort_run(documents, key)?;
    let right = sort_run(right, key)?;
    merge(left, right, key)
}

fn merge(left: Vec<Document>, right: Vec<Document>, key: &str) -> CoreResult<Vec<Document>> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare_by(l, r, key)? != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    Ok(merged)
}

fn compare_by(a: &Document, b: &Document, key: &str) -> CoreResult<Ordering> {
    match (a.get(key), b.get(key)) {
        (Some(av), Some(bv)) => av
            .compare(bv)
            .ok_or_else(|| CoreError::incomparable_values(key, av.type_name(), bv.type_name())),
        // presence is checked up front
        _ => Err(CoreError::missing_sort_key(key, 0)),
    }
}
