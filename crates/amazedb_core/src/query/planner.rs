//! Query planning for `find_one` and `find_all`.

use super::filter::Filter;
use super::search::binary_search;
use super::sort::merge_sort;
use crate::error::{CoreError, CoreResult};
use amazedb_codec::Document;
use tracing::debug;

/// Returns the first document matching `filter`.
///
/// With `sort_by`, "first" means first in ascending order of that field,
/// and every document must carry it. Without `sort_by`, a filter that is a
/// single plain equality is answered by sorting the documents carrying the
/// field and binary-searching them; the result is the same document a
/// linear scan would return.
///
/// # Errors
///
/// Returns filter evaluation errors and, with `sort_by`, the sort errors
/// `MissingSortKey` and `IncomparableValues`.
pub fn find_one(
    documents: &[Document],
    filter: &Filter,
    sort_by: Option<&str>,
) -> CoreResult<Option<Document>> {
    if let Some(key) = sort_by {
        let sorted = merge_sort(documents.to_vec(), key)?;
        return first_match(&sorted, filter);
    }

    if let Some((field, value)) = filter.single_equality() {
        let candidates: Vec<Document> = documents
            .iter()
            .filter(|doc| doc.contains_key(field))
            .cloned()
            .collect();
        match merge_sort(candidates, field) {
            Ok(sorted) => return Ok(binary_search(&sorted, field, value).cloned()),
            Err(CoreError::IncomparableValues { left, right, .. }) => {
                debug!(field, left, right, "mixed field types, scanning instead");
            }
            Err(e) => return Err(e),
        }
    }

    first_match(documents, filter)
}

/// Returns every document matching `filter`, in stored order or, with
/// `sort_by`, ascending by that field.
///
/// # Errors
///
/// Returns filter evaluation errors and, with `sort_by`, the sort errors
/// for the matched documents.
pub fn find_all(
    documents: &[Document],
    filter: &Filter,
    sort_by: Option<&str>,
) -> CoreResult<Vec<Document>> {
    let mut matched = Vec::new();
    for doc in documents {
        if filter.matches(doc)? {
            matched.push(doc.clone());
        }
    }
    match sort_by {
        Some(key) => merge_sort(matched, key),
        None => Ok(matched),
    }
}

fn first_match(documents: &[Document], filter: &Filter) -> CoreResult<Option<Document>> {
    for doc in documents {
        if filter.matches(doc)? {
            return Ok(Some(doc.clone()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amazedb_codec::{from_json, Value};
    use proptest::prelude::*;

    fn people() -> Vec<Document> {
        from_json(
            br#"[
                {"id": 1, "name": "Alice", "age": 31},
                {"id": 2, "name": "Bob", "age": 25},
                {"id": 3, "name": "Alice", "age": 42},
                {"id": 4, "name": "Carol"},
                {"id": 5, "name": "Dave", "age": 25}
            ]"#,
        )
        .unwrap()
    }

    fn ids(docs: &[Document]) -> Vec<i64> {
        docs.iter()
            .filter_map(|d| d.get("id").and_then(Value::as_integer))
            .collect()
    }

    #[test]
    fn fast_path_returns_first_in_stored_order() {
        let found = find_one(&people(), &Filter::new().eq("name", "Alice"), None)
            .unwrap()
            .unwrap();
        assert_eq!(found.get("id"), Some(&Value::from(1)));
    }

    #[test]
    fn fast_path_skips_documents_without_field() {
        let found = find_one(&people(), &Filter::new().eq("age", 25), None)
            .unwrap()
            .unwrap();
        assert_eq!(found.get("id"), Some(&Value::from(2)));
    }

    #[test]
    fn fast_path_with_mixed_types_falls_back_to_scan() {
        let docs = from_json(br#"[{"v": "x"}, {"v": 1}, {"v": 2}]"#).unwrap();
        let found = find_one(&docs, &Filter::new().eq("v", 2), None).unwrap();
        assert_eq!(found.unwrap().get("v"), Some(&Value::from(2)));
    }

    #[test]
    fn no_match_is_none() {
        assert!(find_one(&people(), &Filter::new().eq("name", "Zed"), None)
            .unwrap()
            .is_none());
        assert!(find_one(&[], &Filter::new(), None).unwrap().is_none());
    }

    #[test]
    fn find_one_with_sort_takes_smallest() {
        let docs = from_json(br#"[{"id": 1, "age": 40}, {"id": 2, "age": 20}, {"id": 3, "age": 30}]"#)
            .unwrap();
        let found = find_one(&docs, &Filter::new().gte("age", 25), Some("age"))
            .unwrap()
            .unwrap();
        assert_eq!(found.get("id"), Some(&Value::from(3)));
    }

    #[test]
    fn find_one_sort_requires_key_everywhere() {
        let err = find_one(&people(), &Filter::new(), Some("age")).unwrap_err();
        assert!(matches!(err, CoreError::MissingSortKey { index: 3, .. }));
    }

    #[test]
    fn find_all_preserves_stored_order() {
        let found = find_all(&people(), &Filter::new().eq("name", "Alice"), None).unwrap();
        assert_eq!(ids(&found), vec![1, 3]);
    }

    #[test]
    fn find_all_sorts_matches_only() {
        // Carol has no age but is filtered out before sorting
        let found = find_all(&people(), &Filter::new().gt("age", 20), Some("age")).unwrap();
        assert_eq!(ids(&found), vec![2, 5, 1, 3]);
    }

    #[test]
    fn find_all_empty_filter_returns_everything() {
        assert_eq!(find_all(&people(), &Filter::new(), None).unwrap().len(), 5);
    }

    #[test]
    fn find_all_propagates_filter_errors() {
        let err = find_all(&people(), &Filter::new().regex("name", "["), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRegExp { .. }));
    }

    fn linear_first(docs: &[Document], filter: &Filter) -> Option<Document> {
        docs.iter().find(|d| filter.matches(d).unwrap()).cloned()
    }

    #[test]
    fn fast_path_handles_integers_beyond_float_precision() {
        let docs = from_json(br#"[{"n": 9007199254740993}, {"n": 9007199254740992.0}]"#).unwrap();
        let filter = Filter::new().eq("n", 9_007_199_254_740_992i64);

        let found = find_one(&docs, &filter, None).unwrap();
        assert_eq!(found, linear_first(&docs, &filter));
        assert_eq!(found.unwrap().get("n"), Some(&Value::Float(9_007_199_254_740_992.0)));
    }

    /// Integers around 2^53 next to the floats closest to them.
    fn near_two_pow_53() -> impl Strategy<Value = Value> {
        let base = 1i64 << 53;
        prop_oneof![
            (-4i64..=4).prop_map(move |d| Value::Integer(base + d)),
            (-2i64..=2).prop_map(move |d| Value::Float((base + 2 * d) as f64)),
        ]
    }

    proptest! {
        #[test]
        fn fast_path_agrees_with_scan_near_float_precision(
            values in prop::collection::vec(near_two_pow_53(), 0..12),
            target in near_two_pow_53(),
        ) {
            let docs: Vec<Document> = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| Document::from([("n", v), ("pos", Value::from(i as i64))]))
                .collect();
            let filter = Filter::new().eq("n", target);

            prop_assert_eq!(find_one(&docs, &filter, None).unwrap(), linear_first(&docs, &filter));
        }
    }
}
