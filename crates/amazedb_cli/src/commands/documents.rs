//! Group content commands.

use super::{open_existing, parse_document, parse_filter, print_json, CliResult};
use serde_json::json;
use std::path::Path;

/// Inserts documents into a group, creating it if needed.
pub fn insert(root: &Path, database: &str, group: &str, documents: &[String]) -> CliResult<()> {
    let documents = documents
        .iter()
        .map(|text| parse_document("document", text))
        .collect::<CliResult<Vec<_>>>()?;
    let count = documents.len();

    let db = open_existing(root, database, true)?;
    db.group(group)?.insert_many(documents)?;
    print_json(&json!({ "inserted": count }))
}

/// Prints matching documents.
pub fn find(
    root: &Path,
    database: &str,
    group: &str,
    filter: &str,
    one: bool,
    sort_by: Option<&str>,
) -> CliResult<()> {
    let filter = parse_filter(filter)?;
    let group = open_existing(root, database, false)?.group(group)?;

    if one {
        print_json(&group.find_one(&filter, sort_by)?)
    } else {
        print_json(&group.find_all(&filter, sort_by)?)
    }
}

/// Merges values into matching documents.
pub fn update(
    root: &Path,
    database: &str,
    group: &str,
    filter: &str,
    values: &str,
    one: bool,
) -> CliResult<()> {
    let filter = parse_filter(filter)?;
    let values = parse_document("values", values)?;
    let mut group = open_existing(root, database, false)?.group(group)?;

    let updated = if one {
        usize::from(group.update_one(&filter, &values)?)
    } else {
        group.update(&filter, &values)?
    };
    print_json(&json!({ "updated": updated }))
}

/// Removes matching documents.
pub fn remove(root: &Path, database: &str, group: &str, filter: &str, one: bool) -> CliResult<()> {
    let filter = parse_filter(filter)?;
    let mut group = open_existing(root, database, false)?.group(group)?;

    let removed = if one {
        usize::from(group.remove_one(&filter)?)
    } else {
        group.remove(&filter)?
    };
    print_json(&json!({ "removed": removed }))
}

/// Deletes a group.
pub fn drop_group(root: &Path, database: &str, group: &str) -> CliResult<()> {
    open_existing(root, database, false)?.group(group)?.drop()?;
    print_json(&json!({ "dropped": group }))
}
