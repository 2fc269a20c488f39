//! Database management commands.

use super::{open_existing, print_json, CliResult};
use amazedb_core::{Config, Database};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Summary of one database.
#[derive(Debug, Serialize)]
pub struct DatabaseInfo {
    /// Database name.
    pub name: String,
    /// Database directory.
    pub path: String,
    /// Registered groups.
    pub groups: Vec<String>,
}

impl DatabaseInfo {
    fn of(db: &Database) -> Self {
        Self {
            name: db.name().to_string(),
            path: db.path().display().to_string(),
            groups: db.group_names(),
        }
    }
}

/// Creates a database, initializing the root if needed.
pub fn create(root: &Path, database: &str, error_if_exists: bool) -> CliResult<()> {
    Database::init_root(root)?;
    let config = Config::new().error_if_exists(error_if_exists);
    let db = Database::create(root, database, config)?;
    print_json(&DatabaseInfo::of(&db))
}

/// Lists the databases under the root.
pub fn list(root: &Path) -> CliResult<()> {
    print_json(&Database::list(root)?)
}

/// Deletes a database.
pub fn drop(root: &Path, database: &str) -> CliResult<()> {
    let db = open_existing(root, database, false)?;
    db.drop()?;
    info!(database, "database dropped");
    print_json(&serde_json::json!({ "dropped": database }))
}

/// Lists the groups of a database.
pub fn groups(root: &Path, database: &str) -> CliResult<()> {
    let db = open_existing(root, database, false)?;
    print_json(&db.group_names())
}
