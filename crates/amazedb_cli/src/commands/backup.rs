//! Export and import commands.
//!
//! `export` prints the package key once; it is not stored anywhere else, so
//! losing it makes the package unreadable.

use super::{open_existing, print_json, CliResult};
use amazedb_core::{Config, Database, EncryptionKey, PACKAGE_EXTENSION};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Writes `<dir>/<database>.amazedb` and prints its key.
pub fn export(root: &Path, database: &str, dir: &Path) -> CliResult<()> {
    let db = open_existing(root, database, false)?;
    let key = db.export(dir)?;
    let path = dir.join(format!("{database}.{PACKAGE_EXTENSION}"));

    info!(database, path = %path.display(), "export written");
    print_json(&json!({
        "package": path.display().to_string(),
        "key": key.to_base64(),
    }))
}

/// Replaces a database's contents with a package.
///
/// The database is created if it does not exist yet.
pub fn import(root: &Path, database: &str, package: &Path, key: &str) -> CliResult<()> {
    let key = EncryptionKey::from_base64(key)?;
    Database::init_root(root)?;
    let db = Database::open(root, database, Config::default())?;
    db.import(package, &key)?;

    info!(database, package = %package.display(), "import complete");
    print_json(&json!({
        "database": database,
        "groups": db.group_names(),
    }))
}
