//! CLI command implementations.

pub mod backup;
pub mod database;
pub mod documents;

use amazedb_codec::{document_from_json, CodecError, Document};
use amazedb_core::{Config, CoreError, Database, Filter};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A JSON argument did not parse as an object.
    #[error("invalid {argument}: {source}")]
    InvalidArgument {
        /// Which argument was rejected.
        argument: &'static str,
        /// Why it was rejected.
        #[source]
        source: CodecError,
    },

    /// The database or group operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Output could not be serialized.
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Opens an existing database.
pub(crate) fn open_existing(root: &Path, database: &str, safe_groups: bool) -> CliResult<Database> {
    let config = Config::new()
        .create_if_missing(false)
        .group_safe_mode(safe_groups);
    Ok(Database::open(root, database, config)?)
}

pub(crate) fn parse_document(argument: &'static str, text: &str) -> CliResult<Document> {
    document_from_json(text).map_err(|source| CliError::InvalidArgument { argument, source })
}

pub(crate) fn parse_filter(text: &str) -> CliResult<Filter> {
    let spec = parse_document("filter", text)?;
    Ok(Filter::from_document(&spec)?)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_argument_parses_operators() {
        let filter = parse_filter(r#"{"age": {"__gt": 30}, "name": "Ann"}"#).unwrap();
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(matches!(
            parse_document("values", "[1, 2]"),
            Err(CliError::InvalidArgument { argument: "values", .. })
        ));
        assert!(matches!(
            parse_filter("{not json"),
            Err(CliError::InvalidArgument { argument: "filter", .. })
        ));
    }

    #[test]
    fn unknown_operator_is_core_error() {
        assert!(matches!(
            parse_filter(r#"{"age": {"__near": 3}}"#),
            Err(CliError::Core(CoreError::InvalidFilter { .. }))
        ));
    }
}
