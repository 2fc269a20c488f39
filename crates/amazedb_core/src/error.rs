//! Error types for AmazeDB core.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in AmazeDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] amazedb_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] amazedb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A group with this name already exists.
    #[error("group already exists: {name}")]
    GroupExists {
        /// Name of the group.
        name: String,
    },

    /// The group is not registered in its database.
    #[error("group not found: {name}")]
    GroupNotFound {
        /// Name of the group.
        name: String,
    },

    /// A filter could not be evaluated.
    ///
    /// Raised for unknown operator tags and for custom predicates that fail.
    #[error("invalid filter on field `{field}`: {message}")]
    InvalidFilter {
        /// Field the filter applies to.
        field: String,
        /// What is wrong with the filter.
        message: String,
        /// The predicate failure, when a custom predicate raised one.
        #[source]
        cause: Option<PredicateError>,
    },

    /// A regex-match operand is not a valid pattern.
    #[error("invalid regular expression `{pattern}` on field `{field}`: {message}")]
    InvalidRegExp {
        /// Field the filter applies to.
        field: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A sort field is absent from some document.
    #[error("sort field `{field}` is missing from document at index {index}")]
    MissingSortKey {
        /// The sort field.
        field: String,
        /// Position of the first document lacking it.
        index: usize,
    },

    /// Two values of a sort field cannot be ordered against each other.
    #[error("values of field `{field}` cannot be ordered: {left} vs {right}")]
    IncomparableValues {
        /// The sort field.
        field: String,
        /// Type of the left-hand value.
        left: &'static str,
        /// Type of the right-hand value.
        right: &'static str,
    },

    /// Decryption failed: wrong key, or tampered/malformed ciphertext.
    #[error("decryption failed: {message}")]
    DecryptionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Encryption failed.
    #[error("encryption failed: {message}")]
    EncryptionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Key material is malformed.
    #[error("invalid key: {message}")]
    InvalidKey {
        /// Description of the problem.
        message: String,
    },

    /// The group's backing resource is missing.
    #[error("backing resource not found: {location}")]
    ResourceNotFound {
        /// Where the resource was expected.
        location: String,
    },

    /// A database with this name already exists.
    #[error("database already exists: {name}")]
    DatabaseExists {
        /// Name of the database.
        name: String,
    },

    /// The database has not been created.
    #[error("database not found: {name}")]
    DatabaseNotFound {
        /// Name of the database.
        name: String,
    },

    /// A database or group name contains forbidden characters.
    #[error("invalid name `{name}`: only ASCII letters, digits, `-` and `_` are allowed")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The root directory does not contain a `db` directory.
    #[error("not a database root (no `db` directory): {path}")]
    InvalidRoot {
        /// The rejected root.
        path: String,
    },

    /// The database metadata record is unreadable.
    #[error("corrupt metadata: {message}")]
    CorruptMetadata {
        /// Description of the problem.
        message: String,
    },

    /// An export package decrypted but does not hold a package.
    #[error("invalid package: {message}")]
    InvalidPackage {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a group exists error.
    pub fn group_exists(name: impl Into<String>) -> Self {
        Self::GroupExists { name: name.into() }
    }

    /// Creates a group not found error.
    pub fn group_not_found(name: impl Into<String>) -> Self {
        Self::GroupNotFound { name: name.into() }
    }

    /// Creates an invalid filter error.
    pub fn invalid_filter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an invalid filter error for a failed custom predicate.
    pub fn predicate_failed(field: impl Into<String>, cause: PredicateError) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            message: format!("custom predicate raised: {cause}"),
            cause: Some(cause),
        }
    }

    /// Creates an invalid regular expression error.
    pub fn invalid_regexp(
        field: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRegExp {
            field: field.into(),
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a missing sort key error.
    pub fn missing_sort_key(field: impl Into<String>, index: usize) -> Self {
        Self::MissingSortKey {
            field: field.into(),
            index,
        }
    }

    /// Creates an incomparable values error.
    pub fn incomparable_values(
        field: impl Into<String>,
        left: &'static str,
        right: &'static str,
    ) -> Self {
        Self::IncomparableValues {
            field: field.into(),
            left,
            right,
        }
    }

    /// Creates a decryption failed error.
    pub fn decryption_failed(message: impl Into<String>) -> Self {
        Self::DecryptionFailed {
            message: message.into(),
        }
    }

    /// Creates an encryption failed error.
    pub fn encryption_failed(message: impl Into<String>) -> Self {
        Self::EncryptionFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a resource not found error.
    pub fn resource_not_found(location: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            location: location.into(),
        }
    }

    /// Creates a database exists error.
    pub fn database_exists(name: impl Into<String>) -> Self {
        Self::DatabaseExists { name: name.into() }
    }

    /// Creates a database not found error.
    pub fn database_not_found(name: impl Into<String>) -> Self {
        Self::DatabaseNotFound { name: name.into() }
    }

    /// Creates an invalid name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Creates an invalid root error.
    pub fn invalid_root(path: impl Into<String>) -> Self {
        Self::InvalidRoot { path: path.into() }
    }

    /// Creates a corrupt metadata error.
    pub fn corrupt_metadata(message: impl Into<String>) -> Self {
        Self::CorruptMetadata {
            message: message.into(),
        }
    }

    /// Creates an invalid package error.
    pub fn invalid_package(message: impl Into<String>) -> Self {
        Self::InvalidPackage {
            message: message.into(),
        }
    }
}

/// Failure reported by a custom filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    /// Creates a predicate error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps any error raised inside a predicate.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::new(err.to_string())
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PredicateError {}

impl From<String> for PredicateError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for PredicateError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
