//! Error types for the storage layer.
//!
//! Every public operation in this crate returns [`Result`]. Nothing panics
//! across the crate boundary: failures are logged where they happen and then
//! folded into a [`StoreError`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A database name was empty or whitespace
    #[error("Database name cannot be blank")]
    BlankName,
    /// The engine refused to open a handle
    #[error("Could not open database '{database}': {source}")]
    Connection {
        database: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Another writer holds the database's lock file
    #[error("Database '{database}' is locked by another connection ({})", path.display())]
    Locked { database: String, path: PathBuf },
    /// A catalog lookup failed
    #[error("Schema introspection failed: {message}")]
    SchemaIntrospection {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A migration script failed to execute
    #[error("Migration '{migration}' failed: {message}")]
    Migration {
        migration: String,
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A named migration does not exist in the configured source
    #[error("Migration '{migration}' not found")]
    MigrationNotFound { migration: String },
    /// Statement or row-mapping failure inside a record store
    #[error("DAO error: {message}")]
    Dao {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Mutation against an id with no matching row
    #[error("No entity with id {id} found in table '{table}'")]
    NotFound { table: &'static str, id: u64 },
    /// Shutdown failed, so destroying the files was refused
    #[error("Could not shut down database '{database}'; refusing to destroy it")]
    UnsafeDestroy {
        database: String,
        #[source]
        source: Box<StoreError>,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating DAO errors with optional context.
pub struct DaoErrorBuilder {
    message: String,
}

impl DaoErrorBuilder {
    /// Create a new DAO error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> StoreError {
        StoreError::Dao {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> StoreError {
        StoreError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl StoreError {
    /// Creates a builder for DAO errors.
    pub fn dao(message: impl Into<String>) -> DaoErrorBuilder {
        DaoErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a file system error for `path`.
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}

/// Specialized extension trait for record-store Results.
pub trait DaoResultExt<T> {
    /// Map engine errors into [`StoreError::Dao`] with a message.
    fn dao_context(self, message: &str) -> Result<T>;
}

impl<T> DaoResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn dao_context(self, message: &str) -> Result<T> {
        self.map_err(|e| StoreError::dao(message).with_source(e))
    }
}

/// Logs a failure at the point of occurrence before it is propagated.
pub trait LogErr<T> {
    /// Log the error (with `context`) at error level and pass the Result on.
    fn log_err<C>(self, context: C) -> Self
    where
        C: fmt::Display;
}

impl<T, E> LogErr<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn log_err<C>(self, context: C) -> Self
    where
        C: fmt::Display,
    {
        if let Err(ref e) = self {
            log::error!("{context}: {e}");
        }
        self
    }
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
