//! Named SQLite databases: connection handling, introspection and lifecycle.
//!
//! A [`Database`] is a cheap, cloneable address for one database file. It
//! holds no connection; every call to [`Database::open`] returns a fresh
//! [`ConnectionHandle`] that the caller drops when done.
//!
//! On-disk layout for a database named `mods`:
//!
//! ```text
//! <root>/db/
//! ├─ mods.db         # primary data file
//! └─ mods.lock.db    # writer lock, created by the first writer
//! ```

use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::{
    config::StoreConfig,
    error::{LogErr, Result, StoreError},
};

pub mod lifecycle;
mod lock;
pub mod schema;

use lock::DatabaseLock;

/// Extension of the primary data file.
pub const DATA_FILE_EXTENSION: &str = "db";

/// Extension of the writer lock file.
pub const LOCK_FILE_EXTENSION: &str = "lock.db";

/// Address of one named database under a launcher root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    name: String,
    directory: PathBuf,
}

impl Database {
    /// Creates an address for the database `name` under `config`'s root.
    ///
    /// The name is validated lazily: every operation on a blank name fails
    /// with [`StoreError::BlankName`].
    pub fn new(config: &StoreConfig, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: config.database_dir(),
        }
    }

    /// The logical database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this database's files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Base location `<root>/db/<name>` every artifact is derived from.
    pub fn location(&self) -> PathBuf {
        self.directory.join(&self.name)
    }

    /// Path of the primary data file.
    pub fn data_file(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{DATA_FILE_EXTENSION}", self.name))
    }

    /// Path of the writer lock file.
    pub fn lock_file(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{LOCK_FILE_EXTENSION}", self.name))
    }

    pub(crate) fn ensure_named(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            log::error!("Database name cannot be blank! Aborting operation");
            return Err(StoreError::BlankName);
        }
        Ok(())
    }

    /// Opens a read-write connection, creating the data file if needed.
    ///
    /// The handle holds an exclusive lock on the database's lock file for its
    /// whole lifetime. A second writer fails fast with
    /// [`StoreError::Locked`]; there is no retry.
    pub fn open(&self) -> Result<ConnectionHandle> {
        self.ensure_named()?;

        log::trace!("Opening connection for database [{}]...", self.name);

        fs::create_dir_all(&self.directory)
            .map_err(|e| StoreError::file_system(&self.directory, e))
            .log_err(format_args!("Could not create directory for database [{}]", self.name))?;

        let lock = DatabaseLock::acquire(&self.name, self.lock_file())?;

        let connection = Connection::open(self.data_file())
            .map_err(|e| StoreError::Connection {
                database: self.name.clone(),
                source: e,
            })
            .log_err(format_args!("There was an error while opening database file [{}]", self.name))?;

        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Connection {
                database: self.name.clone(),
                source: e,
            })?;

        Ok(ConnectionHandle {
            connection,
            database: self.name.clone(),
            lock: Some(lock),
        })
    }

    /// Opens a read-only connection without taking the writer lock.
    ///
    /// Fails if the data file does not exist yet.
    pub fn open_reader(&self) -> Result<ConnectionHandle> {
        self.ensure_named()?;

        log::trace!("Opening read-only connection for database [{}]...", self.name);

        let connection = Connection::open_with_flags(
            self.data_file(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Connection {
            database: self.name.clone(),
            source: e,
        })?;

        Ok(ConnectionHandle {
            connection,
            database: self.name.clone(),
            lock: None,
        })
    }
}

/// An open connection to one database.
///
/// Dereferences to [`rusqlite::Connection`]. Dropping the handle closes the
/// connection and then releases the writer lock.
pub struct ConnectionHandle {
    connection: Connection,
    database: String,
    lock: Option<DatabaseLock>,
}

impl ConnectionHandle {
    /// Name of the database this handle is connected to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Whether this handle holds the writer lock.
    pub fn is_writer(&self) -> bool {
        self.lock.is_some()
    }

    /// Closes the connection, reporting a failed close instead of ignoring it.
    pub fn close(self) -> Result<()> {
        let Self {
            connection,
            database,
            lock,
        } = self;

        log::trace!("Closing connection for database [{database}]...");

        connection
            .close()
            .map_err(|(_, e)| StoreError::Connection {
                database: database.clone(),
                source: e,
            })
            .log_err(format_args!("There was an error while closing database [{database}]"))?;

        drop(lock);
        Ok(())
    }
}

impl Deref for ConnectionHandle {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for ConnectionHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}
