//! Schema migrations.
//!
//! Scripts are named `YYYYMMDD_description.sql` and discovered from a
//! [`MigrationSource`]. Every applied script is recorded in the
//! [`MIGRATION_TABLE_NAME`] table, which is created on first use and survives
//! [`Database::reset`].
//!
//! A run selects every discovered script dated strictly after the most
//! recently applied one, sorts them by filename and applies them in order.
//! Each script runs in its own transaction together with its log row, so the
//! log only ever names scripts that completed. The first failure stops the
//! run.

use std::collections::HashSet;

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::{
    db::Database,
    error::{DaoResultExt, LogErr, Result, StoreError},
};

mod embedded;
mod name;
mod source;

pub use embedded::MOD_MIGRATIONS;
pub use name::MigrationName;
pub use source::{EmbeddedMigration, MigrationSource};

/// Name of the table logging applied migrations.
pub const MIGRATION_TABLE_NAME: &str = "schema_migrations";

const CREATE_MIGRATION_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL
)";
const SELECT_LATEST_SQL: &str =
    "SELECT filename FROM schema_migrations ORDER BY id DESC LIMIT 1";
const SELECT_APPLIED_SQL: &str =
    "SELECT filename, applied_at FROM schema_migrations ORDER BY id ASC";
const INSERT_APPLIED_SQL: &str =
    "INSERT INTO schema_migrations (filename, applied_at) VALUES (?1, ?2)";

/// One row of the migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub filename: String,
    pub applied_at: Timestamp,
}

/// Applies migrations from one source to one database.
#[derive(Debug, Clone)]
pub struct Migrator {
    database: Database,
    source: MigrationSource,
}

impl Migrator {
    pub fn new(database: Database, source: MigrationSource) -> Self {
        Self { database, source }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn source(&self) -> &MigrationSource {
        &self.source
    }

    /// Every validly named script in the source, in application order.
    pub fn migration_files(&self) -> Result<Vec<MigrationName>> {
        let mut names: Vec<MigrationName> = self
            .source
            .list()?
            .into_iter()
            .filter_map(|filename| match MigrationName::parse(&filename) {
                Ok(name) => Some(name),
                Err(e) => {
                    log::debug!("Ignoring migration resource [{filename}]: {e}");
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Scripts dated strictly after `date`, in application order.
    pub fn migration_files_dated_after(&self, date: Date) -> Result<Vec<MigrationName>> {
        Ok(self
            .migration_files()?
            .into_iter()
            .filter(|name| name.date() > date)
            .collect())
    }

    /// Filename of the most recently applied migration, if any.
    pub fn latest_applied_migration(&self) -> Result<Option<String>> {
        let conn = self.database.open()?;
        init_migration_table(&conn)?;
        let latest = latest_applied_with(&conn)?;
        conn.close()?;
        Ok(latest)
    }

    /// The whole migration log, oldest first.
    pub fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let conn = self.database.open()?;
        init_migration_table(&conn)?;
        let applied = applied_with(&conn)?;
        conn.close()?;
        Ok(applied)
    }

    /// Scripts the next [`apply_all_pending_migrations`](Self::apply_all_pending_migrations)
    /// run would apply.
    pub fn pending_migrations(&self) -> Result<Vec<MigrationName>> {
        let conn = self.database.open()?;
        init_migration_table(&conn)?;
        let pending = self.pending_with(&conn)?;
        conn.close()?;
        Ok(pending)
    }

    /// Applies every pending script in order and returns their filenames.
    ///
    /// Running it again with nothing new in the source is a no-op.
    pub fn apply_all_pending_migrations(&self) -> Result<Vec<String>> {
        log::trace!(
            "Applying pending migrations to database [{}]...",
            self.database.name()
        );

        let mut conn = self.database.open()?;
        init_migration_table(&conn)?;

        let pending = self.pending_with(&conn)?;
        if pending.is_empty() {
            log::debug!("Database [{}] is up to date", self.database.name());
        }

        let mut applied = Vec::with_capacity(pending.len());
        for name in pending {
            let sql = self.source.read(name.filename())?;
            apply_script_with(&mut conn, name.filename(), &sql)?;
            applied.push(name.filename().to_string());
        }

        conn.close()?;
        Ok(applied)
    }

    /// Applies the script `filename` regardless of ordering and logs it.
    ///
    /// Unlike [`apply_all_pending_migrations`](Self::apply_all_pending_migrations)
    /// this may apply a script dated before the latest logged one.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidInput`] if `filename` is not a valid migration
    ///   name, or if it is already in the log. Each script is logged at most
    ///   once, so re-applying it is refused rather than run twice.
    /// - [`StoreError::MigrationNotFound`] if the source has no such script.
    /// - [`StoreError::Migration`] if the script fails; nothing is logged.
    pub fn apply_migration(&self, filename: &str) -> Result<()> {
        let name = MigrationName::parse(filename)?;
        let sql = self
            .source
            .read(name.filename())
            .log_err(format_args!("Could not load migration [{filename}]"))?;

        let mut conn = self.database.open()?;
        init_migration_table(&conn)?;

        if applied_filenames_with(&conn)?.contains(name.filename()) {
            return Err(StoreError::invalid_input("migration")
                .with_reason(format!("'{filename}' has already been applied")));
        }

        apply_script_with(&mut conn, name.filename(), &sql)?;
        conn.close()
    }

    fn pending_with(&self, conn: &Connection) -> Result<Vec<MigrationName>> {
        let latest = latest_applied_with(conn)?;
        let already_applied = applied_filenames_with(conn)?;

        let candidates = match latest.as_deref().map(MigrationName::parse) {
            Some(Ok(latest)) => self.migration_files_dated_after(latest.date())?,
            Some(Err(e)) => {
                log::warn!(
                    "Latest logged migration in database [{}] has an unexpected name: {e}",
                    self.database.name()
                );
                self.migration_files()?
            }
            None => self.migration_files()?,
        };

        Ok(candidates
            .into_iter()
            .filter(|name| !already_applied.contains(name.filename()))
            .collect())
    }
}

fn init_migration_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_MIGRATION_TABLE_SQL)
        .dao_context("Failed to initialize migration table")
}

fn latest_applied_with(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(SELECT_LATEST_SQL, [], |row| row.get(0))
        .optional()
        .dao_context("Failed to read latest applied migration")
}

fn applied_with(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    let mut stmt = conn
        .prepare(SELECT_APPLIED_SQL)
        .dao_context("Failed to prepare migration log query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .dao_context("Failed to query migration log")?;

    let mut applied = Vec::new();
    for row in rows {
        let (filename, applied_at) = row.dao_context("Failed to read migration log row")?;
        let applied_at = applied_at.parse::<Timestamp>().map_err(|e| {
            StoreError::dao(format!("Invalid timestamp '{applied_at}' for migration '{filename}'"))
                .with_source(rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                ))
        })?;
        applied.push(AppliedMigration {
            filename,
            applied_at,
        });
    }
    Ok(applied)
}

fn applied_filenames_with(conn: &Connection) -> Result<HashSet<String>> {
    Ok(applied_with(conn)?
        .into_iter()
        .map(|applied| applied.filename)
        .collect())
}

fn apply_script_with(conn: &mut Connection, filename: &str, sql: &str) -> Result<()> {
    log::info!("Applying migration [{filename}]...");

    let tx = conn
        .transaction()
        .dao_context("Failed to begin migration transaction")?;

    tx.execute_batch(sql)
        .map_err(|e| StoreError::Migration {
            migration: filename.to_string(),
            message: "script failed to execute".to_string(),
            source: e,
        })
        .log_err(format_args!("Could not apply migration [{filename}]"))?;

    tx.execute(INSERT_APPLIED_SQL, params![filename, Timestamp::now().to_string()])
        .dao_context("Failed to log applied migration")?;

    tx.commit().map_err(|e| StoreError::Migration {
        migration: filename.to_string(),
        message: "could not commit".to_string(),
        source: e,
    })?;

    log::info!("Applied migration [{filename}]");
    Ok(())
}
