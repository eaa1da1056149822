//! Whole-database operations: wipe, reset, shutdown and destroy.
//!
//! Callers must make sure no other connection to the database is open before
//! invoking any of these. The API does not enforce it; a live writer simply
//! makes the operation fail with [`StoreError::Locked`].

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection};

use super::schema::{list_tables, quote_identifier, table_exists_with};
use crate::{
    error::{DaoResultExt, LogErr, Result, StoreError},
    migration::MIGRATION_TABLE_NAME,
};

const SELECT_SCHEMA_OBJECTS_SQL: &str = "SELECT type, name FROM sqlite_master \
     WHERE type IN ('view', 'trigger', 'table') AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY CASE type WHEN 'view' THEN 0 WHEN 'trigger' THEN 1 ELSE 2 END, name";
const SEQUENCE_TABLE: &str = "sqlite_sequence";
const RESTART_SEQUENCES_SQL: &str = "DELETE FROM sqlite_sequence WHERE UPPER(name) <> UPPER(?1)";
const CLEAR_SEQUENCES_SQL: &str = "DELETE FROM sqlite_sequence";

/// Engine side files that may sit next to the data file.
const JOURNAL_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

impl super::Database {
    /// Drops every schema object, the migration log included, so the file
    /// behaves as freshly created.
    pub fn wipe(&self) -> Result<()> {
        self.ensure_named()?;

        log::trace!("Wiping database [{}]...", self.name());

        let mut conn = self
            .open()
            .log_err(format_args!("There was an error while wiping database file [{}]", self.name()))?;

        let objects: Vec<(String, String)> = {
            let mut stmt = conn
                .prepare(SELECT_SCHEMA_OBJECTS_SQL)
                .dao_context("Failed to prepare schema listing")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .dao_context("Failed to list schema objects")?;
            rows.collect::<std::result::Result<_, _>>()
                .dao_context("Failed to read schema objects")?
        };

        set_referential_integrity(&conn, false)?;

        let tx = conn.transaction().dao_context("Failed to begin transaction")?;
        for (kind, name) in &objects {
            tx.execute_batch(&format!(
                "DROP {} IF EXISTS {}",
                kind.to_uppercase(),
                quote_identifier(name)
            ))
            .dao_context("Failed to drop schema object")?;
            log::trace!("Dropped {kind} [{name}]");
        }
        if table_exists_with(&tx, SEQUENCE_TABLE)? {
            tx.execute(CLEAR_SEQUENCES_SQL, [])
                .dao_context("Failed to clear sequences")?;
        }
        tx.commit().dao_context("Failed to commit transaction")?;

        set_referential_integrity(&conn, true)?;

        log::trace!("Database [{}] has been wiped.", self.name());
        conn.close()
    }

    /// Deletes all rows from every table except the migration log and
    /// restarts identity counters at 1. Schema and migration history stay.
    pub fn reset(&self) -> Result<()> {
        self.ensure_named()?;

        log::trace!("Resetting database [{}]...", self.name());

        let mut conn = self
            .open()
            .log_err(format_args!("There was an error while cleaning database file [{}]", self.name()))?;

        // first, disable constraint checks for the duration of the operation
        set_referential_integrity(&conn, false)?;

        let tx = conn.transaction().dao_context("Failed to begin transaction")?;
        for table in list_tables(&tx)? {
            if table.eq_ignore_ascii_case(MIGRATION_TABLE_NAME) {
                log::trace!("Skipping migration table [{table}] from reset process...");
                continue;
            }

            tx.execute(&format!("DELETE FROM {}", quote_identifier(&table)), [])
                .dao_context("Failed to truncate table")?;
            log::trace!("Truncated table with identity restart [{table}]");
        }

        if table_exists_with(&tx, SEQUENCE_TABLE)? {
            let restarted = tx
                .execute(RESTART_SEQUENCES_SQL, params![MIGRATION_TABLE_NAME])
                .dao_context("Failed to restart sequences")?;
            log::trace!("Restarted {restarted} sequence(s)");
        }
        tx.commit().dao_context("Failed to commit transaction")?;

        set_referential_integrity(&conn, true)?;

        log::trace!("Database [{}] has been reset.", self.name());
        conn.close()
    }

    /// Optimizes the file and closes the connection used to do so.
    pub fn shutdown(&self) -> Result<()> {
        self.ensure_named()?;

        log::trace!("Shutting down database [{}]...", self.name());

        let conn = self
            .open()
            .log_err(format_args!("There was an error while shutting down database [{}]", self.name()))?;

        conn.execute_batch("PRAGMA optimize;")
            .dao_context("Failed to optimize database before shutdown")
            .log_err(format_args!("There was an error while shutting down database [{}]", self.name()))?;

        conn.close()
    }

    /// Shuts the database down and deletes its files from disk.
    ///
    /// Refuses with [`StoreError::UnsafeDestroy`] if the shutdown fails.
    pub fn destroy(&self) -> Result<()> {
        self.ensure_named()?;

        if let Err(e) = self.shutdown() {
            log::error!(
                "Could not shutdown database [{}]. It's unsafe to destroy the database. Aborting operation",
                self.name()
            );
            return Err(StoreError::UnsafeDestroy {
                database: self.name().to_string(),
                source: Box::new(e),
            });
        }

        log::info!("Destroying database [{}]...", self.name());

        let lock_file = self.lock_file();
        if lock_file.exists() {
            log::trace!("Lockfile detected. Deleting first...");
            remove_artifact(&lock_file)
                .log_err(format_args!("Failed to delete database lockfile for [{}]", self.name()))?;
        }

        let data_file = self.data_file();
        for suffix in JOURNAL_SUFFIXES {
            let side_file = data_file.with_file_name(format!(
                "{}.{}{suffix}",
                self.name(),
                super::DATA_FILE_EXTENSION
            ));
            if side_file.exists() {
                remove_artifact(&side_file)?;
            }
        }

        remove_artifact(&data_file)
            .log_err(format_args!("Failed to delete database file for [{}]", self.name()))?;

        log::trace!("Database file for [{}] deleted successfully", self.name());
        Ok(())
    }
}

fn set_referential_integrity(conn: &Connection, enabled: bool) -> Result<()> {
    let value = if enabled { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {value};"))
        .dao_context("Failed to toggle referential integrity")
}

fn remove_artifact(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| StoreError::file_system(path, e))
}
