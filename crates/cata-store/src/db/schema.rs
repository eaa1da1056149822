//! Catalog queries: which tables and columns exist.
//!
//! Existence checks never fail. A broken lookup is logged and reported as
//! "does not exist".

use rusqlite::{params, Connection, ToSql};

use crate::error::{DaoResultExt, Result, StoreError};

const TABLE_EXISTS_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND UPPER(name) = ?1";
const COLUMN_EXISTS_SQL: &str =
    "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE UPPER(name) = ?2";
const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name";

/// Quotes `identifier` for direct interpolation into SQL.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Names of every user table visible through `conn`, sorted.
pub(crate) fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(LIST_TABLES_SQL)
        .dao_context("Failed to prepare table listing")?;

    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .dao_context("Failed to list tables")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .dao_context("Failed to read table names")?;

    Ok(tables)
}

/// Whether `table` exists, evaluated on an already open connection.
pub(crate) fn table_exists_with(conn: &Connection, table: &str) -> Result<bool> {
    conn.query_row(TABLE_EXISTS_SQL, params![table.to_uppercase()], |row| {
        row.get::<_, i64>(0)
    })
    .map(|count| count > 0)
    .map_err(|e| StoreError::SchemaIntrospection {
        message: format!("could not look up table '{table}'"),
        source: e,
    })
}

impl super::Database {
    /// Returns whether `table` exists in this database. Case-insensitive.
    pub fn table_exists(&self, table: &str) -> bool {
        let upper = table.to_uppercase();
        match self.catalog_count(TABLE_EXISTS_SQL, params![upper]) {
            Ok(count) => count > 0,
            Err(e) => {
                log::error!(
                    "There was an error while checking if table [{table}] exists in database [{}]: {e}",
                    self.name()
                );
                false
            }
        }
    }

    /// Returns whether `column` exists inside `table`. Case-insensitive.
    pub fn column_exists(&self, table: &str, column: &str) -> bool {
        let (table_upper, column_upper) = (table.to_uppercase(), column.to_uppercase());
        match self.catalog_count(COLUMN_EXISTS_SQL, params![table_upper, column_upper]) {
            Ok(count) => count > 0,
            Err(e) => {
                log::error!(
                    "There was an error while checking if column [{column}] exists within table [{table}] in database [{}]: {e}",
                    self.name()
                );
                false
            }
        }
    }

    /// Lists every user table, sorted by name.
    pub fn tables(&self) -> Result<Vec<String>> {
        if !self.data_file().exists() {
            return Ok(Vec::new());
        }
        let conn = self.open_reader()?;
        list_tables(&conn)
    }

    fn catalog_count(&self, sql: &str, params: &[&dyn ToSql]) -> Result<i64> {
        if !self.data_file().exists() {
            log::trace!("Database [{}] has no data file yet", self.name());
            return Ok(0);
        }

        let conn = self.open_reader()?;
        conn.query_row(sql, params, |row| row.get(0))
            .map_err(|e| StoreError::SchemaIntrospection {
                message: format!("catalog query failed on database '{}'", self.name()),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{config::StoreConfig, db::Database};

    fn test_database() -> (TempDir, Database) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = StoreConfig::new(temp_dir.path());
        (temp_dir, Database::new(&config, "schema_test"))
    }

    #[test]
    fn existence_checks_are_case_insensitive() {
        let (_temp_dir, db) = test_database();
        {
            let conn = db.open().expect("Failed to open database");
            conn.execute_batch("CREATE TABLE sample (id INTEGER PRIMARY KEY, label TEXT)")
                .expect("Failed to create table");
        }

        assert!(db.table_exists("sample"));
        assert!(db.table_exists("SAMPLE"));
        assert!(db.table_exists("Sample"));
        assert!(db.column_exists("sample", "LABEL"));
        assert!(db.column_exists("SAMPLE", "label"));
        assert!(!db.column_exists("sample", "missing"));
        assert!(!db.table_exists("other"));
    }

    #[test]
    fn missing_database_reports_nothing() {
        let (_temp_dir, db) = test_database();

        assert!(!db.table_exists("sample"));
        assert!(!db.column_exists("sample", "id"));
        assert!(db.tables().expect("Failed to list tables").is_empty());
        assert!(!db.data_file().exists());
    }

    #[test]
    fn blank_name_degrades_to_false() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::new(&StoreConfig::new(temp_dir.path()), " ");

        assert!(!db.table_exists("sample"));
        assert!(!db.column_exists("sample", "id"));
    }

    #[test]
    fn corrupt_file_degrades_to_false() {
        let (_temp_dir, db) = test_database();
        std::fs::create_dir_all(db.directory()).expect("Failed to create db dir");
        std::fs::write(db.data_file(), b"this is not a sqlite database at all, not even close")
            .expect("Failed to write file");

        assert!(!db.table_exists("sample"));
    }

    #[test]
    fn list_tables_skips_internal_tables() {
        let (_temp_dir, db) = test_database();
        let conn = db.open().expect("Failed to open database");
        conn.execute_batch(
            "CREATE TABLE b (id INTEGER PRIMARY KEY AUTOINCREMENT);
             CREATE TABLE a (id INTEGER PRIMARY KEY AUTOINCREMENT);
             INSERT INTO a DEFAULT VALUES;",
        )
        .expect("Failed to create tables");

        assert_eq!(list_tables(&conn).expect("Failed to list"), vec!["a", "b"]);
        assert!(table_exists_with(&conn, "A").expect("Lookup failed"));
    }

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("mod"), "\"mod\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
