//! Generic per-table record stores.
//!
//! A [`RecordStore`] supplies its table name, SQL templates, bound values and
//! row mapper; the trait's default methods implement CRUD on top of them.
//! Every operation comes in two forms: `op` opens (and closes) its own
//! connection, `op_with` runs on a caller-supplied connection or transaction
//! so several operations can commit together.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    Connection, Row, Rows,
};

use crate::{
    db::Database,
    error::{DaoResultExt, LogErr, Result, StoreError},
    models::Entity,
};

mod mod_store;
mod modfile_store;

pub use mod_store::ModStore;
pub use modfile_store::ModfileStore;

/// CRUD contract for one table.
///
/// SQL template conventions:
///
/// - [`insert_sql`](Self::insert_sql) binds [`insert_values`](Self::insert_values)
///   as `?1..?n`, then `created_date` and `updated_date` as `?n+1` and `?n+2`,
///   and ends in `RETURNING id`.
/// - [`update_sql`](Self::update_sql) binds [`update_values`](Self::update_values)
///   as `?1..?n`, then `updated_date` as `?n+1` and the id as `?n+2`.
pub trait RecordStore {
    type Entity: Entity + fmt::Debug;

    fn database(&self) -> &Database;

    fn table_name(&self) -> &'static str;

    fn create_table_sql(&self) -> &'static str;

    fn insert_sql(&self) -> &'static str;

    fn update_sql(&self) -> &'static str;

    fn insert_values(&self, entity: &Self::Entity) -> Vec<Value>;

    fn update_values(&self, entity: &Self::Entity) -> Vec<Value>;

    /// Maps one `SELECT *` row to an entity.
    fn build_from_row(&self, row: &Row<'_>) -> Result<Self::Entity>;

    /// Creates the table if it does not exist yet.
    fn initialize_table(&self) -> Result<()> {
        let conn = self.database().open()?;
        self.initialize_table_with(&conn)?;
        conn.close()
    }

    fn initialize_table_with(&self, conn: &Connection) -> Result<()> {
        log::debug!("Initializing table [{}]...", self.table_name());
        conn.execute_batch(self.create_table_sql())
            .dao_context("Failed to initialize table")
            .log_err(format_args!("Could not create table [{}]", self.table_name()))
    }

    /// Inserts `entity` and returns the stored row, with its new id and
    /// identical created and updated dates.
    fn insert(&self, entity: &Self::Entity) -> Result<Self::Entity> {
        let conn = self.database().open()?;
        let inserted = self.insert_with(&conn, entity)?;
        conn.close()?;
        Ok(inserted)
    }

    fn insert_with(&self, conn: &Connection, entity: &Self::Entity) -> Result<Self::Entity> {
        log::debug!("Inserting into [{}]: {entity:?}", self.table_name());

        let now = Timestamp::now().to_string();
        let mut values = self.insert_values(entity);
        values.push(Value::Text(now.clone()));
        values.push(Value::Text(now));

        let id = {
            let mut stmt = conn
                .prepare(self.insert_sql())
                .dao_context("Failed to prepare insert")?;
            let mut rows = stmt
                .query(params_from_iter(values))
                .dao_context("Failed to execute insert")
                .log_err(format_args!("Could not insert into [{}]", self.table_name()))?;
            latest_generated_id(&mut rows)?
        };

        let id = id.ok_or_else(|| {
            StoreError::dao(format!("Insert into '{}' returned no id", self.table_name()))
                .with_source(rusqlite::Error::QueryReturnedNoRows)
        })?;

        self.find_by_id_with(conn, id)?.ok_or(StoreError::NotFound {
            table: self.table_name(),
            id,
        })
    }

    /// Updates the row matching `entity`'s id and returns it re-read.
    ///
    /// The stored `updated_date` strictly increases; `created_date` is left
    /// alone. Fails with [`StoreError::NotFound`] if there is no such row.
    fn update(&self, entity: &Self::Entity) -> Result<Self::Entity> {
        let conn = self.database().open()?;
        let updated = self.update_with(&conn, entity)?;
        conn.close()?;
        Ok(updated)
    }

    fn update_with(&self, conn: &Connection, entity: &Self::Entity) -> Result<Self::Entity> {
        log::debug!("Updating [{}]: {entity:?}", self.table_name());

        let id = entity.id();
        let not_found = || StoreError::NotFound {
            table: self.table_name(),
            id,
        };

        let current = self
            .find_by_id_with(conn, id)?
            .ok_or_else(not_found)
            .log_err(format_args!("Could not update [{}]", self.table_name()))?;

        let updated_date = next_timestamp(current.updated_date());
        let mut values = self.update_values(entity);
        values.push(Value::Text(updated_date.to_string()));
        values.push(Value::Integer(id as i64));

        let changed = conn
            .execute(self.update_sql(), params_from_iter(values))
            .dao_context("Failed to execute update")
            .log_err(format_args!("Could not update [{}]", self.table_name()))?;
        if changed == 0 {
            return Err(not_found());
        }

        self.find_by_id_with(conn, id)?.ok_or_else(not_found)
    }

    /// Deletes `entity`. The default does nothing; stores that support
    /// deletion override [`delete_with`](Self::delete_with).
    fn delete(&self, entity: &Self::Entity) -> Result<()> {
        let conn = self.database().open()?;
        self.delete_with(&conn, entity)?;
        conn.close()
    }

    fn delete_with(&self, _conn: &Connection, entity: &Self::Entity) -> Result<()> {
        log::debug!(
            "Delete is not supported by [{}]; ignoring {entity:?}",
            self.table_name()
        );
        Ok(())
    }

    /// Deletes the row with `id`, failing with [`StoreError::NotFound`] if
    /// there is none.
    fn delete_row_with(&self, conn: &Connection, id: u64) -> Result<()> {
        log::debug!("Deleting [{}] #{id}", self.table_name());

        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table_name());
        let changed = conn
            .execute(&sql, params![id as i64])
            .dao_context("Failed to execute delete")?;
        if changed == 0 {
            log::error!("Could not delete from [{}]: no row with id {id}", self.table_name());
            return Err(StoreError::NotFound {
                table: self.table_name(),
                id,
            });
        }
        Ok(())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Self::Entity>> {
        let conn = self.database().open()?;
        let found = self.find_by_id_with(&conn, id)?;
        conn.close()?;
        Ok(found)
    }

    fn find_by_id_with(&self, conn: &Connection, id: u64) -> Result<Option<Self::Entity>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1", self.table_name());
        let mut found = self.query_with(conn, &sql, &[Value::Integer(id as i64)])?;
        Ok(found.pop())
    }

    /// Rows for every id in `ids` that exists, ordered by id.
    fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Self::Entity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT * FROM {} WHERE id IN ({placeholders}) ORDER BY id",
            self.table_name()
        );
        let values: Vec<Value> = ids.iter().map(|&id| Value::Integer(id as i64)).collect();

        let conn = self.database().open()?;
        let found = self.query_with(&conn, &sql, &values)?;
        conn.close()?;
        Ok(found)
    }

    /// Every row, ordered by id.
    fn find_all(&self) -> Result<Vec<Self::Entity>> {
        let conn = self.database().open()?;
        let found = self.find_all_with(&conn)?;
        conn.close()?;
        Ok(found)
    }

    fn find_all_with(&self, conn: &Connection) -> Result<Vec<Self::Entity>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", self.table_name());
        self.query_with(conn, &sql, &[])
    }

    fn count_all(&self) -> Result<u64> {
        let conn = self.database().open()?;
        let sql = format!("SELECT COUNT(*) FROM {}", self.table_name());
        let count = conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .dao_context("Failed to count rows")?;
        conn.close()?;
        Ok(count as u64)
    }

    /// Runs a `SELECT *` query and maps every row.
    fn query_with(&self, conn: &Connection, sql: &str, values: &[Value]) -> Result<Vec<Self::Entity>> {
        let mut stmt = conn.prepare(sql).dao_context("Failed to prepare query")?;
        let mut rows = stmt
            .query(params_from_iter(values))
            .dao_context("Failed to execute query")
            .log_err(format_args!("Could not query [{}]", self.table_name()))?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next().dao_context("Failed to fetch row")? {
            entities.push(self.build_from_row(row)?);
        }
        Ok(entities)
    }
}

/// Reads the key returned by an insert issued with `RETURNING id`.
///
/// Returns `None` if the statement produced no row.
pub fn latest_generated_id(rows: &mut Rows<'_>) -> Result<Option<u64>> {
    match rows.next().dao_context("Failed to read generated key")? {
        Some(row) => {
            let id: i64 = row.get(0).dao_context("Failed to read generated key")?;
            Ok(Some(id as u64))
        }
        None => Ok(None),
    }
}

/// The current time, or one nanosecond past `previous` if the clock has not
/// moved beyond it.
pub fn next_timestamp(previous: Option<Timestamp>) -> Timestamp {
    let now = Timestamp::now();
    match previous {
        Some(previous) if now <= previous => previous
            .checked_add(SignedDuration::from_nanos(1))
            .unwrap_or(previous),
        _ => now,
    }
}

/// Reads a TEXT timestamp column by name.
pub fn timestamp_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Timestamp> {
    let index = row.as_ref().column_index(column)?;
    row.get::<_, String>(index)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}
