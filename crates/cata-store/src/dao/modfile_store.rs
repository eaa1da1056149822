//! Record store for the `modfile` table.

use rusqlite::{params, types::Value, Connection, Row};

use super::{timestamp_column, RecordStore};
use crate::{
    db::Database,
    error::{DaoResultExt, Result},
    models::ModfileEntity,
};

const TABLE_NAME: &str = "modfile";
const CREATE_TABLE_SQL: &str = include_str!("../../migrations/mod/20240731_create_modfile.sql");
const INSERT_SQL: &str = "INSERT INTO modfile (mod_id, path, hash, created_date, updated_date) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id";
const UPDATE_SQL: &str =
    "UPDATE modfile SET mod_id = ?1, path = ?2, hash = ?3, updated_date = ?4 WHERE id = ?5";
const SELECT_BY_MOD_ID_SQL: &str = "SELECT * FROM modfile WHERE mod_id = ?1 ORDER BY id";
const DELETE_BY_MOD_ID_SQL: &str = "DELETE FROM modfile WHERE mod_id = ?1";

/// Stores the files owned by mods.
#[derive(Debug, Clone)]
pub struct ModfileStore {
    database: Database,
}

impl ModfileStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Every file owned by the mod `mod_id`, ordered by id.
    pub fn find_all_by_mod_id(&self, mod_id: u64) -> Result<Vec<ModfileEntity>> {
        let conn = self.database.open()?;
        let found = self.find_all_by_mod_id_with(&conn, mod_id)?;
        conn.close()?;
        Ok(found)
    }

    pub fn find_all_by_mod_id_with(
        &self,
        conn: &Connection,
        mod_id: u64,
    ) -> Result<Vec<ModfileEntity>> {
        self.query_with(conn, SELECT_BY_MOD_ID_SQL, &[Value::Integer(mod_id as i64)])
    }

    /// Deletes every file owned by `mod_id` and returns how many went.
    pub fn delete_all_by_mod_id(&self, mod_id: u64) -> Result<usize> {
        let conn = self.database.open()?;
        let deleted = self.delete_all_by_mod_id_with(&conn, mod_id)?;
        conn.close()?;
        Ok(deleted)
    }

    pub fn delete_all_by_mod_id_with(&self, conn: &Connection, mod_id: u64) -> Result<usize> {
        log::debug!("Deleting all [{TABLE_NAME}] rows of mod #{mod_id}");
        conn.execute(DELETE_BY_MOD_ID_SQL, params![mod_id as i64])
            .dao_context("Failed to delete modfiles")
    }
}

impl RecordStore for ModfileStore {
    type Entity = ModfileEntity;

    fn database(&self) -> &Database {
        &self.database
    }

    fn table_name(&self) -> &'static str {
        TABLE_NAME
    }

    fn create_table_sql(&self) -> &'static str {
        CREATE_TABLE_SQL
    }

    fn insert_sql(&self) -> &'static str {
        INSERT_SQL
    }

    fn update_sql(&self) -> &'static str {
        UPDATE_SQL
    }

    fn insert_values(&self, entity: &ModfileEntity) -> Vec<Value> {
        vec![
            Value::Integer(entity.mod_id as i64),
            Value::Text(entity.path.clone()),
            Value::Text(entity.hash.clone()),
        ]
    }

    fn update_values(&self, entity: &ModfileEntity) -> Vec<Value> {
        self.insert_values(entity)
    }

    fn build_from_row(&self, row: &Row<'_>) -> Result<ModfileEntity> {
        let build = || -> rusqlite::Result<ModfileEntity> {
            Ok(ModfileEntity {
                id: row.get::<_, i64>("id")? as u64,
                mod_id: row.get::<_, i64>("mod_id")? as u64,
                path: row.get("path")?,
                hash: row.get("hash")?,
                created_date: Some(timestamp_column(row, "created_date")?),
                updated_date: Some(timestamp_column(row, "updated_date")?),
            })
        };
        build().dao_context("Failed to build modfile from row")
    }

    fn delete_with(&self, conn: &Connection, entity: &ModfileEntity) -> Result<()> {
        self.delete_row_with(conn, entity.id)
    }
}
