//! Record store for the `mod` table.

use rusqlite::{types::Value, Connection, Row};

use super::{timestamp_column, RecordStore};
use crate::{
    db::Database,
    error::{DaoResultExt, Result},
    models::ModEntity,
};

const TABLE_NAME: &str = "mod";
const CREATE_TABLE_SQL: &str = include_str!("../../migrations/mod/20240730_create_mod.sql");
const INSERT_SQL: &str = "INSERT INTO mod (name, modinfo, created_date, updated_date) VALUES (?1, ?2, ?3, ?4) RETURNING id";
const UPDATE_SQL: &str = "UPDATE mod SET name = ?1, modinfo = ?2, updated_date = ?3 WHERE id = ?4";

/// Stores mod rows. Files are handled by [`ModfileStore`](super::ModfileStore).
#[derive(Debug, Clone)]
pub struct ModStore {
    database: Database,
}

impl ModStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl RecordStore for ModStore {
    type Entity = ModEntity;

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

    fn insert_values(&self, entity: &ModEntity) -> Vec<Value> {
        vec![
            Value::Text(entity.name.clone()),
            Value::Text(entity.modinfo.clone()),
        ]
    }

    fn update_values(&self, entity: &ModEntity) -> Vec<Value> {
        self.insert_values(entity)
    }

    fn build_from_row(&self, row: &Row<'_>) -> Result<ModEntity> {
        let build = || -> rusqlite::Result<ModEntity> {
            Ok(ModEntity {
                id: row.get::<_, i64>("id")? as u64,
                name: row.get("name")?,
                modinfo: row.get("modinfo")?,
                created_date: Some(timestamp_column(row, "created_date")?),
                updated_date: Some(timestamp_column(row, "updated_date")?),
                modfiles: Vec::new(),
            })
        };
        build().dao_context("Failed to build mod from row")
    }

    /// Deletes the mod row. Its files go with it through `ON DELETE CASCADE`.
    fn delete_with(&self, conn: &Connection, entity: &ModEntity) -> Result<()> {
        self.delete_row_with(conn, entity.id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{config::StoreConfig, error::StoreError, models::Entity};

    fn test_store() -> (TempDir, ModStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(&StoreConfig::new(temp_dir.path()), "mod_store_test");
        let store = ModStore::new(database);
        store.initialize_table().expect("Failed to initialize table");
        (temp_dir, store)
    }

    #[test]
    fn insert_assigns_id_and_equal_dates() {
        let (_temp_dir, store) = test_store();

        let inserted = store
            .insert(&ModEntity::new("Arcana", "arcana/modinfo.json"))
            .expect("Failed to insert");

        assert_eq!(inserted.id, 1);
        assert!(inserted.is_persisted());
        assert!(inserted.created_date.is_some());
        assert_eq!(inserted.created_date, inserted.updated_date);
        assert_eq!(inserted.name, "Arcana");
    }

    #[test]
    fn update_bumps_updated_date_only() {
        let (_temp_dir, store) = test_store();
        let mut inserted = store
            .insert(&ModEntity::new("Arcana", "arcana/modinfo.json"))
            .expect("Failed to insert");

        inserted.name = "Arcana Magic".to_string();
        let updated = store.update(&inserted).expect("Failed to update");

        assert_eq!(updated.name, "Arcana Magic");
        assert_eq!(updated.created_date, inserted.created_date);
        assert!(updated.updated_date > inserted.updated_date);
    }

    #[test]
    fn update_and_delete_missing_row_fail() {
        let (_temp_dir, store) = test_store();
        let mut ghost = ModEntity::new("Ghost", "ghost/modinfo.json");
        ghost.id = 42;

        assert!(matches!(
            store.update(&ghost),
            Err(StoreError::NotFound { table: "mod", id: 42 })
        ));
        assert!(matches!(
            store.delete(&ghost),
            Err(StoreError::NotFound { table: "mod", id: 42 })
        ));
    }

    #[test]
    fn initialize_table_is_idempotent() {
        let (_temp_dir, store) = test_store();

        store.initialize_table().expect("Second initialize should succeed");
        assert!(store.database().table_exists("mod"));
    }
}
