#![allow(dead_code)]

use std::path::PathBuf;

use cata_store::{Database, MigrationSource, Migrator, ModManager, ModManagerBuilder, StoreConfig};
use tempfile::TempDir;

/// Directory of fixture migrations shipped with the test suite.
pub fn test_migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("migrations")
        .join("test")
}

/// Helper function to create a database under a fresh temporary root
pub fn create_test_database(name: &str) -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = StoreConfig::builder()
        .with_root_dir(Some(temp_dir.path()))
        .build()
        .expect("Failed to build config");
    (temp_dir, Database::new(&config, name))
}

/// Helper function to create a migrator over the fixture migrations
pub fn create_test_migrator() -> (TempDir, Migrator) {
    let (temp_dir, database) = create_test_database("migrations");
    let migrator = Migrator::new(database, MigrationSource::directory(test_migrations_dir()));
    (temp_dir, migrator)
}

/// Helper function to create a migrated database using the mod schema
pub fn create_mod_database() -> (TempDir, Database) {
    let (temp_dir, database) = create_test_database("mods");
    Migrator::new(
        database.clone(),
        MigrationSource::Embedded(cata_store::MOD_MIGRATIONS),
    )
    .apply_all_pending_migrations()
    .expect("Failed to apply mod migrations");
    (temp_dir, database)
}

/// Helper function to create a test manager
pub async fn create_test_manager() -> (TempDir, ModManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = ModManagerBuilder::new()
        .with_root_dir(Some(temp_dir.path()))
        .build()
        .await
        .expect("Failed to create manager");
    (temp_dir, manager)
}

/// Counts rows in `table`, opening and closing a connection.
pub fn count_rows(database: &Database, table: &str) -> i64 {
    let conn = database.open().expect("Failed to open database");
    let count = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("Failed to count rows");
    conn.close().expect("Failed to close database");
    count
}
