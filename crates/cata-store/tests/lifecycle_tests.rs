mod common;

use cata_store::{StoreError, MIGRATION_TABLE_NAME};
use common::{count_rows, create_test_database, create_test_migrator};

fn insert_label(database: &cata_store::Database, table: &str, label: &str) -> i64 {
    let conn = database.open().expect("Failed to open database");
    let id = conn
        .query_row(
            &format!("INSERT INTO {table} (label) VALUES (?1) RETURNING id"),
            [label],
            |row| row.get(0),
        )
        .expect("Failed to insert row");
    conn.close().expect("Failed to close database");
    id
}

#[test]
fn test_reset_empties_tables_and_restarts_ids() {
    let (_temp_dir, migrator) = create_test_migrator();
    migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    let db = migrator.database();

    insert_label(db, "sample", "one");
    insert_label(db, "sample", "two");
    assert_eq!(count_rows(db, "sample3"), 1);

    db.reset().expect("Failed to reset database");

    for table in ["sample", "sample2", "sample3"] {
        assert!(db.table_exists(table), "{table} should survive reset");
        assert_eq!(count_rows(db, table), 0, "{table} should be empty");
    }
    assert_eq!(count_rows(db, MIGRATION_TABLE_NAME), 3);
    assert_eq!(insert_label(db, "sample", "fresh"), 1);
    assert_eq!(insert_label(db, "sample3", "fresh"), 1);

    assert!(migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations")
        .is_empty());
}

#[test]
fn test_wipe_removes_every_table() {
    let (_temp_dir, migrator) = create_test_migrator();
    migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    let db = migrator.database();

    db.wipe().expect("Failed to wipe database");

    assert!(db.tables().expect("Failed to list tables").is_empty());
    assert!(!db.table_exists("sample"));
    assert!(!db.table_exists(MIGRATION_TABLE_NAME));

    let reapplied = migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    assert_eq!(reapplied.len(), 3);
}

#[test]
fn test_destroy_then_fresh_open() {
    let (_temp_dir, migrator) = create_test_migrator();
    migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    let db = migrator.database();

    db.destroy().expect("Failed to destroy database");

    assert!(!db.data_file().exists());
    assert!(!db.lock_file().exists());

    let conn = db.open().expect("Failed to open fresh database");
    conn.close().expect("Failed to close database");
    assert!(db.data_file().exists());
    assert!(db.tables().expect("Failed to list tables").is_empty());
}

#[test]
fn test_destroy_untouched_database() {
    let (_temp_dir, db) = create_test_database("never_created");

    // shutdown opens, and so creates, the file first
    db.destroy().expect("Failed to destroy database");
    assert!(!db.data_file().exists());
}

#[test]
fn test_lifecycle_refuses_while_writer_is_open() {
    let (_temp_dir, db) = create_test_database("busy");
    let writer = db.open().expect("Failed to open database");

    assert!(matches!(db.reset(), Err(StoreError::Locked { .. })));
    assert!(matches!(db.wipe(), Err(StoreError::Locked { .. })));
    assert!(matches!(db.shutdown(), Err(StoreError::Locked { .. })));
    assert!(matches!(db.destroy(), Err(StoreError::UnsafeDestroy { .. })));

    writer.close().expect("Failed to close database");
    db.shutdown().expect("Shutdown should succeed once the writer is gone");
}

#[test]
fn test_blank_name_fails_everywhere() {
    let (_temp_dir, db) = create_test_database("   ");

    assert!(matches!(db.open(), Err(StoreError::BlankName)));
    assert!(matches!(db.reset(), Err(StoreError::BlankName)));
    assert!(matches!(db.wipe(), Err(StoreError::BlankName)));
    assert!(matches!(db.shutdown(), Err(StoreError::BlankName)));
    assert!(matches!(db.destroy(), Err(StoreError::BlankName)));
}
