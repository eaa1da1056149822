mod common;

use cata_store::{MigrationName, MigrationSource, Migrator, StoreError, MIGRATION_TABLE_NAME};
use common::{count_rows, create_test_migrator, test_migrations_dir};
use jiff::civil::date;

const BASE: &str = "20240730_base.sql";
const FIRST: &str = "20240731_first_migration.sql";
const SECOND: &str = "20240801_second_migration.sql";

fn filenames(names: &[MigrationName]) -> Vec<&str> {
    names.iter().map(MigrationName::filename).collect()
}

#[test]
fn test_migration_files_are_filtered_and_sorted() {
    let (_temp_dir, migrator) = create_test_migrator();

    let files = migrator.migration_files().expect("Failed to list migrations");

    assert_eq!(filenames(&files), vec![BASE, FIRST, SECOND]);
}

#[test]
fn test_migration_files_dated_after() {
    let (_temp_dir, migrator) = create_test_migrator();

    let after = migrator
        .migration_files_dated_after(date(2024, 7, 30))
        .expect("Failed to list migrations");
    assert_eq!(filenames(&after), vec![FIRST, SECOND]);

    let none = migrator
        .migration_files_dated_after(date(2024, 8, 1))
        .expect("Failed to list migrations");
    assert!(none.is_empty());
}

#[test]
fn test_apply_all_from_clean_state() {
    let (_temp_dir, migrator) = create_test_migrator();
    let db = migrator.database();

    assert!(!db.table_exists("sample"));
    assert!(!db.table_exists("sample2"));
    assert!(!db.table_exists("sample3"));

    let applied = migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");

    assert_eq!(applied, vec![BASE, FIRST, SECOND]);
    assert!(db.table_exists("sample"));
    assert!(db.table_exists("sample2"));
    assert!(db.table_exists("sample3"));
    assert_eq!(
        migrator
            .latest_applied_migration()
            .expect("Failed to read latest migration"),
        Some(SECOND.to_string())
    );
}

#[test]
fn test_apply_all_is_idempotent() {
    let (_temp_dir, migrator) = create_test_migrator();

    migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    let second_run = migrator
        .apply_all_pending_migrations()
        .expect("Second run should succeed");

    assert!(second_run.is_empty());
    assert_eq!(count_rows(migrator.database(), MIGRATION_TABLE_NAME), 3);
    assert!(migrator
        .pending_migrations()
        .expect("Failed to list pending")
        .is_empty());
}

#[test]
fn test_partial_resume_applies_remaining_in_order() {
    let (_temp_dir, migrator) = create_test_migrator();

    migrator
        .apply_migration(BASE)
        .expect("Failed to apply base migration");
    assert_eq!(
        filenames(&migrator.pending_migrations().expect("Failed to list pending")),
        vec![FIRST, SECOND]
    );

    let applied = migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");

    assert_eq!(applied, vec![FIRST, SECOND]);
    let log = migrator
        .applied_migrations()
        .expect("Failed to read migration log");
    let logged: Vec<&str> = log.iter().map(|m| m.filename.as_str()).collect();
    assert_eq!(logged, vec![BASE, FIRST, SECOND]);
    assert!(log.windows(2).all(|w| w[0].applied_at <= w[1].applied_at));
}

#[test]
fn test_seeded_data_survives_and_log_table_is_lazy() {
    let (_temp_dir, migrator) = create_test_migrator();
    let db = migrator.database();

    assert!(!db.table_exists(MIGRATION_TABLE_NAME));
    assert_eq!(migrator.latest_applied_migration().expect("Failed to read"), None);
    assert!(db.table_exists(MIGRATION_TABLE_NAME));

    migrator
        .apply_all_pending_migrations()
        .expect("Failed to apply migrations");
    assert_eq!(count_rows(db, "sample3"), 1);
}

#[test]
fn test_apply_unknown_migration_fails() {
    let (_temp_dir, migrator) = create_test_migrator();

    let result = migrator.apply_migration("20990101_does_not_exist.sql");

    assert!(matches!(result, Err(StoreError::MigrationNotFound { .. })));
    assert_eq!(migrator.latest_applied_migration().expect("Failed to read"), None);
}

#[test]
fn test_missing_directory_has_no_migrations() {
    let (_temp_dir, migrator) = create_test_migrator();
    let empty = Migrator::new(
        migrator.database().clone(),
        MigrationSource::directory(test_migrations_dir().join("missing")),
    );

    assert!(empty.migration_files().expect("Failed to list").is_empty());
    assert!(empty
        .apply_all_pending_migrations()
        .expect("Nothing to apply")
        .is_empty());
}

#[test]
fn test_blank_database_name_fails() {
    let (_temp_dir, migrator) = create_test_migrator();
    let blank = Migrator::new(
        cata_store::Database::new(
            &cata_store::StoreConfig::new(migrator.database().directory()),
            "",
        ),
        migrator.source().clone(),
    );

    assert!(matches!(
        blank.apply_all_pending_migrations(),
        Err(StoreError::BlankName)
    ));
}
