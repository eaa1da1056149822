mod common;

use cata_store::{
    Database, MigrationSource, ModDto, ModManagerBuilder, ModfileDto, StoreConfig, StoreError,
    MODS_DATABASE,
};
use common::{create_test_manager, test_migrations_dir};
use tempfile::TempDir;

fn arcana() -> ModDto {
    ModDto::new("Arcana", "data/mods/arcana/modinfo.json").with_modfiles(vec![
        ModfileDto::new("data/mods/arcana/items.json", "1a"),
        ModfileDto::new("data/mods/arcana/spells.json", "2b"),
    ])
}

#[tokio::test]
async fn test_register_and_list_mods() {
    let (_temp_dir, manager) = create_test_manager().await;

    let registered = manager
        .register_mod(arcana())
        .await
        .expect("Failed to register mod");

    let id = registered.id.expect("Registered mod should have an id");
    assert!(registered.created_date.is_some());
    assert_eq!(registered.modfiles.len(), 2);
    assert!(registered
        .modfiles
        .iter()
        .all(|f| f.mod_id == Some(id) && f.id.is_some()));

    let listed = manager
        .list_all_registered_mods()
        .await
        .expect("Failed to list mods");
    assert_eq!(listed, vec![registered]);
}

#[tokio::test]
async fn test_unregister_removes_mod_and_files() {
    let (_temp_dir, manager) = create_test_manager().await;
    let first = manager
        .register_mod(arcana())
        .await
        .expect("Failed to register mod");
    let second = manager
        .register_mod(ModDto::new("Magiclysm", "data/mods/magiclysm/modinfo.json"))
        .await
        .expect("Failed to register mod");

    manager
        .unregister_mod(&first)
        .await
        .expect("Failed to unregister mod");

    let listed = manager
        .list_all_registered_mods()
        .await
        .expect("Failed to list mods");
    assert_eq!(listed, vec![second]);
    assert_eq!(
        manager
            .repository()
            .database()
            .tables()
            .expect("Failed to list tables"),
        vec!["mod", "modfile", "schema_migrations"]
    );

    assert!(matches!(
        manager.unregister_mod(&first).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_invalid_mods_are_rejected() {
    let (_temp_dir, manager) = create_test_manager().await;

    let unnamed = ModDto::new("", "modinfo.json");
    assert!(matches!(
        manager.register_mod(unnamed).await,
        Err(StoreError::InvalidInput { .. })
    ));

    let unregistered = arcana();
    assert!(matches!(
        manager.unregister_mod(&unregistered).await,
        Err(StoreError::InvalidInput { .. })
    ));

    let registered = manager
        .register_mod(arcana())
        .await
        .expect("Failed to register mod");
    assert!(matches!(
        manager.register_mod(registered).await,
        Err(StoreError::InvalidInput { .. })
    ));

    assert_eq!(
        manager
            .list_all_registered_mods()
            .await
            .expect("Failed to list mods")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_builder_migrates_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let first = ModManagerBuilder::new()
        .with_root_dir(Some(temp_dir.path()))
        .build()
        .await
        .expect("Failed to create manager");
    first
        .register_mod(arcana())
        .await
        .expect("Failed to register mod");

    let second = ModManagerBuilder::new()
        .with_root_dir(Some(temp_dir.path()))
        .build()
        .await
        .expect("Rebuilding should not fail");

    assert_eq!(
        second
            .list_all_registered_mods()
            .await
            .expect("Failed to list mods")
            .len(),
        1
    );
    let database = Database::new(&StoreConfig::new(temp_dir.path()), MODS_DATABASE);
    assert!(database.data_file().exists());
    database.open().expect("Writer lock should be free");
}

#[tokio::test]
async fn test_builder_with_custom_source_and_name() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let manager = ModManagerBuilder::new()
        .with_root_dir(Some(temp_dir.path()))
        .with_database_name("fixtures")
        .with_migration_source(MigrationSource::directory(test_migrations_dir()))
        .build()
        .await
        .expect("Failed to create manager");

    let database = manager.repository().database();
    assert_eq!(database.name(), "fixtures");
    assert!(database.table_exists("sample3"));
    assert!(!database.table_exists("mod"));
}

#[tokio::test]
async fn test_builder_rejects_blank_database_name() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let result = ModManagerBuilder::new()
        .with_root_dir(Some(temp_dir.path()))
        .with_database_name(" ")
        .build()
        .await;

    assert!(matches!(result, Err(StoreError::BlankName)));
}
