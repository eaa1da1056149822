//! Embedded storage layer for the Cata launcher.
//!
//! This crate owns everything the launcher persists: named SQLite databases
//! under `<root>/db/`, the migration engine that brings their schema up to
//! date, the generic record-store pattern used for every table, and the mod
//! registry built on top of it.
//!
//! # Layers
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   ModManager    │    │  ModRepository  │    │    Database     │
//! │ (async, DTOs)   │───▶│ (mod + modfile  │───▶│ (open, lock,    │
//! │                 │    │  record stores) │    │  lifecycle)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                                        ▲
//!                               Migrator ────────────────┘
//! ```
//!
//! Every operation opens its own connection and closes it before returning.
//! There is no pool and no cached state; rows are always re-read from disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cata_store::{ModDto, ModManagerBuilder, ModfileDto};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ModManagerBuilder::new()
//!     .with_root_dir(Some("/tmp/cata"))
//!     .build()
//!     .await?;
//!
//! let registered = manager
//!     .register_mod(ModDto::new("Arcana", "modinfo.json").with_modfiles(vec![
//!         ModfileDto::new("data/mods/arcana/items.json", "3f2a"),
//!     ]))
//!     .await?;
//! println!("registered mod #{:?}", registered.id);
//!
//! for m in manager.list_all_registered_mods().await? {
//!     println!("{} ({} files)", m.name, m.modfiles.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod manager;
pub mod migration;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use config::{StoreConfig, StoreConfigBuilder};
pub use dao::{ModStore, ModfileStore, RecordStore};
pub use db::{ConnectionHandle, Database};
pub use error::{Result, StoreError};
pub use manager::{ModManager, ModManagerBuilder, MODS_DATABASE};
pub use migration::{
    AppliedMigration, EmbeddedMigration, MigrationName, MigrationSource, Migrator,
    MIGRATION_TABLE_NAME, MOD_MIGRATIONS,
};
pub use models::{Entity, ModDto, ModEntity, ModfileDto, ModfileEntity};
pub use repository::ModRepository;
