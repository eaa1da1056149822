//! Command handlers
//!
//! Each handler resolves what it needs from the global flags, calls into
//! `cata-store` and hands the result to the [`Renderer`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use cata_store::{
    Database, MigrationSource, Migrator, ModDto, ModManager, ModManagerBuilder, StoreConfig,
    MOD_MIGRATIONS,
};
use log::info;

use crate::{
    args::ModCommands,
    renderer::{MigrationStatus, Renderer},
};

/// Resolved global flags plus the output renderer.
pub struct Cli {
    root_dir: Option<PathBuf>,
    database: String,
    migrations_dir: Option<PathBuf>,
    renderer: Renderer,
}

impl Cli {
    pub fn new(
        root_dir: Option<PathBuf>,
        database: String,
        migrations_dir: Option<PathBuf>,
        renderer: Renderer,
    ) -> Self {
        Self {
            root_dir,
            database,
            migrations_dir,
            renderer,
        }
    }

    fn migration_source(&self) -> MigrationSource {
        match &self.migrations_dir {
            Some(dir) => MigrationSource::directory(dir),
            None => MigrationSource::Embedded(MOD_MIGRATIONS),
        }
    }

    fn database(&self) -> Result<Database> {
        let config = StoreConfig::builder()
            .with_root_dir(self.root_dir.as_ref())
            .build()
            .context("Failed to resolve launcher root")?;
        Ok(Database::new(&config, self.database.clone()))
    }

    fn migrator(&self) -> Result<Migrator> {
        Ok(Migrator::new(self.database()?, self.migration_source()))
    }

    async fn manager(&self) -> Result<ModManager> {
        ModManagerBuilder::new()
            .with_root_dir(self.root_dir.as_ref())
            .with_database_name(self.database.clone())
            .with_migration_source(self.migration_source())
            .build()
            .await
            .context("Failed to initialize mod manager")
    }

    pub fn migrate(&self) -> Result<()> {
        let applied = self
            .migrator()?
            .apply_all_pending_migrations()
            .context("Failed to apply migrations")?;
        info!("Applied {} migration(s)", applied.len());
        self.renderer.applied_migrations(&applied)
    }

    pub fn list_migrations(&self) -> Result<()> {
        let migrator = self.migrator()?;
        let discovered = migrator
            .migration_files()
            .context("Failed to discover migrations")?;
        let applied = migrator
            .applied_migrations()
            .context("Failed to read migration log")?;
        self.renderer
            .migrations(&MigrationStatus::collect(&discovered, &applied))
    }

    pub fn reset(&self) -> Result<()> {
        let database = self.database()?;
        database
            .reset()
            .with_context(|| format!("Failed to reset database '{}'", database.name()))?;
        self.renderer
            .done(&format!("Database '{}' has been reset.", database.name()))
    }

    pub fn wipe(&self) -> Result<()> {
        let database = self.database()?;
        database
            .wipe()
            .with_context(|| format!("Failed to wipe database '{}'", database.name()))?;
        self.renderer
            .done(&format!("Database '{}' has been wiped.", database.name()))
    }

    pub fn destroy(&self) -> Result<()> {
        let database = self.database()?;
        database
            .destroy()
            .with_context(|| format!("Failed to destroy database '{}'", database.name()))?;
        self.renderer
            .done(&format!("Database '{}' has been destroyed.", database.name()))
    }

    pub async fn handle_mod_command(&self, command: ModCommands) -> Result<()> {
        let manager = self.manager().await?;

        match command {
            ModCommands::Register {
                name,
                modinfo,
                files,
            } => {
                let registered = manager
                    .register_mod(ModDto::new(name, modinfo).with_modfiles(files))
                    .await
                    .context("Failed to register mod")?;
                self.renderer.mod_registered(&registered)
            }
            ModCommands::List => {
                let mods = manager
                    .list_all_registered_mods()
                    .await
                    .context("Failed to list mods")?;
                self.renderer.mods(&mods)
            }
            ModCommands::Unregister { id } => {
                let dto = ModDto {
                    id: Some(id),
                    ..ModDto::default()
                };
                manager
                    .unregister_mod(&dto)
                    .await
                    .with_context(|| format!("Failed to unregister mod #{id}"))?;
                self.renderer.done(&format!("Unregistered mod #{id}."))
            }
        }
    }
}
