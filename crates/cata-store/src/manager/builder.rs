//! Builder for creating and configuring ModManager instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::{ModManager, MODS_DATABASE};
use crate::{
    config::StoreConfig,
    db::Database,
    error::{Result, StoreError},
    migration::{MigrationSource, Migrator, MOD_MIGRATIONS},
    repository::ModRepository,
};

/// Builder for creating and configuring ModManager instances.
#[derive(Debug, Clone)]
pub struct ModManagerBuilder {
    root_dir: Option<PathBuf>,
    database_name: String,
    migration_source: MigrationSource,
}

impl ModManagerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            root_dir: None,
            database_name: MODS_DATABASE.to_string(),
            migration_source: MigrationSource::Embedded(MOD_MIGRATIONS),
        }
    }

    /// Sets a custom launcher-files root.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/cata-launcher` or `~/.local/share/cata-launcher`
    pub fn with_root_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.root_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Uses a database other than [`MODS_DATABASE`].
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Replaces the embedded mod schema with another migration source.
    pub fn with_migration_source(mut self, source: MigrationSource) -> Self {
        self.migration_source = source;
        self
    }

    /// Builds the manager, applying all pending migrations first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::XdgDirectory` or `StoreError::FileSystem` if the
    /// root cannot be resolved, `StoreError::BlankName` for a blank database
    /// name and `StoreError::Migration` if a migration fails.
    pub async fn build(self) -> Result<ModManager> {
        let Self {
            root_dir,
            database_name,
            migration_source,
        } = self;

        let database = task::spawn_blocking(move || {
            let config = StoreConfig::builder().with_root_dir(root_dir).build()?;
            let database = Database::new(&config, database_name);

            let applied = Migrator::new(database.clone(), migration_source)
                .apply_all_pending_migrations()?;
            if !applied.is_empty() {
                log::info!(
                    "Applied {} migration(s) to database [{}]",
                    applied.len(),
                    database.name()
                );
            }

            Ok::<Database, StoreError>(database)
        })
        .await
        .map_err(|e| StoreError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(ModManager::new(ModRepository::new(database)))
    }
}

impl Default for ModManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
