//! Location of the launcher's files on disk.

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Prefix used for the XDG data directory.
pub const XDG_PREFIX: &str = "cata-launcher";

/// Name of the directory, under the root, that holds database files.
pub const DATABASE_DIR: &str = "db";

/// Resolved storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    root_dir: PathBuf,
}

impl StoreConfig {
    /// Creates a configuration rooted at `root_dir`.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
        }
    }

    /// Returns a builder that falls back to the XDG data directory.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }

    /// The launcher-files root.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory holding every database file: `<root>/db`.
    pub fn database_dir(&self) -> PathBuf {
        self.root_dir.join(DATABASE_DIR)
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    root_dir: Option<PathBuf>,
}

impl StoreConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self { root_dir: None }
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

    /// Resolves the configuration and makes sure `<root>/db` exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::XdgDirectory` if no default root can be found and
    /// `StoreError::FileSystem` if the database directory cannot be created.
    pub fn build(self) -> Result<StoreConfig> {
        let root_dir = match self.root_dir {
            Some(path) => path,
            None => Self::default_root_dir()?,
        };

        let config = StoreConfig { root_dir };
        let database_dir = config.database_dir();
        std::fs::create_dir_all(&database_dir)
            .map_err(|e| StoreError::file_system(&database_dir, e))?;

        Ok(config)
    }

    /// Returns the default root following XDG Base Directory specification.
    fn default_root_dir() -> Result<PathBuf> {
        let database_dir = xdg::BaseDirectories::with_prefix(XDG_PREFIX)
            .create_data_directory(DATABASE_DIR)
            .map_err(|e| StoreError::XdgDirectory(e.to_string()))?;

        database_dir
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StoreError::XdgDirectory("data directory has no parent".into()))
    }
}
