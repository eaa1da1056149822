//! Where migration scripts come from.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// A migration script compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedMigration {
    pub filename: &'static str,
    pub sql: &'static str,
}

impl EmbeddedMigration {
    pub const fn new(filename: &'static str, sql: &'static str) -> Self {
        Self { filename, sql }
    }
}

/// Root under which migration scripts are discovered.
///
/// Listing returns every file name found, valid or not; filtering on the
/// `YYYYMMDD_description.sql` pattern happens in the [`Migrator`](super::Migrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationSource {
    /// Scripts shipped inside the binary.
    Embedded(&'static [EmbeddedMigration]),
    /// Scripts read from a directory at runtime. Subdirectories are ignored.
    Directory(PathBuf),
}

impl MigrationSource {
    /// Source reading scripts from `path`.
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::Directory(path.as_ref().to_path_buf())
    }

    /// Names of every script file in this source, unfiltered and unsorted.
    pub fn list(&self) -> Result<Vec<String>> {
        match self {
            Self::Embedded(migrations) => {
                Ok(migrations.iter().map(|m| m.filename.to_string()).collect())
            }
            Self::Directory(path) => {
                let entries = match fs::read_dir(path) {
                    Ok(entries) => entries,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        log::warn!(
                            "Migration directory [{}] does not exist; no migrations found",
                            path.display()
                        );
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(StoreError::file_system(path, e)),
                };

                let mut names = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|e| StoreError::file_system(path, e))?;
                    let is_file = entry
                        .file_type()
                        .map_err(|e| StoreError::file_system(entry.path(), e))?
                        .is_file();
                    if !is_file {
                        continue;
                    }
                    match entry.file_name().into_string() {
                        Ok(name) => names.push(name),
                        Err(raw) => log::warn!("Skipping non UTF-8 migration file name {raw:?}"),
                    }
                }
                Ok(names)
            }
        }
    }

    /// Full text of the script `filename`.
    ///
    /// Fails with [`StoreError::MigrationNotFound`] if this source has no
    /// such script.
    pub fn read(&self, filename: &str) -> Result<String> {
        let not_found = || StoreError::MigrationNotFound {
            migration: filename.to_string(),
        };

        match self {
            Self::Embedded(migrations) => migrations
                .iter()
                .find(|m| m.filename == filename)
                .map(|m| m.sql.to_string())
                .ok_or_else(not_found),
            Self::Directory(path) => {
                // Names must stay inside the source directory.
                if filename.contains(['/', '\\']) || filename == ".." || filename == "." {
                    return Err(not_found());
                }

                let script = path.join(filename);
                match fs::read_to_string(&script) {
                    Ok(sql) => Ok(sql),
                    Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
                    Err(e) => Err(StoreError::file_system(script, e)),
                }
            }
        }
    }
}
