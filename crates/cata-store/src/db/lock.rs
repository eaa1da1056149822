//! Advisory writer lock kept next to each database file.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;

use crate::error::{Result, StoreError};

/// Exclusive lock on `<name>.lock.db`, held for the lifetime of a writer
/// handle.
///
/// The lock file stays on disk after release so every writer locks the same
/// inode. Only [`Database::destroy`](super::Database::destroy) removes it.
#[derive(Debug)]
pub(crate) struct DatabaseLock {
    file: File,
    path: PathBuf,
}

impl DatabaseLock {
    /// Takes the lock without blocking.
    pub(crate) fn acquire(database: &str, path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::file_system(&path, e))?;

        if file.try_lock_exclusive().is_err() {
            log::error!(
                "Database [{database}] is locked by another connection ({})",
                path.display()
            );
            return Err(StoreError::Locked {
                database: database.to_string(),
                path,
            });
        }

        log::trace!("Acquired lock [{}]", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Could not release lock [{}]: {e}", self.path.display());
        }
    }
}
