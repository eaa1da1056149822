//! Async facade over the mod registry.
//!
//! [`ModManager`] is what the launcher's UI talks to. It speaks DTOs, never
//! entities, and runs every storage call on tokio's blocking pool so the UI
//! runtime never waits on disk I/O:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   ModManager    │    │  spawn_blocking │    │  ModRepository  │
//! │ (ModDto in/out) │───▶│ (one task per   │───▶│ (one connection │
//! │                 │    │  operation)     │    │  per operation) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Construction goes through [`ModManagerBuilder`], which applies the mod
//! schema migrations before handing the manager out.

mod builder;
mod mod_ops;

pub use builder::ModManagerBuilder;

use crate::repository::ModRepository;

/// Default name of the database holding the mod registry.
pub const MODS_DATABASE: &str = "mods";

/// Registers, unregisters and lists mods.
#[derive(Debug, Clone)]
pub struct ModManager {
    repository: ModRepository,
}

impl ModManager {
    /// Wraps an already migrated repository.
    pub(crate) fn new(repository: ModRepository) -> Self {
        Self { repository }
    }

    /// The repository this manager writes through.
    pub fn repository(&self) -> &ModRepository {
        &self.repository
    }
}
