//! Mod registry operations for the ModManager.

use tokio::task;

use super::ModManager;
use crate::{
    error::{Result, StoreError},
    models::{ModDto, ModEntity},
};

impl ModManager {
    /// Registers a new mod together with its files.
    ///
    /// Returns the stored mod with ids and timestamps filled in.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the mod already has an id or a
    /// required field is blank.
    pub async fn register_mod(&self, dto: ModDto) -> Result<ModDto> {
        validate_new_mod(&dto)?;

        let repository = self.repository.clone();
        let entity = ModEntity::from(dto);

        let registered = task::spawn_blocking(move || repository.insert(&entity))
            .await
            .map_err(|e| StoreError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        log::info!(
            "Registered mod [{}] as #{} with {} file(s)",
            registered.name,
            registered.id,
            registered.modfiles.len()
        );
        Ok(ModDto::from(registered))
    }

    /// Removes a registered mod and all of its files.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the mod has no id and
    /// `StoreError::NotFound` if no such mod is registered.
    pub async fn unregister_mod(&self, dto: &ModDto) -> Result<()> {
        let id = dto.id.ok_or_else(|| {
            StoreError::invalid_input("id").with_reason("Only registered mods can be unregistered")
        })?;

        let repository = self.repository.clone();
        let entity = ModEntity::from(dto.clone());

        task::spawn_blocking(move || repository.delete(&entity))
            .await
            .map_err(|e| StoreError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        log::info!("Unregistered mod #{id}");
        Ok(())
    }

    /// Lists every registered mod, each with its files, ordered by id.
    pub async fn list_all_registered_mods(&self) -> Result<Vec<ModDto>> {
        let repository = self.repository.clone();

        let mods = task::spawn_blocking(move || repository.find_all_with_modfiles())
            .await
            .map_err(|e| StoreError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        Ok(mods.into_iter().map(ModDto::from).collect())
    }
}

/// Checks that `dto` describes a mod that can be registered.
fn validate_new_mod(dto: &ModDto) -> Result<()> {
    if dto.id.is_some() {
        return Err(StoreError::invalid_input("id")
            .with_reason("Mod is already registered; unregister it first"));
    }
    if dto.name.trim().is_empty() {
        return Err(StoreError::invalid_input("name").with_reason("Mod name cannot be empty"));
    }
    if dto.modinfo.trim().is_empty() {
        return Err(StoreError::invalid_input("modinfo").with_reason("Mod info path cannot be empty"));
    }

    for (index, modfile) in dto.modfiles.iter().enumerate() {
        if modfile.path.trim().is_empty() {
            return Err(StoreError::invalid_input(format!("modfiles[{index}].path"))
                .with_reason("Modfile path cannot be empty"));
        }
        if modfile.hash.trim().is_empty() {
            return Err(StoreError::invalid_input(format!("modfiles[{index}].hash"))
                .with_reason("Modfile hash cannot be empty"));
        }
    }

    Ok(())
}
