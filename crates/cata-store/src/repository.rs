//! The mod aggregate: one `mod` row plus the `modfile` rows it owns.

use crate::{
    dao::{ModStore, ModfileStore, RecordStore},
    db::Database,
    error::{DaoResultExt, Result},
    models::{ModEntity, ModfileEntity},
};

/// Reads and writes mods together with their files.
///
/// Writes run inside a single transaction, so a failure part-way through
/// leaves neither a parent without its files nor files without a parent.
/// Reads return the parent only; load files with
/// [`find_modfiles`](Self::find_modfiles) or use
/// [`find_by_id_with_modfiles`](Self::find_by_id_with_modfiles).
#[derive(Debug, Clone)]
pub struct ModRepository {
    database: Database,
    mods: ModStore,
    modfiles: ModfileStore,
}

impl ModRepository {
    pub fn new(database: Database) -> Self {
        Self {
            mods: ModStore::new(database.clone()),
            modfiles: ModfileStore::new(database.clone()),
            database,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Creates both tables if missing. Only needed when the schema is not
    /// managed through migrations.
    pub fn initialize_tables(&self) -> Result<()> {
        let conn = self.database.open()?;
        self.mods.initialize_table_with(&conn)?;
        self.modfiles.initialize_table_with(&conn)?;
        conn.close()
    }

    /// Inserts the mod, then each of its files stamped with the new mod id.
    ///
    /// Returns the stored mod carrying its stored files.
    pub fn insert(&self, entity: &ModEntity) -> Result<ModEntity> {
        let mut conn = self.database.open()?;
        let tx = conn.transaction().dao_context("Failed to begin transaction")?;

        let mut inserted = self.mods.insert_with(&tx, entity)?;
        inserted.modfiles = self.insert_modfiles_with(&tx, inserted.id, &entity.modfiles)?;

        tx.commit().dao_context("Failed to commit mod insert")?;
        conn.close()?;

        log::debug!(
            "Inserted mod #{} with {} file(s)",
            inserted.id,
            inserted.modfiles.len()
        );
        Ok(inserted)
    }

    /// Updates the mod and replaces its files wholesale.
    ///
    /// Existing files are deleted and `entity.modfiles` is inserted again,
    /// so every file comes back with a fresh id and fresh timestamps.
    pub fn update(&self, entity: &ModEntity) -> Result<ModEntity> {
        let mut conn = self.database.open()?;
        let tx = conn.transaction().dao_context("Failed to begin transaction")?;

        let mut updated = self.mods.update_with(&tx, entity)?;
        let removed = self.modfiles.delete_all_by_mod_id_with(&tx, updated.id)?;
        updated.modfiles = self.insert_modfiles_with(&tx, updated.id, &entity.modfiles)?;

        tx.commit().dao_context("Failed to commit mod update")?;
        conn.close()?;

        log::debug!(
            "Updated mod #{}: replaced {removed} file(s) with {}",
            updated.id,
            updated.modfiles.len()
        );
        Ok(updated)
    }

    /// Deletes the mod. Its files are removed by the schema's cascade.
    pub fn delete(&self, entity: &ModEntity) -> Result<()> {
        self.mods.delete(entity)
    }

    /// The mod with `id`, without files.
    pub fn find_by_id(&self, id: u64) -> Result<Option<ModEntity>> {
        self.mods.find_by_id(id)
    }

    /// Every mod ordered by id, without files.
    pub fn find_all(&self) -> Result<Vec<ModEntity>> {
        self.mods.find_all()
    }

    /// Files owned by `entity`.
    pub fn find_modfiles(&self, entity: &ModEntity) -> Result<Vec<ModfileEntity>> {
        self.modfiles.find_all_by_mod_id(entity.id)
    }

    /// The mod with `id` and all of its files, read on one connection.
    pub fn find_by_id_with_modfiles(&self, id: u64) -> Result<Option<ModEntity>> {
        let conn = self.database.open()?;
        let found = match self.mods.find_by_id_with(&conn, id)? {
            Some(entity) => {
                let modfiles = self.modfiles.find_all_by_mod_id_with(&conn, id)?;
                Some(entity.with_modfiles(modfiles))
            }
            None => None,
        };
        conn.close()?;
        Ok(found)
    }

    /// Every mod with its files, read on one connection.
    pub fn find_all_with_modfiles(&self) -> Result<Vec<ModEntity>> {
        let conn = self.database.open()?;
        let mut mods = self.mods.find_all_with(&conn)?;
        for entity in &mut mods {
            entity.modfiles = self.modfiles.find_all_by_mod_id_with(&conn, entity.id)?;
        }
        conn.close()?;
        Ok(mods)
    }

    pub fn count_all(&self) -> Result<u64> {
        self.mods.count_all()
    }

    fn insert_modfiles_with(
        &self,
        conn: &rusqlite::Connection,
        mod_id: u64,
        modfiles: &[ModfileEntity],
    ) -> Result<Vec<ModfileEntity>> {
        modfiles
            .iter()
            .map(|modfile| {
                let child = ModfileEntity {
                    mod_id,
                    ..modfile.clone()
                };
                self.modfiles.insert_with(conn, &child)
            })
            .collect()
    }
}
