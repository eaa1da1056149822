//! Serializable views of the mod aggregate.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ModEntity, ModfileEntity};

/// A mod as seen by callers of the [`ModManager`](crate::ModManager).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModDto {
    /// `None` until registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub name: String,

    pub modinfo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,

    #[serde(default)]
    pub modfiles: Vec<ModfileDto>,
}

impl ModDto {
    pub fn new(name: impl Into<String>, modinfo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modinfo: modinfo.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_modfiles(mut self, modfiles: Vec<ModfileDto>) -> Self {
        self.modfiles = modfiles;
        self
    }
}

/// One file of a [`ModDto`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModfileDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_id: Option<u64>,

    pub path: String,

    pub hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
}

impl ModfileDto {
    pub fn new(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
            ..Self::default()
        }
    }
}

/// Maps the `0` "unpersisted" sentinel to `None`.
fn persisted_id(id: u64) -> Option<u64> {
    (id != 0).then_some(id)
}

impl From<ModEntity> for ModDto {
    fn from(entity: ModEntity) -> Self {
        Self {
            id: persisted_id(entity.id),
            name: entity.name,
            modinfo: entity.modinfo,
            created_date: entity.created_date,
            updated_date: entity.updated_date,
            modfiles: entity.modfiles.into_iter().map(ModfileDto::from).collect(),
        }
    }
}

impl From<ModDto> for ModEntity {
    fn from(dto: ModDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name,
            modinfo: dto.modinfo,
            created_date: dto.created_date,
            updated_date: dto.updated_date,
            modfiles: dto.modfiles.into_iter().map(ModfileEntity::from).collect(),
        }
    }
}

impl From<ModfileEntity> for ModfileDto {
    fn from(entity: ModfileEntity) -> Self {
        Self {
            id: persisted_id(entity.id),
            mod_id: persisted_id(entity.mod_id),
            path: entity.path,
            hash: entity.hash,
            created_date: entity.created_date,
            updated_date: entity.updated_date,
        }
    }
}

impl From<ModfileDto> for ModfileEntity {
    fn from(dto: ModfileDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            mod_id: dto.mod_id.unwrap_or_default(),
            path: dto.path,
            hash: dto.hash,
            created_date: dto.created_date,
            updated_date: dto.updated_date,
        }
    }
}
