//! Row-shaped entities for the mod registry tables.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Fields shared by every persisted row.
pub trait Entity {
    /// Row id, or `0` if the entity has not been persisted.
    fn id(&self) -> u64;

    fn created_date(&self) -> Option<Timestamp>;

    fn updated_date(&self) -> Option<Timestamp>;

    /// Whether the entity has a store-assigned id.
    fn is_persisted(&self) -> bool {
        self.id() != 0
    }
}

/// A registered mod and, when loaded, the files it owns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModEntity {
    pub id: u64,

    /// Display name of the mod
    pub name: String,

    /// Location of the mod's `modinfo.json`
    pub modinfo: String,

    pub created_date: Option<Timestamp>,

    pub updated_date: Option<Timestamp>,

    /// Owned files. Only populated by aggregate reads.
    #[serde(default)]
    pub modfiles: Vec<ModfileEntity>,
}

impl ModEntity {
    /// Creates an unpersisted mod without files.
    pub fn new(name: impl Into<String>, modinfo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modinfo: modinfo.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_modfiles(mut self, modfiles: Vec<ModfileEntity>) -> Self {
        self.modfiles = modfiles;
        self
    }
}

impl Entity for ModEntity {
    fn id(&self) -> u64 {
        self.id
    }

    fn created_date(&self) -> Option<Timestamp> {
        self.created_date
    }

    fn updated_date(&self) -> Option<Timestamp> {
        self.updated_date
    }
}

/// One file belonging to a mod.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModfileEntity {
    pub id: u64,

    /// Id of the owning mod; stamped by the repository on insert
    pub mod_id: u64,

    /// Path of the file relative to the mod directory
    pub path: String,

    /// Content hash used to detect changes
    pub hash: String,

    pub created_date: Option<Timestamp>,

    pub updated_date: Option<Timestamp>,
}

impl ModfileEntity {
    /// Creates an unpersisted file not yet attached to a mod.
    pub fn new(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
            ..Self::default()
        }
    }
}

impl Entity for ModfileEntity {
    fn id(&self) -> u64 {
        self.id
    }

    fn created_date(&self) -> Option<Timestamp> {
        self.created_date
    }

    fn updated_date(&self) -> Option<Timestamp> {
        self.updated_date
    }
}
