//! Entities persisted by the record stores and the DTOs handed to callers.
//!
//! Entities mirror table rows. An id of `0` means "not yet persisted"; the
//! store assigns the real id and both timestamps on insert. DTOs are the
//! serializable view exposed by the [`ModManager`](crate::ModManager), with
//! optional ids instead of the `0` sentinel.

mod dto;
mod entity;

pub use dto::{ModDto, ModfileDto};
pub use entity::{Entity, ModEntity, ModfileEntity};
