//! Migration scripts compiled into the binary.

use super::source::EmbeddedMigration;

/// Schema of the mod registry: the `mod` and `modfile` tables.
pub const MOD_MIGRATIONS: &[EmbeddedMigration] = &[
    EmbeddedMigration::new(
        "20240730_create_mod.sql",
        include_str!("../../migrations/mod/20240730_create_mod.sql"),
    ),
    EmbeddedMigration::new(
        "20240731_create_modfile.sql",
        include_str!("../../migrations/mod/20240731_create_modfile.sql"),
    ),
];
