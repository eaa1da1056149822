use std::path::PathBuf;

use cata_store::ModfileDto;
use clap::{Parser, Subcommand};

/// Operator command line for the Cata launcher's embedded store
///
/// Applies schema migrations, runs lifecycle operations (reset, wipe,
/// destroy) against a named database and manages the mod registry.
#[derive(Parser, Debug)]
#[command(version, about, name = "cata")]
pub struct Args {
    /// Launcher-files root holding the `db/` directory. Defaults to
    /// $XDG_DATA_HOME/cata-launcher
    #[arg(long, global = true)]
    pub root_dir: Option<PathBuf>,

    /// Name of the database to operate on
    #[arg(long, global = true, default_value = cata_store::MODS_DATABASE)]
    pub database: String,

    /// Read migration scripts from this directory instead of the built-in
    /// mod schema
    #[arg(long, global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Cata CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration
    Migrate,
    /// List discovered migrations and whether each has been applied
    Migrations,
    /// Delete all rows except the migration log and restart ids at 1
    Reset,
    /// Drop every table, the migration log included
    Wipe,
    /// Shut the database down and delete its files
    Destroy,
    /// Manage registered mods
    #[command(alias = "m")]
    Mod {
        #[command(subcommand)]
        command: ModCommands,
    },
}

/// Mod registry commands
#[derive(Subcommand, Debug)]
pub enum ModCommands {
    /// Register a new mod
    Register {
        /// Display name of the mod
        name: String,
        /// Path of the mod's modinfo.json
        modinfo: String,
        /// A file owned by the mod, as PATH=HASH. Repeatable
        #[arg(short, long = "file", value_name = "PATH=HASH", value_parser = parse_modfile)]
        files: Vec<ModfileDto>,
    },
    /// List registered mods with their files
    #[command(alias = "ls")]
    List,
    /// Unregister a mod and delete its files
    #[command(alias = "rm")]
    Unregister {
        /// Id of the registered mod
        id: u64,
    },
}

/// Parses `PATH=HASH`, splitting on the last `=`.
fn parse_modfile(value: &str) -> Result<ModfileDto, String> {
    match value.rsplit_once('=') {
        Some((path, hash)) if !path.is_empty() && !hash.is_empty() => {
            Ok(ModfileDto::new(path, hash))
        }
        _ => Err(format!("expected PATH=HASH, got '{value}'")),
    }
}
