//! Cata CLI Application
//!
//! Operator command line for the launcher's embedded store.

mod args;
mod cli;
mod renderer;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::Renderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        root_dir,
        database,
        migrations_dir,
        json,
        command,
    } = Args::parse();

    let cli = Cli::new(root_dir, database, migrations_dir, Renderer::new(json));

    info!("Cata started");

    match command {
        Migrate => cli.migrate(),
        Migrations => cli.list_migrations(),
        Reset => cli.reset(),
        Wipe => cli.wipe(),
        Destroy => cli.destroy(),
        Mod { command } => cli.handle_mod_command(command).await,
    }
}
