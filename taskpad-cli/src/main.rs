use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use taskpad_core::TaskStore;

mod commands;
mod config;
mod tui;

#[derive(Parser, Debug)]
#[command(
    name = "taskpad",
    version,
    about = "Single-user to-do list manager backed by a flat JSON file"
)]
struct Cli {
    /// Task file to use (overrides config; default: todo.json)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// With no subcommand the interactive UI starts
    #[command(subcommand)]
    command: Option<commands::Command>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    let store = TaskStore::new(cli.file.unwrap_or_else(|| cfg.store.file.clone()));

    match cli.command {
        Some(command) => commands::run(command, &store, &cfg),
        None => tui::run(store, &cfg),
    }
}
