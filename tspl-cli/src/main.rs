//! `tspl`: convert images to TSPL print jobs and back.
//!
//! Settings come from `.env` and `TSPL_*` environment variables, then an
//! optional `--options` JSON file, then per-command flags.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DecodeArgs, EncodeArgs, InspectArgs, OverlayArgs};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "tspl", about = "TSPL label bitmap tool")]
struct Cli {
    /// JSON file with label options (`peel`, `dots_per_unit`)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Threshold an image and write a complete print job
    Encode(EncodeArgs),
    /// Extract the bitmap of a print job as a PNG
    Decode(DecodeArgs),
    /// Paste an image into the bitmap of an existing print job
    Overlay(OverlayArgs),
    /// Print the bitmap header of a print job as JSON
    Inspect(InspectArgs),
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = &cli.options {
        config.options = config::app_config::read_options_file(path)?;
    }
    tracing::debug!(?config, "Configuration loaded");

    match &cli.command {
        Command::Encode(args) => commands::cmd_encode(args, &config),
        Command::Decode(args) => commands::cmd_decode(args),
        Command::Overlay(args) => commands::cmd_overlay(args, &config),
        Command::Inspect(args) => commands::cmd_inspect(args),
    }
}
