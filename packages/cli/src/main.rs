#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `callgrid`: downloads the Baltimore calls-for-service and ASOS weather
//! datasets, and formats them into a grid-by-window summary table.
//!
//! Uses `indicatif-log-bridge` (via [`callgrid_cli_utils::init_logger`])
//! so that log lines and progress bars never fight for the terminal.

mod download;
mod format;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "callgrid",
    about = "Bin police calls on a spatial grid per weather window"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the incident export and the station observations
    Download(download::DownloadArgs),
    /// Parse, filter, bin and write the summary table
    Format(format::FormatArgs),
    /// Write the filtered incident records as JSON or CSV
    Export(format::ExportArgs),
    /// List the built-in filter presets
    Presets,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = callgrid_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Download(args) => download::run(&multi, &args).await?,
        Commands::Format(args) => format::run_format(&multi, &args)?,
        Commands::Export(args) => format::run_export(&args)?,
        Commands::Presets => {
            println!("{:<16} NAME", "ID");
            println!("{}", "-".repeat(50));
            for preset in callgrid_incident::presets::all_presets() {
                println!("{:<16} {}", preset.id, preset.name);
                if let Some(description) = &preset.description {
                    println!("{:<16} {description}", "");
                }
            }
        }
    }

    Ok(())
}
