//! Underfoot CLI - manage offline geologic map packs from the terminal.
//!
//! This binary provides a command-line interface to the underfoot library:
//! listing the catalog, downloading packs with progress and Ctrl-C
//! cancellation, managing the current pack selection, and inspecting a
//! downloaded pack's datasets.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use underfoot::store::DEFAULT_BASE_URL;

use error::CliError;

#[derive(Parser)]
#[command(
    name = "underfoot",
    version = underfoot::VERSION,
    about = "Offline geologic map packs"
)]
struct Cli {
    /// Catalog base URL.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory for downloaded packs and preferences.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List packs available in the catalog and on this device.
    List,
    /// Download a pack's archive.
    Download {
        /// Id of the pack to download.
        pack_id: String,
    },
    /// Delete a downloaded pack.
    Remove {
        /// Id of the pack to delete.
        pack_id: String,
    },
    /// Show or change the current pack.
    Current {
        /// Id of the downloaded pack to make current.
        pack_id: Option<String>,
        /// Clear the selection instead.
        #[arg(long, conflicts_with = "pack_id")]
        clear: bool,
    },
    /// Show which datasets a downloaded pack contains.
    Inspect {
        /// Id of the pack to inspect.
        pack_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    underfoot::telemetry::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::store_config(&cli.base_url, cli.data_dir)?;

    match cli.command {
        Commands::List => commands::list::run(config).await,
        Commands::Download { pack_id } => commands::download::run(config, &pack_id).await,
        Commands::Remove { pack_id } => commands::remove::run(config, &pack_id).await,
        Commands::Current { pack_id, clear } => {
            commands::current::run(config, pack_id, clear).await
        }
        Commands::Inspect { pack_id } => commands::inspect::run(config, &pack_id).await,
    }
}
