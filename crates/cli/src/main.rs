//! Contest Hub CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the documents table
//! ch-cli migrate
//!
//! # Load contests from a JSON file (an array of objects, or one object)
//! ch-cli seed contests fixtures/contests.json
//! ```
//!
//! Connection settings come from the same `DB_*` / `DATABASE_URL`
//! variables the server reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contest_hub_core::Collection;

mod commands;

#[derive(Parser)]
#[command(name = "ch-cli")]
#[command(author, version, about = "Contest Hub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert documents from a JSON file
    Seed {
        /// Target collection (`users`, `contests`, `carts`)
        collection: Collection,

        /// JSON file holding one object or an array of objects
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { collection, file } => {
            let inserted = commands::seed::from_file(collection, &file).await?;
            tracing::info!(%collection, inserted, "Seeding complete");
        }
    }
    Ok(())
}
