//! Cinedeck: keep an Anki deck of movie cloze notes in sync with a catalog.
//!
//! # Usage
//!
//! ```text
//! cinedeck init
//! cinedeck sync [--catalog <path>] [--deck <name>] [--model <name>] [--anki-url <url>]
//!               [--concurrency <n>] [--dry-run]
//! cinedeck diff [--catalog <path>] [--deck <name>] [--model <name>] [--anki-url <url>]
//! cinedeck status [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{diff::DiffArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cinedeck",
    version,
    about = "Sync a movie catalog into Anki cloze notes",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default ~/.cinedeck/config.yaml.
    Init(InitArgs),

    /// Create, update and garbage-collect notes to match the catalog.
    Sync(SyncArgs),

    /// Show unified diffs of the notes sync would change.
    Diff(DiffArgs),

    /// Compare the notes in the deck against the catalog.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Log to stderr so `status --json` output stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run().await,
        Commands::Diff(args) => args.run().await,
        Commands::Status(args) => args.run().await,
    }
}
