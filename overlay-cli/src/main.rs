//! Overlay — keep translation overlays in step with their upstream documents.
//!
//! # Usage
//!
//! ```text
//! overlay init [<dir>] [--force]
//! overlay sync [--dry-run]
//! overlay promote [--out <dir>] [--dry-run]
//! overlay project [--out <dir>] [--dry-run]
//! overlay seed [--out <dir>] [--dry-run]
//! overlay status [--json]
//! overlay diff
//! ```
//!
//! Global flags: `--config <file>`, `--source <dir>`, `--overlay <dir>`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, init::InitArgs, project::ProjectArgs, promote::PromoteArgs, seed::SeedArgs,
    status::StatusArgs, sync::SyncArgs, GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "overlay",
    version,
    about = "Synchronize translation overlays with their source documents",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default overlay.yaml.
    Init(InitArgs),

    /// Reconcile overlay documents with the source documents.
    Sync(SyncArgs),

    /// Write patch documents from corrections that differ from the baseline.
    Promote(PromoteArgs),

    /// Write correction-free copies of the source documents.
    Project(ProjectArgs),

    /// Write source documents with a correction seeded into every entry.
    Seed(SeedArgs),

    /// Show which overlays need syncing or carry corrections.
    Status(StatusArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Promote(args) => args.run(&cli.global),
        Commands::Project(args) => args.run(&cli.global),
        Commands::Seed(args) => args.run(&cli.global),
        Commands::Status(args) => args.run(&cli.global),
        Commands::Diff(args) => args.run(&cli.global),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
