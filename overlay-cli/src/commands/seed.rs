//! `overlay seed` — copy source documents with a correction in every entry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use overlay_sync::pipeline::{self, Stage};

use super::GlobalArgs;

/// Arguments for `overlay seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Destination directory (defaults to `seed_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Show what would be written without touching any file.
    #[arg(long)]
    pub dry_run: bool,
}

impl SeedArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let mut config = global.load()?;
        if let Some(out) = self.out {
            config.seed_dir = out;
        }
        let report = pipeline::run(&config, Stage::Seed, self.dry_run).context("seeding failed")?;
        super::finish(&report, self.dry_run)
    }
}
