//! `overlay sync` — reconcile overlay documents with their sources.

use anyhow::{Context, Result};
use clap::Args;
use overlay_sync::pipeline::{self, Stage};

use super::GlobalArgs;

/// Arguments for `overlay sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be written or deleted without touching any file.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load()?;
        let report = pipeline::run(&config, Stage::Sync, self.dry_run).context("sync failed")?;
        if report.files.is_empty() {
            println!(
                "No documents found in '{}'.",
                config.source_dir.display()
            );
        }
        super::finish(&report, self.dry_run)
    }
}
