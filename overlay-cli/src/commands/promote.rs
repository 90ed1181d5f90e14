//! `overlay promote` — patch documents from edited corrections.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use overlay_sync::pipeline::{self, Stage};

use super::GlobalArgs;

/// Arguments for `overlay promote`.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Destination directory (defaults to `patch_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Show what would be written without touching any file.
    #[arg(long)]
    pub dry_run: bool,
}

impl PromoteArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let mut config = global.load()?;
        if let Some(out) = self.out {
            config.patch_dir = out;
        }
        let report =
            pipeline::run(&config, Stage::Promote, self.dry_run).context("promotion failed")?;
        if report.written() == 0 && !report.has_failures() {
            println!("No corrections differ from the baseline.");
        }
        super::finish(&report, self.dry_run)
    }
}
