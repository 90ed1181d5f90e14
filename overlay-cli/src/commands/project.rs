//! `overlay project` — correction-free copies for external consumers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use overlay_sync::pipeline::{self, Stage};

use super::GlobalArgs;

/// Arguments for `overlay project`.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Destination directory (defaults to `projection_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Show what would be written or deleted without touching any file.
    #[arg(long)]
    pub dry_run: bool,
}

impl ProjectArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let mut config = global.load()?;
        if let Some(out) = self.out {
            config.projection_dir = out;
        }
        let report =
            pipeline::run(&config, Stage::Project, self.dry_run).context("projection failed")?;
        super::finish(&report, self.dry_run)
    }
}
