//! `overlay diff` — show unified diffs for what sync would write.

use anyhow::{bail, Context, Result};
use clap::Args;

use overlay_sync::diff::diff_dir;

use super::GlobalArgs;

/// Arguments for `overlay diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load()?;
        let report = diff_dir(&config).context("diff failed")?;

        if report.diffs.is_empty() && report.failed.is_empty() {
            println!("No differences in '{}'.", config.overlay_dir.display());
            return Ok(());
        }

        for diff in &report.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        if !report.failed.is_empty() {
            for (name, error) in &report.failed {
                eprintln!("error: {name}: {error}");
            }
            bail!("diff failed for {} file(s)", report.failed.len());
        }

        Ok(())
    }
}
