//! `overlay init [<dir>] [--force]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use overlay_core::{config, Config};

/// Write a default `overlay.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Working directory that will hold overlay.yaml.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing overlay.yaml.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let existing = config::config_path_at(&self.path);
        if existing.exists() && !self.force {
            bail!(
                "'{}' already exists (use --force to overwrite)",
                existing.display()
            );
        }

        let path = config::save_at(&self.path, &Config::default())
            .with_context(|| format!("failed to write config in '{}'", self.path.display()))?;

        println!("✓ Wrote {}", path.display());
        Ok(())
    }
}
