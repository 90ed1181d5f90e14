//! Subcommands and the configuration flags they share.

pub mod diff;
pub mod init;
pub mod project;
pub mod promote;
pub mod seed;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use overlay_core::{config, Config};
use overlay_sync::{FileOutcome, RunReport, WriteResult};

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file to load instead of ./overlay.yaml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the source directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Override the overlay directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub overlay: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the config (explicit file, or `./overlay.yaml`, or defaults) and
    /// apply directory overrides relative to the current directory.
    pub fn load(&self) -> Result<Config> {
        let cwd = std::env::current_dir().context("could not determine current directory")?;
        let mut config = match &self.config {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => config::load_at(&cwd).context("failed to load ./overlay.yaml")?,
        };
        if let Some(dir) = &self.source {
            config.source_dir = absolutize(&cwd, dir);
        }
        if let Some(dir) = &self.overlay {
            config.overlay_dir = absolutize(&cwd, dir);
        }
        Ok(config)
    }
}

fn absolutize(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

/// Print a run summary and per-file lines; fail when any file failed.
pub fn finish(report: &RunReport, dry_run: bool) -> Result<()> {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    for orphan in &report.orphans.removed {
        println!("  ✗  {}", orphan.display());
    }
    for file in &report.files {
        let marker = match &file.write {
            Some(WriteResult::Written { .. }) => "✎",
            Some(WriteResult::WouldWrite { .. }) => "~",
            Some(WriteResult::Unchanged { .. }) | None => "·",
        };
        println!("  {marker}  {} — {}", file.name, describe(&file.outcome));
    }

    println!(
        "{prefix}✓ {}: {} file(s), {} written, {} new, +{} -{}, {} orphan(s) deleted",
        report.stage,
        report.files.len(),
        report.written(),
        report.created(),
        report.added(),
        report.removed(),
        report.orphans.removed.len(),
    );
    if report.malformed() > 0 {
        println!("  {} keyless block(s) skipped", report.malformed());
    }

    if report.has_failures() {
        for file in &report.files {
            if let FileOutcome::Failed { error } = &file.outcome {
                eprintln!("error: {}: {error}", file.name);
            }
        }
        for (path, error) in &report.orphans.failed {
            eprintln!("error: could not delete {}: {error}", path.display());
        }
        bail!(
            "{} failed for {} file(s)",
            report.stage,
            report.failed() + report.orphans.failed.len()
        );
    }
    Ok(())
}

fn describe(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Created { entries } => format!("created ({entries} entries)"),
        FileOutcome::Updated { added, removed } => format!("+{added} -{removed}"),
        FileOutcome::Copied => "copied".to_string(),
        FileOutcome::Unchanged => "unchanged".to_string(),
        FileOutcome::Projected { entries } => format!("{entries} entries"),
        FileOutcome::Promoted { entries } => format!("{entries} correction(s)"),
        FileOutcome::NoDifferences => "no differences".to_string(),
        FileOutcome::Seeded { entries } => format!("{entries} seeded"),
        FileOutcome::Failed { error } => format!("failed: {error}"),
    }
}
