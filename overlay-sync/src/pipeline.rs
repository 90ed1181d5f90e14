//! Batch pipeline: run one engine over every document in a directory.
//!
//! Every stage follows the same shape:
//!
//! 1. Verify the input directory exists (abort otherwise — nothing is
//!    processed).
//! 2. Create the destination directory if missing.
//! 3. Sync and projection only: enumerate the destination in full, then
//!    delete prefixed documents that have no same-named source.
//! 4. Process each input document independently. A failing file is
//!    recorded and logged; the remaining files still run.

use std::fmt;
use std::path::{Path, PathBuf};

use overlay_core::{merge, project, promote, seed, Change, Config};

use crate::error::{io_err, SyncError};
use crate::layout::{self, Document, OrphanSweep};
use crate::writer::{self, WriteResult};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Which engine a run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Source → overlay reconciliation.
    Sync,
    /// Source → correction-free projection.
    Project,
    /// Overlay → patch documents.
    Promote,
    /// Source → source documents with seeded corrections.
    Seed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Sync => write!(f, "sync"),
            Stage::Project => write!(f, "project"),
            Stage::Promote => write!(f, "promote"),
            Stage::Seed => write!(f, "seed"),
        }
    }
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Overlay did not exist and was generated.
    Created { entries: usize },
    /// Overlay was edited in place.
    Updated { added: usize, removed: usize },
    /// Input had no Entry blocks and was copied verbatim.
    Copied,
    /// Nothing to change.
    Unchanged,
    /// Projection written.
    Projected { entries: usize },
    /// Patch written.
    Promoted { entries: usize },
    /// No entry carries a differing correction; no patch produced.
    NoDifferences,
    /// Seeded copy written.
    Seeded { entries: usize },
    /// Read, parse or write failed; the file was skipped.
    Failed { error: String },
}

/// Per-document report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
    /// `None` when nothing needed writing.
    pub write: Option<WriteResult>,
    /// Keyless blocks skipped.
    pub malformed: usize,
    /// Repeated keys skipped.
    pub duplicates: usize,
}

impl FileReport {
    fn new(name: &str, outcome: FileOutcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            write: None,
            malformed: 0,
            duplicates: 0,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stage: Stage,
    pub dest_dir: PathBuf,
    /// The destination directory did not exist beforehand.
    pub created_dir: bool,
    pub orphans: OrphanSweep,
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Entries added across all files.
    pub fn added(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Updated { added, .. } => added,
                _ => 0,
            })
            .sum()
    }

    /// Entries removed across all files.
    pub fn removed(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Updated { removed, .. } => removed,
                _ => 0,
            })
            .sum()
    }

    /// Files generated from scratch.
    pub fn created(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Created { .. }))
            .count()
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    /// Files written (or that would be written in dry-run).
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.write.as_ref().is_some_and(WriteResult::is_change))
            .count()
    }

    /// Keyless blocks skipped across all files.
    pub fn malformed(&self) -> usize {
        self.files.iter().map(|f| f.malformed).sum()
    }

    /// `true` when any file or orphan deletion failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.orphans.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run `stage` over the configured directories.
///
/// This is the canonical entrypoint used by every CLI subcommand.
pub fn run(config: &Config, stage: Stage, dry_run: bool) -> Result<RunReport, SyncError> {
    match stage {
        Stage::Sync => sync_dir(config, dry_run),
        Stage::Project => project_dir(config, dry_run),
        Stage::Promote => promote_dir(config, dry_run),
        Stage::Seed => seed_dir(config, dry_run),
    }
}

/// Reconcile every source document into the overlay directory.
pub fn sync_dir(config: &Config, dry_run: bool) -> Result<RunReport, SyncError> {
    run_stage(
        Stage::Sync,
        &config.source_dir,
        &config.overlay_dir,
        true,
        config,
        dry_run,
        sync_file,
    )
}

/// Write the correction-free projection of every source document.
pub fn project_dir(config: &Config, dry_run: bool) -> Result<RunReport, SyncError> {
    run_stage(
        Stage::Project,
        &config.source_dir,
        &config.projection_dir,
        true,
        config,
        dry_run,
        project_file,
    )
}

/// Write a patch document for every overlay document with pending
/// corrections.
pub fn promote_dir(config: &Config, dry_run: bool) -> Result<RunReport, SyncError> {
    run_stage(
        Stage::Promote,
        &config.overlay_dir,
        &config.patch_dir,
        false,
        config,
        dry_run,
        promote_file,
    )
}

/// Write a seeded copy of every source document.
pub fn seed_dir(config: &Config, dry_run: bool) -> Result<RunReport, SyncError> {
    run_stage(
        Stage::Seed,
        &config.source_dir,
        &config.seed_dir,
        false,
        config,
        dry_run,
        seed_file,
    )
}

// ---------------------------------------------------------------------------
// Stage driver
// ---------------------------------------------------------------------------

type FileStep = fn(&Document, &Path, &Config, bool) -> Result<FileReport, SyncError>;

fn run_stage(
    stage: Stage,
    input_dir: &Path,
    dest_dir: &Path,
    sweep_orphans: bool,
    config: &Config,
    dry_run: bool,
    step: FileStep,
) -> Result<RunReport, SyncError> {
    if !input_dir.is_dir() {
        return Err(SyncError::SourceDirMissing {
            path: input_dir.to_path_buf(),
        });
    }
    let inputs = layout::list_documents(input_dir, config)?;

    let created_dir = !dest_dir.exists();
    if created_dir {
        if dry_run {
            tracing::info!("[dry-run] would create directory: {}", dest_dir.display());
        } else {
            std::fs::create_dir_all(dest_dir).map_err(|e| io_err(dest_dir, e))?;
            tracing::info!("created directory: {}", dest_dir.display());
        }
    }

    let orphans = if sweep_orphans {
        layout::remove_orphans(dest_dir, &inputs, config, dry_run)?
    } else {
        OrphanSweep::default()
    };

    tracing::info!("{stage}: processing {} file(s) from {}", inputs.len(), input_dir.display());
    let mut files = Vec::with_capacity(inputs.len());
    for doc in &inputs {
        let dest = dest_dir.join(&doc.name);
        let report = match step(doc, &dest, config, dry_run) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!("{stage} failed for {}: {err}", doc.name);
                FileReport::new(&doc.name, FileOutcome::Failed {
                    error: err.to_string(),
                })
            }
        };
        files.push(report);
    }

    let report = RunReport {
        stage,
        dest_dir: dest_dir.to_path_buf(),
        created_dir,
        orphans,
        files,
    };
    tracing::info!(
        "{stage}: {} file(s), {} written, {} new, +{} -{} entries, {} orphan(s) deleted, {} malformed, {} error(s)",
        report.files.len(),
        report.written(),
        report.created(),
        report.added(),
        report.removed(),
        report.orphans.removed.len(),
        report.malformed(),
        report.failed(),
    );
    Ok(report)
}

fn read_input(doc: &Document) -> Result<String, SyncError> {
    std::fs::read_to_string(&doc.path).map_err(|e| io_err(&doc.path, e))
}

// ---------------------------------------------------------------------------
// Per-file steps
// ---------------------------------------------------------------------------

fn sync_file(
    doc: &Document,
    dest: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<FileReport, SyncError> {
    let source = read_input(doc)?;
    let existing = writer::read_optional(dest)?;
    let merged = merge::reconcile(&source, existing.as_deref(), &config.tags);

    let outcome = match &merged.change {
        Change::Created(_) => FileOutcome::Created {
            entries: merged.added.len(),
        },
        Change::Updated(_) => FileOutcome::Updated {
            added: merged.added.len(),
            removed: merged.removed.len(),
        },
        Change::Copied(_) => FileOutcome::Copied,
        Change::Unchanged => FileOutcome::Unchanged,
    };
    match &outcome {
        FileOutcome::Updated { added, removed } => {
            tracing::info!("{}: +{added} -{removed}", doc.name)
        }
        FileOutcome::Created { entries } => {
            tracing::info!("{}: new overlay with {entries} entries", doc.name)
        }
        FileOutcome::Copied => tracing::info!("{}: no entries, copied verbatim", doc.name),
        _ => tracing::debug!("{}: in sync", doc.name),
    }
    if merged.malformed > 0 {
        tracing::debug!("{}: skipped {} keyless block(s)", doc.name, merged.malformed);
    }

    let write = match merged.text() {
        Some(text) => Some(writer::write_document(dest, text, dry_run)?),
        None => None,
    };
    Ok(FileReport {
        write,
        malformed: merged.malformed,
        duplicates: merged.duplicates,
        ..FileReport::new(&doc.name, outcome)
    })
}

fn project_file(
    doc: &Document,
    dest: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<FileReport, SyncError> {
    let source = read_input(doc)?;
    let projection = project::project(&source, &config.tags);
    let outcome = if projection.copied {
        FileOutcome::Copied
    } else {
        FileOutcome::Projected {
            entries: projection.entries,
        }
    };
    let write = writer::write_document(dest, &projection.text, dry_run)?;
    Ok(FileReport {
        write: Some(write),
        ..FileReport::new(&doc.name, outcome)
    })
}

fn promote_file(
    doc: &Document,
    dest: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<FileReport, SyncError> {
    let overlay = read_input(doc)?;
    let promotion = promote::promote(&overlay, &config.tags);
    let Some(text) = promotion.text else {
        tracing::debug!("{}: no differing corrections", doc.name);
        return Ok(FileReport::new(&doc.name, FileOutcome::NoDifferences));
    };
    tracing::info!("{}: {} correction(s) promoted", doc.name, promotion.promoted.len());
    let write = writer::write_document(dest, &text, dry_run)?;
    Ok(FileReport {
        write: Some(write),
        ..FileReport::new(
            &doc.name,
            FileOutcome::Promoted {
                entries: promotion.promoted.len(),
            },
        )
    })
}

fn seed_file(
    doc: &Document,
    dest: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<FileReport, SyncError> {
    let source = read_input(doc)?;
    let seeding = seed::seed(&source, &config.tags);
    let write = writer::write_document(dest, &seeding.text, dry_run)?;
    Ok(FileReport {
        write: Some(write),
        ..FileReport::new(
            &doc.name,
            FileOutcome::Seeded {
                entries: seeding.seeded,
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn config_in(root: &Path) -> Config {
        Config::default().rooted_at(root)
    }

    #[test]
    fn missing_source_dir_aborts() {
        let root = TempDir::new().expect("root");
        let config = config_in(root.path());
        let err = run(&config, Stage::Sync, false).expect_err("must abort");
        assert!(matches!(err, SyncError::SourceDirMissing { .. }));
        assert!(!config.overlay_dir.exists(), "nothing may be created");
    }

    #[test]
    fn empty_source_dir_reports_no_files() {
        let root = TempDir::new().expect("root");
        let config = config_in(root.path());
        fs::create_dir_all(&config.source_dir).expect("mkdir");

        let report = run(&config, Stage::Sync, false).expect("run");
        assert!(report.files.is_empty());
        assert!(report.created_dir);
        assert!(config.overlay_dir.is_dir());
    }

    #[test]
    fn dry_run_creates_nothing() {
        let root = TempDir::new().expect("root");
        let config = config_in(root.path());
        fs::create_dir_all(&config.source_dir).expect("mkdir");
        fs::write(
            config.source_dir.join("text-a.xml"),
            "<L>\n\t<Entry><zType>A</zType><ja>x</ja></Entry>\n</L>\n",
        )
        .expect("write");

        let report = run(&config, Stage::Sync, true).expect("run");
        assert_eq!(report.created(), 1);
        assert!(matches!(
            report.files[0].write,
            Some(WriteResult::WouldWrite { .. })
        ));
        assert!(!config.overlay_dir.exists());
    }

    #[test]
    fn summary_counts_add_up() {
        let report = RunReport {
            stage: Stage::Sync,
            dest_dir: PathBuf::from("out"),
            created_dir: false,
            orphans: OrphanSweep::default(),
            files: vec![
                FileReport::new("a", FileOutcome::Updated { added: 2, removed: 1 }),
                FileReport::new("b", FileOutcome::Updated { added: 1, removed: 0 }),
                FileReport::new("c", FileOutcome::Created { entries: 5 }),
                FileReport::new("d", FileOutcome::Failed { error: "boom".into() }),
            ],
        };
        assert_eq!(report.added(), 3);
        assert_eq!(report.removed(), 1);
        assert_eq!(report.created(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert_eq!(Stage::Promote.to_string(), "promote");
    }
}
