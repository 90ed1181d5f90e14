//! Read-only overlay status.
//!
//! Every source document is classified against its overlay without writing
//! anything. Overlay documents that sync would delete are listed as orphans.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use overlay_core::{merge, Change, Config, Dataset, TagSchema};

use crate::error::{io_err, SyncError};
use crate::layout::{self, Document};
use crate::writer;

/// Sync state of one overlay document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// No overlay exists; sync would create it.
    Missing,
    /// Sync would add and/or remove entries.
    Pending { additions: usize, removals: usize },
    /// In sync, with `count` corrections that differ from the baseline.
    Corrections { count: usize },
    /// In sync and nothing to promote.
    Current,
    /// The source or overlay could not be read.
    Failed { error: String },
}

impl FileStatus {
    /// `true` when running sync would change the overlay.
    pub fn needs_sync(&self) -> bool {
        matches!(self, FileStatus::Missing | FileStatus::Pending { .. })
    }
}

/// Status row for one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStatus {
    pub name: String,
    pub status: FileStatus,
    /// Last modification of the overlay file, when it exists.
    pub overlay_modified: Option<DateTime<Utc>>,
}

/// Status of a whole overlay directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub documents: Vec<DocumentStatus>,
    /// Overlay documents with no source counterpart.
    pub orphans: Vec<String>,
}

impl StatusReport {
    pub fn needs_sync(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.status.needs_sync())
            .count()
    }

    pub fn corrections(&self) -> usize {
        self.documents
            .iter()
            .map(|d| match d.status {
                FileStatus::Corrections { count } => count,
                _ => 0,
            })
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, FileStatus::Failed { .. }))
            .count()
    }
}

/// Classify every source document under `config.source_dir`.
pub fn check_dir(config: &Config) -> Result<StatusReport, SyncError> {
    if !config.source_dir.is_dir() {
        return Err(SyncError::SourceDirMissing {
            path: config.source_dir.clone(),
        });
    }
    let sources = layout::list_documents(&config.source_dir, config)?;

    let documents = sources
        .iter()
        .map(|doc| {
            let overlay_path = config.overlay_dir.join(&doc.name);
            let status = check_file(&doc.path, &overlay_path, &config.tags).unwrap_or_else(|err| {
                tracing::warn!("status check failed for {}: {err}", doc.name);
                FileStatus::Failed {
                    error: err.to_string(),
                }
            });
            DocumentStatus {
                name: doc.name.clone(),
                status,
                overlay_modified: modified_at(&overlay_path),
            }
        })
        .collect();

    let orphans = layout::list_documents(&config.overlay_dir, config)?
        .into_iter()
        .filter(|d| config.is_orphan_candidate(&d.name) && !has_source(&sources, &d.name))
        .map(|d| d.name)
        .collect();

    Ok(StatusReport { documents, orphans })
}

/// Classify one source/overlay pair.
pub fn check_file(source: &Path, overlay: &Path, tags: &TagSchema) -> Result<FileStatus, SyncError> {
    let source_text = std::fs::read_to_string(source).map_err(|e| io_err(source, e))?;
    let Some(overlay_text) = writer::read_optional(overlay)? else {
        return Ok(FileStatus::Missing);
    };

    let merged = merge::reconcile(&source_text, Some(&overlay_text), tags);
    match merged.change {
        Change::Created(_) => return Ok(FileStatus::Missing),
        Change::Updated(_) => {
            return Ok(FileStatus::Pending {
                additions: merged.added.len(),
                removals: merged.removed.len(),
            })
        }
        Change::Copied(ref text) if *text != overlay_text => {
            return Ok(FileStatus::Pending {
                additions: 0,
                removals: 0,
            })
        }
        Change::Copied(_) | Change::Unchanged => {}
    }

    let count = Dataset::parse(&overlay_text, tags)
        .entries
        .iter()
        .filter(|entry| entry.fields.has_pending_correction())
        .count();
    Ok(if count == 0 {
        FileStatus::Current
    } else {
        FileStatus::Corrections { count }
    })
}

/// Human-readable age such as `42s`, `5m`, `3h` or `2d`.
pub fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

fn has_source(sources: &[Document], name: &str) -> bool {
    sources.iter().any(|s| s.name == name)
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified: SystemTime = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}
