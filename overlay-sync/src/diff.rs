//! Unified diff of what `sync` would write, for `overlay diff`.

use std::path::PathBuf;

use similar::TextDiff;

use overlay_core::{merge, Config};

use crate::{
    error::io_err,
    layout::{self, Document},
    writer, SyncError,
};

/// A single overlay file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diffs for a whole overlay directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub diffs: Vec<FileDiff>,
    /// Documents that could not be read, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Reconcile every source document in memory and compare the result to the
/// overlay on disk. Orphans show up as whole-file deletions. A document that
/// cannot be read is logged and recorded in [`DiffReport::failed`].
///
/// No files are written.
pub fn diff_dir(config: &Config) -> Result<DiffReport, SyncError> {
    if !config.source_dir.is_dir() {
        return Err(SyncError::SourceDirMissing {
            path: config.source_dir.clone(),
        });
    }
    let sources = layout::list_documents(&config.source_dir, config)?;
    let orphans: Vec<Document> = layout::list_documents(&config.overlay_dir, config)?
        .into_iter()
        .filter(|d| {
            config.is_orphan_candidate(&d.name) && !sources.iter().any(|s| s.name == d.name)
        })
        .collect();

    let mut report = DiffReport::default();
    let results = orphans
        .iter()
        .map(|orphan| (orphan, diff_orphan(orphan)))
        .chain(sources.iter().map(|doc| (doc, diff_source(doc, config))));
    for (doc, result) in results {
        match result {
            Ok(Some(diff)) => report.diffs.push(diff),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("diff failed for {}: {err}", doc.name);
                report.failed.push((doc.name.clone(), err.to_string()));
            }
        }
    }
    report.diffs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(report)
}

fn diff_orphan(orphan: &Document) -> Result<Option<FileDiff>, SyncError> {
    let existing = writer::read_optional(&orphan.path)?.unwrap_or_default();
    Ok(Some(render(&orphan.name, orphan.path.clone(), &existing, "")))
}

fn diff_source(doc: &Document, config: &Config) -> Result<Option<FileDiff>, SyncError> {
    let source = std::fs::read_to_string(&doc.path).map_err(|e| io_err(&doc.path, e))?;
    let path = config.overlay_dir.join(&doc.name);
    let existing = writer::read_optional(&path)?.unwrap_or_default();
    let overlay = (!existing.is_empty()).then_some(existing.as_str());

    let merged = merge::reconcile(&source, overlay, &config.tags);
    Ok(merged
        .text()
        .filter(|proposed| *proposed != existing)
        .map(|proposed| render(&doc.name, path.clone(), &existing, proposed)))
}

fn render(name: &str, path: PathBuf, existing: &str, proposed: &str) -> FileDiff {
    let old_header = format!("a/{name}");
    let new_header = format!("b/{name}");
    let unified = TextDiff::from_lines(existing, proposed)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    FileDiff {
        path,
        unified_diff: unified,
    }
}
