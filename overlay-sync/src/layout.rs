//! Directory enumeration and orphan cleanup.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use overlay_core::Config;

use crate::error::{io_err, SyncError};

/// A document file found in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
}

/// All document files directly under `dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn list_documents(dir: &Path, config: &Config) -> Result<Vec<Document>, SyncError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut docs: Vec<Document> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            config.is_document(&name).then(|| Document {
                name,
                path: e.path(),
            })
        })
        .collect();
    docs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(docs)
}

/// Outcome of the orphan phase for one destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanSweep {
    /// Deleted (or, in dry-run, deletable) files.
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Delete prefixed documents in `dest` that have no same-named source file.
///
/// The destination listing is taken in full before anything is deleted.
/// Files without the orphan prefix are never touched.
pub fn remove_orphans(
    dest: &Path,
    sources: &[Document],
    config: &Config,
    dry_run: bool,
) -> Result<OrphanSweep, SyncError> {
    let source_names: BTreeSet<&str> = sources.iter().map(|d| d.name.as_str()).collect();
    let orphans: Vec<Document> = list_documents(dest, config)?
        .into_iter()
        .filter(|d| config.is_orphan_candidate(&d.name) && !source_names.contains(d.name.as_str()))
        .collect();

    let mut sweep = OrphanSweep::default();
    for orphan in orphans {
        if dry_run {
            tracing::info!("[dry-run] would delete: {}", orphan.path.display());
            sweep.removed.push(orphan.path);
            continue;
        }
        match std::fs::remove_file(&orphan.path) {
            Ok(()) => {
                tracing::info!("deleted: {}", orphan.path.display());
                sweep.removed.push(orphan.path);
            }
            Err(err) => {
                tracing::warn!("delete failed {}: {err}", orphan.path.display());
                sweep.failed.push((orphan.path, err.to_string()));
            }
        }
    }
    if sweep.removed.is_empty() && sweep.failed.is_empty() {
        tracing::debug!("no orphans in {}", dest.display());
    }
    Ok(sweep)
}
