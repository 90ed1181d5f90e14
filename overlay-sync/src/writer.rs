//! Atomic, change-gated document writer.
//!
//! ## `write_document` protocol
//!
//! 1. Build content (already done by caller).
//! 2. Read the current file, if any.
//! 3. Compare → skip if identical (no write, mtime untouched).
//! 4. Write to `<path>.overlay.tmp`.
//! 5. Rename to final path (atomic on POSIX). On failure the temp file is
//!    removed and the original is left intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — content matches what is on disk.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// `true` for `Written` and `WouldWrite`.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

/// Temp sibling used while writing `path`.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.overlay.tmp", path.display()))
}

/// Atomically write `content` to `path` unless the file already holds it.
pub fn write_document(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, SyncError> {
    write_with_tmp(path, content, dry_run, &tmp_path(path))
}

fn write_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if read_optional(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Read `path` as UTF-8, or `None` when it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("text-a.xml");
        let result = write_document(&path, "hello", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn same_content_returns_unchanged_and_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.xml");
        write_document(&path, "same content", false).unwrap();
        let mtime_1 = fs::metadata(&path).unwrap().modified().unwrap();

        sleep(Duration::from_millis(1100));
        let result = write_document(&path, "same content", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        let mtime_2 = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(mtime_1, mtime_2, "unchanged content must not be rewritten");
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.xml");
        write_document(&path, "v1", false).unwrap();
        let result = write_document(&path, "v2", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(result.is_change());
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.xml");
        let result = write_document(&path, "content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.xml");
        write_document(&path, "data", false).unwrap();
        assert!(!tmp_path(&path).exists(), ".overlay.tmp must be cleaned up");
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("original-fixja").join("text-a.xml");
        write_document(&path, "content", false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_optional(&tmp.path().join("absent.xml")).unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.xml");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_file = tmp_dir.path().join("file.xml.overlay.tmp");

        let result = write_with_tmp(&path, "new content", false, &tmp_file);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses directory permissions; only check when
        // the rename was actually refused.
        if result.is_err() {
            let current = fs::read_to_string(&path).unwrap();
            assert_eq!(current, "original", "original file should be intact");
            assert!(!tmp_file.exists(), ".overlay.tmp should be cleaned up");
        }
    }
}
