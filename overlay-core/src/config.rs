//! Directory layout and tag configuration.
//!
//! # Storage layout
//!
//! ```text
//! <workdir>/
//!   overlay.yaml        (optional — every field has a default)
//!   original/           source documents
//!   original-fixja/     overlay documents with corrections
//!   original-for-AI/    correction-free projection
//! ```
//!
//! # API pattern
//!
//! - `load_at(dir)` — reads `<dir>/overlay.yaml`, defaults when absent
//! - `load_file(path)` — reads an explicit file, errors when absent
//!
//! Relative directories are resolved against the directory holding the
//! config file, so a loaded [`Config`] never depends on the process cwd.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::TagSchema;

/// File name looked up by [`load_at`].
pub const CONFIG_FILE_NAME: &str = "overlay.yaml";

/// Explicit configuration passed into every pipeline call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream documents; never written.
    pub source_dir: PathBuf,
    /// Overlay documents carrying corrections.
    pub overlay_dir: PathBuf,
    /// Correction-free view for external consumers.
    pub projection_dir: PathBuf,
    /// Destination of promoted patch documents.
    pub patch_dir: PathBuf,
    /// Destination of seeded source documents.
    pub seed_dir: PathBuf,
    /// Destination files starting with this prefix are deleted when the
    /// source has no file of the same name.
    pub orphan_prefix: String,
    /// Document extension, without the dot.
    pub extension: String,
    pub tags: TagSchema,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("original"),
            overlay_dir: PathBuf::from("original-fixja"),
            projection_dir: PathBuf::from("original-for-AI"),
            patch_dir: PathBuf::from("."),
            seed_dir: PathBuf::from("."),
            orphan_prefix: "text-".to_string(),
            extension: "xml".to_string(),
            tags: TagSchema::default(),
        }
    }
}

impl Config {
    /// Resolve every relative directory against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.source_dir,
            &mut self.overlay_dir,
            &mut self.projection_dir,
            &mut self.patch_dir,
            &mut self.seed_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// `true` when `file_name` carries the document extension (case-sensitive).
    pub fn is_document(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }

    /// `true` when `file_name` may be deleted as an orphan.
    pub fn is_orphan_candidate(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.orphan_prefix) && self.is_document(file_name)
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// `<dir>/overlay.yaml` — pure, no I/O.
pub fn config_path_at(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load `<dir>/overlay.yaml`, or the defaults rooted at `dir` when the file
/// does not exist.
pub fn load_at(dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(dir);
    if !path.exists() {
        return Ok(Config::default().rooted_at(dir));
    }
    load_file(&path)
}

/// Load an explicit config file.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
    };
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.rooted_at(base))
}

/// Atomically write `config` to `<dir>/overlay.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
pub fn save_at(dir: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let path = config_path_at(dir);
    let tmp = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
