//! # overlay-sync
//!
//! Directory-level orchestration around the `overlay-core` engines:
//! change-gated atomic writes, orphan cleanup and batch runs.
//!
//! Call [`pipeline::run`] with a [`Stage`] (or one of [`sync_dir`],
//! [`project_dir`], [`promote_dir`], [`seed_dir`]) to process a whole
//! directory. [`status::check_dir`] and [`diff::diff_dir`] are read-only.

pub mod diff;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod status;
pub mod writer;

pub use error::SyncError;
pub use pipeline::{
    project_dir, promote_dir, seed_dir, sync_dir, FileOutcome, FileReport, RunReport, Stage,
};
pub use status::{FileStatus, StatusReport};
pub use writer::WriteResult;
