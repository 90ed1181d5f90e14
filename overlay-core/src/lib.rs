//! Overlay core library — document scanning and the pure text engines.
//!
//! - [`codec`] — tag-span scanner and block serializer
//! - [`dataset`] — header / entries / footer loader
//! - [`merge`] — source → overlay synchronization
//! - [`promote`] — correction → patch documents
//! - [`project`] — correction-free projection
//! - [`seed`] — in-place correction seeding
//! - [`config`] — directory layout and tag names
//!
//! Nothing in this crate touches the filesystem except [`config`].

pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod merge;
pub mod project;
pub mod promote;
pub mod seed;
pub mod types;

pub use config::Config;
pub use dataset::{Dataset, Entry};
pub use error::ConfigError;
pub use merge::{reconcile, Change, MergeResult};
pub use project::{project, Projection};
pub use promote::{promote, Promotion};
pub use seed::{seed, Seeding};
pub use types::{EntryFields, EntryKey, Field, TagSchema};
