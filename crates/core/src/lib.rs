//! # Mirror Core
//!
//! Consistency layer for the offsite mirror.
//!
//! This crate keeps a local directory tree and a remote object store aligned, and appends
//! audit rows to a remote tabular log:
//! - Session pointers for the current remote container, local directory and log target
//! - Dual folder creation and dual file storage, remote first, with verified local copies
//! - Startup configuration resolved from environment-style lookups
//!
//! **No transport concerns**: HTTP clients and credentials belong in `mirror-gsuite`; the
//! service traits and in-memory doubles live in `mirror-remote`.

pub mod config;
pub mod constants;
mod error;
pub mod session;
mod store;

pub use config::{EndpointOverrides, MirrorConfig};
pub use error::{MirrorError, MirrorResult, SessionField};
pub use mirror_files::Replica;
pub use session::{LogTarget, Session};
pub use store::{FolderCreationResult, MirroredStore, ReplicationResult};
