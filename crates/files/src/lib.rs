//! Offsite Mirror Local Storage
//!
//! This crate provides the local half of the offsite mirror: the directory tree that is
//! kept structurally aligned with the remote folder tree.
//!
//! ## Guarantees
//!
//! - A [`LocalDirectory`] only exists for a directory that existed and was writable when
//!   it was opened
//! - Subfolder creation is idempotent while the subfolder is empty and refuses to reuse
//!   a folder that already holds content
//! - Replicated files are compared byte-for-byte with the source before a copy is
//!   reported as successful; mismatches are retried a bounded number of times
//!
//! ## Example Usage
//!
//! ```no_run
//! use mirror_files::{LocalDirectory, SourceFile};
//! use mirror_types::FolderName;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalDirectory::open(Path::new("/srv/offsite"))?;
//! let project = store.create_subfolder(&FolderName::new("projA")?)?;
//!
//! let source = SourceFile::read(Path::new("/tmp/in/report.csv"))?;
//! let replica = project.replicate(&source)?;
//! println!("stored {} after {} attempt(s)", replica.path.display(), replica.attempts);
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{MAX_COPY_ATTEMPTS, MIME_EMPTY, MIME_OCTET_STREAM, MIME_TEXT_PLAIN};
pub use files::{detect_media_type, LocalDirectory, Replica, SourceFile};

use std::path::PathBuf;

/// Errors that can occur during local file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Path does not exist, is not a directory, or is not writable
    #[error("Invalid path {path}: {reason}", path = path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Source file for a copy does not exist or is not a regular file
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Subfolder already exists and holds content
    #[error("Subfolder already exists and is not empty: {}", .0.display())]
    FolderConflict(PathBuf),

    /// Destination content never matched the source within the attempt bound
    #[error("Copy to {path} failed verification after {attempts} attempts", path = path.display())]
    IntegrityCheckFailed { path: PathBuf, attempts: u32 },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
