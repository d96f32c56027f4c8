//! Local directory operations for the offsite mirror
//!
//! This module provides the [`LocalDirectory`] handle that the mirrored store keeps as
//! its local write target, plus the [`SourceFile`] snapshot that feeds both the remote
//! upload and the local copy.
//!
//! # Subfolders
//!
//! Creating a subfolder is idempotent while the folder is empty. A folder that already
//! holds entries is never reused, because that would silently merge two mirror runs:
//!
//! ```text
//! <target>/projA          absent           -> created
//! <target>/projA          present, empty   -> reused
//! <target>/projA          present, entries -> FolderConflict
//! ```
//!
//! # Verified copies
//!
//! A replica is written with a plain copy and then read back and compared with the
//! source bytes. On mismatch the copy is repeated immediately, up to
//! [`MAX_COPY_ATTEMPTS`] total attempts. There is no delay between attempts; the loop
//! absorbs transient write races on the local disk only.
//!
//! A source that already is the destination file is verified without copying.

use crate::constants::{MAX_COPY_ATTEMPTS, MIME_EMPTY, MIME_OCTET_STREAM, MIME_TEXT_PLAIN};
use crate::FilesError;
use mirror_types::FolderName;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// In-memory snapshot of a file that is about to be mirrored.
///
/// The content is read once so that the remote upload and the local verification
/// compare against the same bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    file_name: OsString,
    bytes: Vec<u8>,
    media_type: &'static str,
    sha256: String,
}

impl SourceFile {
    /// Reads a regular file into memory and detects its media type.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::SourceNotFound` if the path does not exist or is not a
    /// regular file, and `FilesError::Io` if it cannot be read.
    pub fn read(path: &Path) -> Result<Self, FilesError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FilesError::SourceNotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(with_context(
                    e,
                    format!("Failed to inspect source file {}", path.display()),
                ))
            }
        };

        if !metadata.is_file() {
            return Err(FilesError::SourceNotFound(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| FilesError::SourceNotFound(path.to_path_buf()))?;

        let bytes = fs::read(path).map_err(|e| {
            with_context(e, format!("Failed to read source file {}", path.display()))
        })?;

        let sha256 = hex::encode(Sha256::digest(&bytes));
        let media_type = detect_media_type(&bytes);

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            bytes,
            media_type,
            sha256,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the source, used as the name of both the remote object and the replica.
    pub fn name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Hex SHA-256 digest of the content.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A verified copy of a [`SourceFile`] inside a [`LocalDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Replica {
    /// Absolute path of the written copy
    pub path: PathBuf,

    /// Size of the verified content in bytes
    pub size_bytes: u64,

    /// Hex SHA-256 digest of the verified content
    pub sha256: String,

    /// Copy attempts used, between 1 and [`MAX_COPY_ATTEMPTS`]
    pub attempts: u32,
}

/// A local directory that was validated as an existing, writable write target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectory {
    path: PathBuf,
}

impl LocalDirectory {
    /// Validates `path` and opens it as a write target.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if:
    /// - The path does not exist or is not a directory
    /// - Path canonicalisation fails
    /// - A probe file cannot be created inside it (not writable by this process)
    pub fn open(path: &Path) -> Result<Self, FilesError> {
        if !path.exists() {
            return Err(invalid_path(path, "directory does not exist"));
        }

        if !path.is_dir() {
            return Err(invalid_path(path, "path is not a directory"));
        }

        let path = path
            .canonicalize()
            .map_err(|e| invalid_path(path, format!("cannot canonicalize: {e}")))?;

        // The probe is anonymous and removed on drop.
        tempfile::tempfile_in(&path)
            .map_err(|e| invalid_path(&path, format!("directory is not writable: {e}")))?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates `name` inside this directory, or reuses it if it exists and is empty.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::FolderConflict` if the folder exists and has entries, and
    /// `FilesError::Io` if it cannot be created or inspected (including when `name`
    /// exists as a regular file).
    pub fn create_subfolder(&self, name: &FolderName) -> Result<LocalDirectory, FilesError> {
        let target = self.path.join(name.as_str());

        match fs::create_dir(&target) {
            Ok(()) => {
                tracing::debug!("created local subfolder {}", target.display());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && target.is_dir() => {
                if !is_dir_empty(&target)? {
                    return Err(FilesError::FolderConflict(target));
                }
                tracing::debug!("reusing empty local subfolder {}", target.display());
            }
            Err(e) => {
                return Err(with_context(
                    e,
                    format!("Failed to create subfolder {}", target.display()),
                ))
            }
        }

        Ok(Self { path: target })
    }

    /// Copies `source` into this directory under its base name and verifies the result.
    ///
    /// An existing file with the same name is overwritten, unless it is the source
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::IntegrityCheckFailed` when every attempt produced content
    /// different from the source, and `FilesError::Io` if a copy or read-back fails.
    pub fn replicate(&self, source: &SourceFile) -> Result<Replica, FilesError> {
        self.replicate_with(source, |from, to| fs::copy(from, to).map(|_| ()))
    }

    pub(crate) fn replicate_with<F>(
        &self,
        source: &SourceFile,
        mut copy: F,
    ) -> Result<Replica, FilesError>
    where
        F: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let destination = self.path.join(&source.file_name);

        // Copying a file onto itself truncates it before reading.
        let in_place = is_same_file(&source.path, &destination);
        if in_place {
            tracing::debug!(
                "{} is already in place, verifying without copying",
                destination.display()
            );
        }

        for attempt in 1..=MAX_COPY_ATTEMPTS {
            if !in_place {
                copy(&source.path, &destination).map_err(|e| {
                    with_context(
                        e,
                        format!(
                            "Failed to copy {} to {}",
                            source.path.display(),
                            destination.display()
                        ),
                    )
                })?;
            }

            let written = fs::read(&destination).map_err(|e| {
                with_context(e, format!("Failed to read back {}", destination.display()))
            })?;

            if written == source.bytes {
                if attempt > 1 {
                    tracing::info!(
                        "copy to {} verified after {} attempts",
                        destination.display(),
                        attempt
                    );
                }
                return Ok(Replica {
                    path: destination,
                    size_bytes: source.len(),
                    sha256: source.sha256.clone(),
                    attempts: attempt,
                });
            }

            tracing::warn!(
                "copy to {} does not match source (attempt {} of {})",
                destination.display(),
                attempt,
                MAX_COPY_ATTEMPTS
            );
        }

        Err(FilesError::IntegrityCheckFailed {
            path: destination,
            attempts: MAX_COPY_ATTEMPTS,
        })
    }
}

/// Best-effort media type for `bytes`.
///
/// Signature detection comes first; content without a known signature is reported as
/// empty, plain text (valid UTF-8) or an opaque octet stream.
pub fn detect_media_type(bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type();
    }

    if bytes.is_empty() {
        MIME_EMPTY
    } else if std::str::from_utf8(bytes).is_ok() {
        MIME_TEXT_PLAIN
    } else {
        MIME_OCTET_STREAM
    }
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn is_dir_empty(path: &Path) -> Result<bool, FilesError> {
    let mut entries = fs::read_dir(path)
        .map_err(|e| with_context(e, format!("Failed to list {}", path.display())))?;
    Ok(entries.next().is_none())
}

fn invalid_path(path: &Path, reason: impl Into<String>) -> FilesError {
    FilesError::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn with_context(e: io::Error, message: String) -> FilesError {
    FilesError::Io(io::Error::new(e.kind(), format!("{message}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn folder(name: &str) -> FolderName {
        FolderName::new(name).unwrap()
    }

    fn write_source(temp: &TempDir, name: &str, content: &[u8]) -> SourceFile {
        let inbox = temp.path().join("in");
        fs::create_dir_all(&inbox).unwrap();
        let path = inbox.join(name);
        fs::write(&path, content).unwrap();
        SourceFile::read(&path).unwrap()
    }

    fn store_dir(temp: &TempDir) -> LocalDirectory {
        let store = temp.path().join("store");
        fs::create_dir_all(&store).unwrap();
        LocalDirectory::open(&store).unwrap()
    }

    #[test]
    fn open_existing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = LocalDirectory::open(temp.path()).unwrap();

        assert_eq!(dir.path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn open_missing_directory_is_invalid() {
        let temp = TempDir::new().unwrap();
        let result = LocalDirectory::open(&temp.path().join("missing"));

        assert!(matches!(result, Err(FilesError::InvalidPath { .. })));
    }

    #[test]
    fn open_regular_file_is_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "not a directory").unwrap();

        let result = LocalDirectory::open(&file);

        assert!(matches!(result, Err(FilesError::InvalidPath { .. })));
    }

    #[test]
    fn create_subfolder_creates_missing_folder() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);

        let sub = store.create_subfolder(&folder("projA")).unwrap();

        assert!(sub.path().is_dir());
        assert_eq!(sub.path(), store.path().join("projA"));
    }

    #[test]
    fn create_subfolder_reuses_empty_folder() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);

        let first = store.create_subfolder(&folder("projA")).unwrap();
        let second = store.create_subfolder(&folder("projA")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn create_subfolder_rejects_non_empty_folder() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let sub = store.create_subfolder(&folder("projA")).unwrap();
        fs::write(sub.path().join("report.csv"), "abc").unwrap();

        let result = store.create_subfolder(&folder("projA"));

        assert!(matches!(result, Err(FilesError::FolderConflict(p)) if p.ends_with("projA")));
        assert_eq!(fs::read(sub.path().join("report.csv")).unwrap(), b"abc");
    }

    #[test]
    fn create_subfolder_over_regular_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        fs::write(store.path().join("projA"), "file in the way").unwrap();

        let result = store.create_subfolder(&folder("projA"));

        assert!(matches!(result, Err(FilesError::Io(_))));
    }

    #[test]
    fn source_file_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = SourceFile::read(&temp.path().join("nope.csv"));

        assert!(matches!(result, Err(FilesError::SourceNotFound(_))));
    }

    #[test]
    fn source_file_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = SourceFile::read(temp.path());

        assert!(matches!(result, Err(FilesError::SourceNotFound(_))));
    }

    #[test]
    fn source_file_snapshot() {
        let temp = TempDir::new().unwrap();
        let source = write_source(&temp, "report.csv", b"abc");

        assert_eq!(source.name(), "report.csv");
        assert_eq!(source.bytes(), b"abc");
        assert_eq!(source.len(), 3);
        assert_eq!(source.media_type(), MIME_TEXT_PLAIN);
        assert_eq!(
            source.sha256(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn detect_media_type_variants() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_media_type(&png_header), "image/png");
        assert_eq!(detect_media_type(b""), MIME_EMPTY);
        assert_eq!(detect_media_type(b"date,file\n"), MIME_TEXT_PLAIN);
        assert_eq!(detect_media_type(&[0x80, 0x81, 0x82, 0x00]), MIME_OCTET_STREAM);
    }

    #[test]
    fn replicate_copies_and_verifies() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let source = write_source(&temp, "report.csv", b"abc");

        let replica = store.replicate(&source).unwrap();

        assert_eq!(replica.path, store.path().join("report.csv"));
        assert_eq!(replica.attempts, 1);
        assert_eq!(replica.size_bytes, 3);
        assert_eq!(replica.sha256, source.sha256());
        assert_eq!(fs::read(&replica.path).unwrap(), b"abc");
    }

    #[test]
    fn replicate_empty_file() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let source = write_source(&temp, "empty.dat", b"");

        let replica = store.replicate(&source).unwrap();

        assert_eq!(replica.size_bytes, 0);
        assert!(fs::read(&replica.path).unwrap().is_empty());
    }

    #[test]
    fn replicate_overwrites_existing_destination() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        fs::write(store.path().join("report.csv"), "stale content").unwrap();
        let source = write_source(&temp, "report.csv", b"fresh");

        let replica = store.replicate(&source).unwrap();

        assert_eq!(fs::read(&replica.path).unwrap(), b"fresh");
    }

    #[test]
    fn replicate_binary_content() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let binary_data: Vec<u8> = (0..=255).collect();
        let source = write_source(&temp, "binary.dat", &binary_data);

        let replica = store.replicate(&source).unwrap();

        assert_eq!(fs::read(&replica.path).unwrap(), binary_data);
    }

    #[test]
    fn replicate_in_place_keeps_source() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let path = store.path().join("report.csv");
        fs::write(&path, b"abc").unwrap();
        let source = SourceFile::read(&path).unwrap();
        let calls = Cell::new(0u32);

        let replica = store
            .replicate_with(&source, |from, to| {
                calls.set(calls.get() + 1);
                fs::copy(from, to).map(|_| ())
            })
            .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(replica.path, path);
        assert_eq!(replica.attempts, 1);
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn replicate_in_place_through_other_path() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        fs::write(store.path().join("report.csv"), b"abc").unwrap();
        let indirect = temp.path().join("store").join(".").join("report.csv");
        let source = SourceFile::read(&indirect).unwrap();

        let replica = store.replicate(&source).unwrap();

        assert_eq!(replica.size_bytes, 3);
        assert_eq!(fs::read(store.path().join("report.csv")).unwrap(), b"abc");
    }

    #[test]
    fn replicate_retries_until_content_matches() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let source = write_source(&temp, "report.csv", b"abc");
        let calls = Cell::new(0u32);

        let replica = store
            .replicate_with(&source, |from, to| {
                calls.set(calls.get() + 1);
                if calls.get() < MAX_COPY_ATTEMPTS {
                    fs::write(to, b"abd")
                } else {
                    fs::copy(from, to).map(|_| ())
                }
            })
            .unwrap();

        assert_eq!(calls.get(), MAX_COPY_ATTEMPTS);
        assert_eq!(replica.attempts, MAX_COPY_ATTEMPTS);
        assert_eq!(fs::read(&replica.path).unwrap(), b"abc");
    }

    #[test]
    fn replicate_fails_after_bounded_attempts() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let source = write_source(&temp, "report.csv", b"abc");
        let calls = Cell::new(0u32);

        let result = store.replicate_with(&source, |_, to| {
            calls.set(calls.get() + 1);
            fs::write(to, b"corrupt")
        });

        assert_eq!(calls.get(), 15);
        assert!(matches!(
            result,
            Err(FilesError::IntegrityCheckFailed { attempts: 15, .. })
        ));
    }

    #[test]
    fn replicate_copy_error_is_not_retried() {
        let temp = TempDir::new().unwrap();
        let store = store_dir(&temp);
        let source = write_source(&temp, "report.csv", b"abc");
        let calls = Cell::new(0u32);

        let result = store.replicate_with(&source, |_, _| {
            calls.set(calls.get() + 1);
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        });

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(FilesError::Io(_))));
    }

    #[test]
    fn replica_serialises_for_audit() {
        let replica = Replica {
            path: PathBuf::from("/srv/offsite/projA/report.csv"),
            size_bytes: 3,
            sha256: "ba7816bf".into(),
            attempts: 1,
        };

        let json = serde_json::to_value(&replica).unwrap();
        assert_eq!(json["size_bytes"], 3);
        assert_eq!(json["path"], "/srv/offsite/projA/report.csv");
    }
}
