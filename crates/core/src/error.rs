use mirror_files::FilesError;
use mirror_remote::RemoteError;
use mirror_types::TextError;
use std::fmt;
use std::path::PathBuf;

/// Session fields that operations depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    RemoteContainer,
    LocalDirectory,
    LogId,
    Table,
    Range,
}

impl SessionField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoteContainer => "remoteContainer",
            Self::LocalDirectory => "localDirectory",
            Self::LogId => "logId",
            Self::Table => "table",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("session field {0} is not set")]
    PreconditionNotSet(SessionField),
    #[error("invalid path {path}: {reason}", path = path.display())]
    InvalidPath { path: PathBuf, reason: String },
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("local subfolder {0:?} already exists and is not empty")]
    FolderConflict(String),
    #[error("remote operation failed: {0}")]
    RemoteOperationFailed(#[from] RemoteError),
    #[error("local operation failed: {0}")]
    LocalOperationFailed(#[source] std::io::Error),
    #[error(
        "replica {path} failed verification after {attempts} attempts",
        path = path.display()
    )]
    ReplicationIntegrityFailed { path: PathBuf, attempts: u32 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<TextError> for MirrorError {
    fn from(e: TextError) -> Self {
        MirrorError::InvalidInput(e.to_string())
    }
}

impl From<FilesError> for MirrorError {
    fn from(e: FilesError) -> Self {
        match e {
            FilesError::InvalidPath { path, reason } => MirrorError::InvalidPath { path, reason },
            FilesError::SourceNotFound(path) => MirrorError::SourceNotFound(path),
            FilesError::FolderConflict(path) => MirrorError::FolderConflict(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            FilesError::IntegrityCheckFailed { path, attempts } => {
                MirrorError::ReplicationIntegrityFailed { path, attempts }
            }
            FilesError::Io(e) => MirrorError::LocalOperationFailed(e),
        }
    }
}

pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_field_names() {
        assert_eq!(SessionField::RemoteContainer.to_string(), "remoteContainer");
        assert_eq!(SessionField::LocalDirectory.to_string(), "localDirectory");
        assert_eq!(SessionField::LogId.to_string(), "logId");
        assert_eq!(SessionField::Table.to_string(), "table");
        assert_eq!(SessionField::Range.to_string(), "range");
    }

    #[test]
    fn files_errors_map_to_mirror_errors() {
        let conflict = MirrorError::from(FilesError::FolderConflict(PathBuf::from(
            "/srv/offsite/projA",
        )));
        assert!(matches!(conflict, MirrorError::FolderConflict(name) if name == "projA"));

        let integrity = MirrorError::from(FilesError::IntegrityCheckFailed {
            path: PathBuf::from("/srv/offsite/report.csv"),
            attempts: 15,
        });
        assert!(matches!(
            integrity,
            MirrorError::ReplicationIntegrityFailed { attempts: 15, .. }
        ));

        let io = MirrorError::from(FilesError::Io(std::io::Error::other("disk full")));
        assert!(matches!(io, MirrorError::LocalOperationFailed(_)));
    }

    #[test]
    fn text_errors_are_invalid_input() {
        assert!(matches!(
            MirrorError::from(TextError::Empty),
            MirrorError::InvalidInput(_)
        ));
    }

    #[test]
    fn precondition_message_names_field() {
        let err = MirrorError::PreconditionNotSet(SessionField::LogId);
        assert_eq!(err.to_string(), "session field logId is not set");
    }
}
