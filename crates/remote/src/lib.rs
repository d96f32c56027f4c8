//! Remote collaborators of the offsite mirror.
//!
//! The mirrored store never talks to a cloud API directly. It is handed two capability
//! objects instead:
//!
//! - a [`RemoteContainerService`] that creates folders and uploads objects into a
//!   hierarchical object store, and
//! - a [`RemoteLogService`] that appends rows to a tabular log.
//!
//! Both are plain synchronous traits so that the store can be driven by the Google
//! adapters in production and by the recording implementations in [`memory`] in tests.
//! Access credentials are supplied to adapters through a [`CredentialProvider`];
//! acquiring and refreshing them is the provider's job.

pub mod memory;
mod service;

pub use mirror_types::RemoteId;
pub use service::{
    AppendAck, AuditRow, Credential, CredentialProvider, FolderMetadata, RangeRef,
    RemoteContainerService, RemoteLogService, ValueInputOption, FOLDER_MIME_TYPE,
};

/// Errors reported by remote collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No usable access credential is available
    #[error("credential unavailable: {0}")]
    Credential(String),

    /// The request never produced a response (connection, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("remote service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The service answered but the body could not be understood
    #[error("invalid response from remote service: {0}")]
    InvalidResponse(String),

    /// The service refused the operation
    #[error("remote service rejected the request: {0}")]
    Rejected(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
