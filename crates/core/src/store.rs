//! The mirrored store.
//!
//! [`MirroredStore`] keeps a local folder tree and a remote folder tree aligned. Every
//! dual operation runs the remote side first and the local side second:
//!
//! | Operation | Remote | Local | On local failure |
//! |---|---|---|---|
//! | [`MirroredStore::create_subfolder`] | create folder | create or reuse empty folder | remote folder stays |
//! | [`MirroredStore::store_file`] | upload object | copy + byte-for-byte verify | remote object stays |
//!
//! There is no transaction spanning both backends, so nothing is rolled back. A caller
//! that receives a local-side error knows the remote side already succeeded and can
//! reconcile from the ids it logged. Session pointers are only moved after both sides
//! succeeded.
//!
//! Precondition checks on session fields always run before any backend call, with one
//! documented exception: `create_subfolder` checks the local directory only after the
//! remote folder was created.

use crate::config::MirrorConfig;
use crate::session::{LogTarget, Session};
use crate::{MirrorError, MirrorResult};
use mirror_files::{LocalDirectory, Replica, SourceFile};
use mirror_remote::{
    AppendAck, AuditRow, FolderMetadata, RemoteContainerService, RemoteLogService,
    ValueInputOption,
};
use mirror_types::{FolderName, NonEmptyText, RemoteId};
use std::path::{Path, PathBuf};

/// Outcome of a subfolder creation on both backends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FolderCreationResult {
    pub remote_folder_id: RemoteId,
    pub local_folder_path: PathBuf,
}

/// Outcome of storing one file on both backends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReplicationResult {
    pub remote_object_id: RemoteId,
    pub local_file_path: PathBuf,
    pub size_bytes: u64,
    pub media_type: String,
    /// Hex SHA-256 digest of the stored content
    pub sha256: String,
    /// Local copy attempts used before the replica verified
    pub attempts: u32,
}

/// Mirrors folders and files into a remote container service and a local directory,
/// and appends audit rows to a remote log.
///
/// The store is meant for sequential use: operations that move session pointers take
/// `&mut self`.
pub struct MirroredStore<C, L> {
    containers: C,
    log: L,
    session: Session,
}

impl<C, L> MirroredStore<C, L>
where
    C: RemoteContainerService,
    L: RemoteLogService,
{
    /// Creates a store with an empty session.
    pub fn new(containers: C, log: L) -> Self {
        Self {
            containers,
            log,
            session: Session::default(),
        }
    }

    /// Creates a store and applies `config` to its session.
    pub fn from_config(containers: C, log: L, config: &MirrorConfig) -> MirrorResult<Self> {
        let mut store = Self::new(containers, log);
        store.configure(config)?;
        Ok(store)
    }

    /// Applies the pointers present in `config` through the validating setters.
    ///
    /// Pointers absent from `config` are left as they are.
    pub fn configure(&mut self, config: &MirrorConfig) -> MirrorResult<()> {
        if let Some(root) = config.remote_root() {
            self.set_remote_container(root.as_str())?;
        }
        if let Some(path) = config.local_root() {
            self.set_local_directory(path)?;
        }
        if let Some(target) = config.log_target() {
            self.session.log_id = Some(target.log_id.clone());
            self.session.log_table = Some(target.table.clone());
            self.session.log_range = Some(target.range.clone());
        }
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn containers(&self) -> &C {
        &self.containers
    }

    pub fn log_service(&self) -> &L {
        &self.log
    }

    pub fn remote_container(&self) -> Option<&RemoteId> {
        self.session.remote_container()
    }

    pub fn local_directory(&self) -> Option<&Path> {
        self.session.local_directory()
    }

    pub fn log_target(&self) -> Option<LogTarget> {
        self.session.log_target()
    }

    /// Sets the remote write target. The id is not checked remotely.
    pub fn set_remote_container(&mut self, id: impl AsRef<str>) -> MirrorResult<()> {
        let id = RemoteId::new(id)?;
        tracing::info!("remote container set to {}", id);
        self.session.remote_container = Some(id);
        Ok(())
    }

    /// Sets the local write target.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::InvalidPath` if the path does not exist, is not a directory
    /// or is not writable.
    pub fn set_local_directory(&mut self, path: impl AsRef<Path>) -> MirrorResult<()> {
        let directory = LocalDirectory::open(path.as_ref())?;
        tracing::info!("local directory set to {}", directory.path().display());
        self.session.local_directory = Some(directory);
        Ok(())
    }

    pub fn set_log_id(&mut self, log_id: impl AsRef<str>) -> MirrorResult<()> {
        self.session.log_id = Some(RemoteId::new(log_id)?);
        Ok(())
    }

    pub fn set_log_table(&mut self, table: impl AsRef<str>) -> MirrorResult<()> {
        self.session.log_table = Some(NonEmptyText::new(table)?);
        Ok(())
    }

    pub fn set_log_range(&mut self, range: impl AsRef<str>) -> MirrorResult<()> {
        self.session.log_range = Some(NonEmptyText::new(range)?);
        Ok(())
    }

    /// Sets all three log-target fields. Nothing is changed unless all three are valid.
    pub fn set_log_target(
        &mut self,
        log_id: impl AsRef<str>,
        table: impl AsRef<str>,
        range: impl AsRef<str>,
    ) -> MirrorResult<()> {
        let target = LogTarget::new(log_id, table, range)?;
        tracing::info!("log target set to {} in {}", target.range_ref(), target.log_id);
        self.session.log_id = Some(target.log_id);
        self.session.log_table = Some(target.table);
        self.session.log_range = Some(target.range);
        Ok(())
    }

    /// Creates `name` under the current remote container and the current local
    /// directory, optionally switching both pointers into the new folder.
    ///
    /// The local folder is reused if it already exists and is empty, so repeating the
    /// call is harmless until something is written into it.
    ///
    /// # Errors
    ///
    /// - `PreconditionNotSet(remoteContainer)` before any backend call
    /// - `InvalidInput` if `name` is not a single path component
    /// - `RemoteOperationFailed` with no local change
    /// - `PreconditionNotSet(localDirectory)`, `FolderConflict` or
    ///   `LocalOperationFailed` after the remote folder was created
    pub fn create_subfolder(
        &mut self,
        name: &str,
        switch_into: bool,
    ) -> MirrorResult<FolderCreationResult> {
        let parent = self.session.require_remote_container()?.clone();
        let name = FolderName::new(name)?;

        let remote_folder_id = self.create_remote_folder(&parent, &name)?;

        let local = self
            .session
            .require_local_directory()
            .and_then(|directory| directory.create_subfolder(&name).map_err(MirrorError::from))
            .map_err(|e| {
                tracing::warn!(
                    "remote folder {} ({}) was created but the local side failed: {}",
                    remote_folder_id,
                    name,
                    e
                );
                e
            })?;

        let result = FolderCreationResult {
            remote_folder_id: remote_folder_id.clone(),
            local_folder_path: local.path().to_path_buf(),
        };

        if switch_into {
            self.session.remote_container = Some(remote_folder_id);
            self.session.local_directory = Some(local);
            tracing::info!(
                "switched into {} ({})",
                result.local_folder_path.display(),
                result.remote_folder_id
            );
        }

        Ok(result)
    }

    /// Creates `name` under the current remote container only.
    ///
    /// With `switch_into`, only the remote pointer moves.
    pub fn create_remote_subfolder(
        &mut self,
        name: &str,
        switch_into: bool,
    ) -> MirrorResult<RemoteId> {
        let parent = self.session.require_remote_container()?.clone();
        let name = FolderName::new(name)?;

        let id = self.create_remote_folder(&parent, &name)?;
        if switch_into {
            tracing::info!("remote container switched to {}", id);
            self.session.remote_container = Some(id.clone());
        }
        Ok(id)
    }

    /// Creates (or reuses, if empty) `name` under the current local directory only.
    pub fn create_local_subfolder(&self, name: &str) -> MirrorResult<PathBuf> {
        let directory = self.session.require_local_directory()?;
        let name = FolderName::new(name)?;

        let created = directory.create_subfolder(&name)?;
        Ok(created.path().to_path_buf())
    }

    /// Uploads `source` to the current remote container and copies it, verified, into
    /// the current local directory under its base name.
    ///
    /// An existing local file with the same name is overwritten.
    ///
    /// # Errors
    ///
    /// - `PreconditionNotSet` if either pointer is unset, before any backend call
    /// - `SourceNotFound` if `source` is missing or not a regular file
    /// - `RemoteOperationFailed` if the upload fails (no local copy is made)
    /// - `ReplicationIntegrityFailed` or `LocalOperationFailed` after the upload
    ///   succeeded
    pub fn store_file(&self, source: impl AsRef<Path>) -> MirrorResult<ReplicationResult> {
        let parent = self.session.require_remote_container()?;
        let local = self.session.require_local_directory()?;
        let source = SourceFile::read(source.as_ref())?;

        let remote_object_id = self.upload(parent, &source)?;

        let replica = local.replicate(&source).map_err(|e| {
            tracing::warn!(
                "remote object {} ({}) was uploaded but the local copy failed: {}",
                remote_object_id,
                source.name(),
                e
            );
            MirrorError::from(e)
        })?;

        tracing::info!(
            "stored {} as {} and {}",
            source.path().display(),
            remote_object_id,
            replica.path.display()
        );

        Ok(ReplicationResult {
            remote_object_id,
            local_file_path: replica.path,
            size_bytes: replica.size_bytes,
            media_type: source.media_type().to_string(),
            sha256: replica.sha256,
            attempts: replica.attempts,
        })
    }

    /// Uploads `source` to the current remote container only.
    pub fn upload_remote_file(&self, source: impl AsRef<Path>) -> MirrorResult<RemoteId> {
        let parent = self.session.require_remote_container()?;
        let source = SourceFile::read(source.as_ref())?;
        self.upload(parent, &source)
    }

    /// Copies `source` into the current local directory only, with verification.
    pub fn replicate_local_file(&self, source: impl AsRef<Path>) -> MirrorResult<Replica> {
        let local = self.session.require_local_directory()?;
        let source = SourceFile::read(source.as_ref())?;
        Ok(local.replicate(&source)?)
    }

    /// Appends one row to the log target, values written as given.
    ///
    /// # Errors
    ///
    /// - `PreconditionNotSet` for `logId`, `table`, `range`, checked in that order
    ///   before any backend call
    /// - `RemoteOperationFailed` if the append fails; it is not retried
    pub fn append_row<I, V>(&self, values: I) -> MirrorResult<AppendAck>
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        let (log_id, range) = self.session.require_log_target()?;
        let row: AuditRow = values.into_iter().collect();

        tracing::debug!("appending {} value(s) to {}", row.len(), range);
        let ack = self
            .log
            .append_row(log_id, &range, &row, ValueInputOption::Raw)?;
        Ok(ack)
    }

    fn create_remote_folder(&self, parent: &RemoteId, name: &FolderName) -> MirrorResult<RemoteId> {
        tracing::debug!("creating remote folder {} under {}", name, parent);
        let id = self
            .containers
            .create_folder(parent, name.as_str(), &FolderMetadata::default())?;
        tracing::info!("created remote folder {} ({}) under {}", id, name, parent);
        Ok(id)
    }

    fn upload(&self, parent: &RemoteId, source: &SourceFile) -> MirrorResult<RemoteId> {
        tracing::debug!(
            "uploading {} ({} bytes) to {}",
            source.path().display(),
            source.len(),
            parent
        );
        let id = self.containers.create_object(
            parent,
            &source.name(),
            source.bytes(),
            source.media_type(),
        )?;
        Ok(id)
    }
}
