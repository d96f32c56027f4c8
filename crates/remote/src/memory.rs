//! In-memory remote services.
//!
//! These record every call they receive, including calls that were told to fail, so
//! callers can assert exactly which backend operations were attempted and in which
//! order. Ids are deterministic (`folder-1`, `object-2`, ...). Creating a folder whose
//! `(parent, name)` already exists returns the existing id.

use crate::{
    AppendAck, AuditRow, FolderMetadata, RangeRef, RemoteContainerService, RemoteError,
    RemoteLogService, RemoteResult, ValueInputOption,
};
use mirror_types::RemoteId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by [`MemoryContainerService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerCall {
    CreateFolder {
        parent: RemoteId,
        name: String,
        metadata: FolderMetadata,
    },
    CreateObject {
        parent: RemoteId,
        name: String,
        bytes: Vec<u8>,
        mime_type: String,
    },
}

/// An object held by [`MemoryContainerService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: RemoteId,
    pub parent: RemoteId,
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Default)]
struct ContainerState {
    calls: Vec<ContainerCall>,
    folders: HashMap<(RemoteId, String), RemoteId>,
    objects: Vec<StoredObject>,
    next_id: u64,
    failures_pending: u32,
}

impl ContainerState {
    fn allocate(&mut self, prefix: &str) -> RemoteResult<RemoteId> {
        self.next_id += 1;
        RemoteId::new(format!("{prefix}-{}", self.next_id))
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    fn take_failure(&mut self) -> RemoteResult<()> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(RemoteError::Rejected("injected failure".into()));
        }
        Ok(())
    }
}

/// Recording in-memory [`RemoteContainerService`].
#[derive(Debug, Default)]
pub struct MemoryContainerService {
    state: Mutex<ContainerState>,
}

impl MemoryContainerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail with [`RemoteError::Rejected`].
    pub fn fail_next(&self, count: u32) {
        self.lock().failures_pending = count;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ContainerCall> {
        self.lock().calls.clone()
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.lock().objects.clone()
    }

    /// Id of the folder called `name` under `parent`, if one was created.
    pub fn folder_id(&self, parent: &RemoteId, name: &str) -> Option<RemoteId> {
        self.lock()
            .folders
            .get(&(parent.clone(), name.to_owned()))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, ContainerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteContainerService for MemoryContainerService {
    fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
        metadata: &FolderMetadata,
    ) -> RemoteResult<RemoteId> {
        let mut state = self.lock();
        state.calls.push(ContainerCall::CreateFolder {
            parent: parent.clone(),
            name: name.to_owned(),
            metadata: metadata.clone(),
        });
        state.take_failure()?;

        let key = (parent.clone(), name.to_owned());
        if let Some(existing) = state.folders.get(&key) {
            return Ok(existing.clone());
        }

        let id = state.allocate("folder")?;
        state.folders.insert(key, id.clone());
        Ok(id)
    }

    fn create_object(
        &self,
        parent: &RemoteId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> RemoteResult<RemoteId> {
        let mut state = self.lock();
        state.calls.push(ContainerCall::CreateObject {
            parent: parent.clone(),
            name: name.to_owned(),
            bytes: bytes.to_vec(),
            mime_type: mime_type.to_owned(),
        });
        state.take_failure()?;

        let id = state.allocate("object")?;
        state.objects.push(StoredObject {
            id: id.clone(),
            parent: parent.clone(),
            name: name.to_owned(),
            bytes: bytes.to_vec(),
            mime_type: mime_type.to_owned(),
        });
        Ok(id)
    }
}

/// A call received by [`MemoryLogService`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogCall {
    pub log_id: RemoteId,
    pub range: RangeRef,
    pub row: AuditRow,
    pub input: ValueInputOption,
}

#[derive(Debug, Default)]
struct LogState {
    calls: Vec<LogCall>,
    failures_pending: u32,
}

/// Recording in-memory [`RemoteLogService`].
#[derive(Debug, Default)]
pub struct MemoryLogService {
    state: Mutex<LogState>,
}

impl MemoryLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` appends fail with [`RemoteError::Rejected`].
    pub fn fail_next(&self, count: u32) {
        self.lock().failures_pending = count;
    }

    pub fn calls(&self) -> Vec<LogCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteLogService for MemoryLogService {
    fn append_row(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        row: &AuditRow,
        input: ValueInputOption,
    ) -> RemoteResult<AppendAck> {
        let mut state = self.lock();
        state.calls.push(LogCall {
            log_id: log_id.clone(),
            range: range.clone(),
            row: row.clone(),
            input,
        });

        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(RemoteError::Rejected("injected failure".into()));
        }

        Ok(AppendAck {
            updated_range: Some(range.to_string()),
            updated_rows: 1,
        })
    }
}
