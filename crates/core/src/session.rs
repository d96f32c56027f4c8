//! Pointer state of one mirrored store.
//!
//! The session holds the current remote container, the current local directory and
//! the log target. Fields are only written by [`crate::MirroredStore`], after their
//! values were validated, so a populated field always refers to something that existed
//! when it was set.

use crate::{MirrorResult, SessionField};
use mirror_files::LocalDirectory;
use mirror_remote::RangeRef;
use mirror_types::{NonEmptyText, RemoteId};
use std::path::Path;

/// Where audit rows are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub log_id: RemoteId,
    pub table: NonEmptyText,
    pub range: NonEmptyText,
}

impl LogTarget {
    /// Validates all three parts.
    pub fn new(
        log_id: impl AsRef<str>,
        table: impl AsRef<str>,
        range: impl AsRef<str>,
    ) -> MirrorResult<Self> {
        Ok(Self {
            log_id: RemoteId::new(log_id)?,
            table: NonEmptyText::new(table)?,
            range: NonEmptyText::new(range)?,
        })
    }

    pub fn range_ref(&self) -> RangeRef {
        RangeRef::new(self.table.as_str(), self.range.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub(crate) remote_container: Option<RemoteId>,
    pub(crate) local_directory: Option<LocalDirectory>,
    pub(crate) log_id: Option<RemoteId>,
    pub(crate) log_table: Option<NonEmptyText>,
    pub(crate) log_range: Option<NonEmptyText>,
}

impl Session {
    pub fn remote_container(&self) -> Option<&RemoteId> {
        self.remote_container.as_ref()
    }

    pub fn local_directory(&self) -> Option<&Path> {
        self.local_directory.as_ref().map(LocalDirectory::path)
    }

    /// The log target, if all three parts are set.
    pub fn log_target(&self) -> Option<LogTarget> {
        Some(LogTarget {
            log_id: self.log_id.clone()?,
            table: self.log_table.clone()?,
            range: self.log_range.clone()?,
        })
    }

    pub(crate) fn require_remote_container(&self) -> MirrorResult<&RemoteId> {
        self.remote_container
            .as_ref()
            .ok_or(crate::MirrorError::PreconditionNotSet(
                SessionField::RemoteContainer,
            ))
    }

    pub(crate) fn require_local_directory(&self) -> MirrorResult<&LocalDirectory> {
        self.local_directory
            .as_ref()
            .ok_or(crate::MirrorError::PreconditionNotSet(
                SessionField::LocalDirectory,
            ))
    }

    /// Checks log id, table and range in that order.
    pub(crate) fn require_log_target(&self) -> MirrorResult<(&RemoteId, RangeRef)> {
        let log_id = self
            .log_id
            .as_ref()
            .ok_or(crate::MirrorError::PreconditionNotSet(SessionField::LogId))?;
        let table = self
            .log_table
            .as_ref()
            .ok_or(crate::MirrorError::PreconditionNotSet(SessionField::Table))?;
        let range = self
            .log_range
            .as_ref()
            .ok_or(crate::MirrorError::PreconditionNotSet(SessionField::Range))?;

        Ok((log_id, RangeRef::new(table.as_str(), range.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MirrorError;

    #[test]
    fn empty_session_reports_missing_fields() {
        let session = Session::default();

        assert!(matches!(
            session.require_remote_container(),
            Err(MirrorError::PreconditionNotSet(SessionField::RemoteContainer))
        ));
        assert!(matches!(
            session.require_local_directory(),
            Err(MirrorError::PreconditionNotSet(SessionField::LocalDirectory))
        ));
        assert!(session.log_target().is_none());
    }

    #[test]
    fn log_target_requires_all_parts_in_order() {
        let mut session = Session::default();
        assert!(matches!(
            session.require_log_target(),
            Err(MirrorError::PreconditionNotSet(SessionField::LogId))
        ));

        session.log_id = Some(RemoteId::new("L1").unwrap());
        assert!(matches!(
            session.require_log_target(),
            Err(MirrorError::PreconditionNotSet(SessionField::Table))
        ));

        session.log_table = Some(NonEmptyText::new("Sheet1").unwrap());
        assert!(matches!(
            session.require_log_target(),
            Err(MirrorError::PreconditionNotSet(SessionField::Range))
        ));

        session.log_range = Some(NonEmptyText::new("A1").unwrap());
        let (log_id, range) = session.require_log_target().unwrap();
        assert_eq!(log_id.as_str(), "L1");
        assert_eq!(range.as_str(), "'Sheet1'!A1");
        assert_eq!(
            session.log_target(),
            Some(LogTarget::new("L1", "Sheet1", "A1").unwrap())
        );
    }

    #[test]
    fn log_target_rejects_blank_parts() {
        assert!(matches!(
            LogTarget::new("L1", " ", "A1"),
            Err(MirrorError::InvalidInput(_))
        ));
        assert!(matches!(
            LogTarget::new("", "Sheet1", "A1"),
            Err(MirrorError::InvalidInput(_))
        ));
    }
}
