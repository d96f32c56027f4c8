//! Capability traits and the values that cross them.

use crate::RemoteResult;
use mirror_types::RemoteId;
use std::fmt;
use std::sync::Arc;

/// Media type that marks a remote entry as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// An access credential accepted by the remote services.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token_type: String,
    access_token: String,
}

impl Credential {
    /// A bearer token credential.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            token_type: "Bearer".into(),
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for the HTTP `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Supplies a credential that is valid at the time of the call.
pub trait CredentialProvider: Send + Sync {
    fn valid_credential(&self) -> RemoteResult<Credential>;
}

/// Metadata attached to a folder when it is created remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMetadata {
    pub mime_type: String,
    pub description: Option<String>,
}

impl Default for FolderMetadata {
    fn default() -> Self {
        Self {
            mime_type: FOLDER_MIME_TYPE.into(),
            description: None,
        }
    }
}

/// A hierarchical remote object store.
pub trait RemoteContainerService {
    /// Creates a folder called `name` under `parent` and returns its id.
    fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
        metadata: &FolderMetadata,
    ) -> RemoteResult<RemoteId>;

    /// Uploads `bytes` as an object called `name` under `parent` and returns its id.
    fn create_object(
        &self,
        parent: &RemoteId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> RemoteResult<RemoteId>;
}

/// How the log service should interpret appended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Values are stored exactly as given, with no parsing or coercion.
    Raw,
    /// Values are parsed as if typed by a user (numbers, dates, formulas).
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

impl fmt::Display for ValueInputOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table-qualified range such as `'Sheet 1'!A1:C1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef(String);

impl RangeRef {
    /// Combines a table name and a range spec.
    ///
    /// The table name is always quoted so that names with spaces or punctuation
    /// address correctly; embedded single quotes are doubled.
    pub fn new(table: &str, range: &str) -> Self {
        Self(format!("'{}'!{}", table.replace('\'', "''"), range))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of caller-defined values, appended in order.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct AuditRow(Vec<serde_json::Value>);

impl AuditRow {
    pub fn values(&self) -> &[serde_json::Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<serde_json::Value>> FromIterator<V> for AuditRow {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Acknowledgement returned by the log service after an append.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppendAck {
    /// Range the row actually landed in, if reported
    pub updated_range: Option<String>,
    pub updated_rows: u32,
}

/// A remote tabular log.
pub trait RemoteLogService {
    /// Appends `row` as a single row at `range` of the log identified by `log_id`.
    fn append_row(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        row: &AuditRow,
        input: ValueInputOption,
    ) -> RemoteResult<AppendAck>;
}

impl<T: RemoteContainerService + ?Sized> RemoteContainerService for &T {
    fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
        metadata: &FolderMetadata,
    ) -> RemoteResult<RemoteId> {
        (**self).create_folder(parent, name, metadata)
    }

    fn create_object(
        &self,
        parent: &RemoteId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> RemoteResult<RemoteId> {
        (**self).create_object(parent, name, bytes, mime_type)
    }
}

impl<T: RemoteContainerService + ?Sized> RemoteContainerService for Arc<T> {
    fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
        metadata: &FolderMetadata,
    ) -> RemoteResult<RemoteId> {
        (**self).create_folder(parent, name, metadata)
    }

    fn create_object(
        &self,
        parent: &RemoteId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> RemoteResult<RemoteId> {
        (**self).create_object(parent, name, bytes, mime_type)
    }
}

impl<T: RemoteLogService + ?Sized> RemoteLogService for &T {
    fn append_row(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        row: &AuditRow,
        input: ValueInputOption,
    ) -> RemoteResult<AppendAck> {
        (**self).append_row(log_id, range, row, input)
    }
}

impl<T: RemoteLogService + ?Sized> RemoteLogService for Arc<T> {
    fn append_row(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        row: &AuditRow,
        input: ValueInputOption,
    ) -> RemoteResult<AppendAck> {
        (**self).append_row(log_id, range, row, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_ref_quotes_table() {
        assert_eq!(RangeRef::new("Sheet1", "A1").as_str(), "'Sheet1'!A1");
        assert_eq!(
            RangeRef::new("Q1 uploads", "A1:C1").as_str(),
            "'Q1 uploads'!A1:C1"
        );
    }

    #[test]
    fn range_ref_escapes_single_quotes() {
        assert_eq!(RangeRef::new("Bob's log", "A:C").as_str(), "'Bob''s log'!A:C");
    }

    #[test]
    fn audit_row_keeps_values_verbatim() {
        let row: AuditRow = ["2024-01-01", "report.csv", "007"].into_iter().collect();

        assert_eq!(row.len(), 3);
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!(["2024-01-01", "report.csv", "007"])
        );
    }

    #[test]
    fn audit_row_mixed_values() {
        let row: AuditRow = vec![json!("report.csv"), json!(3), json!(true)]
            .into_iter()
            .collect();

        assert_eq!(row.values()[1], json!(3));
    }

    #[test]
    fn value_input_option_wire_names() {
        assert_eq!(ValueInputOption::Raw.as_str(), "RAW");
        assert_eq!(ValueInputOption::UserEntered.to_string(), "USER_ENTERED");
    }

    #[test]
    fn credential_debug_redacts_token() {
        let credential = Credential::bearer("ya29.secret");

        assert_eq!(credential.authorization(), "Bearer ya29.secret");
        assert!(!format!("{credential:?}").contains("ya29"));
    }

    #[test]
    fn folder_metadata_defaults_to_folder_type() {
        assert_eq!(FolderMetadata::default().mime_type, FOLDER_MIME_TYPE);
    }
}
