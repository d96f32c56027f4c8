//! Google Workspace adapters for the offsite mirror.
//!
//! - [`DriveClient`] implements [`mirror_remote::RemoteContainerService`] on the Drive v3
//!   REST API (folders and multipart uploads).
//! - [`SheetsClient`] implements [`mirror_remote::RemoteLogService`] on the Sheets v4
//!   `values:append` endpoint.
//! - [`TokenFileCredential`] and [`StaticCredential`] provide access tokens. Obtaining
//!   and refreshing the stored token is left to the external credential tool.
//!
//! Requests are blocking and are not retried here.

mod config;
mod credentials;
mod drive;
mod http;
mod sheets;

pub use config::GsuiteConfig;
pub use credentials::{StaticCredential, TokenFileCredential};
pub use drive::DriveClient;
pub use sheets::SheetsClient;

/// OAuth scope needed for folder creation and uploads.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// OAuth scope needed for appending rows.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
