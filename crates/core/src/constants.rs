//! Constants used throughout the mirror core crate.
//!
//! Configuration keys live here so that the config loader, the runtime wiring and
//! the documentation agree on their spelling.

/// Remote folder id that receives uploads until a subfolder is switched into.
pub const ENV_REMOTE_ROOT: &str = "MIRROR_REMOTE_ROOT";

/// Local directory that receives replicas until a subfolder is switched into.
pub const ENV_LOCAL_ROOT: &str = "MIRROR_LOCAL_ROOT";

/// Spreadsheet (log) id for audit rows.
pub const ENV_LOG_ID: &str = "MIRROR_LOG_ID";

/// Sheet (table) name for audit rows.
pub const ENV_LOG_TABLE: &str = "MIRROR_LOG_TABLE";

/// Range spec for audit rows, e.g. `A1`.
pub const ENV_LOG_RANGE: &str = "MIRROR_LOG_RANGE";

/// Path of the stored OAuth token file.
pub const ENV_CREDENTIALS_PATH: &str = "MIRROR_CREDENTIALS_PATH";

/// Application name sent as the HTTP user agent.
pub const ENV_APPLICATION_NAME: &str = "MIRROR_APPLICATION_NAME";

pub const ENV_DRIVE_BASE_URL: &str = "MIRROR_DRIVE_BASE_URL";
pub const ENV_DRIVE_UPLOAD_BASE_URL: &str = "MIRROR_DRIVE_UPLOAD_BASE_URL";
pub const ENV_SHEETS_BASE_URL: &str = "MIRROR_SHEETS_BASE_URL";

/// Request timeout in whole seconds.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "MIRROR_HTTP_TIMEOUT_SECS";

/// Default token file location when no path is configured.
pub const DEFAULT_CREDENTIALS_PATH: &str = ".credentials/offsite-mirror.json";

/// Default application name.
pub const DEFAULT_APPLICATION_NAME: &str = "Offsite Mirror";
