use std::time::Duration;

use crate::{DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL};

/// Transport configuration shared by the Drive and Sheets clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsuiteConfig {
    /// Base URL for Drive metadata requests.
    pub drive_base_url: String,
    /// Base URL for Drive media uploads.
    pub drive_upload_base_url: String,
    /// Base URL for Sheets requests.
    pub sheets_base_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for GsuiteConfig {
    fn default() -> Self {
        Self {
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            drive_upload_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            user_agent: "offsite-mirror".to_string(),
            timeout: None,
        }
    }
}

impl GsuiteConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_drive_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.drive_base_url = base_url.into();
        self
    }

    pub fn with_drive_upload_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.drive_upload_base_url = base_url.into();
        self
    }

    pub fn with_sheets_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.sheets_base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
