//! Mirror runtime configuration.
//!
//! Configuration is resolved once at process startup and then handed to
//! [`crate::MirroredStore::configure`]. Nothing in the store reads the environment
//! while operations run, which keeps tests and long-lived processes deterministic.
//!
//! Values are read through a lookup function rather than `std::env` directly so that
//! callers can feed the process environment, a `.env`-populated environment, or a
//! plain map in tests.

use crate::constants::{
    DEFAULT_APPLICATION_NAME, DEFAULT_CREDENTIALS_PATH, ENV_APPLICATION_NAME,
    ENV_CREDENTIALS_PATH, ENV_DRIVE_BASE_URL, ENV_DRIVE_UPLOAD_BASE_URL, ENV_HTTP_TIMEOUT_SECS,
    ENV_LOCAL_ROOT, ENV_LOG_ID, ENV_LOG_RANGE, ENV_LOG_TABLE, ENV_REMOTE_ROOT,
    ENV_SHEETS_BASE_URL,
};
use crate::session::LogTarget;
use crate::{MirrorError, MirrorResult};
use mirror_types::RemoteId;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoint overrides for the remote services, used to point at emulators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointOverrides {
    pub drive_base_url: Option<String>,
    pub drive_upload_base_url: Option<String>,
    pub sheets_base_url: Option<String>,
}

/// Mirror configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct MirrorConfig {
    remote_root: Option<RemoteId>,
    local_root: Option<PathBuf>,
    log_target: Option<LogTarget>,
    credentials_path: PathBuf,
    application_name: String,
    endpoints: EndpointOverrides,
    http_timeout: Option<Duration>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            remote_root: None,
            local_root: None,
            log_target: None,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            endpoints: EndpointOverrides::default(),
            http_timeout: None,
        }
    }
}

impl MirrorConfig {
    /// Create a new `MirrorConfig` with no session pointers.
    pub fn new(credentials_path: PathBuf, application_name: String) -> MirrorResult<Self> {
        if application_name.trim().is_empty() {
            return Err(MirrorError::Config(
                "application_name cannot be empty".into(),
            ));
        }

        Ok(Self {
            credentials_path,
            application_name,
            ..Self::default()
        })
    }

    /// Resolves configuration from `lookup`, typically `|key| std::env::var(key).ok()`.
    ///
    /// Blank values count as unset. The log target is all-or-nothing: setting only some
    /// of its three keys is an error.
    pub fn from_lookup<F>(lookup: F) -> MirrorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials_path = get(ENV_CREDENTIALS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        let application_name =
            get(ENV_APPLICATION_NAME).unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string());

        let mut config = Self::new(credentials_path, application_name)?;

        if let Some(root) = get(ENV_REMOTE_ROOT) {
            config.remote_root = Some(RemoteId::new(root)?);
        }
        config.local_root = get(ENV_LOCAL_ROOT).map(PathBuf::from);

        config.log_target = match (get(ENV_LOG_ID), get(ENV_LOG_TABLE), get(ENV_LOG_RANGE)) {
            (None, None, None) => None,
            (Some(id), Some(table), Some(range)) => Some(LogTarget::new(id, table, range)?),
            (id, table, range) => {
                let missing: Vec<&str> = [
                    (ENV_LOG_ID, id.is_none()),
                    (ENV_LOG_TABLE, table.is_none()),
                    (ENV_LOG_RANGE, range.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, missing)| missing.then_some(key))
                .collect();
                return Err(MirrorError::Config(format!(
                    "incomplete log target, missing {}",
                    missing.join(", ")
                )));
            }
        };

        config.endpoints = EndpointOverrides {
            drive_base_url: get(ENV_DRIVE_BASE_URL),
            drive_upload_base_url: get(ENV_DRIVE_UPLOAD_BASE_URL),
            sheets_base_url: get(ENV_SHEETS_BASE_URL),
        };

        config.http_timeout = get(ENV_HTTP_TIMEOUT_SECS)
            .map(|secs| {
                secs.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    MirrorError::Config(format!("{ENV_HTTP_TIMEOUT_SECS}={secs:?}: {e}"))
                })
            })
            .transpose()?;

        Ok(config)
    }

    pub fn with_remote_root(mut self, id: impl AsRef<str>) -> MirrorResult<Self> {
        self.remote_root = Some(RemoteId::new(id)?);
        Ok(self)
    }

    pub fn with_local_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_root = Some(path.into());
        self
    }

    pub fn with_log_target(mut self, target: LogTarget) -> Self {
        self.log_target = Some(target);
        self
    }

    pub fn remote_root(&self) -> Option<&RemoteId> {
        self.remote_root.as_ref()
    }

    pub fn local_root(&self) -> Option<&Path> {
        self.local_root.as_deref()
    }

    pub fn log_target(&self) -> Option<&LogTarget> {
        self.log_target.as_ref()
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn endpoints(&self) -> &EndpointOverrides {
        &self.endpoints
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }
}
