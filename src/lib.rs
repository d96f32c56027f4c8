//! # Offsite Mirror
//!
//! Process wiring for the mirrored store: logging, configuration and the Google-backed
//! remote services.
//!
//! A typical host process calls, once at startup:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! offsite_mirror::init_tracing()?;
//! let config = offsite_mirror::load_config()?;
//! let mut store = offsite_mirror::connect_gsuite(&config)?;
//! store.create_subfolder("2024-06", true)?;
//! store.store_file("/tmp/report.csv")?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Context;
use mirror_core::{MirrorConfig, MirroredStore};
use mirror_gsuite::{DriveClient, GsuiteConfig, SheetsClient, TokenFileCredential};
use mirror_remote::CredentialProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use mirror_core;
pub use mirror_gsuite;
pub use mirror_remote;

/// Store backed by Google Drive and Google Sheets.
pub type GsuiteMirroredStore = MirroredStore<DriveClient, SheetsClient>;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` is honoured; mirror crates log at `info` unless it says otherwise.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("offsite_mirror=info".parse()?)
                .add_directive("mirror_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// Loads `.env` if present, then resolves [`MirrorConfig`] from the process environment.
pub fn load_config() -> anyhow::Result<MirrorConfig> {
    dotenvy::dotenv().ok();
    let config = MirrorConfig::from_lookup(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Transport settings derived from the mirror configuration.
pub fn gsuite_config(config: &MirrorConfig) -> GsuiteConfig {
    let endpoints = config.endpoints();
    let mut gsuite = GsuiteConfig::default().with_user_agent(config.application_name());

    if let Some(url) = &endpoints.drive_base_url {
        gsuite = gsuite.with_drive_base_url(url.as_str());
    }
    if let Some(url) = &endpoints.drive_upload_base_url {
        gsuite = gsuite.with_drive_upload_base_url(url.as_str());
    }
    if let Some(url) = &endpoints.sheets_base_url {
        gsuite = gsuite.with_sheets_base_url(url.as_str());
    }
    if let Some(timeout) = config.http_timeout() {
        gsuite = gsuite.with_timeout(timeout);
    }
    gsuite
}

/// Builds a store whose remote side is Google Drive and Google Sheets.
///
/// The token file is read lazily on each request, so a missing or expired token only
/// surfaces on the first remote operation. The session pointers from `config` are
/// applied before returning.
pub fn connect_gsuite(config: &MirrorConfig) -> anyhow::Result<GsuiteMirroredStore> {
    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(TokenFileCredential::new(config.credentials_path()));
    let transport = gsuite_config(config);

    let drive = DriveClient::new(&transport, Arc::clone(&credentials))
        .context("failed to build Drive client")?;
    let sheets =
        SheetsClient::new(&transport, credentials).context("failed to build Sheets client")?;

    let store = MirroredStore::from_config(drive, sheets, config)?;
    tracing::info!(
        "++ Offsite mirror ready (remote root: {}, local root: {})",
        store
            .remote_container()
            .map(|id| id.as_str())
            .unwrap_or("<unset>"),
        store
            .local_directory()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unset>".into())
    );
    Ok(store)
}
