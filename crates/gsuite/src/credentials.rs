//! Access-token providers.
//!
//! The stored token file is the JSON written by the credential setup tool:
//!
//! ```json
//! {"access_token": "ya29...", "token_type": "Bearer", "expires_in": 3599, "created": 1700000000, "refresh_token": "..."}
//! ```
//!
//! Only `access_token` is required. When `created` and `expires_in` are both present
//! the token is treated as expired shortly before the deadline.

use std::fs;
use std::path::{Path, PathBuf};

use mirror_remote::{Credential, CredentialProvider, RemoteError, RemoteResult};
use serde::Deserialize;

/// Seconds before the recorded expiry at which a token stops being handed out.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// A fixed token, for short-lived processes and tests.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(Credential::bearer(access_token))
    }
}

impl CredentialProvider for StaticCredential {
    fn valid_credential(&self) -> RemoteResult<Credential> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    created: Option<i64>,
}

impl StoredToken {
    fn expires_at(&self) -> Option<i64> {
        Some(self.created? + self.expires_in?)
    }

    fn is_expired(&self, now: i64) -> bool {
        self.expires_at()
            .is_some_and(|deadline| now >= deadline - EXPIRY_MARGIN_SECS)
    }
}

/// Reads the token from a credentials file on every call.
///
/// Re-reading lets an external refresher rotate the file while the process runs.
#[derive(Debug, Clone)]
pub struct TokenFileCredential {
    path: PathBuf,
}

impl TokenFileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> RemoteResult<StoredToken> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            RemoteError::Credential(format!(
                "cannot read credentials file {}: {e}",
                self.path.display()
            ))
        })?;

        let token: StoredToken = serde_json::from_str(&contents).map_err(|e| {
            RemoteError::Credential(format!(
                "malformed credentials file {}: {e}",
                self.path.display()
            ))
        })?;

        if token.access_token.trim().is_empty() {
            return Err(RemoteError::Credential(format!(
                "credentials file {} has an empty access_token",
                self.path.display()
            )));
        }

        Ok(token)
    }
}

impl CredentialProvider for TokenFileCredential {
    fn valid_credential(&self) -> RemoteResult<Credential> {
        let token = self.load()?;

        if token.is_expired(chrono::Utc::now().timestamp()) {
            return Err(RemoteError::Credential(format!(
                "access token in {} has expired; refresh it with the credential tool",
                self.path.display()
            )));
        }

        Ok(Credential::bearer(token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_token(temp: &TempDir, body: &str) -> TokenFileCredential {
        let path = temp.path().join("token.json");
        fs::write(&path, body).unwrap();
        TokenFileCredential::new(path)
    }

    #[test]
    fn static_credential_returns_token() {
        let credential = StaticCredential::new("abc").valid_credential().unwrap();
        assert_eq!(credential.access_token(), "abc");
    }

    #[test]
    fn token_without_expiry_is_valid() {
        let temp = TempDir::new().unwrap();
        let provider = write_token(&temp, r#"{"access_token":"ya29.token"}"#);

        let credential = provider.valid_credential().unwrap();

        assert_eq!(credential.authorization(), "Bearer ya29.token");
    }

    #[test]
    fn fresh_token_is_valid() {
        let temp = TempDir::new().unwrap();
        let now = chrono::Utc::now().timestamp();
        let provider = write_token(
            &temp,
            &format!(
                r#"{{"access_token":"ya29.fresh","expires_in":3599,"created":{now},"refresh_token":"1//r"}}"#
            ),
        );

        assert!(provider.valid_credential().is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let temp = TempDir::new().unwrap();
        let provider = write_token(
            &temp,
            r#"{"access_token":"ya29.old","expires_in":3599,"created":1500000000}"#,
        );

        assert!(matches!(
            provider.valid_credential(),
            Err(RemoteError::Credential(_))
        ));
    }

    #[test]
    fn expiry_margin_applies() {
        let token = StoredToken {
            access_token: "t".into(),
            expires_in: Some(100),
            created: Some(1_000),
        };

        assert!(!token.is_expired(1_000 + 100 - EXPIRY_MARGIN_SECS - 1));
        assert!(token.is_expired(1_000 + 100 - EXPIRY_MARGIN_SECS));
    }

    #[test]
    fn missing_file_is_credential_error() {
        let temp = TempDir::new().unwrap();
        let provider = TokenFileCredential::new(temp.path().join("missing.json"));

        assert!(matches!(
            provider.valid_credential(),
            Err(RemoteError::Credential(_))
        ));
    }

    #[test]
    fn malformed_or_empty_token_is_credential_error() {
        let temp = TempDir::new().unwrap();

        let provider = write_token(&temp, "not json");
        assert!(matches!(
            provider.valid_credential(),
            Err(RemoteError::Credential(_))
        ));

        let provider = write_token(&temp, r#"{"access_token":"  "}"#);
        assert!(matches!(
            provider.valid_credential(),
            Err(RemoteError::Credential(_))
        ));
    }
}
