//! Blocking HTTP plumbing shared by the Drive and Sheets clients.

use std::sync::Arc;

use mirror_remote::{CredentialProvider, RemoteError, RemoteResult};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::Deserialize;

use crate::GsuiteConfig;

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
    status: Option<String>,
}

pub(crate) struct HttpClient {
    http: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpClient {
    pub(crate) fn new(
        config: &GsuiteConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> RemoteResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(transport)?;
        Ok(Self { http, credentials })
    }

    /// Starts an authorised POST. The credential is fetched per request so a token
    /// refreshed by the provider is picked up without rebuilding the client.
    pub(crate) fn post(&self, url: Url) -> RemoteResult<RequestBuilder> {
        let credential = self.credentials.valid_credential()?;
        Ok(self
            .http
            .post(url)
            .header(AUTHORIZATION, credential.authorization()))
    }

    pub(crate) fn send_json(&self, request: RequestBuilder) -> RemoteResult<serde_json::Value> {
        let response = request.send().map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("{e}; body: {body}")))
    }
}

/// Builds `base/segments...`, percent-encoding each segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> RemoteResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| RemoteError::Transport(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| RemoteError::Transport(format!("base url cannot have a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Extracts the human-readable message from a Google API error body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(ErrorPayload {
        error: Some(fields),
    }) = serde_json::from_str::<ErrorPayload>(body)
    {
        match (fields.message, fields.status) {
            (Some(message), Some(status)) => return format!("{status}: {message}"),
            (Some(message), None) => return message,
            (None, Some(status)) => return status,
            (None, None) => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let url = endpoint("https://www.googleapis.com", &["drive", "v3", "files"]).unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = endpoint("http://127.0.0.1:9000/emulator/", &["v4", "spreadsheets"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/emulator/v4/spreadsheets");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint("https://sheets.googleapis.com", &["values", "'Q1 log'!A1:append"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/values/'Q1%20log'!A1:append"
        );
    }

    #[test]
    fn endpoint_rejects_bad_base() {
        assert!(matches!(
            endpoint("not a url", &["x"]),
            Err(RemoteError::Transport(_))
        ));
    }

    #[test]
    fn error_message_from_google_payload() {
        let body = r#"{"error":{"code":404,"message":"File not found: R0.","status":"NOT_FOUND"}}"#;
        assert_eq!(error_message(body), "NOT_FOUND: File not found: R0.");
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(""), "empty response body");
    }
}
