//! Drive v3 container service.

use std::sync::Arc;

use mirror_remote::{
    CredentialProvider, FolderMetadata, RemoteContainerService, RemoteError, RemoteResult,
};
use mirror_types::RemoteId;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

use crate::http::{endpoint, HttpClient};
use crate::GsuiteConfig;

/// Creates folders and uploads objects through the Drive v3 API.
pub struct DriveClient {
    http: HttpClient,
    base_url: String,
    upload_base_url: String,
}

impl DriveClient {
    pub fn new(
        config: &GsuiteConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> RemoteResult<Self> {
        Ok(Self {
            http: HttpClient::new(config, credentials)?,
            base_url: config.drive_base_url.clone(),
            upload_base_url: config.drive_upload_base_url.clone(),
        })
    }
}

impl RemoteContainerService for DriveClient {
    fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
        metadata: &FolderMetadata,
    ) -> RemoteResult<RemoteId> {
        let mut url = endpoint(&self.base_url, &["drive", "v3", "files"])?;
        url.query_pairs_mut().append_pair("fields", "id");

        tracing::debug!("drive: creating folder {name:?} under {parent}");
        let request = self
            .http
            .post(url)?
            .json(&file_metadata(parent, name, Some(metadata)));
        let response = self.http.send_json(request)?;
        parse_id(&response)
    }

    fn create_object(
        &self,
        parent: &RemoteId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> RemoteResult<RemoteId> {
        let mut url = endpoint(&self.upload_base_url, &["upload", "drive", "v3", "files"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", "id");

        let boundary = format!("offsite-mirror-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related_body(
            &boundary,
            &file_metadata(parent, name, None),
            bytes,
            mime_type,
        );

        tracing::debug!(
            "drive: uploading {name:?} ({} bytes, {mime_type}) under {parent}",
            bytes.len()
        );
        let request = self
            .http
            .post(url)?
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body);
        let response = self.http.send_json(request)?;
        parse_id(&response)
    }
}

fn file_metadata(
    parent: &RemoteId,
    name: &str,
    folder: Option<&FolderMetadata>,
) -> serde_json::Value {
    let mut metadata = json!({
        "name": name,
        "parents": [parent.as_str()],
    });

    if let Some(folder) = folder {
        metadata["mimeType"] = json!(folder.mime_type);
        if let Some(description) = &folder.description {
            metadata["description"] = json!(description);
        }
    }

    metadata
}

/// Two-part `multipart/related` body: JSON metadata followed by the raw content.
fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    bytes: &[u8],
    mime_type: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

fn parse_id(response: &serde_json::Value) -> RemoteResult<RemoteId> {
    let id = response
        .get("id")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| RemoteError::InvalidResponse(format!("missing file id in {response}")))?;
    RemoteId::new(id).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}
