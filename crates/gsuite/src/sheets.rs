//! Sheets v4 log service.

use std::sync::Arc;

use mirror_remote::{
    AppendAck, AuditRow, CredentialProvider, RangeRef, RemoteLogService, RemoteResult,
    ValueInputOption,
};
use mirror_types::RemoteId;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::http::{endpoint, HttpClient};
use crate::GsuiteConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
    updated_rows: Option<u32>,
}

/// Appends rows to a spreadsheet through the Sheets v4 API.
pub struct SheetsClient {
    http: HttpClient,
    base_url: String,
}

impl SheetsClient {
    pub fn new(
        config: &GsuiteConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> RemoteResult<Self> {
        Ok(Self {
            http: HttpClient::new(config, credentials)?,
            base_url: config.sheets_base_url.clone(),
        })
    }

    fn append_url(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        input: ValueInputOption,
    ) -> RemoteResult<Url> {
        let range_segment = format!("{range}:append");
        let mut url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", log_id.as_str(), "values", range_segment.as_str()],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());
        Ok(url)
    }
}

impl RemoteLogService for SheetsClient {
    fn append_row(
        &self,
        log_id: &RemoteId,
        range: &RangeRef,
        row: &AuditRow,
        input: ValueInputOption,
    ) -> RemoteResult<AppendAck> {
        let url = self.append_url(log_id, range, input)?;

        tracing::debug!(
            "sheets: appending {} value(s) to {range} of {log_id}",
            row.len()
        );
        let request = self.http.post(url)?.json(&append_body(row));
        let response = self.http.send_json(request)?;
        Ok(parse_ack(response))
    }
}

fn append_body(row: &AuditRow) -> serde_json::Value {
    json!({ "values": [row] })
}

fn parse_ack(response: serde_json::Value) -> AppendAck {
    let updates = serde_json::from_value::<AppendResponse>(response)
        .ok()
        .and_then(|r| r.updates)
        .unwrap_or_default();

    AppendAck {
        updated_range: updates.updated_range,
        updated_rows: updates.updated_rows.unwrap_or(0),
    }
}
