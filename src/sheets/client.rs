//! Sheets v4 REST client

use crate::auth::TokenSource;
use crate::sheets::traits::{SheetStore, SheetsError, SheetsResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Talks to one spreadsheet through the Sheets v4 REST API
pub struct SheetsClient {
    http: Client,
    api_base: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsClient {
    /// Creates a client for `spreadsheet_id`
    ///
    /// # Arguments
    ///
    /// * `http` - The HTTP client to send requests with
    /// * `api_base` - API root, `https://sheets.googleapis.com` in production
    /// * `spreadsheet_id` - The spreadsheet every call targets
    /// * `tokens` - Supplies the bearer token for each request
    pub fn new(
        http: Client,
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> SheetsResult<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| SheetsError::Response(format!("invalid API base URL: {}", e)))?;
        Ok(Self {
            http,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> SheetsResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Response("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    /// `{base}/v4/spreadsheets/{id}:batchUpdate`
    fn batch_url(&self) -> SheetsResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Response("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .push(&format!("{}:batchUpdate", self.spreadsheet_id));
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> SheetsResult<Response> {
        let token = self.tokens.bearer().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

/// Pulls `error.message` out of an API error body, or returns the body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Renders a cell the way the API displays it
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_range(&self, range: &str) -> SheetsResult<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        let response = self.send(self.http.get(url)).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::Response(e.to_string()))?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    async fn update_range(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()> {
        let url = self.values_url(range, "")?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()> {
        let url = self.values_url(range, ":append")?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn batch_update(&self, requests: Vec<Value>) -> SheetsResult<()> {
        let url = self.batch_url()?;
        let request = self.http.post(url).json(&json!({ "requests": requests }));
        self.send(request).await?;
        Ok(())
    }
}
