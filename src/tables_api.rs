//! Client for the `table-api` Supabase Edge Function.

use chrono::{DateTime, Local};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub const DEFAULT_LIMIT: u32 = 100;

/// Filters sent with a get-tables call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetTablesRequest {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for GetTablesRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            category: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct TablesReport {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl TablesReport {
    pub fn success(tables: Value) -> Self {
        Self {
            status: Status::Success,
            tables: Some(tables),
            error: None,
            timestamp: Local::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            tables: None,
            error: Some(message.into()),
            timestamp: Local::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Status::Success
    }
}

pub struct TablesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    jwt: Option<String>,
}

impl TablesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            jwt: None,
        }
    }

    /// Authenticate as a user. An empty token means anonymous.
    pub fn with_jwt(mut self, jwt: Option<String>) -> Self {
        self.jwt = jwt.filter(|t| !t.is_empty());
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/functions/v1/table-api/get-tables",
            self.base_url.trim_end_matches('/')
        )
    }

    /// POST the request and report the upstream answer. Never fails: transport
    /// and decode errors become an error report.
    pub async fn get_tables(&self, request: &GetTablesRequest) -> TablesReport {
        match self.send(request).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("get-tables request failed: {e}");
                TablesReport::error(e.to_string())
            }
        }
    }

    async fn send(&self, request: &GetTablesRequest) -> Result<TablesReport> {
        let endpoint = self.endpoint();
        tracing::info!(%endpoint, "making request");
        tracing::debug!(payload = %serde_json::to_string(request)?, "request payload");

        let mut builder = self
            .http
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(ref jwt) = self.jwt {
            builder = builder.bearer_auth(jwt);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

/// Only a 200 counts as success; its body must be JSON.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<TablesReport> {
    if status != StatusCode::OK {
        let message = format!("Error: {} - {}", status.as_u16(), body);
        tracing::warn!("{message}");
        return Ok(TablesReport::error(message));
    }

    let tables: Value = serde_json::from_str(body)?;
    match tables.as_array() {
        Some(list) => tracing::info!("successfully retrieved {} tables", list.len()),
        None => tracing::info!("retrieved tables payload"),
    }
    Ok(TablesReport::success(tables))
}
