//! Operations on the application's in-page tables.
//!
//! Tables are rendered as `#table-<id>`. Writes go through a
//! `table-operation` DOM event handled by the page itself, which shows
//! `.table-update-success` once it has applied the change.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::automation::Automation;
use crate::error::{Error, Result};

/// Element the page shows after applying a table change.
pub const UPDATE_SUCCESS_SELECTOR: &str = ".table-update-success";
/// How long write and update wait for the confirmation element.
pub const WRITE_CONFIRM_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableAction {
    Read,
    Write,
    Update,
    WaitForUpdate,
}

impl TableAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableAction::Read => "read",
            TableAction::Write => "write",
            TableAction::Update => "update",
            TableAction::WaitForUpdate => "wait-for-update",
        }
    }
}

/// What a table operation reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableOutcome {
    Data {
        success: bool,
        data: Vec<Vec<String>>,
    },
    Message {
        success: bool,
        message: String,
    },
    Updated {
        success: bool,
    },
    Failed {
        success: bool,
        error: String,
        timestamp: DateTime<Local>,
    },
}

impl TableOutcome {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        TableOutcome::Failed {
            success: false,
            error: error.to_string(),
            timestamp: Local::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        match self {
            TableOutcome::Data { success, .. }
            | TableOutcome::Message { success, .. }
            | TableOutcome::Updated { success }
            | TableOutcome::Failed { success, .. } => *success,
        }
    }
}

pub fn table_selector(table_id: &str) -> String {
    format!("#table-{table_id}")
}

/// `null`, `false`, zero and empty strings, arrays or objects carry no change.
fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

pub struct TableOps<'a> {
    page: &'a dyn Automation,
}

impl<'a> TableOps<'a> {
    pub fn new(page: &'a dyn Automation) -> Self {
        Self { page }
    }

    /// Run `action` and turn any failure into [`TableOutcome::Failed`].
    pub async fn run(
        &self,
        table_id: &str,
        action: TableAction,
        data: Option<&Value>,
        timeout: Duration,
    ) -> TableOutcome {
        tracing::info!("table operation: {} on table {table_id}", action.as_str());

        let result = match action {
            TableAction::Read => self.read(table_id).await,
            TableAction::Write | TableAction::Update => {
                self.write(table_id, action, data).await
            }
            TableAction::WaitForUpdate => Ok(TableOutcome::Updated {
                success: self.wait_for_update(table_id, timeout).await,
            }),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("table operation failed: {e}");
            TableOutcome::failed(e)
        })
    }

    async fn locate(&self, table_id: &str) -> Result<String> {
        let selector = table_selector(table_id);
        self.page
            .wait_for(&selector, self.page.default_timeout())
            .await
            .map_err(|_| Error::TableNotFound(table_id.to_string()))?;
        Ok(selector)
    }

    /// Cell text of every row, header rows included.
    pub async fn read(&self, table_id: &str) -> Result<TableOutcome> {
        let selector = self.locate(table_id).await?;
        let selector_js = serde_json::to_string(&selector)?;
        let js = format!(
            r#"
            (() => {{
                const table = document.querySelector({selector_js});
                const rows = Array.from(table.querySelectorAll('tr'));
                return rows.map(row =>
                    Array.from(row.querySelectorAll('td,th')).map(cell => cell.textContent)
                );
            }})()
            "#,
        );

        let rows = self.page.evaluate(&js).await?;
        let data: Vec<Vec<String>> = serde_json::from_value(rows)?;
        Ok(TableOutcome::Data {
            success: true,
            data,
        })
    }

    /// Dispatch a write or update and wait for the page to confirm it.
    pub async fn write(
        &self,
        table_id: &str,
        action: TableAction,
        data: Option<&Value>,
    ) -> Result<TableOutcome> {
        self.locate(table_id).await?;
        let data = data.filter(|d| !is_empty_payload(d)).ok_or(Error::MissingData)?;

        let detail = serde_json::json!({
            "tableId": table_id,
            "action": action.as_str(),
            "data": data,
        });
        let js = format!(
            r#"
            (() => {{
                const event = new CustomEvent('table-operation', {{ detail: {detail} }});
                document.dispatchEvent(event);
            }})()
            "#,
        );
        self.page.evaluate(&js).await?;

        self.page
            .wait_for(UPDATE_SUCCESS_SELECTOR, WRITE_CONFIRM_TIMEOUT)
            .await?;

        Ok(TableOutcome::Message {
            success: true,
            message: format!("Table {} completed", action.as_str()),
        })
    }

    /// True once the confirmation element shows up within `timeout`.
    pub async fn wait_for_update(&self, table_id: &str, timeout: Duration) -> bool {
        match self.page.wait_for(UPDATE_SUCCESS_SELECTOR, timeout).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(table_id, "timeout waiting for table update: {e}");
                false
            }
        }
    }
}
