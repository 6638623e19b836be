//! Browser actions chosen by the executor and the history they leave behind.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::automation::Automation;
use crate::error::Result;

/// One browser action with the fields its kind requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Click { selector: String },
    Type { selector: String, value: String },
    Navigate { url: String },
    Extract { selector: String },
    Wait { selector: String },
    Submit { selector: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Type,
    Navigate,
    Extract,
    Wait,
    Submit,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Click { .. } => ActionKind::Click,
            Action::Type { .. } => ActionKind::Type,
            Action::Navigate { .. } => ActionKind::Navigate,
            Action::Extract { .. } => ActionKind::Extract,
            Action::Wait { .. } => ActionKind::Wait,
            Action::Submit { .. } => ActionKind::Submit,
        }
    }
}

/// An action plus the reason it was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(flatten)]
    pub action: Action,
    pub reason: String,
}

impl ActionRecord {
    pub fn new(action: Action, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: ActionRecord,
    pub result: String,
    pub timestamp: DateTime<Local>,
}

/// Perform `action` and describe what happened.
pub async fn perform(page: &dyn Automation, action: &Action) -> Result<String> {
    match action {
        Action::Click { selector } => {
            page.click(selector).await?;
            Ok(format!("Clicked on {selector}"))
        }
        Action::Type { selector, value } => {
            page.fill(selector, value).await?;
            Ok(format!("Typed '{value}' into {selector}"))
        }
        Action::Navigate { url } => {
            page.navigate(url).await?;
            Ok(format!("Navigated to {url}"))
        }
        Action::Extract { selector } => {
            let text = page.inner_text(selector).await?;
            Ok(format!("Extracted: {text}"))
        }
        Action::Wait { selector } => {
            page.wait_for(selector, page.default_timeout()).await?;
            Ok(format!("Waited for {selector}"))
        }
        Action::Submit { selector } => {
            page.submit(selector).await?;
            Ok(format!("Submitted form using {selector}"))
        }
    }
}

/// Perform `record` and fold a failure into the result text, so a failed
/// action never stops the caller's loop.
pub async fn execute(page: &dyn Automation, record: &ActionRecord) -> HistoryEntry {
    let result = match perform(page, &record.action).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(action = ?record.kind(), "action failed: {e}");
            format!("Error: {e}")
        }
    };

    HistoryEntry {
        action: record.clone(),
        result,
        timestamp: Local::now(),
    }
}
