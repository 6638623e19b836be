//! Structured view of a page, captured before each executor step.

use serde::{Deserialize, Serialize};

/// Maximum characters of body text kept in a snapshot.
pub const BODY_TEXT_LIMIT: usize = 1000;
/// Maximum links kept in a snapshot.
pub const LINK_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub title: String,
    pub url: String,
    pub body_text: String,
    pub links: Vec<Link>,
    pub inputs: Vec<InputField>,
    pub buttons: Vec<Button>,
}

impl PageContent {
    /// Placeholder used when the page could not be read.
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            title: "Error".to_string(),
            url: "Error".to_string(),
            body_text: format!("Error getting page content: {reason}"),
            ..Self::default()
        }
    }

    /// Apply the body text and link limits.
    pub fn truncated(mut self) -> Self {
        if let Some((idx, _)) = self.body_text.char_indices().nth(BODY_TEXT_LIMIT) {
            self.body_text.truncate(idx);
        }
        self.links.truncate(LINK_LIMIT);
        self
    }
}

/// Collects everything a snapshot needs in one round trip.
pub(crate) const SNAPSHOT_JS: &str = r#"
    JSON.stringify({
        title: document.title || '',
        url: window.location.href,
        bodyText: document.body ? (document.body.innerText || '') : '',
        links: Array.from(document.querySelectorAll('a')).map(a => ({
            text: (a.innerText || '').trim(),
            href: a.href || '',
            id: a.id || '',
            class: typeof a.className === 'string' ? a.className : ''
        })),
        inputs: Array.from(document.querySelectorAll('input, textarea, select')).map(el => ({
            type: el.type || el.tagName.toLowerCase(),
            name: el.name || '',
            id: el.id || '',
            placeholder: el.placeholder || '',
            value: el.value || '',
            class: typeof el.className === 'string' ? el.className : ''
        })),
        buttons: Array.from(document.querySelectorAll('button, input[type="submit"], input[type="button"]')).map(btn => ({
            text: (btn.innerText || '').trim() || btn.value || '',
            id: btn.id || '',
            class: typeof btn.className === 'string' ? btn.className : '',
            type: btn.type || ''
        }))
    })
"#;
