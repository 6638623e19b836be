#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use browser_relay::snapshot::PageContent;
use browser_relay::{Automation, Error, Result};
use serde_json::Value;

/// In-memory page: selectors in `present` exist, everything else is missing.
#[derive(Default)]
pub struct FakePage {
    pub present: HashSet<String>,
    pub texts: HashMap<String, String>,
    pub eval_result: Value,
    pub fail_snapshot: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.present.insert(selector.to_string());
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn evaluating_to(mut self, value: Value) -> Self {
        self.eval_result = value;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.present.contains(selector) {
            Ok(())
        } else {
            Err(Error::ElementNotFound(selector.to_string()))
        }
    }
}

#[async_trait]
impl Automation for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {url}"));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click {selector}"));
        self.require(selector)
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.record(format!("fill {selector} {value}"));
        self.require(selector)
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        self.record(format!("text {selector}"));
        self.texts
            .get(selector)
            .cloned()
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<()> {
        self.record(format!("wait {selector}"));
        if self.present.contains(selector) {
            Ok(())
        } else {
            Err(Error::Timeout(selector.to_string()))
        }
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        self.record(format!("submit {selector}"));
        self.require(selector)
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.record(format!("eval {expression}"));
        Ok(self.eval_result.clone())
    }

    async fn snapshot(&self) -> Result<PageContent> {
        if self.fail_snapshot {
            return Err(Error::Js("page crashed".to_string()));
        }
        Ok(PageContent {
            title: "Fake".to_string(),
            url: "about:blank".to_string(),
            ..PageContent::default()
        })
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_millis(10)
    }
}
