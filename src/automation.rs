//! The capability the executor and the table extension drive.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::page::Page;
use crate::snapshot::PageContent;

/// Browser operations used by [`crate::voyager`] and [`crate::table`].
///
/// Implemented by [`Page`]; tests drive the same code with in-memory fakes.
#[async_trait]
pub trait Automation: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Clear the field, then type `value`.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    async fn inner_text(&self, selector: &str) -> Result<String>;

    /// Resolve once `selector` matches, or fail with a timeout.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click a submit control and wait for the navigation it triggers.
    async fn submit(&self, selector: &str) -> Result<()>;

    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value>;

    async fn snapshot(&self) -> Result<PageContent>;

    /// Timeout applied when the caller has none of its own.
    fn default_timeout(&self) -> Duration;
}

#[async_trait]
impl Automation for Page {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        Page::click(self, selector).await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        Page::fill(self, selector, value).await
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        self.text_content(selector).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.wait_for_selector_with_timeout(selector, timeout)
            .await
            .map(|_| ())
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        Page::submit(self, selector).await
    }

    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value> {
        self.evaluate_json(expression).await
    }

    async fn snapshot(&self) -> Result<PageContent> {
        Page::snapshot(self).await
    }

    fn default_timeout(&self) -> Duration {
        Page::default_timeout(self)
    }
}
