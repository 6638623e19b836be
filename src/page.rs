use std::time::Duration;

use base64::Engine;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::snapshot::{PageContent, SNAPSHOT_JS};

/// Wrapper around a chromiumoxide Page exposing the operations the relay needs.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self { inner, default_timeout }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?;
        Ok(())
    }

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?
            .ok_or_else(|| Error::Navigation("No URL found".into()))
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::Js(e.to_string()))?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    /// Wait for a navigation to complete.
    pub async fn wait_for_navigation(&self) -> Result<()> {
        self.inner
            .wait_for_navigation()
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?;
        Ok(())
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Click on an element matching the given CSS selector.
    pub async fn click(&self, selector: &str) -> Result<()> {
        let el = self.find_element(selector).await?;
        el.click().await
    }

    /// Type text into an element matching the given CSS selector.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let el = self.find_element(selector).await?;
        el.click().await?;
        el.type_text(text).await
    }

    /// Replace the value of an input: clear it, then type `text`.
    pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let selector_js =
            serde_json::to_string(selector).map_err(|e| Error::Js(e.to_string()))?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }})()
            "#,
        );
        self.evaluate_void(&js).await?;
        self.type_text(selector, text).await
    }

    /// Click a submit control and wait for the resulting navigation.
    pub async fn submit(&self, selector: &str) -> Result<()> {
        self.click(selector).await?;
        self.wait_for_navigation().await
    }

    /// Wait for an element using the configured default timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<Element> {
        self.wait_for_selector_with_timeout(selector, self.default_timeout)
            .await
    }

    /// Wait for an element matching the given CSS selector to appear in the DOM.
    /// Polls every 100ms up to `timeout`.
    pub async fn wait_for_selector_with_timeout(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element> {
        let interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            match self.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "selector {selector} after {}ms",
                        timeout.as_millis()
                    )));
                }
            }
        }
    }

    // ── Observations ────────────────────────────────────────────────

    /// Take a screenshot of the visible viewport (PNG format).
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| Error::Screenshot(e.to_string()))
    }

    /// Viewport screenshot as standard base64.
    pub async fn screenshot_base64(&self) -> Result<String> {
        let png = self.screenshot().await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(png))
    }

    /// Get the text content of an element matching the given CSS selector.
    pub async fn text_content(&self, selector: &str) -> Result<String> {
        let el = self.find_element(selector).await?;
        el.inner_text().await
    }

    /// Capture title, URL, body text, links, inputs and buttons.
    pub async fn snapshot(&self) -> Result<PageContent> {
        let result = self
            .inner
            .evaluate(SNAPSHOT_JS)
            .await
            .map_err(|e| Error::Js(e.to_string()))?;
        let json_str: String = result
            .into_value()
            .map_err(|e| Error::Js(e.to_string()))?;
        let content: PageContent = serde_json::from_str(&json_str)?;
        Ok(content.truncated())
    }

    /// Evaluate a JavaScript expression and return its JSON value
    /// (`null` when the expression yields nothing).
    pub async fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value> {
        let result = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::Js(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate a JavaScript expression without caring about the return value.
    pub async fn evaluate_void(&self, expression: &str) -> Result<()> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::Js(e.to_string()))?;
        Ok(())
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(Element::new(el))
    }
}
