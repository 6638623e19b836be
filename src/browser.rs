use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::handler::Handler;
use chromiumoxide::page::Page as CrPage;
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::config::{BrowserBuilder, BrowserConfig, BrowserMode};
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags that improve performance without affecting functionality.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
];

/// A browser acquired for one command run.
///
/// Pages opened through the session are tracked and closed by [`BrowserSession::close`].
/// A launched browser is shut down on close; an attached one is left running.
pub struct BrowserSession {
    browser: CrBrowser,
    mode: BrowserMode,
    opened: Mutex<Vec<CrPage>>,
    default_timeout: std::time::Duration,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Create a new BrowserBuilder for configuring a session.
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Connect or launch, depending on `config.mode`.
    pub async fn open(config: BrowserConfig) -> Result<Self> {
        let (browser, handler) = match config.mode.endpoint() {
            Some(endpoint) => {
                tracing::info!(%endpoint, "connecting to Chrome");
                CrBrowser::connect(endpoint.clone())
                    .await
                    .map_err(|e| Error::Connect(format!("{endpoint}: {e}")))?
            }
            None => Self::launch(&config).await?,
        };

        let handler_task = spawn_handler(handler);

        Ok(Self {
            browser,
            mode: config.mode,
            opened: Mutex::new(Vec::new()),
            default_timeout: config.default_timeout,
            handler_task,
        })
    }

    async fn launch(config: &BrowserConfig) -> Result<(CrBrowser, Handler)> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself
        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder.build().map_err(Error::Launch)?;

        tracing::info!(headless = config.headless, "launching Chrome");
        CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))
    }

    /// Open a new page (tab) navigated to the given URL.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        let cr_page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?;

        self.opened.lock().await.push(cr_page.clone());
        tracing::debug!(%url, "opened page");

        Ok(Page::new(cr_page, self.default_timeout))
    }

    /// Open a blank page, used as the starting point of multi-step runs.
    pub async fn blank_page(&self) -> Result<Page> {
        self.new_page("about:blank").await
    }

    /// Release the session: close every page it opened, then shut down a
    /// launched browser or detach from an attached one.
    ///
    /// Page close failures are logged, not returned; the first browser-level
    /// failure is.
    pub async fn close(mut self) -> Result<()> {
        let pages = std::mem::take(self.opened.get_mut());
        for page in pages {
            if let Err(e) = page.close().await {
                tracing::warn!("failed to close page: {e}");
            }
        }

        let result = match self.mode {
            BrowserMode::Launch => {
                let closed = self.browser.close().await.map(|_| ());
                if let Err(e) = self.browser.wait().await {
                    tracing::warn!("browser process did not exit cleanly: {e}");
                }
                closed.map_err(Error::from)
            }
            BrowserMode::Connect { .. } => Ok(()),
        };

        self.handler_task.abort();
        tracing::debug!("browser session closed");
        result
    }
}

fn spawn_handler(mut handler: Handler) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::trace!("cdp handler: {e}");
            }
        }
    })
}
