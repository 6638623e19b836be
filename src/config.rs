use std::time::Duration;

use crate::browser::BrowserSession;
use crate::error::Result;

/// Default Chrome remote-debugging port.
pub const DEFAULT_DEBUG_PORT: u16 = 9222;

/// How the session reaches a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserMode {
    /// Attach to an already running Chrome started with `--remote-debugging-port`.
    Connect { host: String, port: u16 },
    /// Start a private Chrome process owned by the session.
    Launch,
}

impl BrowserMode {
    /// HTTP endpoint chromiumoxide resolves to the browser's websocket URL.
    pub fn endpoint(&self) -> Option<String> {
        match self {
            BrowserMode::Connect { host, port } => Some(format!("http://{host}:{port}")),
            BrowserMode::Launch => None,
        }
    }
}

pub struct BrowserConfig {
    pub mode: BrowserMode,
    /// Only used in launch mode.
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Default timeout for operations like `wait_for_selector` (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            mode: BrowserMode::Connect {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_DEBUG_PORT,
            },
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    /// Attach to Chrome's remote-debugging port on localhost.
    pub fn port(mut self, port: u16) -> Self {
        self.config.mode = BrowserMode::Connect {
            host: "127.0.0.1".to_string(),
            port,
        };
        self
    }

    /// Launch a browser instead of connecting to a running one.
    pub fn launch(mut self, launch: bool) -> Self {
        if launch {
            self.config.mode = BrowserMode::Launch;
        }
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the default timeout for operations like `wait_for_selector`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<BrowserSession> {
        BrowserSession::open(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
