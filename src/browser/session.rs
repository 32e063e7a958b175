use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{ExportError, Result};

/// Launch options for the headless Chromium instance.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Whether to run without a visible window.
    pub headless: bool,
    /// Whether to keep the OS-level sandbox. Disabled by default so the
    /// tool works in containers running as root.
    pub sandbox: bool,
    /// Explicit Chromium executable; auto-detected when absent.
    pub executable: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            executable: None,
        }
    }
}

/// An exclusive headless browser session.
///
/// Owns the Chromium child process and the spawned CDP event handler task.
/// The session must be released with [`BrowserSession::close`]; callers wrap
/// the page work so that close runs on every exit path.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launches Chromium and starts driving its event stream.
    pub async fn launch(options: BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !options.sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(ExportError::launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExportError::launch(e.to_string()))?;

        // The handler stream must be polled for the whole session lifetime,
        // otherwise every CDP call stalls.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Opens a blank page on this session.
    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Closes the browser and reaps the child process.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}
