//! The export pipeline: one HTML file in, one PDF out.
//!
//! `export` acquires the browser session, runs the page steps, and closes
//! the session on every exit path, so a failed render never leaks a
//! Chromium process.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;

use crate::browser::{
    wait_for_selector, BrowserOptions, BrowserSession, NetworkIdleWatcher, SelectorWait,
};
use crate::config::{Config, PageSetup};
use crate::error::{ExportError, Result};
use crate::progress::ProgressCallback;

/// What a completed export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub screenshot_path: PathBuf,
    pub diagram_wait: SelectorWait,
    pub elapsed: Duration,
}

/// Converts one local HTML file into one PDF via a headless browser session.
pub struct PdfExporter {
    config: Config,
    browser: BrowserOptions,
    progress: Option<ProgressCallback>,
    warnings: Option<ProgressCallback>,
}

impl PdfExporter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            browser: BrowserOptions::default(),
            progress: None,
            warnings: None,
        }
    }

    pub fn with_browser_options(mut self, options: BrowserOptions) -> Self {
        self.browser = options;
        self
    }

    /// Progress lines (stdout in the CLI).
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Warning lines (stderr in the CLI).
    pub fn with_warnings(mut self, callback: ProgressCallback) -> Self {
        self.warnings = Some(callback);
        self
    }

    /// Renders `input` to a PDF at `output`.
    ///
    /// The diagram wait expiring is the only recoverable condition; every
    /// other failure aborts the export. The browser session is closed
    /// before this returns, whichever way the page steps went.
    pub async fn export(&self, input: &Path, output: &Path) -> Result<ExportReport> {
        let start = Instant::now();
        self.log_progress("Launching headless browser…");
        let session = BrowserSession::launch(self.browser.clone()).await?;

        let result = self.run_page_steps(&session, input, output).await;
        let closed = session.close().await;

        let diagram_wait = result?;
        closed?;

        Ok(ExportReport {
            output_path: output.to_path_buf(),
            screenshot_path: self.config.screenshot_path.clone(),
            diagram_wait,
            elapsed: start.elapsed(),
        })
    }

    async fn run_page_steps(
        &self,
        session: &BrowserSession,
        input: &Path,
        output: &Path,
    ) -> Result<SelectorWait> {
        let page = session.new_page().await?;

        // Listeners go up before the content load so its requests are counted.
        let watcher = NetworkIdleWatcher::attach(&page).await?;

        let html = fs::read_to_string(input).map_err(|source| ExportError::InputRead {
            path: input.to_path_buf(),
            source,
        })?;

        self.log_progress("Loading HTML content…");
        page.set_content(html.as_str()).await?;
        watcher
            .wait_until_idle(self.config.timeouts.content_idle)
            .await?;

        self.log_progress("Injecting diagram stylesheet…");
        self.inject_stylesheet(&page).await?;

        let diagram_wait = wait_for_selector(
            &page,
            &self.config.diagram_selector,
            self.config.timeouts.diagram_wait,
        )
        .await?;
        match diagram_wait {
            SelectorWait::Found => self.log_progress("Diagram elements found and rendered."),
            SelectorWait::TimedOut => self.log_warning(&format!(
                "No diagram elements matched '{}' within {:?}; continuing without them.",
                self.config.diagram_selector, self.config.timeouts.diagram_wait
            )),
        }

        let screenshot = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await?;
        fs::write(&self.config.screenshot_path, &screenshot).map_err(|source| {
            ExportError::OutputWrite {
                path: self.config.screenshot_path.clone(),
                source,
            }
        })?;
        self.log_progress(&format!(
            "Debug screenshot saved to {}",
            self.config.screenshot_path.display()
        ));

        let pdf = page.pdf(print_params(&self.config.page)).await?;
        fs::write(output, &pdf).map_err(|source| ExportError::OutputWrite {
            path: output.to_path_buf(),
            source,
        })?;

        Ok(diagram_wait)
    }

    /// Appends a `<link rel="stylesheet">` for the configured URL and waits
    /// for it to load. A failed fetch rejects the promise and aborts the
    /// export, matching how the injection behaves natively in the browser.
    async fn inject_stylesheet(&self, page: &Page) -> Result<()> {
        let url_literal = serde_json::to_string(&self.config.stylesheet_url)
            .map_err(|e| ExportError::config(format!("Invalid stylesheet URL: {}", e)))?;
        let expression = format!(
            r#"(() => new Promise((resolve, reject) => {{
                const link = document.createElement('link');
                link.rel = 'stylesheet';
                link.href = {url_literal};
                link.onload = () => resolve(link.href);
                link.onerror = () => reject(new Error('Failed to load stylesheet ' + link.href));
                document.head.appendChild(link);
            }}))()"#
        );
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ExportError::config)?;
        page.evaluate_expression(params).await?;
        Ok(())
    }

    fn log_progress(&self, message: &str) {
        if let Some(cb) = &self.progress {
            cb(message);
        }
    }

    fn log_warning(&self, message: &str) {
        if let Some(cb) = &self.warnings {
            cb(message);
        }
    }
}

/// Page.printToPDF parameters for the configured paper and margins, with
/// background graphics always included.
fn print_params(page: &PageSetup) -> PrintToPdfParams {
    let (paper_width, paper_height) = page.format.dimensions();
    let (top, right, bottom, left) = page.margins.to_inches();
    PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        margin_top: Some(top),
        margin_right: Some(right),
        margin_bottom: Some(bottom),
        margin_left: Some(left),
        ..Default::default()
    }
}
