//! htmlpdf library
//!
//! Renders a local HTML file to a paginated PDF through a headless Chromium
//! session, tolerating the absence of Mermaid diagram elements.
//!
//! # Module Overview
//!
//! - [`browser`] - Headless browser session and wait primitives
//! - [`exporter`] - The HTML-to-PDF export pipeline
//! - [`config`] - Defaults, page setup, and TOML config support
//! - [`error`] - Error type with remediation hints
//!
//! # Example
//!
//! ```no_run
//! use htmlpdf_lib::{Config, PdfExporter};
//! use std::path::Path;
//!
//! # async fn example() -> htmlpdf_lib::Result<()> {
//! let exporter = PdfExporter::new(Config::default());
//! let report = exporter
//!     .export(Path::new("report.html"), Path::new("report.pdf"))
//!     .await?;
//! println!("rendered in {:?}", report.elapsed);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod exporter;
pub mod progress;

pub use browser::{
    wait_for_selector, BrowserOptions, BrowserSession, NetworkIdleWatcher, SelectorWait,
    DEFAULT_POLL_INTERVAL, NETWORK_IDLE_ALLOWANCE, NETWORK_IDLE_QUIET_WINDOW,
};
pub use config::{
    Config, Margins, PageFormat, PageSetup, Timeouts, CSS_PIXELS_PER_INCH, DEBUG_SCREENSHOT_PATH,
    DIAGRAM_SELECTOR, MERMAID_STYLESHEET_URL,
};
pub use error::{ExportError, Result};
pub use exporter::{ExportReport, PdfExporter};
pub use progress::ProgressCallback;
