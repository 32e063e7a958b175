use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{ExportError, Result};

/// Pinned Mermaid stylesheet injected into every page.
pub const MERMAID_STYLESHEET_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mermaid/9.3.0/mermaid.min.css";

/// Default debug screenshot file, written to the current working directory.
pub const DEBUG_SCREENSHOT_PATH: &str = "debug-screenshot.png";

/// CSS selector marking Mermaid diagram containers.
pub const DIAGRAM_SELECTOR: &str = ".mermaid";

/// CSS reference pixel density used to convert px margins to CDP inches.
pub const CSS_PIXELS_PER_INCH: f64 = 96.0;

/// Paper format for the rendered PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageFormat {
    /// Paper dimensions in inches (width, height).
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (8.27, 11.7),
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(format!(
                "unknown page format '{}': expected a4, letter, or legal",
                other
            )),
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageFormat::A4 => "a4",
            PageFormat::Letter => "letter",
            PageFormat::Legal => "legal",
        };
        write!(f, "{name}")
    }
}

/// Page margins in CSS pixels, CSS order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 40,
            right: 20,
            bottom: 40,
            left: 20,
        }
    }
}

impl Margins {
    /// Margins converted to inches for Page.printToPDF.
    pub fn to_inches(self) -> (f64, f64, f64, f64) {
        let px = |v: u32| f64::from(v) / CSS_PIXELS_PER_INCH;
        (px(self.top), px(self.right), px(self.bottom), px(self.left))
    }
}

impl FromStr for Margins {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(
                "Invalid margins: expected four comma-separated px values (top,right,bottom,left)"
                    .to_string(),
            );
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| format!("Invalid margins value: '{}'", part.trim()))?;
        }
        Ok(Margins {
            top: values[0],
            right: values[1],
            bottom: values[2],
            left: values[3],
        })
    }
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.top, self.right, self.bottom, self.left)
    }
}

impl<'de> Deserialize<'de> for Margins {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Paper format plus margins for the PDF step.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub format: PageFormat,
    pub margins: Margins,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Bound on the network-idle wait after setting page content.
    #[serde(with = "humantime_serde")]
    pub content_idle: Duration,
    /// Bound on the diagram-element wait; expiry is non-fatal.
    #[serde(with = "humantime_serde")]
    pub diagram_wait: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            content_idle: Duration::from_secs(30),
            diagram_wait: Duration::from_secs(15),
        }
    }
}

/// Exporter configuration, loadable from a TOML file.
///
/// Every field has a built-in default matching the fixed resources the tool
/// historically hardcoded (pinned stylesheet URL, `debug-screenshot.png`,
/// `.mermaid`), so an empty config file behaves identically to no file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stylesheet_url: String,
    pub screenshot_path: PathBuf,
    pub diagram_selector: String,
    pub page: PageSetup,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stylesheet_url: MERMAID_STYLESHEET_URL.to_string(),
            screenshot_path: PathBuf::from(DEBUG_SCREENSHOT_PATH),
            diagram_selector: DIAGRAM_SELECTOR.to_string(),
            page: PageSetup::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExportError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let cfg: Config = toml::from_str(&raw).map_err(|e| {
            ExportError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        cfg.validate()
            .map_err(|e| ExportError::config(format!("Invalid config ({}): {}", path.display(), e)))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.stylesheet_url.trim().is_empty() {
            return Err("stylesheet_url must not be empty".to_string());
        }
        if self.diagram_selector.trim().is_empty() {
            return Err("diagram_selector must not be empty".to_string());
        }
        if self.timeouts.content_idle.is_zero() {
            return Err("timeouts.content_idle must be positive".to_string());
        }
        if self.timeouts.diagram_wait.is_zero() {
            return Err("timeouts.diagram_wait must be positive".to_string());
        }
        Ok(())
    }
}
