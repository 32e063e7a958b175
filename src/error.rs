use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read input HTML {path}: {source}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to launch headless browser: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Browser(#[from] CdpError),

    #[error("Page network activity did not settle within {0:?}")]
    IdleTimeout(Duration),

    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExportError {
    pub fn launch(message: impl Into<String>) -> Self {
        ExportError::Launch(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ExportError::Config(message.into())
    }

    /// A one-line hint for the most common failure causes, printed
    /// alongside the error message.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            ExportError::InputRead { .. } => {
                Some("Check that the input HTML path exists and is readable.")
            }
            ExportError::Launch(_) => Some(
                "Install Chromium/Chrome and ensure it is discoverable, or point CHROME at the executable.",
            ),
            ExportError::IdleTimeout(_) => Some(
                "Increase --idle-timeout, or check that the page's external resources are reachable.",
            ),
            ExportError::OutputWrite { .. } => {
                Some("Check that the output directory exists and is writable.")
            }
            ExportError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("margins") {
                    Some("Pass margins as T,R,B,L in pixels (e.g., --margins 40,20,40,20).")
                } else if lower.contains("timeout") {
                    Some("Timeouts must be positive (e.g., --diagram-timeout 15).")
                } else {
                    Some("Check flags/paths and the config file; run with --verbose for the effective settings.")
                }
            }
            ExportError::Browser(_) | ExportError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn input_read_display_names_path() {
        let err = ExportError::InputRead {
            path: Path::new("missing.html").to_path_buf(),
            source: std::io::Error::other("no such file"),
        };
        let rendered = format!("{}", err);
        assert!(rendered.contains("missing.html"));
        assert!(rendered.contains("no such file"));
    }

    #[test]
    fn launch_error_suggests_installing_chromium() {
        let err = ExportError::launch("spawn failed");
        let hint = err.remediation().unwrap_or_default();
        assert!(
            hint.contains("Chromium"),
            "expected Chromium install hint, got: {hint}"
        );
    }

    #[test]
    fn config_error_with_margins_gets_margins_hint() {
        let err = ExportError::config("Invalid margins: expected four values");
        let hint = err.remediation().unwrap_or_default();
        assert!(
            hint.contains("T,R,B,L"),
            "expected margins format hint, got: {hint}"
        );
    }

    #[test]
    fn config_error_falls_back_to_generic_hint() {
        let err = ExportError::config("something else");
        let hint = err.remediation().unwrap_or_default();
        assert!(hint.contains("--verbose"));
    }

    #[test]
    fn idle_timeout_display_includes_duration() {
        let err = ExportError::IdleTimeout(Duration::from_secs(30));
        assert!(format!("{}", err).contains("30s"));
    }
}
