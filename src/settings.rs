use std::path::Path;
use std::time::Duration;

use htmlpdf_lib::{Config, PageSetup, Timeouts};

use crate::cli::Cli;

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct ExportFlagSources {
    pub diagram_timeout: bool,
    pub idle_timeout: bool,
    pub page_format: bool,
    pub margins: bool,
}

impl ExportFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            diagram_timeout: flag_present(args, "--diagram-timeout"),
            idle_timeout: flag_present(args, "--idle-timeout"),
            page_format: flag_present(args, "--page-format"),
            margins: flag_present(args, "--margins"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Merge CLI arguments with the config file, preferring CLI when flags are
/// present; for flags clap cannot default (`Option` fields) presence alone
/// decides.
pub fn resolve_export_config(cli: &Cli, config: &Config, flags: &ExportFlagSources) -> Config {
    Config {
        stylesheet_url: cli
            .stylesheet_url
            .clone()
            .unwrap_or_else(|| config.stylesheet_url.clone()),
        screenshot_path: cli
            .screenshot
            .clone()
            .unwrap_or_else(|| config.screenshot_path.clone()),
        diagram_selector: cli
            .diagram_selector
            .clone()
            .unwrap_or_else(|| config.diagram_selector.clone()),
        page: PageSetup {
            format: if flags.page_format {
                cli.page_format
            } else {
                config.page.format
            },
            margins: if flags.margins {
                cli.margins
            } else {
                config.page.margins
            },
        },
        timeouts: Timeouts {
            content_idle: if flags.idle_timeout {
                Duration::from_secs(cli.idle_timeout)
            } else {
                config.timeouts.content_idle
            },
            diagram_wait: if flags.diagram_timeout {
                Duration::from_secs(cli.diagram_timeout)
            } else {
                config.timeouts.diagram_wait
            },
        },
    }
}

/// Log effective config to stderr (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config, sandbox: bool) {
    let config_source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults/built-in".to_string());
    eprintln!(
        "Effective config (source: {}): format {}, margins {} px, idle timeout {:?}, diagram timeout {:?}, selector '{}', stylesheet {}, screenshot {}, sandbox {}",
        config_source,
        config.page.format,
        config.page.margins,
        config.timeouts.content_idle,
        config.timeouts.diagram_wait,
        config.diagram_selector,
        config.stylesheet_url,
        config.screenshot_path.display(),
        sandbox
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use htmlpdf_lib::{Margins, PageFormat};
    use std::path::PathBuf;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_present_matches_exact_and_equals_form() {
        let args = strings(&["htmlpdf", "in.html", "out.pdf", "--margins=1,2,3,4"]);
        assert!(flag_present(&args, "--margins"));
        assert!(!flag_present(&args, "--page-format"));
    }

    #[test]
    fn resolve_prefers_config_when_flags_absent() {
        let cli = Cli::parse_from(["htmlpdf", "in.html", "out.pdf"]);
        let flags = ExportFlagSources::default();
        let config = Config {
            stylesheet_url: "https://example.com/custom.css".to_string(),
            screenshot_path: PathBuf::from("custom.png"),
            diagram_selector: ".chart".to_string(),
            page: PageSetup {
                format: PageFormat::Legal,
                margins: Margins {
                    top: 1,
                    right: 2,
                    bottom: 3,
                    left: 4,
                },
            },
            timeouts: Timeouts {
                content_idle: Duration::from_secs(7),
                diagram_wait: Duration::from_secs(8),
            },
        };

        let resolved = resolve_export_config(&cli, &config, &flags);
        assert_eq!(resolved.stylesheet_url, "https://example.com/custom.css");
        assert_eq!(resolved.screenshot_path, PathBuf::from("custom.png"));
        assert_eq!(resolved.diagram_selector, ".chart");
        assert_eq!(resolved.page.format, PageFormat::Legal);
        assert_eq!(resolved.page.margins.top, 1);
        assert_eq!(resolved.timeouts.content_idle, Duration::from_secs(7));
        assert_eq!(resolved.timeouts.diagram_wait, Duration::from_secs(8));
    }

    #[test]
    fn resolve_prefers_cli_when_flags_present() {
        let cli = Cli::parse_from([
            "htmlpdf",
            "in.html",
            "out.pdf",
            "--diagram-timeout",
            "3",
            "--idle-timeout",
            "9",
            "--page-format",
            "letter",
            "--margins",
            "5,5,5,5",
            "--stylesheet-url",
            "https://example.com/cli.css",
        ]);
        let flags = ExportFlagSources {
            diagram_timeout: true,
            idle_timeout: true,
            page_format: true,
            margins: true,
        };
        let config = Config::default();

        let resolved = resolve_export_config(&cli, &config, &flags);
        assert_eq!(resolved.stylesheet_url, "https://example.com/cli.css");
        assert_eq!(resolved.page.format, PageFormat::Letter);
        assert_eq!(resolved.page.margins.bottom, 5);
        assert_eq!(resolved.timeouts.content_idle, Duration::from_secs(9));
        assert_eq!(resolved.timeouts.diagram_wait, Duration::from_secs(3));
    }

    #[test]
    fn resolve_keeps_defaults_when_nothing_set() {
        let cli = Cli::parse_from(["htmlpdf", "in.html", "out.pdf"]);
        let flags = ExportFlagSources::from_args(&strings(&["htmlpdf", "in.html", "out.pdf"]));
        let resolved = resolve_export_config(&cli, &Config::default(), &flags);

        assert_eq!(resolved.diagram_selector, ".mermaid");
        assert_eq!(resolved.timeouts.diagram_wait, Duration::from_secs(15));
        assert_eq!(resolved.page.margins, Margins::default());
    }
}
