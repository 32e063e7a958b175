use clap::Parser;
use htmlpdf_lib::{Margins, PageFormat};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "htmlpdf")]
#[command(
    version,
    about = "Render a local HTML file (with Mermaid diagrams) to a paginated PDF via headless Chromium",
    long_about = "htmlpdf\n\nLoads an HTML file into a headless Chromium instance, waits for network\nactivity to settle, injects the Mermaid stylesheet, waits (non-fatally) for\ndiagram elements, saves a full-page debug screenshot, and prints the page\nto PDF."
)]
pub struct Cli {
    /// Input HTML file
    #[arg(value_name = "input.html")]
    pub input: PathBuf,

    /// Output PDF file
    #[arg(value_name = "output.pdf")]
    pub output: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for stylesheet/screenshot/page/timeouts; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "URL",
        help = "Stylesheet URL injected before the diagram wait"
    )]
    pub stylesheet_url: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Debug screenshot path (overwritten on every run)"
    )]
    pub screenshot: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SELECTOR",
        help = "CSS selector marking diagram containers"
    )]
    pub diagram_selector: Option<String>,

    #[arg(
        long,
        value_name = "SECS",
        default_value = "15",
        help = "Max seconds to wait for a diagram element (expiry is non-fatal)"
    )]
    pub diagram_timeout: u64,

    #[arg(
        long,
        value_name = "SECS",
        default_value = "30",
        help = "Max seconds to wait for page network activity to settle"
    )]
    pub idle_timeout: u64,

    #[arg(
        long,
        default_value = "a4",
        help = "PDF paper format (a4, letter, legal)"
    )]
    pub page_format: PageFormat,

    #[arg(
        long,
        value_name = "T,R,B,L",
        default_value = "40,20,40,20",
        help = "Page margins in px (top,right,bottom,left)"
    )]
    pub margins: Margins,

    #[arg(
        long,
        help = "Keep the Chromium OS sandbox enabled (disabled by default for containerized runs)"
    )]
    pub sandbox: bool,
}

pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::error::ErrorKind;
    use clap::Parser;
    use htmlpdf_lib::PageFormat;

    #[test]
    fn two_positionals_use_defaults() {
        let cli = Cli::parse_from(["htmlpdf", "in.html", "out.pdf"]);

        assert_eq!(cli.input, std::path::PathBuf::from("in.html"));
        assert_eq!(cli.output, std::path::PathBuf::from("out.pdf"));
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.stylesheet_url.is_none());
        assert!(cli.screenshot.is_none());
        assert!(cli.diagram_selector.is_none());
        assert_eq!(cli.diagram_timeout, 15);
        assert_eq!(cli.idle_timeout, 30);
        assert_eq!(cli.page_format, PageFormat::A4);
        assert_eq!(cli.margins.top, 40);
        assert_eq!(cli.margins.left, 20);
        assert!(!cli.sandbox);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "htmlpdf",
            "in.html",
            "out.pdf",
            "--verbose",
            "--config",
            "htmlpdf.toml",
            "--stylesheet-url",
            "https://example.com/mermaid.css",
            "--screenshot",
            "shots/debug.png",
            "--diagram-selector",
            ".diagram",
            "--diagram-timeout",
            "5",
            "--idle-timeout",
            "20",
            "--page-format",
            "letter",
            "--margins",
            "10,10,10,10",
            "--sandbox",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("htmlpdf.toml")));
        assert_eq!(
            cli.stylesheet_url.as_deref(),
            Some("https://example.com/mermaid.css")
        );
        assert_eq!(
            cli.screenshot.as_deref(),
            Some(std::path::Path::new("shots/debug.png"))
        );
        assert_eq!(cli.diagram_selector.as_deref(), Some(".diagram"));
        assert_eq!(cli.diagram_timeout, 5);
        assert_eq!(cli.idle_timeout, 20);
        assert_eq!(cli.page_format, PageFormat::Letter);
        assert_eq!(cli.margins.right, 10);
        assert!(cli.sandbox);
    }

    #[test]
    fn missing_positionals_are_rejected() {
        let err = Cli::try_parse_from(["htmlpdf"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["htmlpdf", "only-input.html"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn invalid_margins_are_rejected_at_parse_time() {
        let err = Cli::try_parse_from(["htmlpdf", "in.html", "out.pdf", "--margins", "1,2,3"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn invalid_page_format_is_rejected_at_parse_time() {
        let err =
            Cli::try_parse_from(["htmlpdf", "in.html", "out.pdf", "--page-format", "tabloid"])
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
