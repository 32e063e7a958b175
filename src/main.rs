mod cli;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use htmlpdf_lib::{BrowserOptions, Config, ExportError, PdfExporter};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let is_info = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            // clap prints help to stdout and usage errors to stderr.
            let _ = err.print();
            return if is_info {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            };
        }
    };

    let config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err),
    };
    let flag_sources = settings::ExportFlagSources::from_args(&raw_args);
    let resolved = settings::resolve_export_config(&args, &config, &flag_sources);
    if let Err(err) = resolved.validate() {
        return render_error(ExportError::config(err));
    }
    if args.verbose {
        settings::log_effective_config(args.config.as_deref(), &resolved, args.sandbox);
    }

    let exporter = PdfExporter::new(resolved)
        .with_browser_options(BrowserOptions {
            sandbox: args.sandbox,
            executable: std::env::var_os("CHROME").map(PathBuf::from),
            ..BrowserOptions::default()
        })
        .with_progress(Arc::new(|msg: &str| println!("{msg}")))
        .with_warnings(Arc::new(|msg: &str| eprintln!("Warning: {msg}")));

    match exporter.export(&args.input, &args.output).await {
        Ok(report) => {
            println!("PDF created successfully: {}", report.output_path.display());
            if args.verbose {
                eprintln!("Export finished in {:.1}s", report.elapsed.as_secs_f32());
            }
            ExitCode::SUCCESS
        }
        Err(err) => render_error(err),
    }
}

fn render_error(err: ExportError) -> ExitCode {
    eprintln!("Error: {err}");
    if let Some(hint) = err.remediation() {
        eprintln!("Hint: {hint}");
    }
    ExitCode::from(1)
}
