//! pdfbind - Bind a directory of images, documents and PDFs into one PDF.

use clap::Parser;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

use pdfbind::cli::Cli;
use pdfbind::config::Config;
use pdfbind::convert::FontTable;
use pdfbind::error::BindError;
use pdfbind::output::{OutputFormatter, display_run_report};
use pdfbind::pipeline;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with_writer(io::stderr)
        .init();

    let formatter = if cli.quiet {
        OutputFormatter::quiet()
    } else if cli.verbose {
        OutputFormatter::verbose()
    } else {
        OutputFormatter::default()
    };

    if let Err(err) = run(&cli, &formatter) {
        tracing::debug!("{err}");
        formatter.error(&err.status_line());
        process::exit(err.exit_code());
    }
}

/// Main application logic.
fn run(cli: &Cli, formatter: &OutputFormatter) -> Result<(), BindError> {
    let config = Config::try_from(cli)?;
    let fonts = FontTable::load(&config)?;

    if formatter.is_verbose() {
        formatter.section(&format!("{} v{}", pdfbind::NAME, pdfbind::VERSION));
        formatter.detail("Directory", &config.directory.display().to_string());
        formatter.detail("Font mappings", &fonts.len().to_string());
    }

    let report = pipeline::process(&config, &fonts, formatter)?;
    display_run_report(formatter, &report);
    Ok(())
}
