//! CLI argument parsing for pdfbind.
//!
//! This module defines the command-line interface structure using `clap`.

use clap::Parser;
use std::path::PathBuf;

/// Bind the images, documents and PDFs of a directory into a single PDF.
///
/// pdfbind converts every PNG, JPG and DOCX file at the top level of a
/// directory into PDF, concatenates them with the PDFs already there in
/// filename order, writes the result to `merge.pdf` and removes the
/// intermediate files it created.
#[derive(Parser, Debug)]
#[command(name = "pdfbind")]
#[command(version)]
#[command(about = "Bind a directory of images, documents and PDFs into merge.pdf", long_about = None)]
#[command(author)]
pub struct Cli {
    /// Directory to bind (defaults to the current directory)
    ///
    /// Only files directly inside this directory are considered.
    /// Files whose name contains "merge" are skipped, so running
    /// twice never feeds a previous merge.pdf back in.
    #[arg(value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Verbose output - show every conversion, skip and cleanup step
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// JSON file mapping document font names to installed fonts
    ///
    /// Entries extend and override the bundled table, e.g.
    ///   { "宋体": "Noto Serif CJK SC", "Calibri": "Carlito" }
    #[arg(long, value_name = "FILE", env = "PDFBIND_FONT_MAP")]
    pub font_map: Option<PathBuf>,
}

impl Cli {
    /// Default `tracing` filter directive for the chosen verbosity.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "pdfbind=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
