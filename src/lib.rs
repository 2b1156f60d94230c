//! pdfbind - Bind the images, documents and PDFs of a directory into a single PDF.
//!
//! One run over a directory:
//!
//! - lists its top-level files, ignoring any whose name contains `merge`
//! - wraps every PNG and JPG into a one-page PDF
//! - renders every DOCX into a PDF, mapping locale font names to installed fonts
//! - concatenates all PDFs, original and generated, in file name order into
//!   `merge.pdf`
//! - removes the PDFs it generated along the way
//!
//! A file that cannot be converted or read is skipped and reported; the run
//! only fails when the directory is missing, nothing is left to merge, or the
//! output cannot be written.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::config::Config;
//! use pdfbind::convert::FontTable;
//! use pdfbind::output::OutputFormatter;
//! use pdfbind::pipeline;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::for_directory("scans");
//! let fonts = FontTable::load(&config)?;
//! let report = pipeline::process(&config, &fonts, &OutputFormatter::quiet())?;
//! println!("{} pages in {}", report.pages, report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Merging PDFs directly
//!
//! ```no_run
//! use pdfbind::merge::{merge, MergeJob};
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let job = MergeJob::new(
//!     "out/merge.pdf",
//!     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//! );
//! let summary = merge(&job)?;
//! println!("{} pages, {} skipped", summary.pages, summary.skipped.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod scan;

// Re-export commonly used types
pub use config::Config;
pub use error::{BindError, Result, Skipped};
pub use pipeline::{RunReport, process};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
