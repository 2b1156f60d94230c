//! Output formatting and display for pdfbind.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - The run summary printed after a successful merge
//! - Quiet and verbose modes
//!
//! Diagnostics go through `tracing`; this module only prints what the user
//! asked to see.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::output::OutputFormatter;
//! use pdfbind::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Scanning directory");
//! formatter.success("merge succeeded");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::pipeline::RunReport;

/// Display the summary of a completed run.
///
/// The status line is always printed (unless quiet); merged inputs, skips
/// and cleanup details only in verbose mode.
pub fn display_run_report(formatter: &OutputFormatter, report: &RunReport) {
    formatter.success("merge succeeded");
    formatter.info(&format!(
        "Wrote {}: {} pages, {}",
        report.output.display(),
        report.pages,
        format_file_size(report.file_size)
    ));

    if !formatter.is_verbose() {
        if !report.skipped.is_empty() {
            formatter.info(&format!("{} input(s) skipped", report.skipped.len()));
        }
        return;
    }

    formatter.section("Merged:");
    for (idx, path) in report.merged.iter().enumerate() {
        formatter.list_item(idx + 1, &path.display().to_string());
    }

    if !report.skipped.is_empty() {
        formatter.section("Skipped:");
        for (idx, skipped) in report.skipped.iter().enumerate() {
            formatter.list_item(
                idx + 1,
                &format!("{} ({})", skipped.path.display(), skipped.reason.reason()),
            );
        }
    }

    formatter.detail("Removed intermediate files", &report.deleted.len().to_string());
    if !report.cleanup_failures.is_empty() {
        formatter.detail(
            "Could not remove",
            &report.cleanup_failures.len().to_string(),
        );
    }
}

/// Format a byte count for humans.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
