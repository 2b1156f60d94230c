//! Terminal messages for a binding run.
//!
//! Status and progress go to stdout, warnings and errors to stderr, so the
//! final status line stays machine readable when diagnostics are noisy.
//!
//! # Examples
//!
//! ```
//! use pdfbind::output::formatter::OutputFormatter;
//!
//! let out = OutputFormatter::new(false, false);
//! out.info("Scanning scans/");
//! out.success("merge succeeded");
//! out.error("merge failed: disk full");
//! ```

use std::io::{self, IsTerminal, Write};

use crate::config::Config;
use crate::error::Skipped;

/// Kind of message, which decides its marker, colour and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Progress and summary lines.
    Info,
    /// The "merge succeeded" line.
    Success,
    /// A skipped input or a cleanup problem.
    Warning,
    /// The status line of an aborted run.
    Error,
}

impl MessageLevel {
    fn marker(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
        }
    }

    fn ansi(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("32"),
            Self::Warning => Some("33"),
            Self::Error => Some("31"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Quiet/verbose aware printer used by the pipeline and the binary.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    stdout_color: bool,
    stderr_color: bool,
}

impl OutputFormatter {
    /// Create a formatter. Colour is enabled per stream when it is a terminal.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        let color_allowed = std::env::var_os("NO_COLOR").is_none();
        Self {
            quiet,
            verbose,
            stdout_color: color_allowed && io::stdout().is_terminal(),
            stderr_color: color_allowed && io::stderr().is_terminal(),
        }
    }

    /// Formatter matching the verbosity of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Errors only.
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Everything, including merge order and cleanup details.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Progress line. Hidden when quiet.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.emit(MessageLevel::Info, message);
        }
    }

    /// Success status line. Hidden when quiet.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.emit(MessageLevel::Success, message);
        }
    }

    /// Warning on stderr. Hidden when quiet; `tracing` still records it.
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.emit(MessageLevel::Warning, message);
        }
    }

    /// Error on stderr. Always shown.
    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    /// Warn about an input that was left out of the merge.
    pub fn skipped(&self, skipped: &Skipped) {
        self.warning(&format!(
            "Skipped {}: {}",
            skipped.path.display(),
            skipped.reason.reason()
        ));
    }

    /// Heading for a verbose block. Hidden when quiet.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// `label: value` line. Verbose only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Numbered entry under a section. Hidden when quiet.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }

    /// Whether verbose output is on.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether only errors are printed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The text printed for `message` at `level`, including marker and colour.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let colored = if level.to_stderr() {
            self.stderr_color
        } else {
            self.stdout_color
        };

        match level.ansi() {
            Some(code) if colored => format!("\x1b[{code}m{}{message}\x1b[0m", level.marker()),
            _ => format!("{}{message}", level.marker()),
        }
    }

    fn emit(&self, level: MessageLevel, message: &str) {
        let line = self.render(level, message);
        // A closed pipe must not turn a finished run into a panic.
        let _ = if level.to_stderr() {
            writeln!(io::stderr().lock(), "{line}")
        } else {
            writeln!(io::stdout().lock(), "{line}")
        };
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
