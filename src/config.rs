//! Configuration module for pdfbind.
//!
//! This module turns CLI arguments into a validated configuration that
//! drives one binding run. It handles:
//! - Defaulting the directory to the current working directory
//! - The reserved output name and the marker that keeps it out of scans
//! - The reference page size used by the converters
//! - Validation of argument combinations

use anyhow::{Result, bail};

use crate::cli::Cli;
use crate::error::BindError;
use std::path::PathBuf;

/// Name of the merged output file written into the scanned directory.
pub const DEFAULT_OUTPUT_NAME: &str = "merge.pdf";

/// Files whose name contains this marker are never scanned as inputs.
pub const DEFAULT_RESERVED_MARKER: &str = "merge";

/// A page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
}

impl PageSize {
    /// ISO A4 portrait.
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    /// The same page turned on its side.
    pub fn rotate(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Whether the page is wider than it is tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// The larger of the two dimensions.
    pub fn max_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Complete configuration for one binding run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose top-level files are bound together.
    pub directory: PathBuf,

    /// File name of the merged output inside `directory`.
    pub output_name: String,

    /// Substring that excludes a file from scanning.
    pub reserved_marker: String,

    /// Reference page size for converted images and documents.
    pub page_size: PageSize,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Optional JSON file extending the bundled font table.
    pub font_map: Option<PathBuf>,
}

impl Config {
    /// Build a default configuration for the given directory.
    pub fn for_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            reserved_marker: DEFAULT_RESERVED_MARKER.to_string(),
            page_size: PageSize::A4,
            verbose: false,
            quiet: false,
            font_map: None,
        }
    }

    /// Full path of the merged output file.
    pub fn output_path(&self) -> PathBuf {
        self.directory.join(&self.output_name)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory path is empty
    /// - Verbose and quiet modes are both enabled
    /// - The output name does not end in `.pdf`
    /// - The output name would be picked up by the next scan
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            bail!("Directory path cannot be empty");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if !self.output_name.ends_with(".pdf") {
            bail!("Output name must end in .pdf: {}", self.output_name);
        }

        if self.reserved_marker.is_empty() || !self.output_name.contains(&self.reserved_marker) {
            bail!(
                "Output name '{}' must contain the reserved marker '{}'",
                self.output_name,
                self.reserved_marker
            );
        }

        Ok(())
    }
}

impl TryFrom<&Cli> for Config {
    type Error = BindError;

    fn try_from(cli: &Cli) -> std::result::Result<Self, Self::Error> {
        let directory = match &cli.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let config = Self {
            verbose: cli.verbose,
            quiet: cli.quiet,
            font_map: cli.font_map.clone(),
            ..Self::for_directory(directory)
        };

        config.validate()?;
        Ok(config)
    }
}
