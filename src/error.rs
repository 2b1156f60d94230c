//! Error types for pdfbind.
//!
//! This module defines all error types that can occur while binding a
//! directory into a single PDF. Errors carry the path they concern so that
//! skip records and log lines can name the offending file.
//!
//! # Error Categories
//!
//! - **Directory Errors**: missing or unreadable input directory
//! - **Conversion Errors**: images that fail to decode, documents that fail to render
//! - **PDF Errors**: corrupt merge inputs
//! - **Output Errors**: the merged file cannot be created or written
//! - **Cleanup Errors**: a generated file cannot be removed

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfbind operations.
pub type Result<T> = std::result::Result<T, BindError>;

/// Main error type for pdfbind operations.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The input directory does not exist.
    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The input directory exists but cannot be listed.
    #[error("Cannot read directory: {}\n  Reason: {source}", path.display())]
    DirectoryRead {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No PDF is left to merge after conversion.
    #[error("No PDF files found")]
    NoPdfsFound,

    /// An image could not be decoded.
    #[error("Failed to decode image: {}\n  Reason: {reason}", path.display())]
    Decode {
        /// Path to the image.
        path: PathBuf,
        /// Reason reported by the decoder.
        reason: String,
    },

    /// A word-processing document could not be rendered.
    #[error("Failed to convert document: {}\n  Reason: {reason}", path.display())]
    Conversion {
        /// Path to the document.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A merge input is not a usable PDF.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptPdf {
        /// Path to the PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// The merged output cannot be created or written.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    OutputWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Every merge input was skipped.
    #[error("None of the {attempted} input PDF(s) could be read")]
    NothingMerged {
        /// Number of inputs that were tried.
        attempted: usize,
    },

    /// A generated file could not be deleted.
    #[error("Failed to remove generated file: {}\n  Reason: {source}", path.display())]
    Cleanup {
        /// Path of the generated file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Every candidate name for a converted file is already taken.
    #[error("Cannot convert {}: output name already taken by {}", path.display(), taken.display())]
    OutputCollision {
        /// Source file that was not converted.
        path: PathBuf,
        /// Existing file blocking the conversion.
        taken: PathBuf,
    },

    /// An image lost its base name to a later image with the same base name.
    #[error("Skipped {}: superseded by {}", path.display(), by.display())]
    Superseded {
        /// Image that was dropped.
        path: PathBuf,
        /// Image that replaced it.
        by: PathBuf,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<anyhow::Error> for BindError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(format!("{err:#}"))
    }
}

impl BindError {
    /// Create a Decode error.
    pub fn decode(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::Decode {
            path,
            reason: reason.into(),
        }
    }

    /// Create a Conversion error.
    pub fn conversion(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::Conversion {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptPdf error.
    pub fn corrupt_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an OutputWrite error.
    pub fn output_write(path: PathBuf, source: io::Error) -> Self {
        Self::OutputWrite { path, source }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single input item.
    ///
    /// Recoverable errors are recorded as skips and the run continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::Conversion { .. }
                | Self::CorruptPdf { .. }
                | Self::Cleanup { .. }
                | Self::OutputCollision { .. }
                | Self::Superseded { .. }
        )
    }

    /// Check if this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. }
                | Self::NoPdfsFound
                | Self::OutputWrite { .. }
                | Self::NothingMerged { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirectoryNotFound { .. } => 2,
            Self::DirectoryRead { .. } => 2,
            Self::NoPdfsFound => 1,
            Self::Decode { .. } => 3,
            Self::Conversion { .. } => 3,
            Self::CorruptPdf { .. } => 3,
            Self::OutputWrite { .. } => 5,
            Self::NothingMerged { .. } => 6,
            Self::Cleanup { .. } => 5,
            Self::OutputCollision { .. } => 4,
            Self::Superseded { .. } => 4,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
        }
    }

    /// The one-line status reported when this error ends a run.
    pub fn status_line(&self) -> String {
        match self {
            Self::DirectoryNotFound { .. } => "directory not found".to_string(),
            Self::NoPdfsFound => "no PDFs found".to_string(),
            other => format!("merge failed: {}", other.reason()),
        }
    }

    /// A short single-line reason, without the path prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Decode { reason, .. } | Self::Conversion { reason, .. } => reason.clone(),
            Self::CorruptPdf { details, .. } => details.clone(),
            Self::OutputWrite { source, .. }
            | Self::DirectoryRead { source, .. }
            | Self::Cleanup { source, .. }
            | Self::Io { source } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// One input left out of the run, with the reason it was dropped.
#[derive(Debug)]
pub struct Skipped {
    /// The input that was skipped.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: BindError,
}

impl Skipped {
    /// Record `path` as skipped because of `reason`.
    pub fn new(path: impl Into<PathBuf>, reason: BindError) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}
