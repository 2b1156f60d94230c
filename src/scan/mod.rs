//! Directory scanning and input classification.
//!
//! Only the immediate children of the directory are listed. A file takes
//! part in a run when it is a regular file, its extension is one of the
//! supported ones, and its name does not contain the reserved marker.
//!
//! Extensions are compared case-sensitively on the literal text after the
//! last `.`; `Scan.PNG` is not an image. A name without any `.` is its own
//! extension.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BindError, Result};

/// Extensions accepted by the scan.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "pdf", "docx"];

/// What a scanned file will be turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raster image, wrapped into a single-page PDF.
    Image,
    /// Word-processing document, rendered to PDF.
    Document,
    /// Already a PDF, merged as is.
    Pdf,
    /// Anything else.
    Unknown,
}

impl FileKind {
    /// Classify a file by its literal extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "png" | "jpg" => FileKind::Image,
            "docx" => FileKind::Document,
            "pdf" => FileKind::Pdf,
            _ => FileKind::Unknown,
        }
    }
}

/// A file found by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Literal extension (see [`extension_of`]).
    pub extension: String,
    /// Classification derived from the extension.
    pub kind: FileKind,
}

impl SourceFile {
    /// Build a source file record from a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&file_name_of(&path));
        let kind = FileKind::from_extension(&extension);
        Self {
            path,
            extension,
            kind,
        }
    }

    /// File name as a (lossy) string.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    /// File name without its extension.
    pub fn base_name(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) => name[..idx].to_string(),
            None => name,
        }
    }
}

/// Scanned files grouped by kind, each group in filename order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// PNG/JPG inputs.
    pub images: Vec<SourceFile>,
    /// DOCX inputs.
    pub documents: Vec<SourceFile>,
    /// PDF inputs.
    pub pdfs: Vec<SourceFile>,
}

impl Classified {
    /// Total number of classified files.
    pub fn len(&self) -> usize {
        self.images.len() + self.documents.len() + self.pdfs.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Literal extension of a file name: text after the last `.`, or the whole
/// name when there is no `.`.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) => file_name[idx + 1..].to_string(),
        None => file_name.to_string(),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the eligible top-level files of `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`BindError::DirectoryRead`] if the directory itself cannot be
/// listed. Entries that fail individually are logged and skipped.
pub fn scan_directory(dir: &Path, reserved_marker: &str) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(BindError::DirectoryRead {
                    path: dir.to_path_buf(),
                    source: err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                });
            }
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.contains(reserved_marker) {
            debug!("Skipping reserved file: {name}");
            continue;
        }

        let source = SourceFile::new(entry.path());
        if !SUPPORTED_EXTENSIONS.contains(&source.extension.as_str()) {
            continue;
        }

        files.push(source);
    }

    debug!("Scanned {} eligible file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Partition scanned files by kind, preserving their order.
pub fn classify(files: Vec<SourceFile>) -> Classified {
    let mut classified = Classified::default();

    for file in files {
        match file.kind {
            FileKind::Image => classified.images.push(file),
            FileKind::Document => classified.documents.push(file),
            FileKind::Pdf => classified.pdfs.push(file),
            FileKind::Unknown => {}
        }
    }

    classified
}
