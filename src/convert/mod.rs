//! Conversion of non-PDF inputs into single PDF artifacts.
//!
//! Each converter takes its batch of sources and returns a [`BatchReport`]:
//! the artifacts it produced and the sources it had to skip. A skipped
//! source never stops the batch.
//!
//! Artifacts are written next to their source. The preferred name is
//! `<base>.pdf`; when that name is taken (an original PDF already on disk,
//! or an artifact produced earlier in the same run) the artifact falls
//! back to `<base>.<ext>.pdf`. If both are taken the source is skipped.

pub mod document;
pub mod fonts;
pub mod image;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{BindError, Result, Skipped};
use crate::scan::SourceFile;

pub use self::document::DocumentConverter;
pub use self::fonts::FontTable;
pub use self::image::ImageConverter;

/// A PDF taking part in the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArtifact {
    /// The PDF file.
    pub output: PathBuf,
    /// The file it was made from (the PDF itself for original inputs).
    pub origin: SourceFile,
    /// Whether this run created the file and must delete it afterwards.
    pub generated: bool,
}

impl ConvertedArtifact {
    /// An artifact this run created from `origin`.
    pub fn generated(output: impl Into<PathBuf>, origin: SourceFile) -> Self {
        Self {
            output: output.into(),
            origin,
            generated: true,
        }
    }

    /// An original PDF input, merged as is and never deleted.
    pub fn original(origin: SourceFile) -> Self {
        Self {
            output: origin.path.clone(),
            origin,
            generated: false,
        }
    }

    /// File name of the PDF, used for merge ordering.
    pub fn file_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What one converter produced for its batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Artifacts written, in source order.
    pub artifacts: Vec<ConvertedArtifact>,
    /// Sources that were not converted.
    pub skipped: Vec<Skipped>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of converting `source`.
    pub fn record(&mut self, source: &SourceFile, outcome: Result<ConvertedArtifact>) {
        match outcome {
            Ok(artifact) => self.artifacts.push(artifact),
            Err(err) => self.skip(source, err),
        }
    }

    /// Record `source` as skipped.
    pub fn skip(&mut self, source: &SourceFile, reason: BindError) {
        tracing::warn!("Skipping {}: {}", source.path.display(), reason.reason());
        self.skipped.push(Skipped::new(source.path.clone(), reason));
    }

    /// Fold another report into this one.
    pub fn extend(&mut self, other: BatchReport) {
        self.artifacts.extend(other.artifacts);
        self.skipped.extend(other.skipped);
    }
}

/// Hands out artifact paths that never overwrite an existing file.
#[derive(Debug, Default)]
pub struct ArtifactNamer {
    claimed: HashSet<PathBuf>,
}

impl ArtifactNamer {
    /// Create a namer with nothing claimed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an artifact path for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::OutputCollision`] if `<base>.pdf` and
    /// `<base>.<ext>.pdf` are both taken.
    pub fn claim(&mut self, source: &SourceFile) -> Result<PathBuf> {
        let dir = source.path.parent().unwrap_or_else(|| Path::new("."));
        let primary = dir.join(format!("{}.pdf", source.base_name()));
        let fallback = dir.join(format!("{}.pdf", source.file_name()));

        for candidate in [primary, fallback.clone()] {
            if !self.is_taken(&candidate) {
                self.claimed.insert(candidate.clone());
                return Ok(candidate);
            }
        }

        Err(BindError::OutputCollision {
            path: source.path.clone(),
            taken: fallback,
        })
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }
}
