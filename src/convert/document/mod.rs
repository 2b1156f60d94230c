//! DOCX to PDF conversion.
//!
//! A document goes through three steps: the package is read into
//! paragraphs and runs ([`parse`]), the text is broken into lines and pages
//! ([`layout`]), and the pages are written out as PDF ([`render`]). Font
//! names are resolved through the injected [`FontTable`] during layout.

pub mod layout;
pub mod parse;
pub mod render;

use std::path::Path;

use tracing::{debug, info};

use crate::config::PageSize;
use crate::convert::fonts::FontTable;
use crate::convert::{ArtifactNamer, BatchReport, ConvertedArtifact};
use crate::error::{BindError, Result};
use crate::io::save_document;
use crate::scan::SourceFile;

pub use layout::{Layout, Typesetter};
pub use parse::{DocxDocument, read_package};

/// Converts DOCX files into PDFs.
#[derive(Debug, Clone)]
pub struct DocumentConverter<'a> {
    fonts: &'a FontTable,
    page_size: PageSize,
}

impl<'a> DocumentConverter<'a> {
    /// Create a converter resolving fonts through `fonts`.
    pub fn new(fonts: &'a FontTable, page_size: PageSize) -> Self {
        Self { fonts, page_size }
    }

    /// Convert a batch of documents. Failures are recorded and skipped.
    pub fn convert_all(&self, documents: &[SourceFile], namer: &mut ArtifactNamer) -> BatchReport {
        let mut report = BatchReport::new();

        for source in documents {
            let outcome = namer
                .claim(source)
                .and_then(|output| self.convert(source, &output));
            report.record(source, outcome);
        }

        report
    }

    /// Convert one document into a PDF at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Conversion`] if the package cannot be read or
    /// parsed, or the PDF cannot be written. No partial output is left.
    pub fn convert(&self, source: &SourceFile, output: &Path) -> Result<ConvertedArtifact> {
        let layout = self.layout(&source.path)?;
        debug!(
            "{}: {} page(s) laid out",
            source.path.display(),
            layout.page_count()
        );

        let mut doc = render::render(&layout)
            .map_err(|e| BindError::conversion(source.path.clone(), e.to_string()))?;

        save_document(&mut doc, output).map_err(|e| {
            BindError::conversion(
                source.path.clone(),
                format!("cannot write {}: {e}", output.display()),
            )
        })?;

        info!("Converted {} -> {}", source.path.display(), output.display());
        Ok(ConvertedArtifact::generated(output, source.clone()))
    }

    /// Read and lay out the document at `path`.
    pub fn layout(&self, path: &Path) -> Result<Layout> {
        let document = read_package(path)
            .map_err(|e| BindError::conversion(path.to_path_buf(), format!("{e:#}")))?;

        Ok(Typesetter::new(self.fonts, self.page_size).layout(&document))
    }
}
