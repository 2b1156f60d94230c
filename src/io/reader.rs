//! PDF reading.
//!
//! An input PDF is opened into a [`PageStream`]: the parsed document plus
//! the ordered list of its pages. Pages stay opaque; nothing here decodes
//! content streams.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::io::reader::open_for_read;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = open_for_read(Path::new("chapter.pdf"))?;
//! println!("{} has {} pages", stream.path().display(), stream.page_count());
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, ObjectId};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BindError, Result};

/// An opened input PDF exposed as an ordered sequence of page handles.
#[derive(Debug)]
pub struct PageStream {
    /// Source file.
    path: PathBuf,

    /// The parsed document.
    document: Document,

    /// Page object ids in page order.
    pages: Vec<ObjectId>,
}

impl PageStream {
    /// Path of the backing PDF.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the stream.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page handles in original order.
    pub fn pages(&self) -> &[ObjectId] {
        &self.pages
    }

    /// Give up the stream and return the document backing it.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Open an existing PDF for page copying.
///
/// # Errors
///
/// Returns [`BindError::CorruptPdf`] if:
/// - The file cannot be read or parsed
/// - The PDF is encrypted
/// - The PDF has no pages
pub fn open_for_read(path: &Path) -> Result<PageStream> {
    let path_buf = path.to_path_buf();

    let document = Document::load(path)
        .map_err(|e| BindError::corrupt_pdf(path_buf.clone(), e.to_string()))?;

    if document.is_encrypted() {
        return Err(BindError::corrupt_pdf(path_buf, "PDF is encrypted"));
    }

    let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
    if pages.is_empty() {
        return Err(BindError::corrupt_pdf(path_buf, "PDF has no pages"));
    }

    debug!("Opened {} ({} pages)", path.display(), pages.len());

    Ok(PageStream {
        path: path_buf,
        document,
        pages,
    })
}
