//! PDF writing.
//!
//! This module provides:
//! - [`MergeWriter`]: accumulates pages from many input PDFs and commits
//!   them atomically (write to a temporary sibling, then rename)
//! - [`save_document`]: writes a freshly built document, removing the
//!   file again if the write fails part-way
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::io::{open_for_read, MergeWriter};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = MergeWriter::create(Path::new("out/merge.pdf"))?;
//! writer.copy_pages(open_for_read(Path::new("a.pdf"))?)?;
//! writer.copy_pages(open_for_read(Path::new("b.pdf"))?)?;
//! let written = writer.finish()?;
//! println!("{} pages, {} bytes", written.page_count, written.file_size);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object, ObjectId, dictionary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{BindError, Result};
use crate::io::reader::PageStream;

/// What a committed [`MergeWriter`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPdf {
    /// Final path of the written file.
    pub path: PathBuf,

    /// Number of pages in the written document.
    pub page_count: usize,

    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// Writer bound to one output path, collecting pages in append order.
///
/// The output is staged in a hidden temporary file next to the target. A
/// writer dropped without [`MergeWriter::finish`] removes that file, so a
/// failed merge never leaves a half-written document under the final name.
#[derive(Debug)]
pub struct MergeWriter {
    output: PathBuf,
    temp_path: PathBuf,
    file: Option<File>,
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
    committed: bool,
}

impl MergeWriter {
    /// Bind a fresh writer to `output` and create its staging file.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::OutputWrite`] if the staging file cannot be
    /// created (missing directory, insufficient permissions, ...).
    pub fn create(output: &Path) -> Result<Self> {
        let temp_path = staging_path(output);
        let file = File::create(&temp_path)
            .map_err(|e| BindError::output_write(output.to_path_buf(), e))?;

        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Ok(Self {
            output: output.to_path_buf(),
            temp_path,
            file: Some(file),
            document,
            pages_id,
            page_count: 0,
            committed: false,
        })
    }

    /// Output path this writer is bound to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Append every page of `stream`, in order, as opaque units.
    ///
    /// The input's objects are renumbered above the writer's current ids
    /// and its page tree is hung under the writer's root, so inherited page
    /// attributes and content streams are carried over untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::CorruptPdf`] if the input has no usable page
    /// tree root. The writer is left unchanged in that case.
    pub fn copy_pages(&mut self, stream: PageStream) -> Result<usize> {
        let count = stream.page_count();
        let source = stream.path().to_path_buf();
        let mut doc = stream.into_document();

        doc.renumber_objects_with(self.document.max_id + 1);

        let source_root = doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| BindError::corrupt_pdf(source.clone(), e.to_string()))?;

        let root_dict = doc
            .get_object_mut(source_root)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BindError::corrupt_pdf(source.clone(), e.to_string()))?;
        root_dict.set("Parent", self.pages_id);
        root_dict.set("Count", count as i64);

        self.document.max_id = self.document.max_id.max(doc.max_id);
        self.document.objects.extend(doc.objects);

        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BindError::output_write(self.output.clone(), std::io::Error::other(e)))?;

        if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
            kids.push(Object::Reference(source_root));
        }
        self.page_count += count;
        pages.set("Count", self.page_count as i64);

        debug!("Copied {count} page(s) from {}", source.display());
        Ok(count)
    }

    /// Serialize the collected pages and move them into place.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::OutputWrite`] if serializing, flushing or the
    /// final rename fails.
    pub fn finish(mut self) -> Result<WrittenPdf> {
        let output = self.output.clone();
        let write_err = |e: std::io::Error| BindError::output_write(output.clone(), e);

        self.document.prune_objects();
        self.document.renumber_objects();

        let file = match self.file.take() {
            Some(file) => file,
            None => File::create(&self.temp_path).map_err(write_err)?,
        };
        let mut writer = BufWriter::new(file);

        self.document
            .save_to(&mut writer)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        std::fs::rename(&self.temp_path, &self.output).map_err(write_err)?;
        self.committed = true;

        let file_size = std::fs::metadata(&self.output)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(WrittenPdf {
            path: self.output.clone(),
            page_count: self.page_count,
            file_size,
        })
    }
}

impl Drop for MergeWriter {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {e}", self.temp_path.display());
                }
            }
        }
    }
}

/// Hidden sibling used to stage `output` before the final rename.
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.partial"))
}

/// Write a freshly built document to `path`.
///
/// If the write fails after the file was created, the partial file is
/// removed before the error is returned.
pub fn save_document(doc: &mut Document, path: &Path) -> std::io::Result<u64> {
    let result = (|| {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        doc.save_to(&mut writer).map_err(std::io::Error::other)?;
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = result {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
        return Err(e);
    }

    Ok(std::fs::metadata(path).map(|m| m.len()).unwrap_or(0))
}
