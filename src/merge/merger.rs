//! Concatenation of PDF files into one output.
//!
//! Inputs are copied whole, in the order of the job, through a single
//! [`MergeWriter`]. An input that cannot be opened is recorded as a skip;
//! the merge fails only when the output cannot be written or no input
//! contributed a page.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{BindError, Result, Skipped};
use crate::io::{MergeWriter, open_for_read};

/// An ordered list of input PDFs and the file they are merged into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    /// Destination of the merged document.
    pub output: PathBuf,
    /// Inputs in the order their pages should appear.
    pub inputs: Vec<PathBuf>,
}

impl MergeJob {
    /// Create a job writing `inputs` into `output`.
    pub fn new(output: impl Into<PathBuf>, inputs: Vec<PathBuf>) -> Self {
        Self {
            output: output.into(),
            inputs,
        }
    }
}

/// Outcome of a successful merge.
#[derive(Debug)]
pub struct MergeSummary {
    /// Path of the merged document.
    pub output: PathBuf,
    /// Total number of pages written.
    pub pages: usize,
    /// Inputs whose pages made it into the output, in order.
    pub merged: Vec<PathBuf>,
    /// Inputs that could not be read.
    pub skipped: Vec<Skipped>,
    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// Concatenates input PDFs page by page.
#[derive(Debug, Default)]
pub struct Merger;

impl Merger {
    /// Create a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Append every page of every input to `job.output`, in input order.
    ///
    /// Unreadable inputs are skipped and reported in the summary. The output
    /// replaces any previous file at the same path only once it has been
    /// written completely.
    ///
    /// # Errors
    ///
    /// - [`BindError::OutputWrite`] if the output cannot be created or written
    /// - [`BindError::NothingMerged`] if no input contributed a page
    pub fn merge(&self, job: &MergeJob) -> Result<MergeSummary> {
        let mut writer = MergeWriter::create(&job.output)?;
        let mut merged = Vec::with_capacity(job.inputs.len());
        let mut skipped = Vec::new();

        for (idx, path) in job.inputs.iter().enumerate() {
            debug!("[{}/{}] Merging {}", idx + 1, job.inputs.len(), path.display());

            match Self::append(&mut writer, path) {
                Ok(pages) => {
                    debug!("  {pages} page(s) added");
                    merged.push(path.clone());
                }
                Err(err) => {
                    warn!("Skipping {}: {}", path.display(), err.reason());
                    skipped.push(Skipped::new(path.clone(), err));
                }
            }
        }

        if merged.is_empty() {
            return Err(BindError::NothingMerged {
                attempted: job.inputs.len(),
            });
        }

        let written = writer.finish()?;
        info!(
            "Wrote {} ({} pages from {} file(s))",
            written.path.display(),
            written.page_count,
            merged.len()
        );

        Ok(MergeSummary {
            output: written.path,
            pages: written.page_count,
            merged,
            skipped,
            file_size: written.file_size,
        })
    }

    fn append(writer: &mut MergeWriter, path: &Path) -> Result<usize> {
        let stream = open_for_read(path)?;
        writer.copy_pages(stream)
    }
}
