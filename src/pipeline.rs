//! One binding run over a directory.
//!
//! Steps, in order: scan, classify, convert images, convert documents,
//! sort, merge, clean up. The run aborts when the directory does not exist,
//! when no PDF is left to merge, or when the merge itself fails. Anything
//! that goes wrong with a single input is recorded and skipped.
//!
//! Generated artifacts are deleted only after a successful merge. A failed
//! merge leaves them on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::convert::{
    ArtifactNamer, BatchReport, ConvertedArtifact, DocumentConverter, FontTable, ImageConverter,
};
use crate::error::{BindError, Result, Skipped};
use crate::merge::{MergeJob, Merger};
use crate::output::OutputFormatter;
use crate::scan::{classify, scan_directory};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// The merged document.
    pub output: PathBuf,
    /// Pages in the merged document.
    pub pages: usize,
    /// Size of the merged document in bytes.
    pub file_size: u64,
    /// PDFs merged, in page order.
    pub merged: Vec<PathBuf>,
    /// Inputs left out, from conversion and from merging.
    pub skipped: Vec<Skipped>,
    /// Generated artifacts removed after the merge.
    pub deleted: Vec<PathBuf>,
    /// Generated artifacts that could not be removed.
    pub cleanup_failures: Vec<BindError>,
}

/// Run the whole pipeline for `config`.
///
/// # Errors
///
/// - [`BindError::DirectoryNotFound`] if the directory does not exist
/// - [`BindError::NoPdfsFound`] if nothing is left to merge
/// - [`BindError::OutputWrite`] or [`BindError::NothingMerged`] if the merge fails
pub fn process(config: &Config, fonts: &FontTable, formatter: &OutputFormatter) -> Result<RunReport> {
    let dir = config.directory.as_path();
    ensure_directory(dir)?;

    formatter.info(&format!("Scanning {}", dir.display()));
    let files = match scan_directory(dir, &config.reserved_marker) {
        Ok(files) => files,
        Err(err) => {
            warn!("{err}");
            formatter.warning(&format!("Cannot list {}: {}", dir.display(), err.reason()));
            Vec::new()
        }
    };

    let classified = classify(files);
    debug!(
        "Classified {} image(s), {} document(s), {} PDF(s)",
        classified.images.len(),
        classified.documents.len(),
        classified.pdfs.len()
    );

    let mut namer = ArtifactNamer::new();
    let mut conversions = BatchReport::new();
    conversions.extend(ImageConverter::new(config.page_size).convert_all(&classified.images, &mut namer));
    conversions.extend(
        DocumentConverter::new(fonts, config.page_size).convert_all(&classified.documents, &mut namer),
    );

    for skipped in &conversions.skipped {
        formatter.skipped(skipped);
    }

    let generated = conversions.artifacts.clone();
    let inputs = merge_order(
        classified
            .pdfs
            .into_iter()
            .map(ConvertedArtifact::original)
            .chain(conversions.artifacts),
    );

    if inputs.is_empty() {
        return Err(BindError::NoPdfsFound);
    }

    if formatter.is_verbose() {
        formatter.section("Merge order:");
        for (idx, artifact) in inputs.iter().enumerate() {
            formatter.list_item(idx + 1, &artifact.file_name());
        }
    }

    let job = MergeJob::new(
        config.output_path(),
        inputs.iter().map(|a| a.output.clone()).collect(),
    );
    let summary = Merger::new().merge(&job)?;

    for skipped in &summary.skipped {
        formatter.skipped(skipped);
    }

    let (deleted, cleanup_failures) = clean_up(&generated);
    for failure in &cleanup_failures {
        formatter.warning(&failure.to_string());
    }

    let mut skipped = conversions.skipped;
    skipped.extend(summary.skipped);

    info!(
        "Merged {} file(s) into {} ({} pages)",
        summary.merged.len(),
        summary.output.display(),
        summary.pages
    );

    Ok(RunReport {
        output: summary.output,
        pages: summary.pages,
        file_size: summary.file_size,
        merged: summary.merged,
        skipped,
        deleted,
        cleanup_failures,
    })
}

fn ensure_directory(dir: &Path) -> Result<()> {
    let not_found = || BindError::DirectoryNotFound {
        path: dir.to_path_buf(),
    };

    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(not_found()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        // Exists but cannot be inspected; the scan reports it.
        Err(_) => Ok(()),
    }
}

/// Sort merge inputs by file name, byte-wise, keeping each path once.
pub fn merge_order(artifacts: impl IntoIterator<Item = ConvertedArtifact>) -> Vec<ConvertedArtifact> {
    let mut sorted: Vec<ConvertedArtifact> = artifacts.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.file_name()
            .as_bytes()
            .cmp(b.file_name().as_bytes())
            .then_with(|| a.output.cmp(&b.output))
    });
    sorted.dedup_by(|a, b| a.output == b.output);
    sorted
}

/// Remove generated artifacts. Failures are logged and returned, never raised.
fn clean_up(generated: &[ConvertedArtifact]) -> (Vec<PathBuf>, Vec<BindError>) {
    let mut deleted = Vec::new();
    let mut failures = Vec::new();

    for artifact in generated.iter().filter(|a| a.generated) {
        match std::fs::remove_file(&artifact.output) {
            Ok(()) => {
                debug!("Removed {}", artifact.output.display());
                deleted.push(artifact.output.clone());
            }
            Err(source) => {
                warn!("Could not remove {}: {source}", artifact.output.display());
                failures.push(BindError::Cleanup {
                    path: artifact.output.clone(),
                    source,
                });
            }
        }
    }

    (deleted, failures)
}
