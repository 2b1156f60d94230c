//! PDF merging.
//!
//! Pages are copied as opaque units: no re-rendering, no re-compression.

pub mod merger;

pub use merger::{MergeJob, MergeSummary, Merger};

use crate::error::Result;

/// Merge `job.inputs` into `job.output` with a default [`Merger`].
pub fn merge(job: &MergeJob) -> Result<MergeSummary> {
    Merger::new().merge(job)
}
