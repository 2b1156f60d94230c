//! PDF I/O operations.
//!
//! Reading turns an input PDF into an ordered page stream; writing appends
//! page streams to a single output and commits it in one step.

pub mod reader;
pub mod writer;

pub use reader::{PageStream, open_for_read};
pub use writer::{MergeWriter, WrittenPdf, save_document};
