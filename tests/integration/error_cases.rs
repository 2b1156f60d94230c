use crate::common::*;

use pdfbind::cli::Cli;
use pdfbind::config::Config;
use pdfbind::convert::FontTable;
use pdfbind::output::OutputFormatter;
use pdfbind::{BindError, process};
use tempfile::tempdir;

#[test]
fn test_missing_directory() {
    let dir = tempdir().unwrap();
    let config = Config::for_directory(dir.path().join("nope"));

    let err = process(&config, &FontTable::empty(), &OutputFormatter::quiet()).unwrap_err();

    assert!(matches!(err, BindError::DirectoryNotFound { .. }));
    assert_eq!(err.status_line(), "directory not found");
    assert!(err.is_fatal());
}

#[test]
fn test_only_excluded_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"plain text").unwrap();
    std::fs::write(dir.path().join("slides.pptx"), b"not handled").unwrap();
    write_pdf(&dir, "merge-old.pdf", 2);
    write_image(&dir, "premerged.png", 10, 10);

    let err = bind(&dir).unwrap_err();

    assert!(matches!(err, BindError::NoPdfsFound));
    assert!(!dir.path().join("merge.pdf").exists());
    assert!(!dir.path().join("premerged.pdf").exists());
}

#[test]
fn test_nothing_convertible() {
    let dir = tempdir().unwrap();
    write_garbage(&dir, "a.png");
    write_garbage(&dir, "b.docx");

    let err = bind(&dir).unwrap_err();

    assert!(matches!(err, BindError::NoPdfsFound));
    assert_eq!(file_names(&dir), vec!["a.png", "b.docx"]);
}

#[test]
fn test_every_pdf_corrupt() {
    let dir = tempdir().unwrap();
    write_garbage(&dir, "a.pdf");
    write_garbage(&dir, "b.pdf");

    let err = bind(&dir).unwrap_err();

    assert!(matches!(err, BindError::NothingMerged { .. }));
    assert!(!dir.path().join("merge.pdf").exists());
    assert!(!dir.path().join(".merge.pdf.partial").exists());
}

#[test]
fn test_subdirectories_are_not_descended() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("deep.pdf"), b"").unwrap();

    let err = bind(&dir).unwrap_err();
    assert!(matches!(err, BindError::NoPdfsFound));
}

#[test]
fn test_verbose_and_quiet_rejected() {
    let cli = Cli {
        directory: Some(std::path::PathBuf::from(".")),
        verbose: true,
        quiet: true,
        font_map: None,
    };

    let err = Config::try_from(&cli).unwrap_err();
    assert!(matches!(err, BindError::InvalidConfig { .. }));
}
