use crate::common::*;

use pdfbind::cli::Cli;
use pdfbind::config::Config;
use pdfbind::convert::FontTable;
use pdfbind::output::OutputFormatter;
use pdfbind::{BindError, process};
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn test_mixed_directory_in_name_order() {
    let dir = tempdir().unwrap();
    write_image(&dir, "a.png", 200, 100);
    write_pdf(&dir, "b.pdf", 2);
    write_docx(&dir, "c.docx", &paragraph("你好", "宋体"));

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 4);
    assert_eq!(
        report.merged,
        vec![
            dir.path().join("a.pdf"),
            dir.path().join("b.pdf"),
            dir.path().join("c.pdf"),
        ]
    );
    assert!(report.skipped.is_empty());
    assert_eq!(report.deleted.len(), 2);

    let output = dir.path().join("merge.pdf");
    assert_eq!(page_count(&output), 4);

    // The wide image is placed on a landscape page, everything else is portrait.
    let sizes = page_sizes(&output);
    assert_eq!(sizes[0], (842.0, 595.0));
    assert!(sizes[1..].iter().all(|&size| size == (595.0, 842.0)));

    assert_eq!(
        file_names(&dir),
        vec!["a.png", "b.pdf", "c.docx", "merge.pdf"]
    );
}

#[test]
fn test_pages_come_from_inputs_in_name_order() {
    let dir = tempdir().unwrap();
    write_sized_pdf(&dir, "c.pdf", 3, 300);
    write_image(&dir, "b.png", 40, 80);
    write_sized_pdf(&dir, "a.pdf", 2, 100);
    write_sized_pdf(&dir, "B.pdf", 1, 200);

    let report = bind(&dir).unwrap();

    let widths: Vec<f32> = page_sizes(&report.output).iter().map(|&(w, _)| w).collect();
    assert_eq!(widths, vec![200.0, 100.0, 100.0, 595.0, 300.0, 300.0, 300.0]);
}

#[test]
fn test_second_run_ignores_previous_output() {
    let dir = tempdir().unwrap();
    write_pdf(&dir, "a.pdf", 1);
    write_image(&dir, "b.jpg", 50, 80);

    let first = bind(&dir).unwrap();
    let second = bind(&dir).unwrap();

    assert_eq!(first.pages, 2);
    assert_eq!(second.pages, 2);
    assert_eq!(second.merged, first.merged);
    assert_eq!(page_count(&dir.path().join("merge.pdf")), 2);
}

#[test]
fn test_corrupt_pdf_is_skipped() {
    let dir = tempdir().unwrap();
    write_pdf(&dir, "a.pdf", 1);
    write_garbage(&dir, "b.pdf");
    write_pdf(&dir, "c.pdf", 2);

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.merged.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, dir.path().join("b.pdf"));
    assert!(matches!(report.skipped[0].reason, BindError::CorruptPdf { .. }));
}

#[test]
fn test_undecodable_image_does_not_stop_the_run() {
    let dir = tempdir().unwrap();
    write_garbage(&dir, "a.png");
    write_image(&dir, "b.png", 100, 100);

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.merged, vec![dir.path().join("b.pdf")]);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].reason, BindError::Decode { .. }));
    assert!(!dir.path().join("b.pdf").exists());
}

#[test]
fn test_existing_pdf_keeps_its_name() {
    let dir = tempdir().unwrap();
    write_pdf(&dir, "report.pdf", 1);
    write_docx(&dir, "report.docx", &paragraph("Quarterly figures", "Arial"));

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(
        report.merged,
        vec![dir.path().join("report.docx.pdf"), dir.path().join("report.pdf")]
    );
    assert_eq!(report.deleted, vec![dir.path().join("report.docx.pdf")]);
    assert!(dir.path().join("report.pdf").exists());
}

#[test]
fn test_images_sharing_a_base_name() {
    let dir = tempdir().unwrap();
    write_image(&dir, "photo.jpg", 60, 40);
    write_image(&dir, "photo.png", 40, 60);

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, dir.path().join("photo.jpg"));
    assert!(matches!(report.skipped[0].reason, BindError::Superseded { .. }));
    // The surviving page comes from the portrait PNG.
    assert_eq!(page_sizes(&dir.path().join("merge.pdf")), vec![(595.0, 842.0)]);
}

#[test]
fn test_failed_merge_keeps_generated_files() {
    let dir = tempdir().unwrap();
    write_image(&dir, "a.png", 10, 10);
    // A directory in the output's place makes the final rename fail.
    std::fs::create_dir(dir.path().join("merge.pdf")).unwrap();

    let err = bind(&dir).unwrap_err();

    assert!(matches!(err, BindError::OutputWrite { .. }));
    assert!(err.is_fatal());
    assert!(dir.path().join("a.pdf").exists());
    assert!(!dir.path().join(".merge.pdf.partial").exists());
}

#[test]
#[serial]
fn test_defaults_to_current_directory() {
    let dir = tempdir().unwrap();
    write_pdf(&dir, "only.pdf", 3);

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let cli = Cli {
        directory: None,
        verbose: false,
        quiet: true,
        font_map: None,
    };
    let result = Config::try_from(&cli).and_then(|config| {
        let fonts = FontTable::load(&config)?;
        process(&config, &fonts, &OutputFormatter::quiet())
    });

    std::env::set_current_dir(previous).unwrap();

    let report = result.unwrap();
    assert_eq!(report.pages, 3);
    assert!(dir.path().join("merge.pdf").exists());
}
