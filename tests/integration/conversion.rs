use crate::common::*;

use pdfbind::config::Config;
use pdfbind::convert::FontTable;
use pdfbind::output::OutputFormatter;
use pdfbind::{BindError, process};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
#[case::wide_png("scan.png", 300, 100, (842.0, 595.0))]
#[case::tall_jpg("scan.jpg", 100, 300, (595.0, 842.0))]
#[case::square_png("scan.png", 64, 64, (842.0, 595.0))]
fn test_image_page_orientation(
    #[case] name: &str,
    #[case] width: u32,
    #[case] height: u32,
    #[case] expected: (f32, f32),
) {
    let dir = tempdir().unwrap();
    write_image(&dir, name, width, height);

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(page_sizes(&report.output), vec![expected]);
    assert!(!dir.path().join("scan.pdf").exists());
}

#[test]
fn test_document_fonts_are_mapped() {
    let dir = tempdir().unwrap();
    write_docx(&dir, "letter.docx", &paragraph("你好", "宋体"));

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(base_fonts(&report.output), vec!["SimSun"]);
}

#[test]
fn test_user_font_map_overrides_bundled_entry() {
    let dir = tempdir().unwrap();
    write_docx(&dir, "letter.docx", &paragraph("你好", "宋体"));

    let fonts_dir = tempdir().unwrap();
    let font_map = fonts_dir.path().join("fonts.json");
    std::fs::write(&font_map, r#"{ "宋体": "Noto Serif CJK SC" }"#).unwrap();

    let mut config = Config::for_directory(dir.path());
    config.font_map = Some(font_map);
    let fonts = FontTable::load(&config).unwrap();
    let report = process(&config, &fonts, &OutputFormatter::quiet()).unwrap();

    assert_eq!(base_fonts(&report.output), vec!["NotoSerifCJKSC"]);
}

#[test]
fn test_invalid_font_map_is_a_config_error() {
    let dir = tempdir().unwrap();
    let font_map = dir.path().join("fonts.json");
    std::fs::write(&font_map, "not json").unwrap();

    let mut config = Config::for_directory(dir.path());
    config.font_map = Some(font_map);

    let err = FontTable::load(&config).unwrap_err();
    assert!(matches!(err, BindError::InvalidConfig { .. }));
}

#[test]
fn test_long_document_spans_pages() {
    let dir = tempdir().unwrap();
    let body: String = (0..120)
        .map(|i| paragraph(&format!("Line number {i}"), "Times New Roman"))
        .collect();
    write_docx(&dir, "long.docx", &body);

    let report = bind(&dir).unwrap();

    // 48 lines fit on an A4 page with 12pt text.
    assert_eq!(report.pages, 3);
    assert!(
        page_sizes(&report.output)
            .iter()
            .all(|&size| size == (595.0, 842.0))
    );
}

#[test]
fn test_page_break_in_document() {
    let dir = tempdir().unwrap();
    let body = format!(
        "{}<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>{}",
        paragraph("first", "Arial"),
        paragraph("second", "Arial")
    );
    write_docx(&dir, "breaks.docx", &body);

    let report = bind(&dir).unwrap();
    assert_eq!(report.pages, 2);
}

#[test]
fn test_broken_document_is_skipped() {
    let dir = tempdir().unwrap();
    write_garbage(&dir, "broken.docx");
    write_pdf(&dir, "ok.pdf", 1);

    let report = bind(&dir).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, dir.path().join("broken.docx"));
    assert!(matches!(report.skipped[0].reason, BindError::Conversion { .. }));
    assert!(!dir.path().join("broken.pdf").exists());
}
