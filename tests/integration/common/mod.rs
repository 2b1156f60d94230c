//! Shared fixtures for the integration tests.
//!
//! Every fixture is generated into a temporary directory: PDFs with lopdf,
//! images with the image crate, DOCX packages with zip.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};
use tempfile::TempDir;
use zip::write::FileOptions;

/// Write a PDF with `pages` empty A4 pages.
pub fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
    write_sized_pdf(dir, name, pages, 595)
}

/// Write a PDF with `pages` empty pages, `width` points wide and A4 tall.
pub fn write_sized_pdf(dir: &TempDir, name: &str, pages: usize, width: i64) -> PathBuf {
    let path = dir.path().join(name);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => Object::Array(vec![0.into(), 0.into(), width.into(), 842.into()]),
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(&path).unwrap();
    path
}

/// Write a solid-colour PNG or JPG (format taken from the extension).
pub fn write_image(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    RgbImage::from_pixel(width, height, Rgb([40, 120, 200]))
        .save(&path)
        .unwrap();
    path
}

/// Write a DOCX whose body is `body` (WordprocessingML inside `w:body`).
pub fn write_docx(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    let options = FileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
    )
    .unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    )
    .unwrap();
    zip.finish().unwrap();
    path
}

/// A one-paragraph body in the given East Asian font.
pub fn paragraph(text: &str, font: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="{font}" w:eastAsia="{font}"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
    )
}

/// Write a file that claims to be something it is not.
pub fn write_garbage(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"this is not what the extension says").unwrap();
    path
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// (width, height) of every page of the PDF at `path`, in page order.
pub fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            (
                media_box[2].as_float().unwrap(),
                media_box[3].as_float().unwrap(),
            )
        })
        .collect()
}

/// Sorted names of the files in `dir`.
pub fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// `BaseFont` names of every font dictionary in the PDF at `path`.
pub fn base_fonts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    let mut names: Vec<String> = doc
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| matches!(dict.get(b"Type").and_then(Object::as_name), Ok(b"Font")))
        .filter_map(|dict| dict.get(b"BaseFont").and_then(Object::as_name).ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Run the pipeline over `dir` with the bundled font table and no output.
pub fn bind(dir: &TempDir) -> pdfbind::Result<pdfbind::RunReport> {
    let config = pdfbind::Config::for_directory(dir.path());
    let fonts = pdfbind::convert::FontTable::load(&config)?;
    pdfbind::process(&config, &fonts, &pdfbind::output::OutputFormatter::quiet())
}
