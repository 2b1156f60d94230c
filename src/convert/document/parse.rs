//! WordprocessingML reading.
//!
//! Only the parts needed to lay out running text are read: paragraphs,
//! runs, text, tabs, breaks, run fonts and sizes, paragraph alignment and
//! the document-wide default font from `word/styles.xml`. Tables are read
//! as the sequence of paragraphs they contain, and so are text boxes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Part holding the document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Optional part holding styles and document defaults.
pub const STYLES_PART: &str = "word/styles.xml";

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

impl Alignment {
    fn from_val(val: &str) -> Self {
        match val {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

/// Font names and size declared on a run (or as document defaults).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStyle {
    /// Font for Latin text (`w:ascii`, else `w:hAnsi`).
    pub latin_font: Option<String>,
    /// Font for East Asian text (`w:eastAsia`).
    pub east_asia_font: Option<String>,
    /// Size in points.
    pub size: Option<f32>,
}

impl RunStyle {
    /// Fill unset fields from `defaults`.
    pub fn or(&self, defaults: &RunStyle) -> RunStyle {
        RunStyle {
            latin_font: self.latin_font.clone().or_else(|| defaults.latin_font.clone()),
            east_asia_font: self
                .east_asia_font
                .clone()
                .or_else(|| defaults.east_asia_font.clone()),
            size: self.size.or(defaults.size),
        }
    }

    fn apply_fonts(&mut self, e: &BytesStart<'_>) {
        if let Some(font) = attr(e, b"ascii").or_else(|| attr(e, b"hAnsi")) {
            self.latin_font = Some(font);
        }
        if let Some(font) = attr(e, b"eastAsia") {
            self.east_asia_font = Some(font);
        }
    }

    fn apply_size(&mut self, e: &BytesStart<'_>) {
        if let Some(half_points) = attr(e, b"val").and_then(|v| v.parse::<f32>().ok()) {
            if half_points > 0.0 {
                self.size = Some(half_points / 2.0);
            }
        }
    }
}

/// A piece of paragraph content.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Text with the style of its run.
    Text {
        /// The characters; tabs are kept as `\t`.
        text: String,
        /// Style of the enclosing run.
        style: RunStyle,
    },
    /// Line break inside the paragraph.
    LineBreak,
    /// Forced page break.
    PageBreak,
}

/// One paragraph of the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Content in reading order.
    pub inlines: Vec<Inline>,
    /// Horizontal alignment.
    pub alignment: Alignment,
    /// Whether the paragraph must start on a new page.
    pub page_break_before: bool,
}

impl Paragraph {
    /// Concatenated text of the paragraph.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// The parsed body of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxDocument {
    /// Paragraphs in reading order.
    pub paragraphs: Vec<Paragraph>,
    /// Document default run style from `word/styles.xml`.
    pub defaults: RunStyle,
}

/// Read and parse the package at `path`.
pub fn read_package(path: &Path) -> anyhow::Result<DocxDocument> {
    use anyhow::Context;

    let file = File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).context("not a DOCX package")?;

    let body = read_part(&mut archive, DOCUMENT_PART)?
        .with_context(|| format!("missing {DOCUMENT_PART}"))?;
    let styles = read_part(&mut archive, STYLES_PART)?;

    let mut document = parse_document(&body).with_context(|| format!("malformed {DOCUMENT_PART}"))?;
    if let Some(styles) = styles {
        document.defaults =
            parse_defaults(&styles).with_context(|| format!("malformed {STYLES_PART}"))?;
    }

    Ok(document)
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> anyhow::Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// A paragraph still being read.
///
/// Text boxes hold paragraphs of their own inside a run. When one opens,
/// the enclosing paragraph is split: what was read so far is emitted, and
/// the remainder resumes after the text box with the same properties.
struct OpenParagraph {
    paragraph: Paragraph,
    resumed: bool,
}

impl OpenParagraph {
    fn new() -> Self {
        Self {
            paragraph: Paragraph::default(),
            resumed: false,
        }
    }

    /// Emit the content read so far, keep reading into a continuation.
    fn split(&mut self, out: &mut Vec<Paragraph>) {
        if self.paragraph.inlines.is_empty() {
            return;
        }
        let continuation = Paragraph {
            inlines: Vec::new(),
            alignment: self.paragraph.alignment,
            page_break_before: false,
        };
        out.push(std::mem::replace(&mut self.paragraph, continuation));
        self.resumed = true;
    }

    fn close(self, out: &mut Vec<Paragraph>) {
        if !(self.resumed && self.paragraph.inlines.is_empty()) {
            out.push(self.paragraph);
        }
    }
}

/// Parse `word/document.xml`.
///
/// Paragraphs nested in text boxes come out in reading order between the
/// two halves of the paragraph that anchors them. Of an
/// `mc:AlternateContent` block only the first `mc:Choice` is read.
pub fn parse_document(xml: &str) -> anyhow::Result<DocxDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut runs: Vec<RunStyle> = Vec::new();
    let mut in_paragraph_props = false;
    let mut in_run_props = false;
    let mut in_text = false;
    // One entry per open mc:AlternateContent: whether a branch was taken.
    let mut alternates: Vec<bool> = Vec::new();
    // Depth inside an ignored element; zero when reading.
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event()?;

        if skipping > 0 {
            match &event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let empty = matches!(event, Event::Empty(_));
                let name = e.local_name();
                match name.as_ref() {
                    b"AlternateContent" if !empty => alternates.push(false),
                    b"Choice" | b"Fallback" if !empty => match alternates.last_mut() {
                        Some(taken) if *taken => skipping = 1,
                        Some(taken) => *taken = true,
                        None => {}
                    },
                    b"p" => {
                        if let Some(outer) = open.last_mut() {
                            outer.split(&mut paragraphs);
                        }
                        if empty {
                            paragraphs.push(Paragraph::default());
                        } else {
                            open.push(OpenParagraph::new());
                        }
                    }
                    b"pPr" if !empty => in_paragraph_props = true,
                    b"jc" if in_paragraph_props && !in_run_props => {
                        if let (Some(p), Some(val)) = (open.last_mut(), attr(e, b"val")) {
                            p.paragraph.alignment = Alignment::from_val(&val);
                        }
                    }
                    b"pageBreakBefore" if in_paragraph_props => {
                        if let Some(p) = open.last_mut() {
                            p.paragraph.page_break_before = is_on(e);
                        }
                    }
                    b"r" if !empty && !in_paragraph_props => runs.push(RunStyle::default()),
                    b"rPr" if !empty => in_run_props = true,
                    b"rFonts" if in_run_props && !in_paragraph_props => {
                        if let Some(style) = runs.last_mut() {
                            style.apply_fonts(e);
                        }
                    }
                    b"sz" if in_run_props && !in_paragraph_props => {
                        if let Some(style) = runs.last_mut() {
                            style.apply_size(e);
                        }
                    }
                    b"t" if !empty && !runs.is_empty() => in_text = true,
                    b"tab" if !runs.is_empty() && !in_paragraph_props => {
                        push_text(open.last_mut(), runs.last(), "\t");
                    }
                    b"br" | b"cr" if !runs.is_empty() => {
                        let inline = match attr(e, b"type").as_deref() {
                            Some("page") => Inline::PageBreak,
                            _ => Inline::LineBreak,
                        };
                        if let Some(p) = open.last_mut() {
                            p.paragraph.inlines.push(inline);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                push_text(open.last_mut(), runs.last(), &text);
            }
            Event::CData(t) if in_text => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                push_text(open.last_mut(), runs.last(), &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(done) = open.pop() {
                        done.close(&mut paragraphs);
                    }
                }
                b"AlternateContent" => {
                    alternates.pop();
                }
                b"pPr" => in_paragraph_props = false,
                b"rPr" => in_run_props = false,
                b"r" if !in_paragraph_props => {
                    runs.pop();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    while let Some(done) = open.pop() {
        done.close(&mut paragraphs);
    }

    Ok(DocxDocument {
        paragraphs,
        defaults: RunStyle::default(),
    })
}

/// Parse the document defaults (`w:docDefaults/w:rPrDefault`) of
/// `word/styles.xml`.
pub fn parse_defaults(xml: &str) -> anyhow::Result<RunStyle> {
    let mut reader = Reader::from_str(xml);
    let mut defaults = RunStyle::default();
    let mut in_defaults = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"rPrDefault" => in_defaults = true,
            Event::End(e) if e.local_name().as_ref() == b"rPrDefault" => in_defaults = false,
            Event::Start(e) | Event::Empty(e) if in_defaults => match e.local_name().as_ref() {
                b"rFonts" => defaults.apply_fonts(&e),
                b"sz" => defaults.apply_size(&e),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(defaults)
}

fn push_text(paragraph: Option<&mut OpenParagraph>, style: Option<&RunStyle>, text: &str) {
    if text.is_empty() {
        return;
    }
    let (Some(open), Some(style)) = (paragraph, style) else {
        return;
    };
    let p = &mut open.paragraph;

    if let Some(Inline::Text {
        text: last,
        style: last_style,
    }) = p.inlines.last_mut()
    {
        if last_style == style {
            last.push_str(text);
            return;
        }
    }

    p.inlines.push(Inline::Text {
        text: text.to_string(),
        style: style.clone(),
    });
}

/// Value of the attribute whose local name is `key`.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Toggle properties are on unless `w:val` says otherwise.
fn is_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, b"val").as_deref(), Some("0" | "false" | "off"))
}
