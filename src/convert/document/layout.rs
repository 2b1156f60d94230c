//! Line breaking and pagination.
//!
//! Glyph advances are estimated rather than measured: characters that fit
//! the single-byte encoding take half an em, everything else a full em.
//! The renderer declares the same widths in its font dictionaries, so the
//! estimate is what a viewer actually draws.

use crate::config::PageSize;
use crate::convert::document::parse::{Alignment, DocxDocument, Inline, Paragraph, RunStyle};
use crate::convert::fonts::FontTable;

/// Blank border on every side of a page, in points.
pub const PAGE_MARGIN: f32 = 72.0;

/// Line height as a multiple of the largest font size on the line.
pub const LINE_SPACING: f32 = 1.2;

/// Font size used when neither the run nor the document defaults set one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Latin font used when neither the run nor the document defaults name one.
pub const DEFAULT_LATIN_FONT: &str = "Times New Roman";

/// East Asian font used when neither the run nor the document defaults name one.
pub const DEFAULT_EAST_ASIA_FONT: &str = "SimSun";

const TAB_WIDTH_SPACES: usize = 4;

/// WinAnsi code of `c`, if the encoding has one.
///
/// Printable ASCII and the Latin-1 supplement map to themselves; the
/// 0x80-0x9F block holds typographic punctuation and a few letters.
pub fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// How a character is encoded in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Script {
    /// Character with a WinAnsi code.
    Latin,
    /// Anything else, written as UTF-16 through a CID font.
    Wide,
}

impl Script {
    /// Classify a character.
    pub fn of(c: char) -> Self {
        match winansi_byte(c) {
            Some(_) => Script::Latin,
            None => Script::Wide,
        }
    }

    /// Advance width in em.
    pub fn advance_em(self) -> f32 {
        match self {
            Script::Latin => 0.5,
            Script::Wide => 1.0,
        }
    }
}

/// A run of text drawn with one font at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Left edge.
    pub x: f32,
    /// The characters.
    pub text: String,
    /// Physical font name.
    pub font: String,
    /// Encoding class of every character in `text`.
    pub script: Script,
    /// Font size in points.
    pub size: f32,
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Baseline position from the bottom of the page.
    pub baseline: f32,
    /// Text on the line; empty for blank lines.
    pub spans: Vec<Span>,
}

/// One output page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Lines from top to bottom.
    pub lines: Vec<Line>,
}

/// A whole document laid out on pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Page size shared by every page.
    pub page_size: PageSize,
    /// At least one page.
    pub pages: Vec<Page>,
}

impl Layout {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All spans of all pages, in drawing order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .flat_map(|line| line.spans.iter())
    }
}

#[derive(Debug, Clone)]
struct Token {
    text: String,
    width: f32,
    font: String,
    script: Script,
    size: f32,
    space: bool,
}

#[derive(Debug, Default)]
struct PendingLine {
    tokens: Vec<Token>,
    width: f32,
}

impl PendingLine {
    fn push(&mut self, token: Token) {
        self.width += token.width;
        self.tokens.push(token);
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Width without trailing spaces.
    fn ink_width(&self) -> f32 {
        let trailing: f32 = self
            .tokens
            .iter()
            .rev()
            .take_while(|t| t.space)
            .map(|t| t.width)
            .sum();
        self.width - trailing
    }
}

enum Flow {
    Line {
        tokens: Vec<Token>,
        width: f32,
        size: f32,
    },
    PageBreak,
}

/// Lays paragraphs out on pages.
pub struct Typesetter<'a> {
    fonts: &'a FontTable,
    page_size: PageSize,
    defaults: RunStyle,
}

impl<'a> Typesetter<'a> {
    /// Create a typesetter resolving fonts through `fonts`.
    pub fn new(fonts: &'a FontTable, page_size: PageSize) -> Self {
        Self {
            fonts,
            page_size,
            defaults: RunStyle::default(),
        }
    }

    fn avail_width(&self) -> f32 {
        self.page_size.width - 2.0 * PAGE_MARGIN
    }

    /// Lay out `doc`. An empty document yields a single blank page.
    pub fn layout(mut self, doc: &DocxDocument) -> Layout {
        self.defaults = doc.defaults.clone();

        let top = self.page_size.height - PAGE_MARGIN;
        let mut pages = vec![Page::default()];
        let mut y = top;

        for paragraph in &doc.paragraphs {
            if paragraph.page_break_before && pages.last().is_some_and(|p| !p.lines.is_empty()) {
                pages.push(Page::default());
                y = top;
            }

            for flow in self.break_lines(paragraph) {
                match flow {
                    Flow::PageBreak => {
                        pages.push(Page::default());
                        y = top;
                    }
                    Flow::Line {
                        tokens,
                        width,
                        size,
                    } => {
                        let height = size * LINE_SPACING;
                        let page_used = pages.last().is_some_and(|p| !p.lines.is_empty());
                        if y - height < PAGE_MARGIN && page_used {
                            pages.push(Page::default());
                            y = top;
                        }

                        let baseline = y - size;
                        y -= height;

                        let x = PAGE_MARGIN + self.indent(paragraph.alignment, width);
                        let line = Line {
                            baseline,
                            spans: into_spans(tokens, x),
                        };
                        if let Some(page) = pages.last_mut() {
                            page.lines.push(line);
                        }
                    }
                }
            }
        }

        Layout {
            page_size: self.page_size,
            pages,
        }
    }

    fn indent(&self, alignment: Alignment, width: f32) -> f32 {
        let slack = (self.avail_width() - width).max(0.0);
        match alignment {
            Alignment::Left => 0.0,
            Alignment::Center => slack / 2.0,
            Alignment::Right => slack,
        }
    }

    fn break_lines(&self, paragraph: &Paragraph) -> Vec<Flow> {
        let avail = self.avail_width();
        let mut flows = Vec::new();
        let mut line = PendingLine::default();
        let mut after_line_break = false;
        let mut size = self.size_of(&paragraph_style(paragraph).or(&self.defaults));

        for inline in &paragraph.inlines {
            match inline {
                Inline::Text { text, style } => {
                    let style = style.or(&self.defaults);
                    size = self.size_of(&style);

                    for token in self.tokenize(text, &style) {
                        after_line_break = false;
                        if token.space {
                            line.push(token);
                            continue;
                        }

                        if line.width + token.width > avail && !line.is_empty() {
                            flows.push(finish(&mut line, size));
                        }

                        if token.width > avail {
                            for piece in split_chars(token) {
                                if line.width + piece.width > avail && !line.is_empty() {
                                    flows.push(finish(&mut line, size));
                                }
                                line.push(piece);
                            }
                        } else {
                            line.push(token);
                        }
                    }
                }
                Inline::LineBreak => {
                    flows.push(finish(&mut line, size));
                    after_line_break = true;
                }
                Inline::PageBreak => {
                    if !line.is_empty() {
                        flows.push(finish(&mut line, size));
                    }
                    flows.push(Flow::PageBreak);
                    after_line_break = false;
                }
            }
        }

        if !line.is_empty() || flows.is_empty() || after_line_break {
            flows.push(finish(&mut line, size));
        }

        flows
    }

    fn size_of(&self, style: &RunStyle) -> f32 {
        style
            .size
            .or(self.defaults.size)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    fn font_for(&self, script: Script, style: &RunStyle) -> String {
        let name = match script {
            Script::Latin => style.latin_font.as_deref().unwrap_or(DEFAULT_LATIN_FONT),
            Script::Wide => style
                .east_asia_font
                .as_deref()
                .or(style.latin_font.as_deref())
                .unwrap_or(DEFAULT_EAST_ASIA_FONT),
        };
        self.fonts.resolve(name).to_string()
    }

    fn tokenize(&self, text: &str, style: &RunStyle) -> Vec<Token> {
        let size = self.size_of(style);
        let latin_font = self.font_for(Script::Latin, style);
        let wide_font = self.font_for(Script::Wide, style);
        let mut tokens = Vec::new();
        let mut word = String::new();

        let latin = |text: String, space: bool| Token {
            width: text.chars().count() as f32 * Script::Latin.advance_em() * size,
            text,
            font: latin_font.clone(),
            script: Script::Latin,
            size,
            space,
        };

        for c in text.chars() {
            let is_space = c == ' ' || c == '\t';
            let script = Script::of(c);

            if is_space || script == Script::Wide || c.is_control() {
                if !word.is_empty() {
                    tokens.push(latin(std::mem::take(&mut word), false));
                }
            }

            if c == '\t' {
                tokens.push(latin(" ".repeat(TAB_WIDTH_SPACES), true));
            } else if c == ' ' {
                tokens.push(latin(" ".to_string(), true));
            } else if c.is_control() {
                continue;
            } else if script == Script::Wide {
                tokens.push(Token {
                    text: c.to_string(),
                    width: Script::Wide.advance_em() * size,
                    font: wide_font.clone(),
                    script: Script::Wide,
                    size,
                    space: false,
                });
            } else {
                word.push(c);
            }
        }

        if !word.is_empty() {
            tokens.push(latin(word, false));
        }

        tokens
    }
}

/// Style of the first text run, used to size blank lines.
fn paragraph_style(paragraph: &Paragraph) -> RunStyle {
    paragraph
        .inlines
        .iter()
        .find_map(|inline| match inline {
            Inline::Text { style, .. } => Some(style.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn finish(line: &mut PendingLine, fallback_size: f32) -> Flow {
    let width = line.ink_width();
    let tokens = std::mem::take(&mut line.tokens);
    line.width = 0.0;

    let size = tokens
        .iter()
        .map(|t| t.size)
        .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.max(s))))
        .unwrap_or(fallback_size);

    Flow::Line {
        tokens,
        width,
        size,
    }
}

fn split_chars(token: Token) -> Vec<Token> {
    let per_char = token.script.advance_em() * token.size;
    token
        .text
        .chars()
        .map(|c| Token {
            text: c.to_string(),
            width: per_char,
            font: token.font.clone(),
            script: token.script,
            size: token.size,
            space: false,
        })
        .collect()
}

/// Merge adjacent tokens sharing font, script and size into spans.
fn into_spans(tokens: Vec<Token>, start_x: f32) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut x = start_x;

    for token in tokens {
        match spans.last_mut() {
            Some(span)
                if span.font == token.font
                    && span.script == token.script
                    && span.size == token.size =>
            {
                span.text.push_str(&token.text);
            }
            _ => spans.push(Span {
                x,
                text: token.text.clone(),
                font: token.font.clone(),
                script: token.script,
                size: token.size,
            }),
        }
        x += token.width;
    }

    while let Some(span) = spans.last_mut() {
        let trimmed = span.text.trim_end_matches(' ').len();
        span.text.truncate(trimmed);
        if span.text.is_empty() {
            spans.pop();
        } else {
            break;
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::document::parse::parse_document;
    use rstest::rstest;

    fn doc(inner: &str) -> DocxDocument {
        parse_document(&format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        ))
        .unwrap()
    }

    fn layout(inner: &str) -> Layout {
        let fonts = FontTable::bundled().unwrap();
        Typesetter::new(&fonts, PageSize::A4).layout(&doc(inner))
    }

    fn line_texts(layout: &Layout) -> Vec<String> {
        layout
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .map(|l| l.spans.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_script_of() {
        assert_eq!(Script::of('a'), Script::Latin);
        assert_eq!(Script::of('é'), Script::Latin);
        assert_eq!(Script::of('宋'), Script::Wide);
        assert_eq!(Script::of('Ж'), Script::Wide);
        assert_eq!(Script::of('。'), Script::Wide);
    }

    #[rstest]
    #[case('\u{2018}', 0x91)]
    #[case('\u{201D}', 0x94)]
    #[case('\u{2013}', 0x96)]
    #[case('\u{2014}', 0x97)]
    #[case('\u{2026}', 0x85)]
    #[case('\u{20AC}', 0x80)]
    #[case('é', 0xE9)]
    fn test_typographic_punctuation_is_latin(#[case] c: char, #[case] code: u8) {
        assert_eq!(winansi_byte(c), Some(code));
        assert_eq!(Script::of(c), Script::Latin);
    }

    #[test]
    fn test_split_chars_keeps_script_advance() {
        let token = Token {
            text: "宋体".to_string(),
            width: 1000.0,
            font: "SimSun".to_string(),
            script: Script::Wide,
            size: 500.0,
            space: false,
        };

        let pieces = split_chars(token);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|p| p.width == 500.0));
    }

    #[test]
    fn test_empty_document_is_one_blank_page() {
        let layout = layout("");
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].lines.is_empty());
    }

    #[test]
    fn test_single_line() {
        let layout = layout(r#"<w:p><w:r><w:t>Hello world</w:t></w:r></w:p>"#);

        assert_eq!(layout.page_count(), 1);
        assert_eq!(line_texts(&layout), vec!["Hello world"]);
        let line = &layout.pages[0].lines[0];
        assert_eq!(line.spans[0].x, PAGE_MARGIN);
        assert_eq!(line.baseline, 842.0 - PAGE_MARGIN - DEFAULT_FONT_SIZE);
        assert_eq!(line.spans[0].font, "Times New Roman");
    }

    #[test]
    fn test_wraps_long_paragraph() {
        // 451pt of text width at 12pt -> 75 Latin characters per line.
        let words = vec!["word"; 40].join(" ");
        let layout = layout(&format!(r#"<w:p><w:r><w:t>{words}</w:t></w:r></w:p>"#));

        let lines = line_texts(&layout);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 75);
            assert!(!line.starts_with(' '));
        }
        assert_eq!(lines.join(" "), words);
    }

    #[test]
    fn test_breaks_between_wide_characters() {
        let text = "宋".repeat(60);
        let layout = layout(&format!(
            r#"<w:p><w:r><w:rPr><w:rFonts w:eastAsia="宋体"/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#
        ));

        let lines = line_texts(&layout);
        // 451pt / 12pt -> 37 wide characters per line.
        assert_eq!(lines[0].chars().count(), 37);
        assert_eq!(lines[1].chars().count(), 23);
        assert!(layout.spans().all(|s| s.font == "SimSun"));
    }

    #[test]
    fn test_fonts_resolved_per_script() {
        let layout = layout(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial" w:eastAsia="微软雅黑"/></w:rPr><w:t>Hi 你好</w:t></w:r></w:p>"#,
        );

        let spans: Vec<&Span> = layout.spans().collect();
        assert_eq!(spans[0].font, "Arial");
        assert_eq!(spans[0].script, Script::Latin);
        assert_eq!(spans[1].font, "Microsoft Yahei");
        assert_eq!(spans[1].script, Script::Wide);
        assert_eq!(spans[1].text, "你好");
    }

    #[test]
    fn test_page_break() {
        let layout = layout(
            r#"<w:p><w:r><w:t>one</w:t><w:br w:type="page"/><w:t>two</w:t></w:r></w:p>"#,
        );
        assert_eq!(layout.page_count(), 2);
        assert_eq!(line_texts(&layout), vec!["one", "two"]);
    }

    #[test]
    fn test_page_break_before_first_paragraph_does_not_add_page() {
        let layout = layout(
            r#"<w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>first</w:t></w:r></w:p><w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>second</w:t></w:r></w:p>"#,
        );
        assert_eq!(layout.page_count(), 2);
    }

    #[test]
    fn test_paginates_when_full() {
        // 698pt of text height / 14.4pt per line -> 48 lines per page.
        let paragraphs = r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#.repeat(60);
        let layout = layout(&paragraphs);

        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.pages[0].lines.len(), 48);
        assert_eq!(layout.pages[1].lines.len(), 12);
    }

    #[test]
    fn test_alignment() {
        let layout = layout(
            r#"<w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t>ab</w:t></w:r></w:p><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>ab</w:t></w:r></w:p>"#,
        );
        let right = &layout.pages[0].lines[0].spans[0];
        let center = &layout.pages[0].lines[1].spans[0];

        // "ab" is 12pt wide at 12pt.
        assert!((right.x - (595.0 - PAGE_MARGIN - 12.0)).abs() < 0.01);
        assert!((center.x - (PAGE_MARGIN + (451.0 - 12.0) / 2.0)).abs() < 0.01);
    }

    #[test]
    fn test_blank_paragraph_keeps_its_line() {
        let layout = layout(r#"<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>b</w:t></w:r></w:p>"#);
        assert_eq!(line_texts(&layout), vec!["a", "", "b"]);
    }

    #[test]
    fn test_line_break() {
        let layout = layout(r#"<w:p><w:r><w:t>a</w:t><w:br/><w:t>b</w:t></w:r></w:p>"#);
        assert_eq!(line_texts(&layout), vec!["a", "b"]);
    }
}
