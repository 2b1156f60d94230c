//! PDF emission for a laid-out document.
//!
//! Fonts are referenced by name only, nothing is embedded. Latin text uses
//! a simple font with `WinAnsiEncoding`; everything else goes through a
//! Type0 font with the `UniGB-UTF16-H` CMap. Both declare the advance
//! widths the layout assumed.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::convert::document::layout::{Layout, Script, Span, winansi_byte};

const FIRST_CHAR: i64 = 32;
const LAST_CHAR: i64 = 255;

/// Build the PDF for `layout`.
pub fn render(layout: &Layout) -> lopdf::Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let fonts = register_fonts(&mut doc, layout);
    let mut font_dict = Dictionary::new();
    for (resource, id) in fonts.values() {
        font_dict.set(resource.as_bytes().to_vec(), Object::Reference(*id));
    }
    let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

    let media_box = Object::Array(vec![
        0.into(),
        0.into(),
        layout.page_size.width.into(),
        layout.page_size.height.into(),
    ]);

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = Vec::new();
        for line in &page.lines {
            for span in &line.spans {
                let Some((resource, _)) = fonts.get(&(span.font.clone(), span.script)) else {
                    continue;
                };
                operations.extend(show_text(span, resource, line.baseline));
            }
        }

        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// PDF name for a font: the physical name with spaces removed.
pub fn base_font_name(font: &str) -> String {
    font.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Encode `text` for a font of the given script.
pub fn encode_text(text: &str, script: Script) -> Object {
    match script {
        Script::Latin => Object::String(
            text.chars()
                .map(|c| winansi_byte(c).unwrap_or(b'?'))
                .collect(),
            StringFormat::Literal,
        ),
        Script::Wide => Object::String(
            text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            StringFormat::Hexadecimal,
        ),
    }
}

type FontKey = (String, Script);

fn register_fonts(doc: &mut Document, layout: &Layout) -> BTreeMap<FontKey, (String, ObjectId)> {
    let mut fonts = BTreeMap::new();

    for span in layout.spans() {
        let key = (span.font.clone(), span.script);
        if fonts.contains_key(&key) {
            continue;
        }

        let resource = format!("F{}", fonts.len() + 1);
        let id = match span.script {
            Script::Latin => add_simple_font(doc, &span.font),
            Script::Wide => add_cid_font(doc, &span.font),
        };
        fonts.insert(key, (resource, id));
    }

    fonts
}

fn font_descriptor(doc: &mut Document, name: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(name.as_bytes().to_vec()),
        "Flags" => 32,
        "FontBBox" => Object::Array(vec![0.into(), (-200).into(), 1000.into(), 900.into()]),
        "ItalicAngle" => 0,
        "Ascent" => 880,
        "Descent" => -120,
        "CapHeight" => 700,
        "StemV" => 80,
    })
}

fn add_simple_font(doc: &mut Document, font: &str) -> ObjectId {
    let name = base_font_name(font);
    let descriptor_id = font_descriptor(doc, &name);
    let advance = (Script::Latin.advance_em() * 1000.0) as i64;
    let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR).map(|_| advance.into()).collect();

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(name.into_bytes()),
        "Encoding" => "WinAnsiEncoding",
        "FirstChar" => FIRST_CHAR,
        "LastChar" => LAST_CHAR,
        "Widths" => widths,
        "FontDescriptor" => descriptor_id,
    })
}

fn add_cid_font(doc: &mut Document, font: &str) -> ObjectId {
    let name = base_font_name(font);
    let descriptor_id = font_descriptor(doc, &name);
    let advance = (Script::Wide.advance_em() * 1000.0) as i64;

    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("GB1"),
            "Supplement" => 2,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => advance,
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(name.into_bytes()),
        "Encoding" => "UniGB-UTF16-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
    })
}

fn show_text(span: &Span, resource: &str, baseline: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(resource.as_bytes().to_vec()), span.size.into()],
        ),
        Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                span.x.into(),
                baseline.into(),
            ],
        ),
        Operation::new("Tj", vec![encode_text(&span.text, span.script)]),
        Operation::new("ET", vec![]),
    ]
}
