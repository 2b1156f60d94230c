//! Image to PDF conversion.
//!
//! Every image becomes a one-page PDF. Images taller than wide go on a
//! portrait page, all others on a landscape page. The image is scaled
//! uniformly to fit inside the page margins and centred.

use std::collections::HashMap;
use std::path::Path;

use ::image::{DynamicImage, GenericImageView};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, info};

use crate::config::PageSize;
use crate::convert::{ArtifactNamer, BatchReport, ConvertedArtifact};
use crate::error::{BindError, Result};
use crate::io::save_document;
use crate::scan::SourceFile;

/// Blank border kept around the image, in points.
pub const IMAGE_MARGIN: f32 = 36.0;

/// Where an image lands on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// The page the image is drawn on.
    pub page: PageSize,
    /// Left edge of the image.
    pub x: f32,
    /// Bottom edge of the image.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

impl Placement {
    /// Place a `width` x `height` pixel image on a page derived from `base`.
    ///
    /// The page is `base` in portrait for images taller than wide and
    /// turned to landscape otherwise.
    pub fn fit(width: u32, height: u32, base: PageSize) -> Self {
        let portrait = if base.is_landscape() { base.rotate() } else { base };
        let page = if height > width {
            portrait
        } else {
            portrait.rotate()
        };

        let avail_w = page.width - 2.0 * IMAGE_MARGIN;
        let avail_h = page.height - 2.0 * IMAGE_MARGIN;
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let scale = (avail_w / w).min(avail_h / h);

        let (drawn_w, drawn_h) = (w * scale, h * scale);
        Self {
            page,
            x: (page.width - drawn_w) / 2.0,
            y: (page.height - drawn_h) / 2.0,
            width: drawn_w,
            height: drawn_h,
        }
    }
}

/// Converts PNG and JPG files into single-page PDFs.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    page_size: PageSize,
}

impl ImageConverter {
    /// Create a converter placing images on `page_size` pages.
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }

    /// Convert a batch of images.
    ///
    /// Images sharing a base name are folded so that the one sorting last
    /// wins; the others are reported as superseded.
    pub fn convert_all(&self, images: &[SourceFile], namer: &mut ArtifactNamer) -> BatchReport {
        let mut report = BatchReport::new();
        let mut winners: HashMap<String, &SourceFile> = HashMap::new();

        for source in images {
            if let Some(previous) = winners.insert(source.base_name(), source) {
                report.skip(
                    previous,
                    BindError::Superseded {
                        path: previous.path.clone(),
                        by: source.path.clone(),
                    },
                );
            }
        }

        for source in images {
            let wins = winners
                .get(&source.base_name())
                .is_some_and(|winner| winner.path == source.path);
            if !wins {
                continue;
            }

            let outcome = namer
                .claim(source)
                .and_then(|output| self.convert(source, &output));
            report.record(source, outcome);
        }

        report
    }

    /// Convert one image into a PDF at `output`.
    ///
    /// # Errors
    ///
    /// - [`BindError::Decode`] if the image cannot be decoded
    /// - [`BindError::Conversion`] if the PDF cannot be written
    pub fn convert(&self, source: &SourceFile, output: &Path) -> Result<ConvertedArtifact> {
        let img = ::image::open(&source.path)
            .map_err(|e| BindError::decode(source.path.clone(), e.to_string()))?;

        let mut doc = self.render(&img, source)?;
        save_document(&mut doc, output).map_err(|e| {
            BindError::conversion(
                source.path.clone(),
                format!("cannot write {}: {e}", output.display()),
            )
        })?;

        info!("Converted {} -> {}", source.path.display(), output.display());
        Ok(ConvertedArtifact::generated(output, source.clone()))
    }

    /// Build the one-page document showing `img`.
    pub fn render(&self, img: &DynamicImage, source: &SourceFile) -> Result<Document> {
        let (width, height) = img.dimensions();
        let placement = Placement::fit(width, height, self.page_size);
        debug!(
            "{}: {width}x{height} px drawn at {:.1}x{:.1} pt",
            source.path.display(),
            placement.width,
            placement.height
        );

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };

        if img.color().has_alpha() {
            let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
            let smask_id = doc.add_object(compressed(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            )));
            image_dict.set("SMask", smask_id);
        }

        let rgb = img.to_rgb8().into_raw();
        let image_id = doc.add_object(compressed(Stream::new(image_dict, rgb)));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| BindError::conversion(source.path.clone(), e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![
                0.into(),
                0.into(),
                placement.page.width.into(),
                placement.page.height.into(),
            ]),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

fn compressed(mut stream: Stream) -> Stream {
    if let Err(e) = stream.compress() {
        debug!("Leaving image stream uncompressed: {e}");
    }
    stream
}
