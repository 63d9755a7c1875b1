//! Page-set assembly: wrap JPEG rasters in fixed-size PDF pages.
//!
//! Each output page carries exactly one image XObject, drawn by a one-line
//! content stream:
//!
//! ```text
//! q  w 0 0 h  x y cm  /Im0 Do  Q
//! ```
//!
//! The JPEG bytes are stored untouched under `/DCTDecode`.

use super::encode::{encode_jpeg, EncodedPage};
use super::layout::{a5_landscape, fit_centered, image_size_points, PageSize, Placement};
use super::render::Rasterizer;
use crate::error::{BookletError, Result};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

/// Rasterisation and compression parameters for one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub dpi: u32,
    pub jpeg_quality: u8,
    pub page_size: PageSize,
}

impl RenderSettings {
    /// Settings targeting the booklet's A5-landscape page.
    pub fn a5(dpi: u32, jpeg_quality: u8) -> Self {
        Self {
            dpi,
            jpeg_quality,
            page_size: a5_landscape(),
        }
    }
}

/// Incrementally builds a single-document page-set.
pub struct PageSetBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    page_size: PageSize,
}

impl PageSetBuilder {
    pub fn new(page_size: PageSize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            page_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `page`, whose pixels were rendered at `dpi`.
    pub fn push_image(&mut self, page: &EncodedPage, dpi: u32) -> Placement {
        let natural = image_size_points(page.width, page.height, dpi);
        let placement = fit_centered(natural, self.page_size);

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(page.width as i64),
                "Height" => Object::Integer(page.height as i64),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            page.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = self.doc.add_object(image);

        let content = format!(
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/Im0 Do\nQ\n",
            placement.width, placement.height, placement.x, placement.y
        );
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.page_size.width),
                Object::Real(self.page_size.height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        self.kids.push(page_id);

        placement
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let kids: Vec<Object> = self.kids.into_iter().map(Object::Reference).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}

/// Convert one source PDF into a page-set of rasterised A5-landscape pages.
///
/// The result has the same page count and order as the source; vector
/// content, text and metadata are not carried over.
pub fn convert_source(
    rasterizer: &dyn Rasterizer,
    source_key: &str,
    pdf: &[u8],
    settings: &RenderSettings,
) -> Result<Document> {
    let mut builder = PageSetBuilder::new(settings.page_size);

    let rendered = rasterizer.rasterize(source_key, pdf, settings.dpi, &mut |index, image| {
        let encoded = encode_jpeg(&image, settings.jpeg_quality).map_err(|e| {
            BookletError::conversion(source_key, format!("page {}: JPEG encoding failed: {e}", index + 1))
        })?;
        let placement = builder.push_image(&encoded, settings.dpi);
        debug!(
            "{} page {}: scale {:.3}, placed at ({:.1}, {:.1})",
            source_key,
            index + 1,
            placement.scale,
            placement.x,
            placement.y
        );
        Ok(())
    })?;

    if rendered != builder.page_count() {
        return Err(BookletError::Internal(format!(
            "{source_key}: rasterizer reported {rendered} pages but produced {}",
            builder.page_count()
        )));
    }

    Ok(builder.finish())
}
