//! PDF rasterisation: render every page of a source PDF to a `DynamicImage`.
//!
//! Rendering sits behind the [`Rasterizer`] trait so the rest of the pipeline
//! can be driven by any renderer. [`PdfiumRasterizer`] is the production
//! implementation on top of `pdfium-render`.
//!
//! Pages are handed to a sink one at a time, in document order; at 300 DPI a
//! single A4 page is ~35 MB of RGBA, so a document is never held as a whole
//! vector of bitmaps.

use crate::error::{BookletError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Receives `(page_index_0based, image)` for each rendered page.
pub type PageSink<'a> = dyn FnMut(usize, DynamicImage) -> Result<()> + 'a;

/// Renders PDF pages to raster images.
pub trait Rasterizer {
    /// Render every page of `pdf` at `dpi` and pass each to `sink`, in order.
    ///
    /// Pixel dimensions are the page size in inches × `dpi`. Returns the number
    /// of pages rendered. A document that cannot be parsed fails with
    /// [`BookletError::ConversionFailed`] naming `source_key`.
    fn rasterize(
        &self,
        source_key: &str,
        pdf: &[u8],
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize>;
}

/// [`Rasterizer`] backed by the pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind to pdfium.
    ///
    /// Resolution order: `library_path`, then `PDFIUM_LIB_PATH`, then the
    /// platform library in the working directory, then the system library.
    pub fn bind(library_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os("PDFIUM_LIB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let bindings = match library_path.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path).map_err(|e| {
                    BookletError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
                })?
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| BookletError::PdfiumBindingFailed(e.to_string()))?,
        };

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        source_key: &str,
        pdf: &[u8],
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| BookletError::conversion(source_key, format!("{:?}", e)))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("{}: {} pages", source_key, total_pages);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

        let mut rendered = 0;
        for (index, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                BookletError::conversion(source_key, format!("page {}: {:?}", index + 1, e))
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered {} page {} → {}x{} px",
                source_key,
                index + 1,
                image.width(),
                image.height()
            );

            sink(index, image)?;
            rendered += 1;
        }

        Ok(rendered)
    }
}
