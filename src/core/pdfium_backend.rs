//! Page rasterization through pdfium

use image::RgbaImage;
use pdfium_render::prelude::*;

use super::error::{CompareError, Result};
use super::visual::{DocumentBackend, PageSource};

/// Resolution used when none is given; PDF user space is 72 units per inch.
pub const DEFAULT_DPI: f32 = 96.0;

/// [`DocumentBackend`] backed by a pdfium shared library
pub struct PdfiumBackend {
    pdfium: Pdfium,
    scale: f32,
}

impl PdfiumBackend {
    /// Bind pdfium from the working directory, falling back to the system library
    pub fn bind(dpi: f32) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| CompareError::Render(format!("pdfium library unavailable: {}", e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            scale: dpi / 72.0,
        })
    }
}

pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    scale: f32,
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize) -> Result<RgbaImage> {
        let page_index = PdfPageIndex::try_from(index)
            .map_err(|_| CompareError::Render(format!("page index {} out of range", index)))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| CompareError::Render(format!("page {}: {}", index + 1, e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(self.scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| CompareError::Render(format!("page {}: {}", index + 1, e)))?;

        let width = u32::try_from(bitmap.width()).unwrap_or(0);
        let height = u32::try_from(bitmap.height()).unwrap_or(0);
        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| CompareError::Render(format!("page {}: bitmap size mismatch", index + 1)))
    }
}

impl DocumentBackend for PdfiumBackend {
    type Document<'a> = PdfiumDocument<'a>;

    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfiumDocument<'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| CompareError::InvalidDocument(e.to_string()))?;

        Ok(PdfiumDocument {
            document,
            scale: self.scale,
        })
    }
}
