//! PDF page rasterization using pdfium.
//!
//! ## Usage
//!
//! ```no_run
//! use ocrbench_render::{PageRasterizer, RasterSpec};
//!
//! # fn example(bytes: Vec<u8>) -> ocrbench_render::Result<()> {
//! let rasterizer = PageRasterizer::new(RasterSpec::default())?;
//! let document = rasterizer.open(bytes)?;
//!
//! for page in rasterizer.render_pages(&document, &[1, 2, 3])? {
//!     println!("Page {}: {}x{}", page.page_number, page.width(), page.height());
//! }
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use image::DynamicImage;
use pdfium_render::prelude::{PdfPageIndex, PdfRenderConfig, Pdfium};

use crate::TRACING_TARGET_RENDER;
use crate::error::{Error, Result};
use crate::spec::RasterSpec;

/// An immutable PDF buffer with its page count.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    data: Bytes,
    page_count: u32,
}

impl PdfDocument {
    pub(crate) fn from_parts(data: Bytes, page_count: u32) -> Self {
        Self { data, page_count }
    }

    /// Returns the raw document bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Maps a 1-based page number to a backend page index.
    pub fn page_index(&self, page_number: u32) -> Result<PdfPageIndex> {
        if page_number == 0 || page_number > self.page_count {
            return Err(Error::page_out_of_range(page_number, self.page_count));
        }
        Ok((page_number - 1) as PdfPageIndex)
    }
}

/// A rendered page in canonical RGBA channel order.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number
    pub page_number: u32,
    /// Scale the page was rendered at, in pixels per PDF unit
    pub scale: f32,
    /// Decoded pixels
    pub image: DynamicImage,
}

impl PageImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders PDF pages into bounded-resolution images.
///
/// Holds a pdfium binding, which is not `Send`; create one per worker thread.
pub struct PageRasterizer {
    pdfium: Pdfium,
    spec: RasterSpec,
}

impl std::fmt::Debug for PageRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRasterizer")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl PageRasterizer {
    /// Creates a rasterizer bound to a pdfium library next to the executable,
    /// falling back to the system library.
    pub fn new(spec: RasterSpec) -> Result<Self> {
        Self::with_library_dir(spec, "./")
    }

    /// Creates a rasterizer bound to the pdfium library in `dir`, falling back
    /// to the system library.
    pub fn with_library_dir(spec: RasterSpec, dir: &str) -> Result<Self> {
        spec.validate()?;

        let path = Pdfium::pdfium_platform_library_name_at_path(dir);
        let bindings = Pdfium::bind_to_library(path.clone())
            .or_else(|_| Pdfium::bind_to_system_library())
            .inspect_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_RENDER,
                    library = %path.display(),
                    error = %err,
                    "Failed to bind pdfium library"
                );
            })?;

        Ok(Self::with_pdfium(Pdfium::new(bindings), spec))
    }

    /// Creates a rasterizer from an existing pdfium binding.
    pub fn with_pdfium(pdfium: Pdfium, spec: RasterSpec) -> Self {
        Self { pdfium, spec }
    }

    /// Returns the raster spec.
    pub fn spec(&self) -> &RasterSpec {
        &self.spec
    }

    /// Loads a document once to learn its page count.
    pub fn open(&self, data: impl Into<Bytes>) -> Result<PdfDocument> {
        let data = data.into();
        let page_count = {
            let document = self.pdfium.load_pdf_from_byte_slice(&data, None)?;
            document.pages().len() as u32
        };

        tracing::debug!(
            target: TRACING_TARGET_RENDER,
            page_count,
            size_bytes = data.len(),
            "Opened PDF document"
        );

        Ok(PdfDocument::from_parts(data, page_count))
    }

    /// Renders a single page.
    pub fn render(&self, document: &PdfDocument, page_number: u32) -> Result<PageImage> {
        let mut pages = self.render_pages(document, &[page_number])?;
        pages
            .pop()
            .ok_or_else(|| Error::page_out_of_range(page_number, document.page_count()))
    }

    /// Renders several pages, loading the document only once.
    ///
    /// Every page number is checked before anything is rendered.
    pub fn render_pages(
        &self,
        document: &PdfDocument,
        page_numbers: &[u32],
    ) -> Result<Vec<PageImage>> {
        let indices = page_numbers
            .iter()
            .map(|&page_number| document.page_index(page_number))
            .collect::<Result<Vec<_>>>()?;

        // Backend handles live only inside this scope.
        let handle = self
            .pdfium
            .load_pdf_from_byte_slice(document.as_bytes(), None)?;
        let pages = handle.pages();

        let mut images = Vec::with_capacity(indices.len());
        for (&page_number, index) in page_numbers.iter().zip(indices) {
            let page = pages.get(index)?;
            let (width_pts, height_pts) = (page.width().value, page.height().value);
            let scale = self.spec.effective_scale(width_pts, height_pts);
            let (target_width, target_height) = self.spec.target_size(width_pts, height_pts);

            let config = PdfRenderConfig::new()
                .set_target_width(target_width as i32)
                .set_target_height(target_height as i32);

            let bitmap = page.render_with_config(&config)?;
            let image = bitmap.as_image();

            tracing::debug!(
                target: TRACING_TARGET_RENDER,
                page = page_number,
                width_pts,
                height_pts,
                scale,
                width = image.width(),
                height = image.height(),
                "Rendered page"
            );

            images.push(PageImage {
                page_number,
                scale,
                image,
            });
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal valid PDF with one blank page per `(width, height)`.
    fn minimal_pdf(pages: &[(u32, u32)]) -> Vec<u8> {
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                (0..pages.len())
                    .map(|i| format!("{} 0 R", i + 3))
                    .collect::<Vec<_>>()
                    .join(" "),
                pages.len()
            ),
        ];
        for (w, h) in pages {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] >>"
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn page_index_rejects_zero_and_past_end() {
        let document = PdfDocument::from_parts(Bytes::new(), 4);

        assert!(matches!(
            document.page_index(0),
            Err(Error::PageOutOfRange { page: 0, page_count: 4 })
        ));
        assert!(matches!(
            document.page_index(5),
            Err(Error::PageOutOfRange { page: 5, page_count: 4 })
        ));
        assert_eq!(document.page_index(1).unwrap(), 0 as PdfPageIndex);
        assert_eq!(document.page_index(4).unwrap(), 3 as PdfPageIndex);
    }

    #[test]
    #[ignore = "requires the pdfium shared library"]
    fn renders_pages_within_the_cap() {
        let rasterizer = PageRasterizer::new(RasterSpec::default()).unwrap();
        let document = rasterizer
            .open(minimal_pdf(&[(612, 792), (200, 300)]))
            .unwrap();
        assert_eq!(document.page_count(), 2);

        let pages = rasterizer.render_pages(&document, &[1, 2]).unwrap();

        assert_eq!((pages[0].width(), pages[0].height()), (1190, 1540));
        assert_eq!((pages[1].width(), pages[1].height()), (554, 831));
        assert_eq!(pages[1].scale, RasterSpec::default().dpi_scale);
    }

    #[test]
    #[ignore = "requires the pdfium shared library"]
    fn rejects_out_of_range_pages_on_a_real_document() {
        let rasterizer = PageRasterizer::new(RasterSpec::default()).unwrap();
        let document = rasterizer.open(minimal_pdf(&[(612, 792)])).unwrap();

        assert!(rasterizer.render(&document, 0).is_err());
        assert!(rasterizer.render(&document, 2).is_err());
        assert!(rasterizer.render(&document, 1).is_ok());
    }
}
