//! Error types for ocrbench-render.

use pdfium_render::prelude::PdfiumError;

/// Result type for all rendering operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for rasterization and encoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested page does not exist in the document.
    #[error("Page {page} out of range (1-{page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// The pdfium library could not be bound, or rejected the document.
    #[error("Pdfium error: {0}")]
    Pdfium(#[from] PdfiumError),

    /// Image encoding or decoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid raster configuration.
    #[error("Invalid raster configuration: {reason}")]
    InvalidSpec { reason: String },
}

impl Error {
    /// Create a page out of range error
    pub fn page_out_of_range(page: u32, page_count: u32) -> Self {
        Self::PageOutOfRange { page, page_count }
    }

    /// Create an invalid raster configuration error
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }
}

impl From<Error> for ocrbench_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::PageOutOfRange { page, page_count } => {
                ocrbench_core::Error::out_of_range(page, page_count)
            }
            Error::Pdfium(e) => ocrbench_core::Error::render().with_message(e.to_string()),
            Error::Image(e) => ocrbench_core::Error::render()
                .with_message(e.to_string())
                .with_source(e),
            Error::InvalidSpec { reason } => {
                ocrbench_core::Error::configuration().with_message(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ocrbench_core::ErrorKind;

    use super::*;

    #[test]
    fn out_of_range_maps_to_core_kind() {
        let err: ocrbench_core::Error = Error::page_out_of_range(9, 8).into();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.message.as_deref(), Some("page 9 out of range (1-8)"));
    }
}
