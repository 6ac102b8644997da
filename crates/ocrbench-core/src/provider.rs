//! Provider abstraction over OCR backends.

use std::sync::Arc;

use crate::{OcrResult, PreparedPage, Result};

/// A backend able to recognize one prepared page at a time.
///
/// Implementations must be safe to call concurrently: the scheduler issues
/// many overlapping calls through one shared provider.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    /// Recognizes a single page.
    async fn recognize(&self, page: &PreparedPage) -> Result<OcrResult>;
}

#[async_trait::async_trait]
impl<T: OcrProvider + ?Sized> OcrProvider for Arc<T> {
    async fn recognize(&self, page: &PreparedPage) -> Result<OcrResult> {
        (**self).recognize(page).await
    }
}
