//! [`OcrProvider`] implementation backed by [`OcrClient`].

use async_trait::async_trait;
use ocrbench_core::{OcrProvider, OcrResult, PreparedPage};

use crate::OcrClient;

#[async_trait]
impl OcrProvider for OcrClient {
    async fn recognize(&self, page: &PreparedPage) -> ocrbench_core::Result<OcrResult> {
        self.recognize_page(page).await.map_err(Into::into)
    }
}
