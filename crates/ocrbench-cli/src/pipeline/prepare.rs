//! Rasterization and encoding ahead of the concurrent phase.

use anyhow::Context;
use bytes::Bytes;
use ocrbench_core::PreparedPage;
use ocrbench_render::{PageRasterizer, RasterSpec};

use crate::TRACING_TARGET_PIPELINE;

/// Pages ready to send, plus the document's page count.
#[derive(Debug)]
pub struct PreparedDocument {
    pub page_count: u32,
    pub pages: Vec<PreparedPage>,
}

/// Renders and encodes `page_numbers` on a blocking worker thread.
///
/// The pdfium binding is created on that thread and dropped with it.
pub async fn prepare_pages(
    data: Bytes,
    page_numbers: Vec<u32>,
    spec: RasterSpec,
    pdfium_dir: Option<String>,
) -> anyhow::Result<PreparedDocument> {
    tokio::task::spawn_blocking(move || prepare_blocking(data, &page_numbers, spec, pdfium_dir))
        .await
        .context("page preparation worker panicked")?
}

fn prepare_blocking(
    data: Bytes,
    page_numbers: &[u32],
    spec: RasterSpec,
    pdfium_dir: Option<String>,
) -> anyhow::Result<PreparedDocument> {
    let rasterizer = match pdfium_dir.as_deref() {
        Some(dir) => PageRasterizer::with_library_dir(spec, dir),
        None => PageRasterizer::new(spec),
    }
    .context("failed to initialize pdfium")?;

    let document = rasterizer.open(data).context("failed to open PDF")?;
    let page_count = document.page_count();

    tracing::info!(
        target: TRACING_TARGET_PIPELINE,
        page_count,
        selected = page_numbers.len(),
        "PDF opened"
    );

    let images = rasterizer
        .render_pages(&document, page_numbers)
        .map_err(ocrbench_core::Error::from)
        .context("failed to render pages")?;

    let pages = images
        .iter()
        .map(|image| image.encode().map_err(ocrbench_core::Error::from))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to encode pages")?;

    Ok(PreparedDocument { page_count, pages })
}
