#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for rasterization and encoding.
pub const TRACING_TARGET_RENDER: &str = "ocrbench_render::render";

mod encoder;
pub mod error;
mod rasterizer;
mod spec;

pub use crate::encoder::encode_png;
pub use crate::error::{Error, Result};
pub use crate::rasterizer::{PageImage, PageRasterizer, PdfDocument};
pub use crate::spec::{DEFAULT_DPI_SCALE, DEFAULT_MAX_DIMENSION, RasterSpec};
