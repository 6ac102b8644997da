//! Lossless PNG encoding of rendered pages.

use std::borrow::Cow;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use ocrbench_core::{EncodedPayload, PreparedPage};

use crate::TRACING_TARGET_RENDER;
use crate::error::Result;
use crate::rasterizer::PageImage;

/// Encodes an image as PNG, dropping any alpha channel first.
///
/// 8-bit RGB and grayscale images are written as-is; every other pixel
/// format is converted to 8-bit RGB. The output is deterministic.
pub fn encode_png(image: &DynamicImage) -> Result<EncodedPayload> {
    let opaque = match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => Cow::Borrowed(image),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    };

    let mut buffer = Vec::new();
    opaque.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;

    Ok(EncodedPayload::png(buffer))
}

impl PageImage {
    /// Encodes this page into a payload ready for recognition.
    pub fn encode(&self) -> Result<PreparedPage> {
        let payload = encode_png(&self.image)?;

        tracing::info!(
            target: TRACING_TARGET_RENDER,
            page = self.page_number,
            width = self.width(),
            height = self.height(),
            base64_kib = payload.base64_len() as f64 / 1024.0,
            "Prepared page payload"
        );

        Ok(PreparedPage::new(
            self.page_number,
            self.width(),
            self.height(),
            payload,
        ))
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb, Rgba};

    use super::*;

    fn gradient(width: u32, height: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 7) as u8, (y * 13) as u8, ((x + y) * 3) as u8])
        })
    }

    #[test]
    fn round_trips_pixel_identical() {
        let original = gradient(37, 23);
        let payload = encode_png(&DynamicImage::ImageRgb8(original.clone())).unwrap();

        assert_eq!(payload.mime_type(), "image/png");
        let decoded = image::load_from_memory(payload.as_bytes()).unwrap();
        assert_eq!(decoded.to_rgb8(), original);
    }

    #[test]
    fn flattens_alpha_to_three_channels() {
        let rgba = ImageBuffer::from_fn(4, 4, |x, _| Rgba([x as u8 * 40, 10, 20, 0]));
        let payload = encode_png(&DynamicImage::ImageRgba8(rgba)).unwrap();

        let decoded = image::load_from_memory(payload.as_bytes()).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.color().channel_count(), 3);
        assert_eq!(decoded.to_rgb8().get_pixel(2, 1), &Rgb([80, 10, 20]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let image = DynamicImage::ImageRgb8(gradient(64, 48));
        let first = encode_png(&image).unwrap();
        let second = encode_png(&image).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn page_encode_keeps_identity_and_size() {
        let page = PageImage {
            page_number: 7,
            scale: 2.0,
            image: DynamicImage::ImageRgb8(gradient(10, 20)),
        };

        let prepared = page.encode().unwrap();
        assert_eq!(prepared.page_number, 7);
        assert_eq!((prepared.width, prepared.height), (10, 20));
        assert!(!prepared.payload.is_empty());
    }
}
