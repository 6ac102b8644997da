//! Raster sizing rules.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest edge recommended for the LightOnOCR family of models.
pub const DEFAULT_MAX_DIMENSION: u32 = 1540;

/// Pixels per PDF unit; 2.77 is roughly 200 DPI for 72-unit-per-inch pages.
pub const DEFAULT_DPI_SCALE: f32 = 2.77;

/// How PDF pages are turned into pixels.
///
/// The rendered image's longest edge never exceeds `max_dimension`, and the
/// effective scale is only ever reduced relative to `dpi_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RasterSpec {
    /// Cap on the longest edge of the rendered image, in pixels.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RASTER_MAX_DIMENSION", default_value_t = DEFAULT_MAX_DIMENSION)
    )]
    pub max_dimension: u32,

    /// Pixels per PDF unit before any downscaling.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RASTER_DPI_SCALE", default_value_t = DEFAULT_DPI_SCALE)
    )]
    pub dpi_scale: f32,
}

impl Default for RasterSpec {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            dpi_scale: DEFAULT_DPI_SCALE,
        }
    }
}

impl RasterSpec {
    /// Creates a spec with the given cap and scale.
    pub fn new(max_dimension: u32, dpi_scale: f32) -> Self {
        Self {
            max_dimension,
            dpi_scale,
        }
    }

    /// Validates the spec.
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(Error::invalid_spec("max dimension must be greater than 0"));
        }
        if !self.dpi_scale.is_finite() || self.dpi_scale <= 0.0 {
            return Err(Error::invalid_spec(format!(
                "dpi scale must be a positive number, got {}",
                self.dpi_scale
            )));
        }
        Ok(())
    }

    /// Factor in `(0, 1]` applied to `dpi_scale` so both axes fit the cap.
    pub fn resize_factor(&self, width_pts: f32, height_pts: f32) -> f32 {
        let pixel_width = width_pts * self.dpi_scale;
        let pixel_height = height_pts * self.dpi_scale;
        let cap = self.max_dimension as f32;

        1.0_f32.min(cap / pixel_width).min(cap / pixel_height)
    }

    /// Scale at which the page is actually rendered.
    pub fn effective_scale(&self, width_pts: f32, height_pts: f32) -> f32 {
        self.dpi_scale * self.resize_factor(width_pts, height_pts)
    }

    /// Pixel dimensions for a page of the given native size.
    ///
    /// Rounded to the nearest pixel, clamped to `[1, max_dimension]`.
    pub fn target_size(&self, width_pts: f32, height_pts: f32) -> (u32, u32) {
        let scale = self.effective_scale(width_pts, height_pts);
        let to_pixels = |points: f32| {
            let pixels = (points * scale).round() as u32;
            pixels.clamp(1, self.max_dimension)
        };

        (to_pixels(width_pts), to_pixels(height_pts))
    }
}
