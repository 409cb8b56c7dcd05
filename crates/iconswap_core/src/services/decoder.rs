//! Decoding and normalization of dropped icon files.
//!
//! Raster formats go through the `image` crate, SVG through `resvg`. Every
//! successful load is normalized to a square RGBA image of the configured
//! canonical size.

use crate::error::IconError;
use crate::models::{CustomIconAsset, IconFileFormat};

use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::path::Path;

/// Default edge length of a normalized custom icon.
pub const DEFAULT_CANONICAL_SIZE: u32 = 1024;

/// Message reported for any decode failure.
const DECODE_FAILED: &str = "could not load image";

/// Turns dropped files into [`CustomIconAsset`]s.
#[derive(Debug, Clone, Copy)]
pub struct IconDecoder {
    size: u32,
}

impl IconDecoder {
    /// Create a decoder producing `size`x`size` images.
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    /// Edge length of produced images.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Validate, read, decode and normalize a file.
    ///
    /// The extension is checked before the file is touched.
    pub fn load(&self, path: &Path) -> Result<CustomIconAsset, IconError> {
        let format = IconFileFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read icon file");
            IconError::platform_with_source(DECODE_FAILED, e)
        })?;

        let image = self.decode(&bytes, format)?;
        tracing::debug!(
            path = %path.display(),
            %format,
            size = self.size,
            "Custom icon decoded"
        );
        Ok(CustomIconAsset::new(image, format, path))
    }

    /// Decode in-memory bytes of a known format.
    pub fn decode(&self, bytes: &[u8], format: IconFileFormat) -> Result<RgbaImage, IconError> {
        match format {
            IconFileFormat::Png => self.decode_raster(bytes, ImageFormat::Png),
            IconFileFormat::Jpeg => self.decode_raster(bytes, ImageFormat::Jpeg),
            IconFileFormat::Svg => self.rasterize_svg(bytes),
        }
    }

    fn decode_raster(&self, bytes: &[u8], format: ImageFormat) -> Result<RgbaImage, IconError> {
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| IconError::platform_with_source(DECODE_FAILED, e))?;

        let rgba = decoded.to_rgba8();
        if rgba.dimensions() == (self.size, self.size) {
            return Ok(rgba);
        }
        Ok(image::imageops::resize(&rgba, self.size, self.size, FilterType::Lanczos3))
    }

    fn rasterize_svg(&self, bytes: &[u8]) -> Result<RgbaImage, IconError> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| IconError::platform_with_source(DECODE_FAILED, e))?;

        let target = self.size as f32;
        let orig = tree.size();
        let transform =
            tiny_skia::Transform::from_scale(target / orig.width(), target / orig.height());

        let mut pixmap = tiny_skia::Pixmap::new(self.size, self.size)
            .ok_or_else(|| IconError::platform(DECODE_FAILED))?;
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha
        let mut out = RgbaImage::new(self.size, self.size);
        for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(out)
    }
}

impl Default for IconDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_CANONICAL_SIZE)
    }
}
