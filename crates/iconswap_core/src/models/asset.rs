//! User-supplied icon assets.

use crate::error::IconError;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source format of a dropped icon file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconFileFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG (`.jpg` or `.jpeg`)
    Jpeg,
    /// Scalable Vector Graphics, rasterized on load
    Svg,
}

impl IconFileFormat {
    /// Map a file extension to a format, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Validate a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, IconError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| IconError::validation("unsupported format"))
    }
}

impl std::fmt::Display for IconFileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Svg => "SVG",
        };
        f.write_str(name)
    }
}

/// A decoded, normalized user-supplied icon.
///
/// Lives in memory only; a restart discards it.
#[derive(Clone)]
pub struct CustomIconAsset {
    image: Arc<RgbaImage>,
    format: IconFileFormat,
    source: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl CustomIconAsset {
    /// Wrap an already normalized image.
    pub fn new(image: RgbaImage, format: IconFileFormat, source: impl Into<PathBuf>) -> Self {
        Self { image: Arc::new(image), format, source: source.into(), loaded_at: Utc::now() }
    }

    /// The decoded RGBA image.
    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    /// Source format of the dropped file.
    pub fn format(&self) -> IconFileFormat {
        self.format
    }

    /// Path the image was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// When the asset was decoded.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Image dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl std::fmt::Debug for CustomIconAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomIconAsset")
            .field("dimensions", &self.dimensions())
            .field("format", &self.format)
            .field("source", &self.source)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_case_insensitive() {
        assert_eq!(IconFileFormat::from_extension("PNG"), Some(IconFileFormat::Png));
        assert_eq!(IconFileFormat::from_extension("Jpg"), Some(IconFileFormat::Jpeg));
        assert_eq!(IconFileFormat::from_extension("jpeg"), Some(IconFileFormat::Jpeg));
        assert_eq!(IconFileFormat::from_extension("SvG"), Some(IconFileFormat::Svg));
        assert_eq!(IconFileFormat::from_extension("bmp"), None);
        assert_eq!(IconFileFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_from_path_rejects_missing_extension() {
        let err = IconFileFormat::from_path(Path::new("/tmp/icon")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "unsupported format");

        let err = IconFileFormat::from_path(Path::new("icon.bmp")).unwrap_err();
        assert!(err.is_validation());

        assert_eq!(
            IconFileFormat::from_path(Path::new("dir.d/Icon.SVG")).unwrap(),
            IconFileFormat::Svg
        );
    }

    #[test]
    fn test_asset_reports_dimensions() {
        let asset = CustomIconAsset::new(RgbaImage::new(16, 16), IconFileFormat::Png, "a.png");
        assert_eq!(asset.dimensions(), (16, 16));
        assert_eq!(asset.source(), Path::new("a.png"));
    }
}
