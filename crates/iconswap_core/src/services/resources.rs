//! Bundled icon images resolved by catalog identifier.

use image::RgbaImage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Named image assets shipped with the application.
///
/// Images come from `<dir>/<identifier>.png` and are decoded once, or are
/// registered directly in memory.
pub struct IconResources {
    dir: Option<PathBuf>,
    cache: RwLock<HashMap<String, Arc<RgbaImage>>>,
}

impl IconResources {
    /// Resources held in memory only.
    pub fn in_memory() -> Self {
        Self { dir: None, cache: RwLock::new(HashMap::new()) }
    }

    /// Resources loaded lazily from a directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()), cache: RwLock::new(HashMap::new()) }
    }

    /// Register an image under an identifier, replacing any previous one.
    pub fn register(&self, id: impl Into<String>, image: RgbaImage) {
        self.cache.write().insert(id.into(), Arc::new(image));
    }

    /// Look up an image by identifier.
    pub fn resolve(&self, id: &str) -> Option<Arc<RgbaImage>> {
        if let Some(image) = self.cache.read().get(id) {
            return Some(image.clone());
        }

        let path = self.dir.as_ref()?.join(format!("{id}.png"));
        if !path.is_file() {
            tracing::debug!(id, path = %path.display(), "Icon resource not found");
            return None;
        }

        match image::open(&path) {
            Ok(decoded) => {
                let image = Arc::new(decoded.to_rgba8());
                self.cache.write().insert(id.to_string(), image.clone());
                tracing::debug!(id, path = %path.display(), "Icon resource loaded");
                Some(image)
            }
            Err(e) => {
                tracing::warn!(id, path = %path.display(), error = %e, "Icon resource unreadable");
                None
            }
        }
    }

    /// Check whether an identifier resolves to an image.
    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }
}

impl std::fmt::Debug for IconResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconResources")
            .field("dir", &self.dir)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_registered_images_resolve() {
        let resources = IconResources::in_memory();
        resources.register("AppIcon", RgbaImage::new(4, 4));

        assert!(resources.contains("AppIcon"));
        assert!(!resources.contains("AppIcon 2"));
    }

    #[test]
    fn test_directory_lookup_is_cached() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("AppIcon 2.png"))
            .unwrap();

        let resources = IconResources::from_dir(dir.path());
        let first = resources.resolve("AppIcon 2").unwrap();
        let second = resources.resolve("AppIcon 2").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(resources.resolve("Missing").is_none());
    }
}
