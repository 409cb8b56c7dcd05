//! Synchronous in-memory icon swap.
//!
//! Replaces the process-wide [`LiveIcon`] image that the window chrome renders.
//! Nothing survives the process.

use super::{ApplyHandle, IconTarget, PlatformIconAdapter};
use crate::error::IconError;
use crate::models::CUSTOM_ICON;
use crate::services::IconResources;

use image::RgbaImage;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// The image currently shown as the application icon.
#[derive(Debug, Clone)]
pub struct LiveImage {
    /// Identifier the image was set under.
    pub label: String,
    /// The image itself.
    pub image: Arc<RgbaImage>,
}

/// Mutable icon reference read by the window chrome.
#[derive(Debug, Default)]
pub struct LiveIcon {
    current: RwLock<Option<LiveImage>>,
    revision: AtomicU64,
}

impl LiveIcon {
    /// Create an empty live icon.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live icon shared by the whole process.
    pub fn process() -> Arc<LiveIcon> {
        static PROCESS: OnceLock<Arc<LiveIcon>> = OnceLock::new();
        PROCESS.get_or_init(|| Arc::new(LiveIcon::new())).clone()
    }

    /// Current image, if one was ever set.
    pub fn current(&self) -> Option<LiveImage> {
        self.current.read().clone()
    }

    /// Label of the current image.
    pub fn label(&self) -> Option<String> {
        self.current.read().as_ref().map(|live| live.label.clone())
    }

    /// Number of times the image has been set.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn replace(&self, label: &str, image: Arc<RgbaImage>) {
        *self.current.write() = Some(LiveImage { label: label.to_string(), image });
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

/// Adapter that swaps the in-memory application icon.
pub struct DockIconAdapter {
    resources: Arc<IconResources>,
    live: Arc<LiveIcon>,
    primary: String,
}

impl DockIconAdapter {
    /// Create an adapter. `primary` names the resource shown for the default icon.
    pub fn new(resources: Arc<IconResources>, live: Arc<LiveIcon>, primary: &str) -> Self {
        Self { resources, live, primary: primary.to_string() }
    }

    fn swap_bundled(&self, id: &str) -> Result<(), IconError> {
        let image = self.resources.resolve(id).ok_or_else(|| {
            tracing::warn!(id, "Could not find icon in the bundled resources");
            IconError::platform("resource not found")
        })?;
        self.live.replace(id, image);
        Ok(())
    }
}

impl PlatformIconAdapter for DockIconAdapter {
    fn set_icon(&self, target: IconTarget) -> ApplyHandle {
        let result = match target {
            IconTarget::Default => self.swap_bundled(&self.primary),
            IconTarget::Alternate(id) => self.swap_bundled(&id),
            IconTarget::Custom(Some(asset)) => {
                self.live.replace(CUSTOM_ICON, asset.image().clone());
                Ok(())
            }
            // Nothing to show yet
            IconTarget::Custom(None) => Ok(()),
        };

        if result.is_ok() {
            tracing::debug!(
                label = ?self.live.label(),
                revision = self.live.revision(),
                "Dock icon swapped"
            );
        }
        ApplyHandle::Ready(result)
    }

    fn name(&self) -> &'static str {
        "dock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomIconAsset, IconFileFormat};
    use image::Rgba;

    fn adapter() -> (DockIconAdapter, Arc<LiveIcon>) {
        let resources = Arc::new(IconResources::in_memory());
        resources.register("AppIcon", RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        resources.register("AppIcon 2", RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        let live = Arc::new(LiveIcon::new());
        (DockIconAdapter::new(resources, live.clone(), "AppIcon"), live)
    }

    fn ready(handle: ApplyHandle) -> Result<(), IconError> {
        match handle {
            ApplyHandle::Ready(result) => result,
            ApplyHandle::Pending(_) => panic!("dock adapter must complete synchronously"),
        }
    }

    #[test]
    fn test_default_shows_primary_resource() {
        let (adapter, live) = adapter();
        ready(adapter.set_icon(IconTarget::Default)).unwrap();
        assert_eq!(live.label(), Some("AppIcon".to_string()));
    }

    #[test]
    fn test_missing_resource_is_platform_error() {
        let (adapter, live) = adapter();
        let err = ready(adapter.set_icon(IconTarget::Alternate("AppIcon 3".into()))).unwrap_err();
        assert_eq!(err.to_string(), "resource not found");
        assert!(live.current().is_none());
    }

    #[test]
    fn test_pending_custom_is_noop() {
        let (adapter, live) = adapter();
        ready(adapter.set_icon(IconTarget::Custom(None))).unwrap();
        assert_eq!(live.revision(), 0);
    }

    #[test]
    fn test_custom_asset_becomes_live() {
        let (adapter, live) = adapter();
        let asset = CustomIconAsset::new(RgbaImage::new(8, 8), IconFileFormat::Png, "mine.png");
        ready(adapter.set_icon(IconTarget::Custom(Some(asset.clone())))).unwrap();

        let current = live.current().unwrap();
        assert_eq!(current.label, CUSTOM_ICON);
        assert!(Arc::ptr_eq(&current.image, asset.image()));
    }

    #[test]
    fn test_repeated_set_reuses_same_image() {
        let (adapter, live) = adapter();
        ready(adapter.set_icon(IconTarget::Alternate("AppIcon 2".into()))).unwrap();
        let first = live.current().unwrap();
        ready(adapter.set_icon(IconTarget::Alternate("AppIcon 2".into()))).unwrap();
        let second = live.current().unwrap();

        assert!(Arc::ptr_eq(&first.image, &second.image));
        assert_eq!(live.revision(), 2);
    }

    #[test]
    fn test_process_live_icon_is_shared() {
        assert!(Arc::ptr_eq(&LiveIcon::process(), &LiveIcon::process()));
    }
}
