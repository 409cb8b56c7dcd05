//! Shared fixtures for unit tests.

use crate::controller::IconSelectionController;
use crate::error::IconError;
use crate::models::IconCatalog;
use crate::services::platform::{
    AlternateIconAdapter, AlternateIconBackend, ApplyHandle, DockIconAdapter, IconTarget, LiveIcon,
    PlatformIconAdapter,
};
use crate::services::{IconDecoder, IconResources, MemoryStore};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Edge length used by test decoders to keep fixtures fast.
pub(crate) const TEST_ICON_SIZE: u32 = 32;

/// Backend that records every name it is asked to set.
pub(crate) struct RecordingBackend {
    supported: bool,
    failure: Option<String>,
    panics: bool,
    delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<Option<String>>>,
}

impl RecordingBackend {
    pub(crate) fn supported() -> Self {
        Self {
            supported: true,
            failure: None,
            panics: false,
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unsupported() -> Self {
        Self { supported: false, ..Self::supported() }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self { failure: Some(message.to_string()), ..Self::supported() }
    }

    /// Panic inside the returned future.
    pub(crate) fn panicking() -> Self {
        Self { panics: true, ..Self::supported() }
    }

    /// Delay successive calls by the given durations, in order.
    pub(crate) fn with_delays(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self { delays: Mutex::new(delays.into_iter().collect()), ..Self::supported() }
    }

    pub(crate) fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().clone()
    }
}

impl AlternateIconBackend for RecordingBackend {
    fn supports_alternate_icons(&self) -> bool {
        self.supported
    }

    fn set_alternate_icon_name(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, Result<(), IconError>> {
        self.calls.lock().push(name);
        let delay = self.delays.lock().pop_front();
        let failure = self.failure.clone();
        let panics = self.panics;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if panics {
                panic!("backend crashed");
            }
            match failure {
                Some(message) => Err(IconError::platform(message)),
                None => Ok(()),
            }
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Synchronous adapter that records the targets it receives.
#[derive(Default)]
pub(crate) struct RecordingAdapter {
    targets: Mutex<Vec<String>>,
}

impl RecordingAdapter {
    pub(crate) fn targets(&self) -> Vec<String> {
        self.targets.lock().clone()
    }
}

impl PlatformIconAdapter for RecordingAdapter {
    fn set_icon(&self, target: IconTarget) -> ApplyHandle {
        let described = match target {
            IconTarget::Default => "default".to_string(),
            IconTarget::Alternate(id) => format!("alternate:{id}"),
            IconTarget::Custom(Some(_)) => "custom".to_string(),
            IconTarget::Custom(None) => "custom:none".to_string(),
        };
        self.targets.lock().push(described);
        ApplyHandle::Ready(Ok(()))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Resources holding an image for every default catalog entry.
pub(crate) fn bundled_resources() -> Arc<IconResources> {
    let resources = Arc::new(IconResources::in_memory());
    resources.register("AppIcon", RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
    resources.register("AppIcon 2", RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
    resources
}

fn controller_with(
    adapter: Arc<dyn PlatformIconAdapter>,
    store: Arc<MemoryStore>,
) -> IconSelectionController {
    IconSelectionController::new(
        IconCatalog::default(),
        store,
        adapter,
        tokio::runtime::Handle::current(),
    )
    .with_decoder(IconDecoder::new(TEST_ICON_SIZE))
}

/// Controller over the dock adapter. Must be called inside a tokio runtime.
pub(crate) fn dock_controller(store: Arc<MemoryStore>) -> (IconSelectionController, Arc<LiveIcon>) {
    let live = Arc::new(LiveIcon::new());
    let adapter = Arc::new(DockIconAdapter::new(bundled_resources(), live.clone(), "AppIcon"));
    (controller_with(adapter, store), live)
}

/// Controller over the alternate-icon adapter. Must be called inside a tokio runtime.
pub(crate) fn alternate_controller(
    backend: Arc<RecordingBackend>,
    store: Arc<MemoryStore>,
) -> IconSelectionController {
    controller_with(Arc::new(AlternateIconAdapter::new(backend)), store)
}

/// Controller over a recording adapter. Must be called inside a tokio runtime.
pub(crate) fn recording_controller(
    store: Arc<MemoryStore>,
) -> (IconSelectionController, Arc<RecordingAdapter>) {
    let adapter = Arc::new(RecordingAdapter::default());
    (controller_with(adapter.clone(), store), adapter)
}

/// Write a solid PNG and return its path.
pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}
