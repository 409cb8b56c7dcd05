//! Asynchronous alternate-icon variant.
//!
//! Mirrors an OS API that takes an optional icon name (`None` restores the
//! primary icon) and reports completion later. OS alternate icons must be
//! bundled, so custom images go to an optional in-process adapter instead.

use super::{ApplyHandle, IconTarget, PlatformIconAdapter};
use crate::error::IconError;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The OS alternate-icon API.
pub trait AlternateIconBackend: Send + Sync {
    /// Whether this environment supports alternate icons at all.
    fn supports_alternate_icons(&self) -> bool;

    /// Switch to the named alternate icon, or back to the primary on `None`.
    fn set_alternate_icon_name(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, Result<(), IconError>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Backend for environments without alternate icons.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAlternateIcons;

impl AlternateIconBackend for NoAlternateIcons {
    fn supports_alternate_icons(&self) -> bool {
        false
    }

    fn set_alternate_icon_name(
        &self,
        _name: Option<String>,
    ) -> BoxFuture<'static, Result<(), IconError>> {
        async { Err(IconError::unsupported("alternate icons")) }.boxed()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Records the alternate icon name in a marker file read by the launcher.
///
/// The file holds the icon name; its absence means the primary icon.
#[derive(Debug, Clone)]
pub struct LauncherFileBackend {
    path: PathBuf,
}

impl LauncherFileBackend {
    /// Marker file name inside the data directory.
    pub const FILE_NAME: &'static str = "alternate_icon";

    /// Use `<data_dir>/alternate_icon` as the marker file.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self { path: data_dir.join(Self::FILE_NAME) }
    }

    /// Marker file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently recorded alternate icon, if any.
    pub fn alternate_icon_name(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl AlternateIconBackend for LauncherFileBackend {
    fn supports_alternate_icons(&self) -> bool {
        self.path.parent().map(Path::is_dir).unwrap_or(false)
    }

    fn set_alternate_icon_name(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, Result<(), IconError>> {
        let path = self.path.clone();
        async move {
            let result = match &name {
                Some(name) => tokio::fs::write(&path, name.as_bytes()).await,
                None => match tokio::fs::remove_file(&path).await {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };

            result.map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Launcher icon update failed");
                IconError::platform_with_source(e.to_string(), e)
            })
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "launcher-file"
    }
}

/// Adapter that requests OS-level alternate icons.
pub struct AlternateIconAdapter {
    backend: Arc<dyn AlternateIconBackend>,
    custom: Option<Arc<dyn PlatformIconAdapter>>,
}

impl AlternateIconAdapter {
    /// Wrap a backend. Custom images are reported as unsupported.
    pub fn new(backend: Arc<dyn AlternateIconBackend>) -> Self {
        Self { backend, custom: None }
    }

    /// Show custom images through `adapter` instead of rejecting them.
    pub fn with_custom_images(mut self, adapter: Arc<dyn PlatformIconAdapter>) -> Self {
        self.custom = Some(adapter);
        self
    }
}

impl PlatformIconAdapter for AlternateIconAdapter {
    fn set_icon(&self, target: IconTarget) -> ApplyHandle {
        if let (IconTarget::Custom(_), Some(custom)) = (&target, &self.custom) {
            tracing::debug!(adapter = custom.name(), "Routing custom icon in-process");
            return custom.set_icon(target);
        }

        if !self.backend.supports_alternate_icons() {
            tracing::debug!(backend = self.backend.name(), "Alternate icons unsupported");
            return ApplyHandle::Ready(Err(IconError::unsupported("alternate icons")));
        }

        let name = match target {
            IconTarget::Default => None,
            IconTarget::Alternate(id) => Some(id),
            IconTarget::Custom(_) => {
                return ApplyHandle::Ready(Err(IconError::unsupported(
                    "custom images cannot be used as alternate icons",
                )));
            }
        };

        tracing::debug!(backend = self.backend.name(), ?name, "Requesting alternate icon");
        ApplyHandle::Pending(self.backend.set_alternate_icon_name(name))
    }

    fn name(&self) -> &'static str {
        "alternate"
    }
}
