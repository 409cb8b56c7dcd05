//! Platform icon adapters.
//!
//! The controller talks to the platform through [`PlatformIconAdapter`]. Two
//! variants exist:
//! - [`AlternateIconAdapter`] asks the OS to switch to an alternate icon and
//!   completes asynchronously; custom images fall through to the dock variant
//! - [`DockIconAdapter`] swaps the process-wide [`LiveIcon`] image
//!   synchronously and forgets it on exit
//!
//! Which one is used is decided at runtime from [`AdapterKind`] and the
//! backend's capability flag.

pub mod alternate;
pub mod dock;

pub use alternate::{
    AlternateIconAdapter, AlternateIconBackend, LauncherFileBackend, NoAlternateIcons,
};
pub use dock::{DockIconAdapter, LiveIcon, LiveImage};

use crate::error::IconError;
use crate::models::CustomIconAsset;
use crate::services::IconResources;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What the adapter is asked to show.
#[derive(Debug, Clone)]
pub enum IconTarget {
    /// No alternate icon: the primary icon.
    Default,
    /// A non-primary bundled icon.
    Alternate(String),
    /// The user-supplied image, if one is loaded.
    Custom(Option<CustomIconAsset>),
}

impl IconTarget {
    /// Check whether this clears any alternate icon.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// Result of [`PlatformIconAdapter::set_icon`].
pub enum ApplyHandle {
    /// The call finished synchronously.
    Ready(Result<(), IconError>),
    /// The call completes later; poll off the owning task.
    Pending(BoxFuture<'static, Result<(), IconError>>),
}

impl ApplyHandle {
    /// Wait for the outcome regardless of variant.
    pub async fn wait(self) -> Result<(), IconError> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
        }
    }
}

impl std::fmt::Debug for ApplyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Makes an icon the live one.
pub trait PlatformIconAdapter: Send + Sync {
    /// Request the platform to show `target`.
    ///
    /// Must be idempotent: repeating a call leaves the same end state.
    fn set_icon(&self, target: IconTarget) -> ApplyHandle;

    /// Adapter name for logging.
    fn name(&self) -> &'static str;
}

/// Which adapter variant to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Alternate icons when the backend supports them, dock icon otherwise.
    #[default]
    Auto,
    /// Always the asynchronous alternate-icon variant.
    Alternate,
    /// Always the in-memory dock icon variant.
    Dock,
}

/// Pick and build the adapter for `kind`.
pub fn build_adapter(
    kind: AdapterKind,
    backend: Arc<dyn AlternateIconBackend>,
    resources: Arc<IconResources>,
    live: Arc<LiveIcon>,
    primary: &str,
) -> Arc<dyn PlatformIconAdapter> {
    let use_alternate = match kind {
        AdapterKind::Alternate => true,
        AdapterKind::Dock => false,
        AdapterKind::Auto => backend.supports_alternate_icons(),
    };

    let dock = Arc::new(DockIconAdapter::new(resources, live, primary));
    let adapter: Arc<dyn PlatformIconAdapter> = if use_alternate {
        Arc::new(AlternateIconAdapter::new(backend).with_custom_images(dock))
    } else {
        dock
    };

    tracing::info!(?kind, adapter = adapter.name(), "Platform icon adapter selected");
    adapter
}
