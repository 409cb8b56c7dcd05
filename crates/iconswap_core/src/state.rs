//! Application state.
//!
//! Wires the configuration, storage, resources, runtime and platform adapter
//! together and hands out the icon controller.

use crate::config::IconSwapConfig;
use crate::controller::IconSelectionController;
use crate::error::IconError;
use crate::models::IconCatalog;
use crate::services::platform::{build_adapter, LauncherFileBackend, LiveIcon};
use crate::services::{IconDecoder, IconResources, LocalStorage, PlatformIconAdapter};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Central application state.
pub struct IconSwapState {
    config: IconSwapConfig,
    catalog: IconCatalog,
    /// Local SQLite storage
    storage: Arc<LocalStorage>,
    resources: Arc<IconResources>,
    live_icon: Arc<LiveIcon>,
    adapter: Arc<dyn PlatformIconAdapter>,
    data_dir: PathBuf,
    /// Tokio runtime for platform calls and background decoding
    tokio_runtime: tokio::runtime::Runtime,
}

impl IconSwapState {
    /// Create state in the default data directory.
    pub fn new() -> Result<Self, IconError> {
        Self::with_data_dir(crate::services::storage::default_data_dir())
    }

    /// Create state in a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, IconError> {
        crate::services::storage::init_data_dir(&data_dir)?;

        let config = IconSwapConfig::load(&data_dir)?;
        config.validate()?;
        let catalog = config.icon_catalog()?;

        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| IconError::internal(format!("Failed to create tokio runtime: {e}")))?;

        let storage = Arc::new(LocalStorage::open(data_dir.clone())?);
        let resources = Arc::new(IconResources::from_dir(config.resources_dir(&data_dir)));
        let live_icon = LiveIcon::process();
        let adapter = build_adapter(
            config.adapter,
            Arc::new(LauncherFileBackend::in_data_dir(&data_dir)),
            resources.clone(),
            live_icon.clone(),
            catalog.primary(),
        );

        tracing::info!(
            data_dir = %data_dir.display(),
            icons = catalog.len(),
            adapter = adapter.name(),
            "IconSwapState initialized"
        );

        Ok(Self {
            config,
            catalog,
            storage,
            resources,
            live_icon,
            adapter,
            data_dir,
            tokio_runtime,
        })
    }

    /// Build the icon controller. Call `initialize` on it before use.
    pub fn controller(&self) -> IconSelectionController {
        IconSelectionController::new(
            self.catalog.clone(),
            self.storage.clone(),
            self.adapter.clone(),
            self.tokio_runtime.handle().clone(),
        )
        .with_decoder(IconDecoder::new(self.config.canonical_size))
        .with_storage_key(self.config.storage_key.clone())
    }

    // ========== Accessors ==========

    /// Loaded configuration.
    pub fn config(&self) -> &IconSwapConfig {
        &self.config
    }

    /// Local storage service.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Bundled icon resources.
    pub fn resources(&self) -> &IconResources {
        &self.resources
    }

    /// The process-wide live icon.
    pub fn live_icon(&self) -> &LiveIcon {
        &self.live_icon
    }

    /// Data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Tokio runtime.
    pub fn runtime(&self) -> &tokio::runtime::Runtime {
        &self.tokio_runtime
    }

    /// Block on a future using the runtime. Avoid from async contexts.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.tokio_runtime.block_on(future)
    }
}

impl std::fmt::Debug for IconSwapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconSwapState")
            .field("data_dir", &self.data_dir)
            .field("adapter", &self.adapter.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeResult, SelectionState, CUSTOM_ICON};
    use crate::services::AdapterKind;
    use crate::testing::write_png;
    use tempfile::tempdir;

    #[test]
    fn test_state_selects_launcher_backend_by_default() {
        let dir = tempdir().unwrap();
        let state = IconSwapState::with_data_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(state.config().adapter, AdapterKind::Auto);

        let mut controller = state.controller();
        assert_eq!(controller.adapter_name(), "alternate");

        let result = controller.select("AppIcon 2");
        assert_eq!(result, ChangeResult::Dispatched("AppIcon 2".into()));
        let result = state.block_on(controller.next_completion());
        assert_eq!(result, Some(ChangeResult::Applied("AppIcon 2".into())));

        let backend = LauncherFileBackend::in_data_dir(dir.path());
        assert_eq!(backend.alternate_icon_name(), Some("AppIcon 2".to_string()));
    }

    #[test]
    fn test_default_config_applies_custom_icon() {
        let dir = tempdir().unwrap();
        let drop = write_png(dir.path(), "drop.png", 20, 10);
        let state = IconSwapState::with_data_dir(dir.path().join("data")).unwrap();
        let mut controller = state.controller();
        assert_eq!(controller.adapter_name(), "alternate");

        let result = controller.load_custom_icon(&drop);
        assert_eq!(result, ChangeResult::Applied(CUSTOM_ICON.into()));
        assert_eq!(controller.state(), SelectionState::Custom);

        let asset = controller.custom_asset().unwrap();
        assert_eq!(asset.dimensions(), (1024, 1024));
    }

    #[test]
    fn test_dock_config_uses_resources_dir() {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("icons");
        std::fs::create_dir_all(&icons).unwrap();
        write_png(&icons, "AppIcon.png", 4, 4);

        let config = IconSwapConfig { adapter: AdapterKind::Dock, ..Default::default() };
        config.save(dir.path()).unwrap();

        let state = IconSwapState::with_data_dir(dir.path().to_path_buf()).unwrap();
        let mut controller = state.controller();
        assert_eq!(controller.adapter_name(), "dock");

        assert_eq!(controller.initialize(), ChangeResult::Applied("AppIcon".into()));
        assert_eq!(
            controller.select("AppIcon 2"),
            ChangeResult::PlatformError("resource not found".into())
        );
    }

    #[test]
    fn test_selection_survives_restart() {
        let dir = tempdir().unwrap();
        {
            let config = IconSwapConfig { adapter: AdapterKind::Dock, ..Default::default() };
            config.save(dir.path()).unwrap();
            let state = IconSwapState::with_data_dir(dir.path().to_path_buf()).unwrap();
            let mut controller = state.controller();
            controller.select("AppIcon 2");
        }

        let state = IconSwapState::with_data_dir(dir.path().to_path_buf()).unwrap();
        let mut controller = state.controller();
        controller.initialize();
        assert_eq!(controller.current().as_str(), "AppIcon 2");
    }
}
