//! Icon selection controller.
//!
//! Owns the current selection and the custom icon asset, validates requests,
//! dispatches them to the platform adapter and publishes the outcome.
//!
//! The controller is confined to one task. Work that finishes elsewhere (an
//! asynchronous platform call, a background decode) is posted back over a
//! channel and only touches controller state when the owning task drains it
//! with [`IconSelectionController::process_completions`] or
//! [`IconSelectionController::next_completion`].
//!
//! Selections are persisted before the platform call. A failed apply leaves
//! the persisted selection as requested and the live icon unchanged until a
//! later apply succeeds. Overlapping applies are not cancelled; whichever
//! completion is drained last determines the final reported result.

use crate::error::IconError;
use crate::models::{
    ChangeResult, ControllerEvent, CustomIconAsset, IconCatalog, IconFileFormat, IconSelection,
    SelectionState, CUSTOM_ICON,
};
use crate::services::platform::{ApplyHandle, IconTarget, PlatformIconAdapter};
use crate::services::storage::{SelectionStore, SELECTED_ICON_KEY};
use crate::services::IconDecoder;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Work finished off the owning task.
enum Completion {
    Applied { seq: u64, label: String, notify: bool, result: Result<(), IconError> },
    Decoded { seq: u64, path: PathBuf, result: Result<CustomIconAsset, IconError> },
}

fn task_failed(what: &str, err: tokio::task::JoinError) -> IconError {
    tracing::error!(error = %err, "{what} task did not finish");
    IconError::internal(format!("{what} task failed"))
}

/// Icon selection state machine.
pub struct IconSelectionController {
    catalog: IconCatalog,
    store: Arc<dyn SelectionStore>,
    adapter: Arc<dyn PlatformIconAdapter>,
    decoder: IconDecoder,
    runtime: Handle,
    storage_key: String,
    current: IconSelection,
    custom_asset: Option<CustomIconAsset>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    last_seq: u64,
    subscribers: Vec<mpsc::UnboundedSender<ControllerEvent>>,
}

impl IconSelectionController {
    /// Create a controller showing the primary icon.
    ///
    /// Call [`initialize`](Self::initialize) to restore the persisted selection.
    pub fn new(
        catalog: IconCatalog,
        store: Arc<dyn SelectionStore>,
        adapter: Arc<dyn PlatformIconAdapter>,
        runtime: Handle,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let current = IconSelection::Catalog(catalog.primary().to_string());
        Self {
            catalog,
            store,
            adapter,
            decoder: IconDecoder::default(),
            runtime,
            storage_key: SELECTED_ICON_KEY.to_string(),
            current,
            custom_asset: None,
            completion_tx,
            completion_rx,
            in_flight: 0,
            last_seq: 0,
            subscribers: Vec::new(),
        }
    }

    /// Use a different decoder (canonical size).
    pub fn with_decoder(mut self, decoder: IconDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Persist the selection under a different key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    // ========== Accessors ==========

    /// The bundled icon catalog.
    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    /// The current selection.
    pub fn current(&self) -> &IconSelection {
        &self.current
    }

    /// The loaded custom icon, if any.
    pub fn custom_asset(&self) -> Option<&CustomIconAsset> {
        self.custom_asset.as_ref()
    }

    /// Observable state for the view.
    pub fn state(&self) -> SelectionState {
        match (&self.current, &self.custom_asset) {
            (IconSelection::Catalog(id), _) => SelectionState::Catalog(id.clone()),
            (IconSelection::Custom, None) => SelectionState::PendingCustom,
            (IconSelection::Custom, Some(_)) => SelectionState::Custom,
        }
    }

    /// Name of the platform adapter in use.
    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Number of dispatched operations whose completion is not drained yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Subscribe to state changes and outcomes.
    ///
    /// The current state is sent immediately.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ControllerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(ControllerEvent::SelectionChanged(self.state()));
        self.subscribers.push(tx);
        rx
    }

    // ========== Operations ==========

    /// Restore the persisted selection and re-sync the platform icon.
    pub fn initialize(&mut self) -> ChangeResult {
        let persisted = match self.store.get(&self.storage_key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Failed to read selection");
                String::new()
            }
        };
        self.initialize_with(&persisted)
    }

    /// Restore from an explicit persisted value. Empty means the primary icon.
    ///
    /// Failures are logged, never published.
    pub fn initialize_with(&mut self, persisted: &str) -> ChangeResult {
        self.current = self.catalog.restore(persisted).unwrap_or_else(|| {
            tracing::warn!(persisted, "Unknown persisted icon, falling back to primary");
            IconSelection::Catalog(self.catalog.primary().to_string())
        });
        tracing::info!(selection = %self.current, "Icon selection restored");
        self.publish(ControllerEvent::SelectionChanged(self.state()));

        let id = self.current.as_str().to_string();
        self.apply(&id, false)
    }

    /// Select a catalog icon or the custom sentinel.
    pub fn select(&mut self, id: &str) -> ChangeResult {
        let Some(selection) = self.catalog.parse(id) else {
            tracing::warn!(id, "Rejected unknown icon identifier");
            return self.report(ChangeResult::ValidationError(format!("unknown icon: {id}")), true);
        };

        if !selection.is_custom() {
            self.custom_asset = None;
        }
        self.set_current(selection);

        let id = self.current.as_str().to_string();
        self.apply(&id, true)
    }

    /// Ask the platform to show `id`.
    ///
    /// Returns [`ChangeResult::Dispatched`] when the adapter completes later;
    /// the final result then comes from the completion channel.
    pub fn apply(&mut self, id: &str, notify: bool) -> ChangeResult {
        let target = match self.resolve_target(id) {
            Ok(target) => target,
            Err(e) => return self.report(ChangeResult::from_error(&e), notify),
        };

        if let IconTarget::Custom(None) = target {
            tracing::debug!("Custom icon selected without an image, nothing to apply");
            return ChangeResult::PendingCustom;
        }

        let seq = self.next_seq();
        tracing::debug!(
            seq,
            id,
            adapter = self.adapter.name(),
            clears_alternate = target.is_default(),
            "Applying icon"
        );

        match self.adapter.set_icon(target) {
            ApplyHandle::Ready(result) => self.finish_apply(seq, id.to_string(), notify, result),
            ApplyHandle::Pending(future) => {
                let tx = self.completion_tx.clone();
                let label = id.to_string();
                self.in_flight += 1;
                // Run the call as its own task so a panic still posts a completion.
                let task = self.runtime.spawn(future);
                self.runtime.spawn(async move {
                    let result = task.await.unwrap_or_else(|e| Err(task_failed("icon change", e)));
                    let _ = tx.send(Completion::Applied { seq, label, notify, result });
                });
                ChangeResult::Dispatched(id.to_string())
            }
        }
    }

    /// Load a dropped file as the custom icon, decoding on the calling thread.
    pub fn load_custom_icon(&mut self, path: impl AsRef<Path>) -> ChangeResult {
        let path = path.as_ref();
        let result = self.decoder.load(path);
        self.finish_load(path, result)
    }

    /// Load a dropped file as the custom icon, decoding on a blocking worker.
    ///
    /// The extension is validated immediately; the rest arrives as a completion.
    pub fn load_custom_icon_in_background(&mut self, path: impl AsRef<Path>) -> ChangeResult {
        let path = path.as_ref().to_path_buf();
        if let Err(e) = IconFileFormat::from_path(&path) {
            tracing::warn!(path = %path.display(), "Rejected custom icon with unsupported format");
            return self.report(ChangeResult::from_error(&e), true);
        }

        let seq = self.next_seq();
        let decoder = self.decoder;
        let tx = self.completion_tx.clone();
        self.in_flight += 1;
        tracing::debug!(seq, path = %path.display(), "Decoding custom icon in background");

        let decode_path = path.clone();
        let task = self.runtime.spawn_blocking(move || decoder.load(&decode_path));
        self.runtime.spawn(async move {
            let result = task.await.unwrap_or_else(|e| Err(task_failed("icon decode", e)));
            let _ = tx.send(Completion::Decoded { seq, path, result });
        });
        ChangeResult::Dispatched(CUSTOM_ICON.to_string())
    }

    // ========== Completions ==========

    /// Apply every completion that has arrived, without waiting.
    pub fn process_completions(&mut self) -> Vec<ChangeResult> {
        let mut results = Vec::new();
        while let Ok(completion) = self.completion_rx.try_recv() {
            results.push(self.handle_completion(completion));
        }
        results
    }

    /// Wait for the next completion. Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<ChangeResult> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completion_rx.recv().await?;
        Some(self.handle_completion(completion))
    }

    fn handle_completion(&mut self, completion: Completion) -> ChangeResult {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Applied { seq, label, notify, result } => {
                if seq < self.last_seq {
                    tracing::debug!(
                        seq,
                        latest = self.last_seq,
                        "Completion from superseded apply"
                    );
                }
                self.finish_apply(seq, label, notify, result)
            }
            Completion::Decoded { seq, path, result } => {
                tracing::trace!(seq, "Background decode finished");
                self.finish_load(&path, result)
            }
        }
    }

    // ========== Helpers ==========

    fn resolve_target(&self, id: &str) -> Result<IconTarget, IconError> {
        if id == CUSTOM_ICON {
            Ok(IconTarget::Custom(self.custom_asset.clone()))
        } else if self.catalog.is_primary(id) {
            Ok(IconTarget::Default)
        } else if self.catalog.contains(id) {
            Ok(IconTarget::Alternate(id.to_string()))
        } else {
            Err(IconError::validation(format!("unknown icon: {id}")))
        }
    }

    fn finish_apply(
        &mut self,
        seq: u64,
        label: String,
        notify: bool,
        result: Result<(), IconError>,
    ) -> ChangeResult {
        let outcome = match result {
            Ok(()) => {
                tracing::info!(seq, icon = %label, "Icon applied");
                ChangeResult::Applied(label)
            }
            Err(e) => {
                tracing::warn!(
                    seq,
                    icon = %label,
                    category = e.category(),
                    error = %e,
                    "Icon apply failed"
                );
                ChangeResult::from_error(&e)
            }
        };
        self.report(outcome, notify)
    }

    fn finish_load(
        &mut self,
        path: &Path,
        result: Result<CustomIconAsset, IconError>,
    ) -> ChangeResult {
        match result {
            Ok(asset) => {
                tracing::info!(
                    path = %path.display(),
                    format = %asset.format(),
                    "Custom icon loaded"
                );
                self.custom_asset = Some(asset);
                self.set_current(IconSelection::Custom);
                self.apply(CUSTOM_ICON, true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Custom icon rejected");
                self.report(ChangeResult::from_error(&e), true)
            }
        }
    }

    /// Persist then record a selection. Storage failures do not block it.
    fn set_current(&mut self, selection: IconSelection) {
        if let Err(e) = self.store.set(&self.storage_key, selection.as_str()) {
            tracing::error!(
                store = self.store.name(),
                selection = %selection,
                error = %e,
                "Failed to persist icon selection"
            );
        }
        self.current = selection;
        self.publish(ControllerEvent::SelectionChanged(self.state()));
    }

    fn report(&mut self, result: ChangeResult, notify: bool) -> ChangeResult {
        if notify {
            self.publish(ControllerEvent::Outcome(result.clone()));
        }
        result
    }

    fn publish(&mut self, event: ControllerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn next_seq(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }
}

impl std::fmt::Debug for IconSelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconSelectionController")
            .field("current", &self.current)
            .field("custom_asset", &self.custom_asset)
            .field("adapter", &self.adapter.name())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
