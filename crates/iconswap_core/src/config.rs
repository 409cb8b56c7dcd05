//! Application configuration.
//!
//! Read from `config.json` in the data directory. Missing file or missing
//! fields fall back to defaults.

use crate::error::IconError;
use crate::models::IconCatalog;
use crate::services::decoder::DEFAULT_CANONICAL_SIZE;
use crate::services::storage::SELECTED_ICON_KEY;
use crate::services::AdapterKind;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted canonical icon edge.
const MAX_CANONICAL_SIZE: u32 = 4096;

/// iconswap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSwapConfig {
    /// Bundled icon identifiers; the first is the primary icon.
    pub catalog: Vec<String>,
    /// Edge length custom icons are resized to.
    pub canonical_size: u32,
    /// Key the selection is persisted under.
    pub storage_key: String,
    /// Which platform adapter to use.
    pub adapter: AdapterKind,
    /// Directory with `<identifier>.png` resources (defaults to `<data_dir>/icons`).
    pub resources_dir: Option<PathBuf>,
}

impl Default for IconSwapConfig {
    fn default() -> Self {
        Self {
            catalog: IconCatalog::default().entries().to_vec(),
            canonical_size: DEFAULT_CANONICAL_SIZE,
            storage_key: SELECTED_ICON_KEY.to_string(),
            adapter: AdapterKind::Auto,
            resources_dir: None,
        }
    }
}

impl IconSwapConfig {
    /// Config file name inside the data directory.
    pub const FILE_NAME: &'static str = "config.json";

    /// Load from the data directory, or defaults when no file exists.
    pub fn load(data_dir: &Path) -> Result<Self, IconError> {
        let path = data_dir.join(Self::FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            IconError::config(format!("Failed to read '{}': {e}", path.display()))
        })?;
        let config = Self::from_json(&contents)?;
        tracing::info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, IconError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to the data directory.
    pub fn save(&self, data_dir: &Path) -> Result<(), IconError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(Self::FILE_NAME), json)?;
        Ok(())
    }

    /// Check the invariants the controller relies on.
    pub fn validate(&self) -> Result<(), IconError> {
        self.icon_catalog()?;
        if self.canonical_size == 0 || self.canonical_size > MAX_CANONICAL_SIZE {
            return Err(IconError::config(format!(
                "canonical_size must be between 1 and {MAX_CANONICAL_SIZE}, got {}",
                self.canonical_size
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(IconError::config("storage_key must not be empty"));
        }
        Ok(())
    }

    /// Build the icon catalog.
    pub fn icon_catalog(&self) -> Result<IconCatalog, IconError> {
        IconCatalog::new(self.catalog.iter().cloned())
    }

    /// Resolve the resources directory.
    pub fn resources_dir(&self, data_dir: &Path) -> PathBuf {
        self.resources_dir.clone().unwrap_or_else(|| data_dir.join("icons"))
    }
}
