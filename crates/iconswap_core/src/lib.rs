//! Core of iconswap: switch an application's icon between bundled
//! alternatives or a user-supplied image.
//!
//! - **error**: Error taxonomy and user-facing error info
//! - **models**: Catalog, selection, custom asset and change results
//! - **services**: Storage, decoding, bundled resources and platform adapters
//! - **controller**: The icon selection state machine
//! - **config**: JSON configuration
//! - **state**: Application wiring
//! - **logging**: Structured logging setup

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::IconSwapConfig;
pub use controller::IconSelectionController;
pub use error::{ErrorInfo, IconError};
pub use models::{
    ChangeResult, ControllerEvent, CustomIconAsset, IconCatalog, IconFileFormat, IconSelection,
    SelectionState, CUSTOM_ICON,
};
pub use services::{
    AdapterKind, IconDecoder, IconResources, IconTarget, LocalStorage, MemoryStore,
    PlatformIconAdapter, SelectionStore,
};
pub use state::IconSwapState;
