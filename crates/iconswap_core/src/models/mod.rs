//! Data models for iconswap.
//!
//! - `catalog` - IconCatalog, IconSelection and the custom sentinel
//! - `asset` - CustomIconAsset and accepted file formats
//! - `change` - ChangeResult, SelectionState, ControllerEvent

pub mod asset;
pub mod catalog;
pub mod change;

pub use asset::{CustomIconAsset, IconFileFormat};
pub use catalog::{IconCatalog, IconSelection, CUSTOM_ICON};
pub use change::{ChangeResult, ControllerEvent, SelectionState};
