//! Services behind the icon controller.
//!
//! - `storage` - persisted selection (SQLite or in-memory)
//! - `decoder` - validation, decode and normalization of dropped files
//! - `resources` - bundled icon images
//! - `platform` - adapters that make an icon live

pub mod decoder;
pub mod platform;
pub mod resources;
pub mod storage;

pub use decoder::IconDecoder;
pub use platform::{AdapterKind, ApplyHandle, IconTarget, PlatformIconAdapter};
pub use resources::IconResources;
pub use storage::{LocalStorage, MemoryStore, SelectionStore};
