//! Persistent key-value storage for the selected icon.
//!
//! The controller only needs `get(key)` and `set(key, value)`, expressed by
//! the [`SelectionStore`] trait. [`LocalStorage`] keeps the values in a small
//! SQLite database; [`MemoryStore`] keeps them for the process lifetime.
//!
//! # Data Directory Locations
//!
//! - **macOS**: `~/Library/Application Support/dev.iconswap.IconSwap`
//! - **Windows**: `%APPDATA%\iconswap\IconSwap`
//! - **Linux**: `~/.local/share/iconswap`
//! - **Debug builds**: `./iconswap_data` in current directory

use crate::error::IconError;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key holding the selected icon identifier.
pub const SELECTED_ICON_KEY: &str = "appIcon";

/// Get the default data directory for the application.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./iconswap_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_dir()
            .map(|d| {
                #[cfg(target_os = "macos")]
                {
                    d.join("dev.iconswap.IconSwap")
                }
                #[cfg(target_os = "windows")]
                {
                    d.join("iconswap").join("IconSwap")
                }
                #[cfg(not(any(target_os = "macos", target_os = "windows")))]
                {
                    d.join("iconswap")
                }
            })
            .unwrap_or_else(|| PathBuf::from("./iconswap_data"))
    }
}

/// Initialize the data directory, creating it if needed.
pub fn init_data_dir(path: &Path) -> Result<(), IconError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(IconError::storage(
                format!("Data path exists but is not a directory: {}", path.display()),
                Some("Select a different location or remove the existing file"),
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|e| {
        IconError::storage(
            format!("Failed to create data directory '{}': {}", path.display(), e),
            Some("Check permissions or select a different location"),
        )
    })?;

    tracing::info!(path = %path.display(), "Created data directory");
    Ok(())
}

/// Key-value store used to persist the selection across restarts.
pub trait SelectionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, IconError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), IconError>;

    /// Read a value, falling back to `default` when missing.
    fn get_or(&self, key: &str, default: &str) -> Result<String, IconError> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Store name for logging.
    fn name(&self) -> &'static str;
}

impl<T: SelectionStore + ?Sized> SelectionStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, IconError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IconError> {
        (**self).set(key, value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// ============================================================================
// LocalStorage
// ============================================================================

/// SQLite-backed settings storage.
///
/// Thread-safe via internal Mutex. Uses WAL mode for concurrent reads.
pub struct LocalStorage {
    /// Thread-safe SQLite connection
    connection: Mutex<Connection>,
    /// Data directory path
    data_dir: PathBuf,
}

impl LocalStorage {
    /// Open or create local storage in the given data directory.
    pub fn open(data_dir: PathBuf) -> Result<Self, IconError> {
        init_data_dir(&data_dir)?;
        let db_path = data_dir.join("iconswap.db");
        Self::open_with_path(db_path, data_dir)
    }

    /// Open storage with a specific database path.
    pub fn open_with_path(db_path: PathBuf, data_dir: PathBuf) -> Result<Self, IconError> {
        let connection = Connection::open(&db_path).map_err(|e| {
            IconError::storage(
                format!("Failed to open database '{}': {}", db_path.display(), e),
                Some("The database file may be corrupted. Try deleting it to start fresh."),
            )
        })?;

        Self::configure_connection(&connection)?;

        let storage = Self { connection: Mutex::new(connection), data_dir };
        storage.run_migrations()?;

        tracing::info!(path = %db_path.display(), "Local storage opened");
        Ok(storage)
    }

    fn configure_connection(conn: &Connection) -> Result<(), IconError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )
        .map_err(|e| IconError::storage(format!("Failed to configure database: {e}"), None))
    }

    fn run_migrations(&self) -> Result<(), IconError> {
        const DOMAIN: &str = "settings";
        let conn = self.connection.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                domain TEXT NOT NULL,
                step INTEGER NOT NULL,
                migration TEXT NOT NULL,
                PRIMARY KEY(domain, step)
            ) STRICT",
            [],
        )
        .map_err(|e| IconError::storage(format!("Failed to create migrations table: {e}"), None))?;

        let current_step: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(step), 0) FROM migrations WHERE domain = ?",
                [DOMAIN],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_step < 1 {
            conn.execute_batch(
                "
                CREATE TABLE settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                ) STRICT;
                ",
            )
            .map_err(|e| IconError::storage(format!("Migration 1 failed: {e}"), None))?;

            conn.execute(
                "INSERT INTO migrations (domain, step, migration) VALUES (?1, 1, 'settings table')",
                [DOMAIN],
            )?;
            tracing::debug!(domain = DOMAIN, step = 1, "Applied storage migration");
        }

        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Delete a value.
    pub fn delete(&self, key: &str) -> Result<(), IconError> {
        let conn = self.connection.lock();
        conn.execute("DELETE FROM settings WHERE key = ?", [key])
            .map_err(|e| IconError::storage(format!("Failed to delete setting: {e}"), None))?;
        Ok(())
    }
}

impl SelectionStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, IconError> {
        let conn = self.connection.lock();
        conn.query_row("SELECT value FROM settings WHERE key = ?", [key], |row| row.get(0))
            .optional()
            .map_err(|e| IconError::storage(format!("Failed to load setting '{key}': {e}"), None))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IconError> {
        let conn = self.connection.lock();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .map_err(|e| IconError::storage(format!("Failed to save setting '{key}': {e}"), None))?;

        tracing::trace!(key, value, "Setting saved");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage").field("data_dir", &self.data_dir).finish()
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store. Values are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl SelectionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, IconError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IconError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
