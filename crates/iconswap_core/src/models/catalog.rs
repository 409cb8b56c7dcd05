//! Icon catalog and selection identifiers.

use crate::error::IconError;

use serde::{Deserialize, Serialize};

/// Identifier that stands for the user-supplied image.
pub const CUSTOM_ICON: &str = "Custom";

/// Ordered set of bundled icon identifiers.
///
/// Insertion order is display order and the first entry is the primary icon.
/// Never empty, never contains duplicates or the custom sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCatalog {
    entries: Vec<String>,
}

impl IconCatalog {
    /// Build a catalog, rejecting empty, duplicate or reserved identifiers.
    pub fn new<I, S>(entries: I) -> Result<Self, IconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.into();
            if entry.trim().is_empty() {
                return Err(IconError::config("Icon catalog contains an empty identifier"));
            }
            if entry == CUSTOM_ICON {
                return Err(IconError::config(format!(
                    "'{CUSTOM_ICON}' is reserved for user-supplied icons"
                )));
            }
            if seen.contains(&entry) {
                return Err(IconError::config(format!("Duplicate icon identifier '{entry}'")));
            }
            seen.push(entry);
        }

        if seen.is_empty() {
            return Err(IconError::config("Icon catalog must contain at least one icon"));
        }

        Ok(Self { entries: seen })
    }

    /// The primary (default) icon identifier.
    pub fn primary(&self) -> &str {
        &self.entries[0]
    }

    /// Check whether the identifier names the primary icon.
    pub fn is_primary(&self, id: &str) -> bool {
        self.primary() == id
    }

    /// Check whether the identifier names a bundled icon.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    /// All identifiers in display order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of bundled icons.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a catalog built through [`IconCatalog::new`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a requested identifier into a selection.
    ///
    /// Returns `None` for anything that is neither a catalog entry nor the
    /// custom sentinel.
    pub fn parse(&self, id: &str) -> Option<IconSelection> {
        if id == CUSTOM_ICON {
            Some(IconSelection::Custom)
        } else if self.contains(id) {
            Some(IconSelection::Catalog(id.to_string()))
        } else {
            None
        }
    }

    /// Restore a persisted identifier. Empty maps to the primary icon.
    pub fn restore(&self, persisted: &str) -> Option<IconSelection> {
        if persisted.is_empty() {
            return Some(IconSelection::Catalog(self.primary().to_string()));
        }
        self.parse(persisted)
    }
}

impl Default for IconCatalog {
    fn default() -> Self {
        Self { entries: vec!["AppIcon".to_string(), "AppIcon 2".to_string()] }
    }
}

/// The persisted icon selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconSelection {
    /// A bundled icon by identifier.
    Catalog(String),
    /// The user-supplied image.
    Custom,
}

impl IconSelection {
    /// The identifier written to storage.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Catalog(id) => id,
            Self::Custom => CUSTOM_ICON,
        }
    }

    /// Check whether this is the custom sentinel.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl std::fmt::Display for IconSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
