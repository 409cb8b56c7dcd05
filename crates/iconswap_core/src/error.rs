//! Error types for iconswap.
//!
//! Every failure the controller can meet is one of these variants. The
//! controller converts them into a [`ChangeResult`](crate::models::ChangeResult)
//! before anything reaches the view, so none of them are ever fatal.

use thiserror::Error;

/// Main error type for iconswap.
#[derive(Debug, Error)]
pub enum IconError {
    /// Bad input shape: unsupported file extension, unknown identifier.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The platform call failed, a resource was missing, or decoding failed.
    #[error("{message}")]
    Platform {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The environment has no support for the requested icon change.
    #[error("Unsupported: {message}")]
    Unsupported {
        /// What was not supported.
        message: String,
    },

    /// Local SQLite storage or filesystem error.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl IconError {
    // ========== Constructors ==========

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Create a new platform error.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform { message: message.into(), source: None }
    }

    /// Create a new platform error with source.
    pub fn platform_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Platform { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported { message: message.into() }
    }

    /// Create a new storage error.
    pub fn storage(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::Storage { message: message.into(), hint: hint.map(String::from), source: None }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// Check if this error means the capability is absent.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this error was caused by bad input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Validation",
            Self::Platform { .. } => "Platform",
            Self::Unsupported { .. } => "Unsupported",
            Self::Storage { .. } => "Storage",
            Self::Config { .. } => "Config",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => Some("Use a PNG, JPEG or SVG image"),
            Self::Platform { .. } => Some("Select the icon again to retry"),
            Self::Unsupported { .. } => None,
            Self::Storage { hint, .. } => hint.as_deref(),
            Self::Config { .. } => Some("Check config.json in the data directory"),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let technical_detail = match self {
            Self::Platform { source: Some(source), .. }
            | Self::Storage { source: Some(source), .. } => Some(source.to_string()),
            _ => None,
        };

        ErrorInfo {
            error_type: format!("{} Error", self.category()),
            message: self.to_string(),
            hint: self.hint().map(String::from),
            technical_detail,
        }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Platform Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Convert from rusqlite::Error to IconError.
impl From<rusqlite::Error> for IconError {
    fn from(err: rusqlite::Error) -> Self {
        IconError::Storage {
            message: err.to_string(),
            hint: Some("The local database may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from std::io::Error to IconError.
impl From<std::io::Error> for IconError {
    fn from(err: std::io::Error) -> Self {
        IconError::Storage {
            message: err.to_string(),
            hint: Some("Check file permissions and disk space".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from serde_json::Error to IconError.
impl From<serde_json::Error> for IconError {
    fn from(err: serde_json::Error) -> Self {
        IconError::Config { message: format!("Invalid JSON: {err}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_hints() {
        let err = IconError::validation("unsupported format");
        assert_eq!(err.category(), "Validation");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "unsupported format");

        let err = IconError::unsupported("alternate icons");
        assert!(err.is_unsupported());
        assert!(err.hint().is_none());

        let err = IconError::storage("disk full", Some("Free some space"));
        assert_eq!(err.hint(), Some("Free some space"));
    }

    #[test]
    fn test_error_info_carries_source_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = IconError::platform_with_source("could not load image", io);
        let info = err.to_error_info();

        assert_eq!(info.error_type, "Platform Error");
        assert_eq!(info.message, "could not load image");
        assert_eq!(info.technical_detail.as_deref(), Some("no such file"));
    }

    #[test]
    fn test_json_error_maps_to_config() {
        let err: IconError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.category(), "Config");
    }
}
