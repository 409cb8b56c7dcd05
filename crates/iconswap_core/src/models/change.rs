//! Outcomes of icon changes and the events the controller publishes.

use crate::error::IconError;

use serde::Serialize;

/// Outcome of an apply attempt.
///
/// Produced per call and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChangeResult {
    /// The icon is now live.
    Applied(String),
    /// The environment cannot change icons at all. Not retried.
    Unsupported,
    /// The platform call, resource lookup or decode failed.
    PlatformError(String),
    /// The request itself was malformed.
    ValidationError(String),
    /// Custom icon selected but no image loaded yet. Not an error.
    PendingCustom,
    /// Work is in flight; the final result arrives as a completion.
    Dispatched(String),
}

impl ChangeResult {
    /// Map an error into the result taxonomy.
    pub fn from_error(err: &IconError) -> Self {
        match err {
            IconError::Validation { message } => Self::ValidationError(message.clone()),
            IconError::Unsupported { .. } => Self::Unsupported,
            IconError::Platform { message, .. } => Self::PlatformError(message.clone()),
            other => Self::PlatformError(other.to_string()),
        }
    }

    /// Check whether this result reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Unsupported | Self::PlatformError(_) | Self::ValidationError(_))
    }

    /// Check whether the result is final (not waiting on a completion).
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Dispatched(_))
    }

    /// User-facing message for an alert.
    pub fn message(&self) -> String {
        match self {
            Self::Applied(label) => format!("App icon changed successfully to {label}!"),
            Self::Unsupported => {
                "Alternative app icons are not supported on this device.".to_string()
            }
            Self::PlatformError(message) => format!("Failed to change app icon: {message}"),
            Self::ValidationError(message) => format!("Invalid icon: {message}"),
            Self::PendingCustom => "Drop an image to use it as the app icon.".to_string(),
            Self::Dispatched(label) => format!("Changing app icon to {label}..."),
        }
    }
}

impl std::fmt::Display for ChangeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Observable projection of the controller's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionState {
    /// A bundled icon is selected.
    Catalog(String),
    /// Custom selected, waiting for an image (the view shows the drop target).
    PendingCustom,
    /// Custom selected and an image is loaded.
    Custom,
}

/// Notification published to controller subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The selection state changed.
    SelectionChanged(SelectionState),
    /// A user-facing outcome to present.
    Outcome(ChangeResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_mapping() {
        assert_eq!(
            ChangeResult::from_error(&IconError::validation("unsupported format")),
            ChangeResult::ValidationError("unsupported format".into())
        );
        assert_eq!(
            ChangeResult::from_error(&IconError::unsupported("no alternate icons")),
            ChangeResult::Unsupported
        );
        assert_eq!(
            ChangeResult::from_error(&IconError::platform("resource not found")),
            ChangeResult::PlatformError("resource not found".into())
        );
        assert!(matches!(
            ChangeResult::from_error(&IconError::internal("boom")),
            ChangeResult::PlatformError(_)
        ));
    }

    #[test]
    fn test_markers_are_not_errors() {
        assert!(!ChangeResult::PendingCustom.is_error());
        assert!(!ChangeResult::Dispatched("AppIcon".into()).is_error());
        assert!(!ChangeResult::Dispatched("AppIcon".into()).is_final());
        assert!(ChangeResult::Unsupported.is_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ChangeResult::Applied("AppIcon 2".into()).message(),
            "App icon changed successfully to AppIcon 2!"
        );
        assert_eq!(
            ChangeResult::PlatformError("denied".into()).to_string(),
            "Failed to change app icon: denied"
        );
    }
}
