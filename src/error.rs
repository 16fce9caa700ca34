use thiserror::Error;
use tracing::{error, warn};

use crate::tabs::TabId;

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable, logged
    Error,    // operation failed, shown inline
    Critical, // session is over, user must reload the page
}

/// Domain-specific errors for the palette core
#[derive(Error, Debug)]
pub enum PaletteError {
    /// The host environment was reloaded; no retry can succeed.
    #[error("Extension context invalidated - please reload the page")]
    ContextInvalidated,

    #[error("Message channel error: {0}")]
    Channel(String),

    #[error("Invalid response to '{action}': {detail}")]
    InvalidResponse { action: &'static str, detail: String },

    #[error("'{action}' failed: {message}")]
    ActionFailed {
        action: &'static str,
        message: String,
    },

    #[error("Could not scan tab {tab_id}: {reason}")]
    ScanFailed { tab_id: TabId, reason: String },

    #[error("Tab {0} no longer exists")]
    NotFound(TabId),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaletteError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ContextInvalidated => ErrorSeverity::Critical,
            Self::Channel(_) => ErrorSeverity::Error,
            Self::InvalidResponse { .. } => ErrorSeverity::Warning,
            Self::ActionFailed { .. } => ErrorSeverity::Error,
            Self::ScanFailed { .. } => ErrorSeverity::Info,
            Self::NotFound(_) => ErrorSeverity::Error,
            Self::Config(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::ContextInvalidated => {
                "Extension was reloaded. Please refresh this page to continue using GoFaster."
                    .to_string()
            }
            Self::Channel(msg) => format!("Could not reach the extension: {}", msg),
            Self::InvalidResponse { .. } => "Invalid response from background script".to_string(),
            Self::ActionFailed { message, .. } => message.clone(),
            Self::ScanFailed { tab_id, .. } => format!("Could not search tab {}", tab_id),
            Self::NotFound(_) => "That tab is no longer open".to_string(),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
        }
    }

    /// True for the terminal "please reload the page" condition.
    pub fn is_context_invalidated(&self) -> bool {
        matches!(self, Self::ContextInvalidated)
    }
}

pub type Result<T> = std::result::Result<T, PaletteError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use gofaster::error::ResultExt;
///
/// // Highlighting in another tab is best-effort
/// directory.highlight_in_tab(id, query).await.warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
