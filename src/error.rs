//! Notification Error Types
//!
//! Defines the errors surfaced by subscribe, publish, lock and queue operations.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while coordinating through marker files
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Marker file create/remove/stat failed for a reason other than not-found
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The namespace lock file could not be opened or locked
    #[error("Failed to acquire namespace lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Publish deadline elapsed before an armed marker appeared
    #[error("Timed out after {}ms publishing event '{event}'", .timeout.as_millis())]
    Timeout { event: String, timeout: Duration },

    /// Instance has been closed
    #[error("Notifier is closed")]
    Closed,

    /// Configuration rejected by validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl NotifyError {
    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a lock acquisition error
    pub fn lock(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Lock {
            path: path.into(),
            source,
        }
    }

    /// Create a publish timeout error
    pub fn timeout(event: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            event: event.into(),
            timeout,
        }
    }

    /// Create a configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
