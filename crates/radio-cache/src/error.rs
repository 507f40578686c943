//! Error types for cache synchronization.

use radio_media::{ManifestFormatError, MediaError};
use thiserror::Error;

/// Result type for cache operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote manifest or one of its files could not be retrieved.
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The remote manifest is not usable.
    #[error("Invalid remote manifest: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, SyncError::Fetch { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}

impl From<ManifestFormatError> for SyncError {
    fn from(e: ManifestFormatError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<MediaError> for SyncError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Io(e) => Self::Io(e),
            other => Self::Internal(other.to_string()),
        }
    }
}
