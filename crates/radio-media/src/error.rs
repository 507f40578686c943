//! Error types for encoder operations.

use thiserror::Error;

/// Result type for encoder operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while supervising the encoder.
#[derive(Debug, Error)]
pub enum MediaError {
    /// A setting required to launch the encoder is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The encoder binary could not be started.
    #[error("Failed to launch encoder `{program}`: {message}")]
    Launch { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a launch failure error.
    pub fn launch(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Launch {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, MediaError::Configuration(_))
    }

    pub fn is_launch(&self) -> bool {
        matches!(self, MediaError::Launch { .. })
    }
}
