//! Command line error types.

use taleweave_core::error::{ServiceError, SessionError};
use taleweave_http::config::ConfigError;
use thiserror::Error;

/// Failures that end a command.
#[derive(Debug, Error)]
pub enum AppError {
    /// The environment or flags are missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A story service call made outside a reading session failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The reading session failed in a way the reader cannot recover from.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Terminal input or output failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns `true` if the story service rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Service(ServiceError::Unauthorized) | Self::Session(SessionError::Unauthorized)
        )
    }
}
