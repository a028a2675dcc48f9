//! Handler error types.

use ldpsync_engine::SyncError;
use thiserror::Error;

/// Result type for request handling.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors that end a request before or during synchronization.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A required header was absent or empty.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The request named no entity.
    #[error("missing entity identifier")]
    MissingIdentifier,

    /// Credentials were required but not supplied.
    #[error("authorization required")]
    Unauthorized,

    /// The engine refused or failed the request.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl HandlerError {
    /// The HTTP status to answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::MissingHeader(_) | HandlerError::MissingIdentifier => 400,
            HandlerError::Unauthorized => 401,
            HandlerError::Sync(e) => e.status_code(),
        }
    }
}
