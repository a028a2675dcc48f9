//! Error types for the resolver crate.

use thiserror::Error;

/// Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors that can occur while resolving or minting a location.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The identifier is not a well-formed UUID.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The mapping store could not be read or written.
    #[error("mapping store error: {0}")]
    Store(String),

    /// I/O error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted mapping document is corrupt.
    #[error("corrupt mapping document: {0}")]
    Corrupt(#[from] serde_json::Error),
}
