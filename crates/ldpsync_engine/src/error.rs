//! Error types for the sync engine.
//!
//! Upstream failures are not errors: they come back as `Upstream` variants
//! and end up in a `SyncOutcome`. A `SyncError` means a local assumption was
//! violated.

use ldpsync_graph::GraphError;
use ldpsync_protocol::ProtocolError;
use ldpsync_resolver::ResolverError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The caller's request was incomplete or invalid.
    #[error("invalid request: {0}")]
    ClientInput(String),

    /// Metadata on either side did not have the expected shape.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// The repository lacks a capability the operation needs.
    #[error("repository does not support {0}")]
    Capability(String),

    /// The path resolver failed.
    #[error("resolver error: {0}")]
    Resolver(#[source] ResolverError),

    /// Invalid phase transition.
    #[error("invalid phase transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current phase.
        from: String,
        /// Attempted target phase.
        to: String,
    },
}

impl SyncError {
    /// The HTTP status a caller-facing interface should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            SyncError::ClientInput(_) => 400,
            SyncError::Capability(_) => 405,
            SyncError::MalformedMetadata(_)
            | SyncError::Resolver(_)
            | SyncError::InvalidStateTransition { .. } => 500,
        }
    }
}

impl From<GraphError> for SyncError {
    fn from(error: GraphError) -> Self {
        SyncError::MalformedMetadata(error.to_string())
    }
}

impl From<ResolverError> for SyncError {
    fn from(error: ResolverError) -> Self {
        match error {
            ResolverError::MalformedIdentifier(id) => {
                SyncError::ClientInput(format!("malformed identifier: {}", id))
            }
            other => SyncError::Resolver(other),
        }
    }
}

impl From<ProtocolError> for SyncError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::UnknownKind(kind) => {
                SyncError::ClientInput(format!("unknown entity kind: {}", kind))
            }
            other => SyncError::MalformedMetadata(other.to_string()),
        }
    }
}
