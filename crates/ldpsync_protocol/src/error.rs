//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol parsing.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while parsing protocol values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A timestamp literal could not be parsed.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp {
        /// The offending literal.
        value: String,
    },

    /// A digest header or URN could not be parsed.
    #[error("invalid digest: {value}")]
    InvalidDigest {
        /// The offending value.
        value: String,
    },

    /// A URI did not live under the expected base.
    #[error("uri {uri} is not under base {base}")]
    ForeignUri {
        /// The URI that was split.
        uri: String,
        /// The base it was expected under.
        base: String,
    },

    /// An unknown entity kind name.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}
