//! Error types for the graph crate.

use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while reading or transforming a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The document was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The JSON was valid but not a JSON-LD shape we understand.
    #[error("invalid JSON-LD structure: {0}")]
    InvalidStructure(String),

    /// The subject to rewrite does not appear in the graph.
    #[error("subject {subject} not found in graph")]
    SubjectNotFound {
        /// The missing subject.
        subject: String,
    },

    /// A required literal could not be interpreted.
    #[error("malformed value for {predicate}: {value}")]
    MalformedLiteral {
        /// Predicate carrying the value.
        predicate: String,
        /// The offending value.
        value: String,
    },
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::InvalidJson(err.to_string())
    }
}
