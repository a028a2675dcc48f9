//! CLI error types.

use ldpsync_resolver::ResolverError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this tool.
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The effective configuration could not be rendered.
    #[error("cannot render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// The HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// Path resolution failed.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Output could not be rendered.
    #[error("cannot render output: {0}")]
    Json(#[from] serde_json::Error),
}
