//! Resolver selection.

use crate::error::ResolverResult;
use crate::file::FileMappingStore;
use crate::memory::MemoryMappingStore;
use crate::resolver::{MappingResolver, PairtreeResolver, PathResolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which resolution strategy to use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResolverConfig {
    /// Deterministic pairtree paths; no state.
    #[default]
    Pairtree,
    /// Lookup/mint over an in-memory mapping.
    Memory,
    /// Lookup/mint over a JSON mapping document.
    File {
        /// Path of the mapping document.
        path: PathBuf,
    },
}

/// Builds the configured resolver.
///
/// # Errors
///
/// Returns an error if a file-backed store cannot be opened.
pub fn build_resolver(config: &ResolverConfig) -> ResolverResult<Box<dyn PathResolver>> {
    Ok(match config {
        ResolverConfig::Pairtree => Box::new(PairtreeResolver::new()),
        ResolverConfig::Memory => Box::new(MappingResolver::new(MemoryMappingStore::new())),
        ResolverConfig::File { path } => Box::new(MappingResolver::new(
            FileMappingStore::open_with_create_dirs(path)?,
        )),
    })
}
