//! Mapping store trait.

use crate::error::ResolverResult;
use ldpsync_protocol::ResourceLocation;

/// Persistent identifier → location mapping.
///
/// # Invariants
///
/// - `put_if_absent` never replaces an existing mapping
/// - `put_if_absent` returns whatever location is stored after the call,
///   which is the caller's location only if it won the race
///
/// # Implementors
///
/// - [`crate::MemoryMappingStore`] - For testing and single-process use
/// - [`crate::FileMappingStore`] - JSON document on disk
pub trait MappingStore: Send + Sync {
    /// Looks up the location for an identifier.
    fn get(&self, identifier: &str) -> ResolverResult<Option<ResourceLocation>>;

    /// Stores a mapping unless one already exists, returning the stored location.
    fn put_if_absent(
        &self,
        identifier: &str,
        location: ResourceLocation,
    ) -> ResolverResult<ResourceLocation>;

    /// Number of stored mappings.
    fn len(&self) -> ResolverResult<usize>;

    /// Returns true if nothing is stored.
    fn is_empty(&self) -> ResolverResult<bool> {
        Ok(self.len()? == 0)
    }
}
