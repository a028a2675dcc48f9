//! In-memory mapping store.

use crate::error::ResolverResult;
use crate::store::MappingStore;
use ldpsync_protocol::ResourceLocation;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A mapping store held in memory.
///
/// Thread-safe; mappings are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    mappings: RwLock<HashMap<String, ResourceLocation>>,
}

impl MemoryMappingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for MemoryMappingStore {
    fn get(&self, identifier: &str) -> ResolverResult<Option<ResourceLocation>> {
        Ok(self.mappings.read().get(identifier).cloned())
    }

    fn put_if_absent(
        &self,
        identifier: &str,
        location: ResourceLocation,
    ) -> ResolverResult<ResourceLocation> {
        Ok(self
            .mappings
            .write()
            .entry(identifier.to_string())
            .or_insert(location)
            .clone())
    }

    fn len(&self) -> ResolverResult<usize> {
        Ok(self.mappings.read().len())
    }
}
