//! The path resolver seam and its two strategies.

use crate::error::ResolverResult;
use crate::pairtree::{normalize_identifier, pairtree_path};
use crate::store::MappingStore;
use ldpsync_protocol::ResourceLocation;
use tracing::debug;

/// Maps an entity identifier to its repository location.
pub trait PathResolver: Send + Sync {
    /// Looks up the location. `None` means no mapping exists yet.
    fn resolve(&self, identifier: &str, base: &str) -> ResolverResult<Option<ResourceLocation>>;

    /// Assigns a location to an identifier, or returns the one already assigned.
    fn mint(&self, identifier: &str, base: &str) -> ResolverResult<ResourceLocation>;

    /// Whether `resolve` can return `None` and `mint` is meaningful.
    fn supports_minting(&self) -> bool;
}

impl<R: PathResolver + ?Sized> PathResolver for Box<R> {
    fn resolve(&self, identifier: &str, base: &str) -> ResolverResult<Option<ResourceLocation>> {
        (**self).resolve(identifier, base)
    }

    fn mint(&self, identifier: &str, base: &str) -> ResolverResult<ResourceLocation> {
        (**self).mint(identifier, base)
    }

    fn supports_minting(&self) -> bool {
        (**self).supports_minting()
    }
}

/// Resolves by pairtree hashing alone. Never returns `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairtreeResolver;

impl PairtreeResolver {
    /// Creates the resolver.
    pub fn new() -> Self {
        Self
    }
}

impl PathResolver for PairtreeResolver {
    fn resolve(&self, identifier: &str, base: &str) -> ResolverResult<Option<ResourceLocation>> {
        Ok(Some(ResourceLocation::new(base, pairtree_path(identifier)?)))
    }

    fn mint(&self, identifier: &str, base: &str) -> ResolverResult<ResourceLocation> {
        Ok(ResourceLocation::new(base, pairtree_path(identifier)?))
    }

    fn supports_minting(&self) -> bool {
        false
    }
}

/// Resolves through a mapping store, minting pairtree locations on demand.
///
/// The stored location wins over the `base` of later calls: a location is
/// immutable once assigned.
#[derive(Debug)]
pub struct MappingResolver<S: MappingStore> {
    store: S,
}

impl<S: MappingStore> MappingResolver<S> {
    /// Creates a resolver over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: MappingStore> PathResolver for MappingResolver<S> {
    fn resolve(&self, identifier: &str, _base: &str) -> ResolverResult<Option<ResourceLocation>> {
        let id = normalize_identifier(identifier)?;
        self.store.get(&id)
    }

    fn mint(&self, identifier: &str, base: &str) -> ResolverResult<ResourceLocation> {
        let id = normalize_identifier(identifier)?;
        let candidate = ResourceLocation::new(base, pairtree_path(&id)?);
        let stored = self.store.put_if_absent(&id, candidate.clone())?;
        if stored != candidate {
            debug!(identifier = %id, location = %stored, "mint found an existing mapping");
        }
        Ok(stored)
    }

    fn supports_minting(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMappingStore;
    use crate::ResolverError;

    const ID: &str = "0a1b2c3d-0000-4000-8000-000000000001";
    const BASE: &str = "http://repo/rest";

    #[test]
    fn pairtree_always_resolves() {
        let resolver = PairtreeResolver::new();
        let loc = resolver.resolve(ID, BASE).unwrap().unwrap();
        assert_eq!(loc.uri(), format!("{}/0a/1b/2c/3d/{}", BASE, ID));
        assert_eq!(resolver.mint(ID, BASE).unwrap(), loc);
        assert!(!resolver.supports_minting());
    }

    #[test]
    fn mapping_resolve_then_mint_then_resolve() {
        let resolver = MappingResolver::new(MemoryMappingStore::new());
        assert!(resolver.resolve(ID, BASE).unwrap().is_none());

        let minted = resolver.mint(ID, BASE).unwrap();
        assert_eq!(resolver.resolve(ID, BASE).unwrap(), Some(minted.clone()));

        // Minting again, even against another base, returns the stored location.
        assert_eq!(resolver.mint(ID, "http://other/rest").unwrap(), minted);
        assert_eq!(resolver.store().len().unwrap(), 1);
    }

    #[test]
    fn mapping_normalizes_case() {
        let resolver = MappingResolver::new(MemoryMappingStore::new());
        let minted = resolver.mint(&ID.to_uppercase(), BASE).unwrap();
        assert_eq!(resolver.resolve(ID, BASE).unwrap(), Some(minted));
    }

    #[test]
    fn malformed_identifier() {
        let resolver = MappingResolver::new(MemoryMappingStore::new());
        assert!(matches!(
            resolver.resolve("nope", BASE),
            Err(ResolverError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn boxed_resolver_delegates() {
        let resolver: Box<dyn PathResolver> =
            Box::new(MappingResolver::new(MemoryMappingStore::new()));
        assert!(resolver.supports_minting());
        assert!(resolver.resolve(ID, BASE).unwrap().is_none());
    }
}
