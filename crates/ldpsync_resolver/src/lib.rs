//! # ldpsync Resolver
//!
//! Maps an entity identifier to its repository location.
//!
//! Two strategies sit behind the one [`PathResolver`] trait:
//! - [`PairtreeResolver`]: a pure function of the identifier
//! - [`MappingResolver`]: looks the identifier up in a [`MappingStore`] and
//!   mints a pairtree location on first use
//!
//! [`build_resolver`] picks one from a [`ResolverConfig`].
//!
//! ## Key Invariants
//!
//! - A location, once assigned to an identifier, never changes
//! - Minting is idempotent: minting twice returns the stored location

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod file;
mod memory;
mod pairtree;
mod resolver;
mod store;

pub use config::{build_resolver, ResolverConfig};
pub use error::{ResolverError, ResolverResult};
pub use file::FileMappingStore;
pub use memory::MemoryMappingStore;
pub use pairtree::{normalize_identifier, pairtree_path};
pub use resolver::{MappingResolver, PairtreeResolver, PathResolver};
pub use store::MappingStore;
