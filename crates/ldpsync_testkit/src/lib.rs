//! # ldpsync Testkit
//!
//! Test utilities for ldpsync.
//!
//! This crate provides:
//! - `FakeRepository`, an in-memory LDP repository with ETags, binary
//!   descriptions, tombstones and versioning
//! - `FakeCms`, serving JSON-LD entities, files and digests
//! - `FakeNetwork`, routing one `HttpClient` to both by URL
//! - JSON-LD fixtures and proptest generators
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ldpsync_testkit::prelude::*;
//!
//! let network = FakeNetwork::new();
//! network.cms().put_entity(&node_url(1), node_jsonld(&node_url(1), "Title", T1));
//! let engine = SyncEngine::new(config(), PairtreeResolver::new(), network.clone());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cms;
pub mod fixtures;
pub mod generators;
pub mod network;
pub mod repository;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cms::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::network::*;
    pub use crate::repository::*;
}

pub use cms::*;
pub use fixtures::*;
pub use generators::*;
pub use network::*;
pub use repository::*;
