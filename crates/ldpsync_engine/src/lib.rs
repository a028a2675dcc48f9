//! # ldpsync Engine
//!
//! Pushes CMS entity state into an LDP object repository.
//!
//! This crate provides:
//! - `ContentSourceClient` for reading CMS entities, files and digests
//! - `RepositoryClient` for conditional reads and writes against the repository
//! - `SyncEngine`, the per-request state machine tying them together
//!
//! ## Architecture
//!
//! Every request walks the same phases:
//!
//! ```text
//! Resolving → (Creating | Comparing) → Writing → (Done | Conflict | Failed)
//! ```
//!
//! Upstream calls return `Upstream<T>`; a non-`Ok` result ends the walk with
//! the upstream status forwarded unchanged.
//!
//! ## Key Invariants
//!
//! - Updates are sent with `If-Match`, creations with `If-None-Match: *`
//! - A repository copy at least as new as the CMS state is never overwritten
//! - Binaries are only transferred when their digest changed
//! - Nothing is retried

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod exchange;

mod config;
mod content;
mod engine;
mod error;
mod repository;
mod state;

pub use config::{SyncConfig, DEFAULT_REPOSITORY_BASE};
pub use content::{BinaryContent, BinaryProbe, CmsEntity, ContentSourceClient};
pub use engine::{DeleteRequest, SaveRequest, SyncEngine, VersionRequest};
pub use error::{SyncError, SyncResult};
pub use repository::{
    RepositoryClient, RepositoryResource, ResourceHead, VersionReceipt, WriteBody, WriteReceipt,
};
pub use state::SyncPhase;
