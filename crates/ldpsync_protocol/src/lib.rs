//! # ldpsync Protocol
//!
//! Shared data model for the ldpsync synchronizer.
//!
//! This crate provides:
//! - `EntityRef` and `ResourceLocation` for addressing
//! - `ConcurrencyToken`, `ModifiedMarker` and `ContentDigest` for change detection
//! - `LinkRelations` for parsing `Link` headers
//! - `Upstream<T>` and `SyncOutcome` for classified results
//! - The `HttpClient` seam and a scripted `MockHttpClient`
//!
//! This is a pure model crate. It performs no I/O of its own.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod digest;
mod entity;
mod error;
mod http;
mod link;
mod location;
mod marker;
mod outcome;
mod token;

pub use auth::AuthToken;
pub use digest::{ContentDigest, DigestAlgorithm};
pub use entity::{EntityKind, EntityRef};
pub use error::{ProtocolError, ProtocolResult};
pub use http::{
    header, HttpClient, HttpRequest, HttpResponse, Method, MockHttpClient, TransportError,
};
pub use link::{LinkRelation, LinkRelations};
pub use location::ResourceLocation;
pub use marker::ModifiedMarker;
pub use outcome::{
    ConflictReason, FaultKind, SyncOutcome, SyncStatus, Upstream, UpstreamFault, UpstreamSource,
};
pub use token::ConcurrencyToken;
