//! # ldpsync Graph
//!
//! Typed linked-data graph and the metadata transformer.
//!
//! This crate provides:
//! - `Graph` and `Term`, a subject → predicate → values model with a single
//!   lookup primitive, [`Graph::predicate_values`]
//! - Reading and writing expanded JSON-LD
//! - `MetadataTransformer`, which turns a CMS entity graph into the exact
//!   triples the repository should store
//!
//! This is a pure crate with no I/O. JSON-LD contexts are not processed:
//! both upstreams exchange expanded documents.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod graph;
mod jsonld;
mod term;
mod transform;
pub mod vocab;

pub use error::{GraphError, GraphResult};
pub use graph::Graph;
pub use jsonld::{from_json, parse_jsonld, to_json, to_jsonld_bytes, JSONLD_CONTENT_TYPE};
pub use term::{Literal, Term};
pub use transform::{
    modified_marker, strip_format_suffix, MetadataTransformer, RepositoryPayload,
    TransformOptions,
};
